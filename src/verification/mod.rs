// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Query driver: discharges assertion and equivalence obligations against
//! the solver and projects models back onto base variable names.

pub mod encoder;
pub mod solver;

use crate::error::SolverError;
use crate::ssa::SsaProgram;
use encoder::encode_program;
use solver::{CheckResult, Formula, SmtSolver, SolverValue};
use std::collections::BTreeMap;

/// Base variable name to integer value, lexicographically ordered.
pub type VarMap = BTreeMap<String, i64>;

/// Base variable name to a (program 1, program 2) value pair.
pub type VarPairMap = BTreeMap<String, (i64, i64)>;

#[derive(Debug, Clone, serde::Serialize)]
pub struct VerificationResult {
    pub ok: bool,
    pub examples: Vec<VarMap>,
    pub counterexamples: Vec<VarMap>,
    pub ssa_text: String,
    pub smt_text: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct EquivalenceResult {
    pub ok: bool,
    pub examples: Vec<VarMap>,
    pub counterexamples: Vec<VarPairMap>,
    pub ssa1_text: String,
    pub ssa2_text: String,
    pub smt_text: String,
}

fn project(program: &SsaProgram, prefix: &str, assignments: &std::collections::HashMap<String, SolverValue>) -> VarMap {
    let mut out = VarMap::new();
    for (name, version) in &program.max_version {
        let key = if prefix.is_empty() { format!("{}_{}", name, version) } else { format!("{}{}_{}", prefix, name, version) };
        if let Some(SolverValue::Int(v)) = assignments.get(&key) {
            out.insert(name.clone(), *v);
        }
    }
    out
}

fn blocking_entry(program: &SsaProgram, prefix: &str, assignments: &std::collections::HashMap<String, SolverValue>) -> std::collections::HashMap<String, SolverValue> {
    let mut out = std::collections::HashMap::new();
    for (name, version) in &program.max_version {
        let key = if prefix.is_empty() { format!("{}_{}", name, version) } else { format!("{}{}_{}", prefix, name, version) };
        if let Some(value) = assignments.get(&key) {
            out.insert(key, value.clone());
        }
    }
    out
}

/// At most two counterexamples are ever reported; the second search
/// forbids the exact final-value vector of the first (see the open
/// question on blocking-clause scope recorded for this component).
const MAX_COUNTEREXAMPLES: usize = 2;

pub fn check_program(program: &SsaProgram) -> Result<VerificationResult, SolverError> {
    let encoded = encode_program(program, "").map_err(|e| SolverError::Internal { message: e.to_string() })?;
    let gamma = Formula::And(encoded.assumptions.clone());
    let solver = SmtSolver::new();

    let mut counterexamples = Vec::new();
    let mut ok = true;

    for obligation in &encoded.obligations {
        let goal = Formula::Implies(Box::new(gamma.clone()), Box::new(obligation.clone()));
        let mut blocked = Vec::new();
        loop {
            match solver.check_valid(&goal, &blocked)? {
                CheckResult::Verified => break,
                CheckResult::Failed(model) => {
                    ok = false;
                    counterexamples.push(project(program, "", &model.assignments));
                    if counterexamples.len() >= MAX_COUNTEREXAMPLES {
                        break;
                    }
                    blocked.push(blocking_entry(program, "", &model.assignments));
                }
            }
        }
    }

    let examples = match solver.find_model(&gamma)? {
        Some(assignments) => vec![project(program, "", &assignments)],
        None => Vec::new(),
    };

    Ok(VerificationResult {
        ok,
        examples: if ok { examples } else { Vec::new() },
        counterexamples,
        ssa_text: program.render(),
        smt_text: encoded.assumptions.iter().map(|f| f.to_string()).collect::<Vec<_>>().join("\n"),
    })
}

pub fn check_equivalence(program1: &SsaProgram, program2: &SsaProgram) -> Result<EquivalenceResult, SolverError> {
    let encoded1 = encode_program(program1, "").map_err(|e| SolverError::Internal { message: e.to_string() })?;
    let encoded2 = encode_program(program2, "p2_").map_err(|e| SolverError::Internal { message: e.to_string() })?;

    let mut common: Vec<String> = program1.outputs().into_iter().filter(|n| program2.max_version.contains_key(n)).collect();
    common.sort();

    let equalities: Vec<Formula> = common
        .iter()
        .map(|name| {
            let v1 = program1.max_version[name];
            let v2 = program2.max_version[name];
            Formula::Eq(
                Box::new(Formula::IntVar(format!("{}_{}", name, v1))),
                Box::new(Formula::IntVar(format!("p2_{}_{}", name, v2))),
            )
        })
        .collect();
    let equivalence = Formula::And(equalities);

    // Γ is the background constraints only; each program's own `assert`
    // obligations are never folded in here (mirroring `check_program`),
    // since a failing obligation folded into the antecedent would make
    // the implication vacuously valid.
    let mut gamma_terms = encoded1.assumptions.clone();
    gamma_terms.extend(encoded2.assumptions.clone());
    let gamma = Formula::And(gamma_terms);

    let solver = SmtSolver::new();

    // The obligations discharged against Γ: every assert obligation from
    // each program, plus the equivalence predicate itself, each checked
    // separately exactly as `check_program` discharges its obligation list.
    let mut obligations = encoded1.obligations.clone();
    obligations.extend(encoded2.obligations.clone());
    obligations.push(equivalence);

    let mut counterexamples = Vec::new();
    let mut ok = true;

    for obligation in &obligations {
        let goal = Formula::Implies(Box::new(gamma.clone()), Box::new(obligation.clone()));
        let mut blocked = Vec::new();
        loop {
            match solver.check_valid(&goal, &blocked)? {
                CheckResult::Verified => break,
                CheckResult::Failed(model) => {
                    ok = false;
                    let mut pair_map = VarPairMap::new();
                    for name in &common {
                        let v1 = program1.max_version[name];
                        let v2 = program2.max_version[name];
                        let a = model.assignments.get(&format!("{}_{}", name, v1));
                        let b = model.assignments.get(&format!("p2_{}_{}", name, v2));
                        if let (Some(SolverValue::Int(a)), Some(SolverValue::Int(b))) = (a, b) {
                            if a != b {
                                pair_map.insert(name.clone(), (*a, *b));
                            }
                        }
                    }
                    let mut entry = blocking_entry(program1, "", &model.assignments);
                    entry.extend(blocking_entry(program2, "p2_", &model.assignments));
                    counterexamples.push(pair_map);
                    if counterexamples.len() >= MAX_COUNTEREXAMPLES {
                        break;
                    }
                    blocked.push(entry);
                }
            }
        }
    }

    let examples = if ok {
        match solver.find_model(&gamma)? {
            Some(assignments) => {
                let mut combined = project(program1, "", &assignments);
                combined.extend(project(program2, "p2_", &assignments));
                vec![combined]
            }
            None => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let smt_text = gamma_terms_text(&encoded1.assumptions, &encoded2.assumptions);

    Ok(EquivalenceResult {
        ok,
        examples,
        counterexamples,
        ssa1_text: program1.render(),
        ssa2_text: program2.render(),
        smt_text,
    })
}

fn gamma_terms_text(a: &[Formula], b: &[Formula]) -> String {
    a.iter().chain(b.iter()).map(|f| f.to_string()).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::ssa::builder::build_ssa;
    use crate::ssa::unroll::unroll_program;

    fn build(src: &str, depth: u32) -> SsaProgram {
        let program = parse_source(src, "t.vb").unwrap();
        let unrolled = unroll_program(program.statements, depth);
        build_ssa(&unrolled).unwrap()
    }

    #[test]
    fn test_valid_program_has_no_counterexample() {
        let program = build("var x := 5; assert x == 5;", 3);
        let result = check_program(&program).unwrap();
        assert!(result.ok);
        assert!(result.counterexamples.is_empty());
    }

    #[test]
    fn test_failing_assertion_reports_counterexample() {
        let program = build("var x := 10; var y := 5; var z := 0; while(y>0){ z:=z+x; y:=y-1; } assert z==51;", 5);
        let result = check_program(&program).unwrap();
        assert!(!result.ok);
        assert_eq!(result.counterexamples[0].get("z"), Some(&50));
    }

    #[test]
    fn test_equivalent_programs_report_ok() {
        let p1 = build("var x := 3; var y := x + x;", 3);
        let p2 = build("var x := 3; var y := 2 * x;", 3);
        let result = check_equivalence(&p1, &p2).unwrap();
        assert!(result.ok);
    }

    #[test]
    fn test_inequivalent_programs_report_differing_output() {
        let p1 = build("var x := 3; var y := x + 1;", 3);
        let p2 = build("var x := 3; var y := x + 2;", 3);
        let result = check_equivalence(&p1, &p2).unwrap();
        assert!(!result.ok);
        assert_eq!(result.counterexamples[0].get("y"), Some(&(4, 5)));
    }

    #[test]
    fn test_a_failing_assert_in_one_program_does_not_make_the_equivalence_query_vacuous() {
        // program 1's obligation is unsatisfiable on its own; folding it into
        // the background constraints would make Γ ⟹ E vacuously valid for
        // any E, masking the real difference between x=1 and x=2.
        let p1 = build("var x := 1; assert 1 == 2;", 3);
        let p2 = build("var x := 2;", 3);
        let result = check_equivalence(&p1, &p2).unwrap();
        assert!(!result.ok);
    }
}
