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

//! Dead-code elimination over SSA.
//!
//! A `(name, version)` is live if it is read by an `assert`, an `if`
//! condition, a Φ-node source, or transitively by the value of another
//! live definition. The final version of every base variable is also
//! treated as live — it may be the subject of an equivalence check that
//! has not been encoded yet when this pass runs, so eliminating it would
//! silently change what can be compared. Control-flow statements and
//! asserts are never removed, only the dead bindings inside them.

use crate::ssa::{SsaExpr, SsaProgram, SsaStmt};
use std::collections::{HashMap, HashSet};

type Key = (String, u32);

pub fn run(mut program: SsaProgram) -> SsaProgram {
    let mut def_uses: HashMap<Key, Vec<Key>> = HashMap::new();
    let mut roots: HashSet<Key> = HashSet::new();

    collect(&program.statements, &mut def_uses, &mut roots);
    for (name, version) in &program.max_version {
        roots.insert((name.clone(), *version));
    }

    let live = closure(roots, &def_uses);
    program.statements = filter_stmts(program.statements, &live);
    program
}

fn collect_uses(expr: &SsaExpr, out: &mut Vec<Key>) {
    match expr {
        SsaExpr::IntLit(_) | SsaExpr::BoolLit(_) => {}
        SsaExpr::Var(name, version) => out.push((name.clone(), *version)),
        SsaExpr::Unary(_, operand) => collect_uses(operand, out),
        SsaExpr::Binary(_, lhs, rhs) => {
            collect_uses(lhs, out);
            collect_uses(rhs, out);
        }
    }
}

fn collect(stmts: &[SsaStmt], def_uses: &mut HashMap<Key, Vec<Key>>, roots: &mut HashSet<Key>) {
    for stmt in stmts {
        match stmt {
            SsaStmt::Decl { name, version, value } | SsaStmt::Assign { name, version, value } => {
                let mut uses = Vec::new();
                collect_uses(value, &mut uses);
                def_uses.insert((name.clone(), *version), uses);
            }
            SsaStmt::If { cond, then_branch, else_branch, phis } => {
                let mut uses = Vec::new();
                collect_uses(cond, &mut uses);
                roots.extend(uses);
                collect(then_branch, def_uses, roots);
                collect(else_branch, def_uses, roots);
                for phi in phis {
                    def_uses.insert((phi.name.clone(), phi.version), phi.sources.clone());
                }
            }
            SsaStmt::While { cond, body, phis } => {
                let mut uses = Vec::new();
                collect_uses(cond, &mut uses);
                roots.extend(uses);
                collect(body, def_uses, roots);
                for phi in phis {
                    def_uses.insert((phi.name.clone(), phi.version), phi.sources.clone());
                }
            }
            SsaStmt::Phi(phi) => {
                def_uses.insert((phi.name.clone(), phi.version), phi.sources.clone());
            }
            SsaStmt::Assert { cond } => {
                let mut uses = Vec::new();
                collect_uses(cond, &mut uses);
                roots.extend(uses);
            }
        }
    }
}

fn closure(roots: HashSet<Key>, def_uses: &HashMap<Key, Vec<Key>>) -> HashSet<Key> {
    let mut live = HashSet::new();
    let mut stack: Vec<Key> = roots.into_iter().collect();
    while let Some(key) = stack.pop() {
        if live.insert(key.clone()) {
            if let Some(uses) = def_uses.get(&key) {
                stack.extend(uses.iter().cloned());
            }
        }
    }
    live
}

fn filter_stmts(stmts: Vec<SsaStmt>, live: &HashSet<Key>) -> Vec<SsaStmt> {
    stmts
        .into_iter()
        .filter_map(|stmt| match stmt {
            SsaStmt::Decl { name, version, value } => {
                live.contains(&(name.clone(), version)).then_some(SsaStmt::Decl { name, version, value })
            }
            SsaStmt::Assign { name, version, value } => {
                live.contains(&(name.clone(), version)).then_some(SsaStmt::Assign { name, version, value })
            }
            SsaStmt::If { cond, then_branch, else_branch, phis } => Some(SsaStmt::If {
                cond,
                then_branch: filter_stmts(then_branch, live),
                else_branch: filter_stmts(else_branch, live),
                phis,
            }),
            SsaStmt::While { cond, body, phis } => {
                Some(SsaStmt::While { cond, body: filter_stmts(body, live), phis })
            }
            other => Some(other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::ssa::builder::build_ssa;
    use crate::ssa::unroll::unroll_program;

    fn build(src: &str) -> SsaProgram {
        let program = parse_source(src, "t.vb").unwrap();
        let unrolled = unroll_program(program.statements, 3);
        build_ssa(&unrolled).unwrap()
    }

    #[test]
    fn test_unused_declaration_is_removed() {
        let program = run(build("var x := 1; var y := 2; assert x == 1;"));
        let has_y = program.statements.iter().any(|s| matches!(s, SsaStmt::Decl { name, .. } if name == "y"));
        assert!(!has_y);
    }

    #[test]
    fn test_transitively_used_declaration_survives() {
        let program = run(build("var x := 1; var y := x + 1; assert y == 2;"));
        let has_x = program.statements.iter().any(|s| matches!(s, SsaStmt::Decl { name, .. } if name == "x"));
        assert!(has_x);
    }

    #[test]
    fn test_final_output_version_survives_even_if_unused() {
        let program = run(build("var x := 1; var y := 2; assert x == 1;"));
        assert_eq!(program.max_version.get("y"), Some(&0));
        let has_y = program.statements.iter().any(|s| matches!(s, SsaStmt::Decl { name, .. } if name == "y"));
        assert!(has_y, "the final version of y is a potential equivalence output and must survive");
    }

    #[test]
    fn test_assert_is_never_removed() {
        let program = run(build("var x := 1; assert x == 1;"));
        assert!(program.statements.iter().any(|s| matches!(s, SsaStmt::Assert { .. })));
    }
}
