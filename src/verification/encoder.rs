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

//! Translation from a loop-free SSA program into linear-integer-arithmetic
//! formulas consumed by the solver.
//!
//! Every SSA identifier is an integer symbol; a boolean-valued expression
//! assigned into one is coerced to 0/1 at the point of assignment.
//! Mixing sorts inside a comparison or boolean connective is a semantic
//! error, never a silent cast. Statements inside an `if` branch are
//! encoded as `path_condition => equation`; Φ-nodes are encoded as an
//! unguarded disjunction over their source versions, which is sound
//! because each source's own guarded equation already pins it down on
//! the path where it is live.

use crate::ast::{BinOp, UnOp};
use crate::error::{SemanticError, SourceLocation};
use crate::ssa::{SsaExpr, SsaProgram, SsaStmt};
use crate::verification::solver::Formula;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sort {
    Int,
    Bool,
}

/// Translated program: `assumptions` is Γ, `obligations` is the ordered
/// list of per-`assert` verification conditions to discharge.
pub struct Encoded {
    pub assumptions: Vec<Formula>,
    pub obligations: Vec<Formula>,
}

pub fn encode_program(program: &SsaProgram, prefix: &str) -> Result<Encoded, SemanticError> {
    let mut assumptions = Vec::new();
    let mut obligations = Vec::new();
    encode_stmts(&program.statements, prefix, None, &mut assumptions, &mut obligations)?;
    Ok(Encoded { assumptions, obligations })
}

fn var_name(prefix: &str, name: &str, version: u32) -> String {
    if prefix.is_empty() {
        format!("{}_{}", name, version)
    } else {
        format!("{}{}_{}", prefix, name, version)
    }
}

fn guard(path_cond: &Option<Formula>, consequent: Formula) -> Formula {
    match path_cond {
        Some(pc) => Formula::Implies(Box::new(pc.clone()), Box::new(consequent)),
        None => consequent,
    }
}

fn conjoin(path_cond: &Option<Formula>, extra: Formula) -> Formula {
    match path_cond {
        Some(pc) => Formula::And(vec![pc.clone(), extra]),
        None => extra,
    }
}

fn encode_stmts(
    stmts: &[SsaStmt],
    prefix: &str,
    path_cond: Option<Formula>,
    assumptions: &mut Vec<Formula>,
    obligations: &mut Vec<Formula>,
) -> Result<(), SemanticError> {
    for stmt in stmts {
        match stmt {
            SsaStmt::Decl { name, version, value } | SsaStmt::Assign { name, version, value } => {
                let (formula, sort) = encode_typed(value, prefix)?;
                let as_int = match sort {
                    Sort::Int => formula,
                    Sort::Bool => Formula::IteInt(Box::new(formula), Box::new(Formula::IntConst(1)), Box::new(Formula::IntConst(0))),
                };
                let lhs = Formula::IntVar(var_name(prefix, name, *version));
                assumptions.push(guard(&path_cond, Formula::Eq(Box::new(lhs), Box::new(as_int))));
            }
            SsaStmt::If { cond, then_branch, else_branch, phis } => {
                let (cond_formula, sort) = encode_typed(cond, prefix)?;
                if sort != Sort::Bool {
                    return Err(SemanticError::NonBooleanAssertion { location: SourceLocation::unknown() });
                }
                let then_pc = Some(conjoin(&path_cond, cond_formula.clone()));
                let else_pc = Some(conjoin(&path_cond, Formula::Not(Box::new(cond_formula))));
                encode_stmts(then_branch, prefix, then_pc, assumptions, obligations)?;
                encode_stmts(else_branch, prefix, else_pc, assumptions, obligations)?;

                for phi in phis {
                    let lhs = Formula::IntVar(var_name(prefix, &phi.name, phi.version));
                    let disjuncts = phi
                        .sources
                        .iter()
                        .map(|(name, version)| Formula::Eq(Box::new(lhs.clone()), Box::new(Formula::IntVar(var_name(prefix, name, *version)))))
                        .collect();
                    assumptions.push(Formula::Or(disjuncts));
                }
            }
            SsaStmt::While { .. } => {
                unreachable!("loops are eliminated by ssa::unroll before encoding runs")
            }
            SsaStmt::Phi(phi) => {
                let lhs = Formula::IntVar(var_name(prefix, &phi.name, phi.version));
                let disjuncts = phi
                    .sources
                    .iter()
                    .map(|(name, version)| Formula::Eq(Box::new(lhs.clone()), Box::new(Formula::IntVar(var_name(prefix, name, *version)))))
                    .collect();
                assumptions.push(Formula::Or(disjuncts));
            }
            SsaStmt::Assert { cond } => {
                let (formula, sort) = encode_typed(cond, prefix)?;
                if sort != Sort::Bool {
                    return Err(SemanticError::NonBooleanAssertion { location: SourceLocation::unknown() });
                }
                obligations.push(guard(&path_cond, formula));
            }
        }
    }
    Ok(())
}

fn encode_typed(expr: &SsaExpr, prefix: &str) -> Result<(Formula, Sort), SemanticError> {
    match expr {
        SsaExpr::IntLit(v) => Ok((Formula::IntConst(*v), Sort::Int)),
        SsaExpr::BoolLit(v) => Ok((Formula::BoolConst(*v), Sort::Bool)),
        SsaExpr::Var(name, version) => Ok((Formula::IntVar(var_name(prefix, name, *version)), Sort::Int)),
        SsaExpr::Unary(UnOp::Neg, operand) => {
            let (formula, sort) = encode_typed(operand, prefix)?;
            expect_int(sort)?;
            Ok((Formula::Neg(Box::new(formula)), Sort::Int))
        }
        SsaExpr::Unary(UnOp::Not, operand) => {
            let (formula, sort) = encode_typed(operand, prefix)?;
            expect_bool(sort)?;
            Ok((Formula::Not(Box::new(formula)), Sort::Bool))
        }
        SsaExpr::Binary(op, lhs, rhs) => encode_binary(*op, lhs, rhs, prefix),
    }
}

fn expect_int(sort: Sort) -> Result<(), SemanticError> {
    match sort {
        Sort::Int => Ok(()),
        Sort::Bool => Err(SemanticError::SortMismatch { operator: "arithmetic operator expecting an integer".to_string(), location: SourceLocation::unknown() }),
    }
}

fn expect_bool(sort: Sort) -> Result<(), SemanticError> {
    match sort {
        Sort::Bool => Ok(()),
        Sort::Int => Err(SemanticError::SortMismatch { operator: "boolean connective expecting a boolean".to_string(), location: SourceLocation::unknown() }),
    }
}

fn encode_binary(op: BinOp, lhs: &SsaExpr, rhs: &SsaExpr, prefix: &str) -> Result<(Formula, Sort), SemanticError> {
    let (lf, ls) = encode_typed(lhs, prefix)?;
    let (rf, rs) = encode_typed(rhs, prefix)?;

    // `Eq`/`Ne` only require their operands to agree with each other;
    // every other operator has a fixed expected operand sort, classified
    // by `BinOp` itself rather than re-derived here.
    match op {
        BinOp::Eq | BinOp::Ne => same_sort(ls, rs)?,
        _ if op.expects_boolean_operands() => {
            expect_bool(ls)?;
            expect_bool(rs)?;
        }
        _ => {
            expect_int(ls)?;
            expect_int(rs)?;
        }
    }

    let formula = match op {
        BinOp::Add => Formula::Add(Box::new(lf), Box::new(rf)),
        BinOp::Sub => Formula::Sub(Box::new(lf), Box::new(rf)),
        BinOp::Mul => Formula::Mul(Box::new(lf), Box::new(rf)),
        BinOp::Div => Formula::Div(Box::new(lf), Box::new(rf)),
        BinOp::Mod => Formula::Mod(Box::new(lf), Box::new(rf)),
        BinOp::Lt => Formula::Lt(Box::new(lf), Box::new(rf)),
        BinOp::Gt => Formula::Gt(Box::new(lf), Box::new(rf)),
        BinOp::Le => Formula::Le(Box::new(lf), Box::new(rf)),
        BinOp::Ge => Formula::Ge(Box::new(lf), Box::new(rf)),
        BinOp::Eq => Formula::Eq(Box::new(lf), Box::new(rf)),
        BinOp::Ne => Formula::Ne(Box::new(lf), Box::new(rf)),
        BinOp::And => Formula::And(vec![lf, rf]),
        BinOp::Or => Formula::Or(vec![lf, rf]),
    };

    Ok((formula, if op.is_boolean_result() { Sort::Bool } else { Sort::Int }))
}

fn same_sort(a: Sort, b: Sort) -> Result<(), SemanticError> {
    if a == b {
        Ok(())
    } else {
        Err(SemanticError::SortMismatch {
            operator: format!("comparison between {:?} and {:?}", a, b).to_lowercase(),
            location: SourceLocation::unknown(),
        })
    }
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
    fn test_single_assert_becomes_one_obligation() {
        let program = build("var x := 1; assert x == 1;");
        let encoded = encode_program(&program, "").unwrap();
        assert_eq!(encoded.obligations.len(), 1);
    }

    #[test]
    fn test_prefix_is_applied_to_every_variable() {
        let program = build("var x := 1; assert x == 1;");
        let encoded = encode_program(&program, "p2_").unwrap();
        let rendered = format!("{}", encoded.assumptions[0]);
        assert!(rendered.contains("p2_x_0"));
    }

    #[test]
    fn test_mismatched_sort_comparison_is_rejected() {
        let program = build("var x := 1; assert (x == 1) == x;");
        let err = encode_program(&program, "").unwrap_err();
        assert!(matches!(err, SemanticError::SortMismatch { .. }));
    }

    #[test]
    fn test_branch_assignment_is_guarded_by_path_condition() {
        let program = build("var x := 1; if(x==1){ x := 2; } assert x==2;");
        let encoded = encode_program(&program, "").unwrap();
        let has_guard = encoded.assumptions.iter().any(|f| matches!(f, Formula::Implies(..)));
        assert!(has_guard);
    }
}
