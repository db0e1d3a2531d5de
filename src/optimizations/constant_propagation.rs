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

//! Constant propagation and folding over SSA.
//!
//! Because every SSA `(name, version)` pair is globally unique, a single
//! flat map tracks known constants across the whole program, including
//! inside nested `if` branches — there is no scope to worry about. `if`
//! conditions that fold to a literal are replaced by the taken branch;
//! Φ-nodes are left untouched since they merge values from branches that
//! may not both be present.

use crate::ast::{BinOp, UnOp};
use crate::ssa::{SsaExpr, SsaProgram, SsaStmt};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
enum ConstValue {
    Int(i64),
    Bool(bool),
}

impl ConstValue {
    fn to_expr(self) -> SsaExpr {
        match self {
            ConstValue::Int(v) => SsaExpr::IntLit(v),
            ConstValue::Bool(v) => SsaExpr::BoolLit(v),
        }
    }
}

fn as_const(expr: &SsaExpr) -> Option<ConstValue> {
    match expr {
        SsaExpr::IntLit(v) => Some(ConstValue::Int(*v)),
        SsaExpr::BoolLit(v) => Some(ConstValue::Bool(*v)),
        _ => None,
    }
}

pub fn run(mut program: SsaProgram) -> SsaProgram {
    let mut consts = HashMap::new();
    program.statements = fold_stmts(program.statements, &mut consts);
    program
}

fn fold_stmts(stmts: Vec<SsaStmt>, consts: &mut HashMap<(String, u32), ConstValue>) -> Vec<SsaStmt> {
    let mut out = Vec::new();
    for stmt in stmts {
        match stmt {
            SsaStmt::Decl { name, version, value } => {
                let folded = fold_expr(&value, consts);
                if let Some(cv) = as_const(&folded) {
                    consts.insert((name.clone(), version), cv);
                }
                out.push(SsaStmt::Decl { name, version, value: folded });
            }
            SsaStmt::Assign { name, version, value } => {
                let folded = fold_expr(&value, consts);
                if let Some(cv) = as_const(&folded) {
                    consts.insert((name.clone(), version), cv);
                }
                out.push(SsaStmt::Assign { name, version, value: folded });
            }
            SsaStmt::If { cond, then_branch, else_branch, phis } => {
                let folded_cond = fold_expr(&cond, consts);
                match as_const(&folded_cond) {
                    Some(ConstValue::Bool(true)) => out.extend(fold_stmts(then_branch, consts)),
                    Some(ConstValue::Bool(false)) => out.extend(fold_stmts(else_branch, consts)),
                    _ => {
                        let then_branch = fold_stmts(then_branch, consts);
                        let else_branch = fold_stmts(else_branch, consts);
                        out.push(SsaStmt::If { cond: folded_cond, then_branch, else_branch, phis });
                    }
                }
            }
            SsaStmt::While { cond, body, phis } => {
                let folded_cond = fold_expr(&cond, consts);
                out.push(SsaStmt::While { cond: folded_cond, body: fold_stmts(body, consts), phis });
            }
            SsaStmt::Phi(phi) => out.push(SsaStmt::Phi(phi)),
            SsaStmt::Assert { cond } => out.push(SsaStmt::Assert { cond: fold_expr(&cond, consts) }),
        }
    }
    out
}

fn fold_expr(expr: &SsaExpr, consts: &HashMap<(String, u32), ConstValue>) -> SsaExpr {
    match expr {
        SsaExpr::IntLit(v) => SsaExpr::IntLit(*v),
        SsaExpr::BoolLit(v) => SsaExpr::BoolLit(*v),
        SsaExpr::Var(name, version) => match consts.get(&(name.clone(), *version)) {
            Some(cv) => cv.to_expr(),
            None => SsaExpr::Var(name.clone(), *version),
        },
        SsaExpr::Unary(op, operand) => {
            let folded = fold_expr(operand, consts);
            match (op, as_const(&folded)) {
                (UnOp::Neg, Some(ConstValue::Int(n))) => SsaExpr::IntLit(-n),
                (UnOp::Not, Some(ConstValue::Bool(b))) => SsaExpr::BoolLit(!b),
                _ => SsaExpr::Unary(*op, Box::new(folded)),
            }
        }
        SsaExpr::Binary(op, lhs, rhs) => {
            let lhs = fold_expr(lhs, consts);
            let rhs = fold_expr(rhs, consts);
            match (as_const(&lhs), as_const(&rhs)) {
                (Some(l), Some(r)) => fold_binary(*op, l, r).unwrap_or_else(|| SsaExpr::Binary(*op, Box::new(lhs), Box::new(rhs))),
                _ => SsaExpr::Binary(*op, Box::new(lhs), Box::new(rhs)),
            }
        }
    }
}

fn fold_binary(op: BinOp, lhs: ConstValue, rhs: ConstValue) -> Option<SsaExpr> {
    use ConstValue::{Bool, Int};
    match (op, lhs, rhs) {
        (BinOp::Add, Int(a), Int(b)) => Some(SsaExpr::IntLit(a + b)),
        (BinOp::Sub, Int(a), Int(b)) => Some(SsaExpr::IntLit(a - b)),
        (BinOp::Mul, Int(a), Int(b)) => Some(SsaExpr::IntLit(a * b)),
        // Division/modulo by a literal zero are left unfolded; the solver
        // is the one place that reasons about that obligation.
        (BinOp::Div, Int(a), Int(b)) if b != 0 => Some(SsaExpr::IntLit(a / b)),
        (BinOp::Mod, Int(a), Int(b)) if b != 0 => Some(SsaExpr::IntLit(a % b)),
        (BinOp::Eq, Int(a), Int(b)) => Some(SsaExpr::BoolLit(a == b)),
        (BinOp::Eq, Bool(a), Bool(b)) => Some(SsaExpr::BoolLit(a == b)),
        (BinOp::Ne, Int(a), Int(b)) => Some(SsaExpr::BoolLit(a != b)),
        (BinOp::Ne, Bool(a), Bool(b)) => Some(SsaExpr::BoolLit(a != b)),
        (BinOp::Lt, Int(a), Int(b)) => Some(SsaExpr::BoolLit(a < b)),
        (BinOp::Gt, Int(a), Int(b)) => Some(SsaExpr::BoolLit(a > b)),
        (BinOp::Le, Int(a), Int(b)) => Some(SsaExpr::BoolLit(a <= b)),
        (BinOp::Ge, Int(a), Int(b)) => Some(SsaExpr::BoolLit(a >= b)),
        (BinOp::And, Bool(a), Bool(b)) => Some(SsaExpr::BoolLit(a && b)),
        (BinOp::Or, Bool(a), Bool(b)) => Some(SsaExpr::BoolLit(a || b)),
        _ => None,
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
    fn test_folds_arithmetic_chain() {
        let program = run(build("var x := 2 + 3; var y := x * 2; assert y == 10;"));
        assert!(program.statements.iter().any(|s| matches!(s, SsaStmt::Decl { value: SsaExpr::IntLit(10), .. })));
    }

    #[test]
    fn test_dead_branch_is_dropped_when_condition_is_literal() {
        let program = run(build("var x := 1; if(1 == 1){ x := 5; } else { x := 9; } assert x == 5;"));
        let has_if = program.statements.iter().any(|s| matches!(s, SsaStmt::If { .. }));
        assert!(!has_if);
    }

    #[test]
    fn test_division_by_zero_literal_is_left_unfolded() {
        let program = run(build("var x := 1; var y := x / 0; assert y == 0;"));
        let still_div = program.statements.iter().any(|s| {
            matches!(s, SsaStmt::Decl { value: SsaExpr::Binary(BinOp::Div, _, _), .. })
        });
        assert!(still_div);
    }
}
