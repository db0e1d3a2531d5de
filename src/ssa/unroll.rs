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

//! Bounded loop unrolling.
//!
//! Runs as a source-level rewrite before SSA construction: every `while`
//! (including `for`, which is first desugared to a `while`) is replaced
//! by a depth-bounded chain of `if`s terminating in an assertion of the
//! negated condition. Ordinary `If`-merge Φ placement in the SSA builder
//! then takes care of reconciling the "loop never entered" path against
//! the "loop entered at least once" path — no special-cased Φ handling
//! is needed here.

use crate::ast::Stmt;

/// Desugar `for` loops and bound every `while` to `depth` iterations.
pub fn unroll_program(statements: Vec<Stmt>, depth: u32) -> Vec<Stmt> {
    statements.into_iter().flat_map(|s| unroll_stmt(s, depth)).collect()
}

fn unroll_stmt(stmt: Stmt, depth: u32) -> Vec<Stmt> {
    match stmt {
        Stmt::VarDecl { .. } | Stmt::Assign { .. } | Stmt::Assert { .. } => vec![stmt],
        Stmt::If { cond, then_branch, else_branch, location } => {
            vec![Stmt::If {
                cond,
                then_branch: unroll_program(then_branch, depth),
                else_branch: unroll_program(else_branch, depth),
                location,
            }]
        }
        Stmt::For { init, cond, step, body, location } => {
            let mut while_body = body;
            while_body.push(*step);
            let desugared = Stmt::While { cond, body: while_body, location };
            let mut out = vec![*init];
            out.extend(unroll_stmt(desugared, depth));
            out
        }
        Stmt::While { cond, body, location } => {
            let unrolled_body = unroll_program(body, depth);
            unroll_while(&cond, &unrolled_body, depth, &location)
        }
    }
}

fn unroll_while(cond: &crate::ast::Expr, body: &[Stmt], depth: u32, location: &crate::error::SourceLocation) -> Vec<Stmt> {
    if depth == 0 {
        let negated = crate::ast::Expr::Unary {
            op: crate::ast::UnOp::Not,
            operand: Box::new(cond.clone()),
            location: location.clone(),
        };
        return vec![Stmt::Assert { cond: negated, location: location.clone() }];
    }

    let mut then_branch = body.to_vec();
    then_branch.extend(unroll_while(cond, body, depth - 1, location));

    vec![Stmt::If {
        cond: cond.clone(),
        then_branch,
        else_branch: Vec::new(),
        location: location.clone(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    #[test]
    fn test_unroll_removes_while() {
        let program = parse_source("var x := 0; while(x < 4){ x := x + 1; }", "t.vb").unwrap();
        let unrolled = unroll_program(program.statements, 3);
        fn contains_while(stmts: &[Stmt]) -> bool {
            stmts.iter().any(|s| match s {
                Stmt::While { .. } => true,
                Stmt::If { then_branch, else_branch, .. } => {
                    contains_while(then_branch) || contains_while(else_branch)
                }
                _ => false,
            })
        }
        assert!(!contains_while(&unrolled));
    }

    #[test]
    fn test_unroll_depth_zero_is_immediate_assert() {
        let program = parse_source("var x := 0; while(x < 4){ x := x + 1; }", "t.vb").unwrap();
        let unrolled = unroll_program(program.statements, 0);
        assert!(matches!(unrolled[1], Stmt::Assert { .. }));
    }

    #[test]
    fn test_for_desugars_before_unrolling() {
        let program = parse_source("for(var i := 0; i < 3; i := i + 1){ assert i >= 0; }", "t.vb").unwrap();
        let unrolled = unroll_program(program.statements, 3);
        assert!(matches!(unrolled[0], Stmt::VarDecl { .. }));
        assert!(matches!(unrolled[1], Stmt::If { .. }));
    }
}
