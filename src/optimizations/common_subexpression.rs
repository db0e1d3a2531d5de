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

//! Common subexpression elimination over SSA.
//!
//! Memoizes the canonical textual form of each expression to the SSA
//! variable that already holds its value, scoped to the straight-line
//! sequence of statements it was computed in — a table built inside one
//! arm of an `if` is not visible in the other arm or after the `if`,
//! since the two branches may not both execute.

use crate::ssa::{SsaExpr, SsaProgram, SsaStmt};
use std::collections::HashMap;

pub fn run(mut program: SsaProgram) -> SsaProgram {
    let mut table = HashMap::new();
    program.statements = cse_stmts(program.statements, &mut table);
    program
}

fn canonical(expr: &SsaExpr) -> String {
    expr.to_string()
}

fn cse_expr(expr: &SsaExpr, table: &HashMap<String, (String, u32)>) -> SsaExpr {
    match expr {
        SsaExpr::IntLit(_) | SsaExpr::BoolLit(_) | SsaExpr::Var(..) => expr.clone(),
        SsaExpr::Unary(op, operand) => {
            let operand = cse_expr(operand, table);
            let candidate = SsaExpr::Unary(*op, Box::new(operand));
            match table.get(&canonical(&candidate)) {
                Some((name, version)) => SsaExpr::Var(name.clone(), *version),
                None => candidate,
            }
        }
        SsaExpr::Binary(op, lhs, rhs) => {
            let lhs = cse_expr(lhs, table);
            let rhs = cse_expr(rhs, table);
            let candidate = SsaExpr::Binary(*op, Box::new(lhs), Box::new(rhs));
            match table.get(&canonical(&candidate)) {
                Some((name, version)) => SsaExpr::Var(name.clone(), *version),
                None => candidate,
            }
        }
    }
}

/// Rewrite `value`'s subexpressions against `table`, then either alias it
/// to an existing variable holding the identical whole expression, or
/// register it as the first variable that computed this expression.
fn cse_definition(name: &str, version: u32, value: &SsaExpr, table: &mut HashMap<String, (String, u32)>) -> SsaExpr {
    let rewritten = cse_expr(value, table);
    let key = canonical(&rewritten);
    if let Some((existing_name, existing_version)) = table.get(&key) {
        return SsaExpr::Var(existing_name.clone(), *existing_version);
    }
    table.insert(key, (name.to_string(), version));
    rewritten
}

fn cse_stmts(stmts: Vec<SsaStmt>, table: &mut HashMap<String, (String, u32)>) -> Vec<SsaStmt> {
    let mut out = Vec::new();
    for stmt in stmts {
        match stmt {
            SsaStmt::Decl { name, version, value } => {
                let value = cse_definition(&name, version, &value, table);
                out.push(SsaStmt::Decl { name, version, value });
            }
            SsaStmt::Assign { name, version, value } => {
                let value = cse_definition(&name, version, &value, table);
                out.push(SsaStmt::Assign { name, version, value });
            }
            SsaStmt::If { cond, then_branch, else_branch, phis } => {
                let cond = cse_expr(&cond, table);
                let mut then_table = table.clone();
                let then_branch = cse_stmts(then_branch, &mut then_table);
                let mut else_table = table.clone();
                let else_branch = cse_stmts(else_branch, &mut else_table);
                out.push(SsaStmt::If { cond, then_branch, else_branch, phis });
            }
            SsaStmt::While { cond, body, phis } => {
                let cond = cse_expr(&cond, table);
                let mut body_table = table.clone();
                let body = cse_stmts(body, &mut body_table);
                out.push(SsaStmt::While { cond, body, phis });
            }
            SsaStmt::Phi(phi) => out.push(SsaStmt::Phi(phi)),
            SsaStmt::Assert { cond } => out.push(SsaStmt::Assert { cond: cse_expr(&cond, table) }),
        }
    }
    out
}
