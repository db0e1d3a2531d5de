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

//! AST to SSA conversion, including Φ placement at `if` merges.
//!
//! Runs on loop-free source (see `ssa::unroll`): variable versions are
//! allocated by a single monotonically increasing counter per base name,
//! shared across the whole conversion so every `(name, version)` pair is
//! globally unique.

use crate::ast::{Expr, Stmt};
use crate::error::SemanticError;
use crate::ssa::{Phi, SsaExpr, SsaProgram, SsaStmt};
use std::collections::HashMap;

struct Builder {
    counters: HashMap<String, u32>,
    max_version: HashMap<String, u32>,
}

impl Builder {
    fn fresh(&mut self, name: &str) -> u32 {
        let counter = self.counters.entry(name.to_string()).or_insert(0);
        let version = *counter;
        *counter += 1;
        self.max_version.insert(name.to_string(), version);
        version
    }
}

fn convert_expr(expr: &Expr, versions: &HashMap<String, u32>) -> Result<SsaExpr, SemanticError> {
    match expr {
        Expr::IntLit { value, .. } => Ok(SsaExpr::IntLit(*value)),
        Expr::RealLit { location, .. } => {
            Err(SemanticError::UnsupportedRealLiteral { location: location.clone() })
        }
        Expr::Var { name, location } => {
            let version = versions
                .get(name)
                .ok_or_else(|| SemanticError::UndefinedVariable { name: name.clone(), location: location.clone() })?;
            Ok(SsaExpr::Var(name.clone(), *version))
        }
        Expr::Unary { op, operand, .. } => Ok(SsaExpr::Unary(*op, Box::new(convert_expr(operand, versions)?))),
        Expr::Binary { op, lhs, rhs, .. } => {
            Ok(SsaExpr::Binary(*op, Box::new(convert_expr(lhs, versions)?), Box::new(convert_expr(rhs, versions)?)))
        }
    }
}

fn build_stmts(
    stmts: &[Stmt],
    versions: &mut HashMap<String, u32>,
    declared: &mut HashMap<String, crate::error::SourceLocation>,
    builder: &mut Builder,
) -> Result<Vec<SsaStmt>, SemanticError> {
    let mut out = Vec::new();

    for stmt in stmts {
        match stmt {
            Stmt::VarDecl { name, value, location } => {
                if let Some(previous) = declared.get(name) {
                    return Err(SemanticError::DuplicateDeclaration {
                        name: name.clone(),
                        location: location.clone(),
                        previous_location: previous.clone(),
                    });
                }
                let ssa_value = convert_expr(value, versions)?;
                let version = builder.fresh(name);
                versions.insert(name.clone(), version);
                declared.insert(name.clone(), location.clone());
                out.push(SsaStmt::Decl { name: name.clone(), version, value: ssa_value });
            }
            Stmt::Assign { name, value, location } => {
                if !declared.contains_key(name) {
                    return Err(SemanticError::UndefinedVariable { name: name.clone(), location: location.clone() });
                }
                let ssa_value = convert_expr(value, versions)?;
                let version = builder.fresh(name);
                versions.insert(name.clone(), version);
                out.push(SsaStmt::Assign { name: name.clone(), version, value: ssa_value });
            }
            Stmt::If { cond, then_branch, else_branch, .. } => {
                let ssa_cond = convert_expr(cond, versions)?;

                let pre_versions = versions.clone();
                let pre_declared = declared.clone();

                let then_ssa = build_stmts(then_branch, versions, declared, builder)?;
                let true_versions = versions.clone();
                let true_declared = declared.clone();

                *versions = pre_versions.clone();
                *declared = pre_declared.clone();
                let else_ssa = build_stmts(else_branch, versions, declared, builder)?;
                let false_versions = versions.clone();
                let false_declared = declared.clone();

                let mut names: Vec<String> = true_versions.keys().chain(false_versions.keys()).cloned().collect();
                names.sort();
                names.dedup();

                let mut phis = Vec::new();
                let mut merged_versions = pre_versions;
                for name in names {
                    let tv = true_versions.get(&name).copied();
                    let fv = false_versions.get(&name).copied();
                    match (tv, fv) {
                        (Some(t), Some(f)) if t != f => {
                            let version = builder.fresh(&name);
                            phis.push(Phi { name: name.clone(), version, sources: vec![(name.clone(), t), (name.clone(), f)] });
                            merged_versions.insert(name, version);
                        }
                        (Some(t), Some(_)) => {
                            merged_versions.insert(name, t);
                        }
                        // Declared on only one side: the small imperative language has no
                        // block scoping, so a declaration made in exactly one branch still
                        // becomes visible after the `if` (see the worked scenario where a
                        // variable is declared identically in both arms of an `if`).
                        (Some(t), None) => {
                            merged_versions.insert(name, t);
                        }
                        (None, Some(f)) => {
                            merged_versions.insert(name, f);
                        }
                        (None, None) => unreachable!("name drawn from the union of both branch version maps"),
                    }
                }

                let mut merged_declared = pre_declared;
                for (name, location) in true_declared.into_iter().chain(false_declared) {
                    merged_declared.entry(name).or_insert(location);
                }

                *versions = merged_versions;
                *declared = merged_declared;

                out.push(SsaStmt::If { cond: ssa_cond, then_branch: then_ssa, else_branch: else_ssa, phis });
            }
            Stmt::While { .. } | Stmt::For { .. } => {
                unreachable!("loops are eliminated by ssa::unroll before SSA construction runs")
            }
            Stmt::Assert { cond, .. } => {
                let ssa_cond = convert_expr(cond, versions)?;
                out.push(SsaStmt::Assert { cond: ssa_cond });
            }
        }
    }

    Ok(out)
}

/// Convert a loop-free statement sequence into an SSA program.
pub fn build_ssa(statements: &[Stmt]) -> Result<SsaProgram, SemanticError> {
    let mut builder = Builder { counters: HashMap::new(), max_version: HashMap::new() };
    let mut versions = HashMap::new();
    let mut declared = HashMap::new();
    let ssa_statements = build_stmts(statements, &mut versions, &mut declared, &mut builder)?;
    Ok(SsaProgram { statements: ssa_statements, max_version: builder.max_version.into_iter().collect() })
}
