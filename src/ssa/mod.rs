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

//! Static single-assignment intermediate representation.
//!
//! Every SSA variable `(name, version)` has exactly one defining
//! statement. `If`/`While` carry their branches directly as nested
//! statement lists rather than pointing into a basic-block graph.

pub mod builder;
pub mod unroll;

use crate::ast::{BinOp, UnOp};
use std::collections::BTreeMap;
use std::fmt;

/// An SSA-level expression. Reads name a specific version of a variable
/// rather than the variable itself.
#[derive(Debug, Clone, PartialEq)]
pub enum SsaExpr {
    IntLit(i64),
    BoolLit(bool),
    Var(String, u32),
    Unary(UnOp, Box<SsaExpr>),
    Binary(BinOp, Box<SsaExpr>, Box<SsaExpr>),
}

impl fmt::Display for SsaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SsaExpr::IntLit(v) => write!(f, "{}", v),
            SsaExpr::BoolLit(v) => write!(f, "{}", v),
            SsaExpr::Var(name, version) => write!(f, "{}_{}", name, version),
            SsaExpr::Unary(op, e) => write!(f, "({} {})", op, e),
            SsaExpr::Binary(op, l, r) => write!(f, "({} {} {})", l, op, r),
        }
    }
}

/// A Φ-node: `name_version` is one of the listed source versions.
#[derive(Debug, Clone, PartialEq)]
pub struct Phi {
    pub name: String,
    pub version: u32,
    pub sources: Vec<(String, u32)>,
}

impl fmt::Display for Phi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<String> = self.sources.iter().map(|(n, v)| format!("{}_{}", n, v)).collect();
        write!(f, "{}_{} := phi({})", self.name, self.version, sources.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SsaStmt {
    Decl { name: String, version: u32, value: SsaExpr },
    Assign { name: String, version: u32, value: SsaExpr },
    If { cond: SsaExpr, then_branch: Vec<SsaStmt>, else_branch: Vec<SsaStmt>, phis: Vec<Phi> },
    /// Retained in the statement sum for fidelity to the source-level
    /// data model; the bounded unroller (see `unroll`) eliminates every
    /// `While` before SSA construction runs, so this variant never
    /// appears in a built `SsaProgram`.
    While { cond: SsaExpr, body: Vec<SsaStmt>, phis: Vec<Phi> },
    Phi(Phi),
    Assert { cond: SsaExpr },
}

/// A loop-free SSA program plus the highest version ever allocated to
/// each base variable name, needed to resolve "the final value of `n`".
#[derive(Debug, Clone, PartialEq)]
pub struct SsaProgram {
    pub statements: Vec<SsaStmt>,
    pub max_version: BTreeMap<String, u32>,
}

impl SsaProgram {
    /// Base variable names that appear on the left-hand side of at least
    /// one `Decl`, `Assign`, or `Phi` anywhere in the program — the
    /// "outputs" used by equivalence checking.
    pub fn outputs(&self) -> Vec<String> {
        self.max_version.keys().cloned().collect()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        render_stmts(&self.statements, 0, &mut out);
        out
    }
}

fn indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str("    ");
    }
}

fn render_stmts(stmts: &[SsaStmt], level: usize, out: &mut String) {
    for stmt in stmts {
        render_stmt(stmt, level, out);
    }
}

fn render_stmt(stmt: &SsaStmt, level: usize, out: &mut String) {
    indent(level, out);
    match stmt {
        SsaStmt::Decl { name, version, value } => {
            out.push_str(&format!("{}_{} := {}\n", name, version, value));
        }
        SsaStmt::Assign { name, version, value } => {
            out.push_str(&format!("{}_{} := {}\n", name, version, value));
        }
        SsaStmt::If { cond, then_branch, else_branch, phis } => {
            out.push_str(&format!("if ({}) {{\n", cond));
            render_stmts(then_branch, level + 1, out);
            indent(level, out);
            out.push_str("} else {\n");
            render_stmts(else_branch, level + 1, out);
            indent(level, out);
            out.push_str("}\n");
            for phi in phis {
                indent(level, out);
                out.push_str(&format!("{}\n", phi));
            }
        }
        SsaStmt::While { cond, body, phis } => {
            out.push_str(&format!("while ({}) {{\n", cond));
            render_stmts(body, level + 1, out);
            indent(level, out);
            out.push_str("}\n");
            for phi in phis {
                indent(level, out);
                out.push_str(&format!("{}\n", phi));
            }
        }
        SsaStmt::Phi(phi) => out.push_str(&format!("{}\n", phi)),
        SsaStmt::Assert { cond } => out.push_str(&format!("assert {}\n", cond)),
    }
}
