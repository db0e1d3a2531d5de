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

//! Abstract syntax tree for the small imperative language.
//!
//! Nodes carry no type information; integers and booleans are told apart
//! by operator position during SSA construction and encoding.

use crate::error::SourceLocation;

/// A complete source program: an ordered sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl {
        name: String,
        value: Expr,
        location: SourceLocation,
    },
    Assign {
        name: String,
        value: Expr,
        location: SourceLocation,
    },
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
        location: SourceLocation,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    /// `for(init; cond; step) { body }`. The parser desugars this to
    /// `init` followed by a `While` whose body is `body` then `step`, so
    /// this variant never survives past parsing into SSA construction.
    For {
        init: Box<Stmt>,
        cond: Expr,
        step: Box<Stmt>,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    Assert {
        cond: Expr,
        location: SourceLocation,
    },
}

impl Stmt {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Stmt::VarDecl { location, .. }
            | Stmt::Assign { location, .. }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::For { location, .. }
            | Stmt::Assert { location, .. } => location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLit {
        value: i64,
        location: SourceLocation,
    },
    RealLit {
        value: f64,
        location: SourceLocation,
    },
    Var {
        name: String,
        location: SourceLocation,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        location: SourceLocation,
    },
}

impl Expr {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Expr::IntLit { location, .. }
            | Expr::RealLit { location, .. }
            | Expr::Var { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Binary { location, .. } => location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
            UnOp::Not => write!(f, "not"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// Whether this operator compares or connects booleans, as opposed to
    /// producing an integer value.
    pub fn is_boolean_result(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge | BinOp::And | BinOp::Or
        )
    }

    /// Whether the operands of this operator are expected to be boolean.
    pub fn expects_boolean_operands(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binop_classification() {
        assert!(BinOp::Lt.is_boolean_result());
        assert!(!BinOp::Add.is_boolean_result());
        assert!(BinOp::And.expects_boolean_operands());
        assert!(!BinOp::Lt.expects_boolean_operands());
    }

    #[test]
    fn test_stmt_location() {
        let loc = SourceLocation::new("t.vb".into(), 1, 1, 0);
        let stmt = Stmt::Assert { cond: Expr::IntLit { value: 1, location: loc.clone() }, location: loc.clone() };
        assert_eq!(stmt.location(), &loc);
    }
}
