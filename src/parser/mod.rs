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

//! Recursive-descent parser with operator-precedence climbing.
//!
//! Precedence, low to high: or, and, equality, relational, additive,
//! multiplicative, unary.

use crate::ast::{BinOp, Expr, Program, Stmt, UnOp};
use crate::error::ParseError;
use crate::lexer::{Token, TokenType};

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, position: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        tok
    }

    fn check(&self, token_type: &TokenType) -> bool {
        std::mem::discriminant(&self.current().token_type) == std::mem::discriminant(token_type)
    }

    fn expect(&mut self, token_type: TokenType, expected: &str) -> Result<Token, ParseError> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            Err(ParseError::UnexpectedToken {
                found: self.current().lexeme.clone(),
                expected: expected.to_string(),
                location: self.current().location.clone(),
            })
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !matches!(self.current().token_type, TokenType::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenType::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.check(&TokenType::RBrace) {
            if matches!(self.current().token_type, TokenType::Eof) {
                return Err(ParseError::UnexpectedEof { expected: "'}'".to_string() });
            }
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenType::RBrace, "'}'")?;
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match &self.current().token_type {
            TokenType::Var => self.parse_var_decl(),
            TokenType::While => self.parse_while(),
            TokenType::For => self.parse_for(),
            TokenType::If => self.parse_if(),
            TokenType::Assert => self.parse_assert(),
            TokenType::Identifier(_) => self.parse_assign(),
            _ => Err(ParseError::UnexpectedToken {
                found: self.current().lexeme.clone(),
                expected: "a statement".to_string(),
                location: self.current().location.clone(),
            }),
        }
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, ParseError> {
        let location = self.advance().location; // `var`
        let name = self.expect_identifier()?;
        self.expect_assign_op()?;
        let value = self.parse_expr()?;
        self.expect(TokenType::Semicolon, "';'")?;
        Ok(Stmt::VarDecl { name, value, location })
    }

    fn parse_assign(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current().location.clone();
        let name = self.expect_identifier()?;
        self.expect_assign_op()?;
        let value = self.parse_expr()?;
        self.expect(TokenType::Semicolon, "';'")?;
        Ok(Stmt::Assign { name, value, location })
    }

    fn expect_assign_op(&mut self) -> Result<(), ParseError> {
        if self.check(&TokenType::Walrus) || self.check(&TokenType::Assign) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                found: self.current().lexeme.clone(),
                expected: "':=' or '='".to_string(),
                location: self.current().location.clone(),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match self.current().token_type.clone() {
            TokenType::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::UnexpectedToken {
                found: self.current().lexeme.clone(),
                expected: "an identifier".to_string(),
                location: self.current().location.clone(),
            }),
        }
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let location = self.advance().location; // `while`
        self.expect(TokenType::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenType::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body, location })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let location = self.advance().location; // `for`
        self.expect(TokenType::LParen, "'('")?;
        let init = self.parse_statement()?;
        let cond = self.parse_expr()?;
        self.expect(TokenType::Semicolon, "';'")?;
        let step_location = self.current().location.clone();
        let step_name = self.expect_identifier()?;
        self.expect_assign_op()?;
        let step_value = self.parse_expr()?;
        let step = Stmt::Assign { name: step_name, value: step_value, location: step_location };
        self.expect(TokenType::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(Stmt::For { init: Box::new(init), cond, step: Box::new(step), body, location })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let location = self.advance().location; // `if`
        self.expect(TokenType::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenType::RParen, "')'")?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.check(&TokenType::Else) {
            self.advance();
            self.parse_block()?
        } else {
            Vec::new()
        };
        Ok(Stmt::If { cond, then_branch, else_branch, location })
    }

    fn parse_assert(&mut self) -> Result<Stmt, ParseError> {
        let location = self.advance().location; // `assert`
        let cond = self.parse_expr()?;
        self.expect(TokenType::Semicolon, "';'")?;
        Ok(Stmt::Assert { cond, location })
    }

    // Expression grammar, low to high precedence:
    // or -> and -> equality -> relational -> additive -> multiplicative -> unary -> primary

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.check(&TokenType::Or) {
            let location = self.advance().location;
            let rhs = self.parse_and()?;
            lhs = Expr::Binary { op: BinOp::Or, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.check(&TokenType::And) {
            let location = self.advance().location;
            let rhs = self.parse_equality()?;
            lhs = Expr::Binary { op: BinOp::And, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.current().token_type {
                TokenType::EqEq => BinOp::Eq,
                TokenType::NotEq => BinOp::Ne,
                _ => break,
            };
            let location = self.advance().location;
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current().token_type {
                TokenType::Lt => BinOp::Lt,
                TokenType::Gt => BinOp::Gt,
                TokenType::Le => BinOp::Le,
                TokenType::Ge => BinOp::Ge,
                _ => break,
            };
            let location = self.advance().location;
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current().token_type {
                TokenType::Plus => BinOp::Add,
                TokenType::Minus => BinOp::Sub,
                _ => break,
            };
            let location = self.advance().location;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current().token_type {
                TokenType::Star => BinOp::Mul,
                TokenType::Slash => BinOp::Div,
                TokenType::Percent => BinOp::Mod,
                _ => break,
            };
            let location = self.advance().location;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.current().token_type {
            TokenType::Minus => {
                let location = self.advance().location;
                let operand = self.parse_unary()?;
                Ok(Expr::Unary { op: UnOp::Neg, operand: Box::new(operand), location })
            }
            TokenType::Not => {
                let location = self.advance().location;
                let operand = self.parse_unary()?;
                Ok(Expr::Unary { op: UnOp::Not, operand: Box::new(operand), location })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let location = self.current().location.clone();
        match self.current().token_type.clone() {
            TokenType::Integer(value) => {
                self.advance();
                Ok(Expr::IntLit { value, location })
            }
            TokenType::Decimal(value) => {
                self.advance();
                Ok(Expr::RealLit { value, location })
            }
            TokenType::Identifier(name) => {
                self.advance();
                Ok(Expr::Var { name, location })
            }
            TokenType::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenType::RParen, "')'")?;
                Ok(expr)
            }
            _ => Err(ParseError::UnexpectedToken {
                found: self.current().lexeme.clone(),
                expected: "an expression".to_string(),
                location,
            }),
        }
    }
}

/// Convenience entry point: lex and parse in one call.
pub fn parse_source(text: &str, file_name: &str) -> Result<Program, ParseError> {
    let mut lexer = crate::lexer::Lexer::new(text, file_name.to_string());
    let tokens = lexer.tokenize()?;
    let mut parser = Parser::new(tokens);
    parser.parse_program()
}
