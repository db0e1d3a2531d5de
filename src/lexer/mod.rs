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

//! Lexical analysis for the small imperative language.

use crate::error::{LexError, SourceLocation};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenType {
    Identifier(String),
    Integer(i64),
    Decimal(f64),

    // Keywords
    Var,
    While,
    For,
    If,
    Else,
    Assert,
    And,
    Or,
    Not,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Assign,   // =
    Walrus,   // :=

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,

    Eof,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    pub location: SourceLocation,
    pub lexeme: String,
}

impl Token {
    pub fn new(token_type: TokenType, location: SourceLocation, lexeme: String) -> Self {
        Self { token_type, location, lexeme }
    }
}

/// Lexer for the small imperative language's source text.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
    line: usize,
    column: usize,
    file_name: String,
}

impl Lexer {
    pub fn new(input: &str, file_name: String) -> Self {
        let chars: Vec<char> = input.graphemes(true).flat_map(|g| g.chars()).collect();
        let current_char = chars.first().copied();
        Self { input: chars, position: 0, current_char, line: 1, column: 1, file_name }
    }

    fn advance(&mut self) {
        if self.current_char == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.file_name.clone(), self.line, self.column, self.position)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current_char {
                Some(c) if c.is_whitespace() => self.advance(),
                Some('/') if self.peek_next() == Some('/') => {
                    while let Some(c) = self.current_char {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Tokenize the entire input, terminating with a single `Eof` token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let location = self.location();
            let Some(c) = self.current_char else {
                tokens.push(Token::new(TokenType::Eof, location, String::new()));
                break;
            };

            if c.is_ascii_digit() {
                tokens.push(self.read_number(location)?);
            } else if c.is_alphabetic() || c == '_' {
                tokens.push(self.read_identifier_or_keyword(location));
            } else {
                tokens.push(self.read_operator_or_punctuation(location)?);
            }
        }
        Ok(tokens)
    }

    fn read_number(&mut self, location: SourceLocation) -> Result<Token, LexError> {
        let mut lexeme = String::new();
        while let Some(c) = self.current_char {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if self.current_char == Some('.') && self.peek_next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            lexeme.push('.');
            self.advance();
            while let Some(c) = self.current_char {
                if c.is_ascii_digit() {
                    lexeme.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            let value: f64 = lexeme.parse().map_err(|_| LexError::InvalidNumber {
                value: lexeme.clone(),
                location: location.clone(),
            })?;
            return Ok(Token::new(TokenType::Decimal(value), location, lexeme));
        }

        let value: i64 = lexeme.parse().map_err(|_| LexError::InvalidNumber {
            value: lexeme.clone(),
            location: location.clone(),
        })?;
        Ok(Token::new(TokenType::Integer(value), location, lexeme))
    }

    fn read_identifier_or_keyword(&mut self, location: SourceLocation) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.current_char {
            if c.is_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let token_type = match lexeme.as_str() {
            "var" => TokenType::Var,
            "while" => TokenType::While,
            "for" => TokenType::For,
            "if" => TokenType::If,
            "else" => TokenType::Else,
            "assert" => TokenType::Assert,
            "and" => TokenType::And,
            "or" => TokenType::Or,
            "not" => TokenType::Not,
            _ => TokenType::Identifier(lexeme.clone()),
        };
        Token::new(token_type, location, lexeme)
    }

    fn read_operator_or_punctuation(&mut self, location: SourceLocation) -> Result<Token, LexError> {
        let c = self.current_char.unwrap();
        self.advance();

        let (token_type, lexeme) = match c {
            '+' => (TokenType::Plus, "+".to_string()),
            '-' => (TokenType::Minus, "-".to_string()),
            '*' => (TokenType::Star, "*".to_string()),
            '/' => (TokenType::Slash, "/".to_string()),
            '%' => (TokenType::Percent, "%".to_string()),
            '(' => (TokenType::LParen, "(".to_string()),
            ')' => (TokenType::RParen, ")".to_string()),
            '{' => (TokenType::LBrace, "{".to_string()),
            '}' => (TokenType::RBrace, "}".to_string()),
            ';' => (TokenType::Semicolon, ";".to_string()),
            '=' => {
                if self.current_char == Some('=') {
                    self.advance();
                    (TokenType::EqEq, "==".to_string())
                } else {
                    (TokenType::Assign, "=".to_string())
                }
            }
            '!' => {
                if self.current_char == Some('=') {
                    self.advance();
                    (TokenType::NotEq, "!=".to_string())
                } else {
                    return Err(LexError::UnexpectedCharacter { character: c, location });
                }
            }
            '<' => {
                if self.current_char == Some('=') {
                    self.advance();
                    (TokenType::Le, "<=".to_string())
                } else {
                    (TokenType::Lt, "<".to_string())
                }
            }
            '>' => {
                if self.current_char == Some('=') {
                    self.advance();
                    (TokenType::Ge, ">=".to_string())
                } else {
                    (TokenType::Gt, ">".to_string())
                }
            }
            ':' => {
                if self.current_char == Some('=') {
                    self.advance();
                    (TokenType::Walrus, ":=".to_string())
                } else {
                    return Err(LexError::UnexpectedCharacter { character: c, location });
                }
            }
            other => return Err(LexError::UnexpectedCharacter { character: other, location }),
        };

        Ok(Token::new(token_type, location, lexeme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(src: &str) -> Vec<TokenType> {
        let mut lexer = Lexer::new(src, "t.vb".to_string());
        lexer.tokenize().unwrap().into_iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_basic_declaration() {
        let toks = types("var x := 10;");
        assert_eq!(
            toks,
            vec![
                TokenType::Var,
                TokenType::Identifier("x".to_string()),
                TokenType::Walrus,
                TokenType::Integer(10),
                TokenType::Semicolon,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let toks = types("x <= y and z != 0");
        assert_eq!(
            toks,
            vec![
                TokenType::Identifier("x".to_string()),
                TokenType::Le,
                TokenType::Identifier("y".to_string()),
                TokenType::And,
                TokenType::Identifier("z".to_string()),
                TokenType::NotEq,
                TokenType::Integer(0),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_line_comment_skipped() {
        let toks = types("x := 1; // trailing comment\ny := 2;");
        assert!(toks.iter().any(|t| matches!(t, TokenType::Identifier(n) if n == "y")));
    }

    #[test]
    fn test_decimal_literal() {
        let toks = types("3.14");
        assert_eq!(toks, vec![TokenType::Decimal(3.14), TokenType::Eof]);
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("x := 1 $ 2;", "t.vb".to_string());
        assert!(lexer.tokenize().is_err());
    }
}
