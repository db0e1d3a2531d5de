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

//! Error reporter with source context display

use crate::error::{LexError, ParseError, SemanticError, SourceLocation};
use std::collections::HashMap;
use std::fs;

/// Error reporter that displays errors with surrounding source lines
pub struct DetailedErrorReporter {
    source_cache: HashMap<String, Vec<String>>,
}

impl DetailedErrorReporter {
    pub fn new() -> Self {
        Self { source_cache: HashMap::new() }
    }

    pub fn report_parse_error(&mut self, error: &ParseError) {
        match error {
            ParseError::UnexpectedToken { found, expected, location } => {
                self.report_with_context("unexpected token", &format!("expected {}, found {}", expected, found), location);
            }
            ParseError::UnexpectedEof { expected } => {
                eprintln!("error: unexpected end of input, expected {}", expected);
            }
            ParseError::InvalidExpression { reason, location } => {
                self.report_with_context("invalid expression", reason, location);
            }
            ParseError::Lexer { source } => self.report_lex_error(source),
        }
    }

    pub fn report_semantic_error(&mut self, error: &SemanticError) {
        match error {
            SemanticError::UndefinedVariable { name, location } => {
                self.report_with_context("undefined variable", &format!("'{}' is not declared", name), location);
            }
            SemanticError::DuplicateDeclaration { name, location, previous_location } => {
                self.report_with_context("duplicate declaration", &format!("'{}' already declared", name), location);
                self.report_with_context("previous declaration", &format!("'{}' first declared here", name), previous_location);
            }
            other => eprintln!("error: {}", other),
        }
    }

    pub fn report_lex_error(&mut self, error: &LexError) {
        match error {
            LexError::UnexpectedCharacter { character, location } => {
                self.report_with_context("unexpected character", &format!("'{}' is not valid here", character), location);
            }
            other => eprintln!("error: {}", other),
        }
    }

    fn report_with_context(&mut self, title: &str, message: &str, location: &SourceLocation) {
        eprintln!("error: {}", title);
        eprintln!("  --> {}:{}:{}", location.file, location.line, location.column);
        eprintln!();

        if let Ok(lines) = self.get_source_lines(&location.file) {
            let line_num = location.line;
            let col_num = location.column;
            let width = line_num.to_string().len().max(3);
            let start = line_num.saturating_sub(1).max(1);
            let end = (line_num + 1).min(lines.len());

            for i in start..=end {
                if i == 0 || i > lines.len() {
                    continue;
                }
                let line = &lines[i - 1];
                let line_str = format!("{:>width$}", i, width = width);
                if i == line_num {
                    eprintln!("{} |     {}", line_str, line);
                    let padding = " ".repeat(width + 6 + col_num.saturating_sub(1));
                    eprintln!("{} {} {}^", " ".repeat(width), "|", padding);
                    eprintln!("{} {} {}{}", " ".repeat(width), "|", padding, message);
                } else {
                    eprintln!("{} |     {}", line_str, line);
                }
            }
        } else {
            eprintln!("  {}", message);
        }
        eprintln!();
    }

    fn get_source_lines(&mut self, file_path: &str) -> Result<&Vec<String>, std::io::Error> {
        if !self.source_cache.contains_key(file_path) {
            let content = fs::read_to_string(file_path)?;
            let lines: Vec<String> = content.lines().map(|s| s.to_string()).collect();
            self.source_cache.insert(file_path.to_string(), lines);
        }
        Ok(self.source_cache.get(file_path).unwrap())
    }
}

impl Default for DetailedErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
