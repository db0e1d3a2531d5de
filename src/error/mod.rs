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

//! Error handling for the verifier
//!
//! Typed errors per pipeline phase, aggregated into one top-level error.

mod reporter;
pub use reporter::DetailedErrorReporter;

use std::fmt;
use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(file: String, line: usize, column: usize, offset: usize) -> Self {
        Self { file, line, column, offset }
    }

    pub fn unknown() -> Self {
        Self { file: "<unknown>".to_string(), line: 0, column: 0, offset: 0 }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Source span covering a range of characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    pub fn single(location: SourceLocation) -> Self {
        Self { start: location.clone(), end: location }
    }
}

/// Lexical analysis errors
#[derive(Error, Debug, Clone)]
pub enum LexError {
    #[error("Unexpected character '{character}' at {location}")]
    UnexpectedCharacter { character: char, location: SourceLocation },

    #[error("Invalid number literal '{value}' at {location}")]
    InvalidNumber { value: String, location: SourceLocation },

    #[error("Unterminated comment at {location}")]
    UnterminatedComment { location: SourceLocation },
}

/// Parsing errors
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Unexpected token {found}, expected {expected} at {location}")]
    UnexpectedToken { found: String, expected: String, location: SourceLocation },

    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("Invalid expression at {location}: {reason}")]
    InvalidExpression { reason: String, location: SourceLocation },

    #[error("Lexer error: {source}")]
    Lexer {
        #[from]
        source: LexError,
    },
}

/// Semantic errors surfaced while building SSA or encoding to SMT
#[derive(Error, Debug, Clone)]
pub enum SemanticError {
    #[error("Undefined variable '{name}' at {location}")]
    UndefinedVariable { name: String, location: SourceLocation },

    #[error("Variable '{name}' already declared at {location} (previously declared at {previous_location})")]
    DuplicateDeclaration {
        name: String,
        location: SourceLocation,
        previous_location: SourceLocation,
    },

    #[error("Assertion condition is not boolean-valued at {location}")]
    NonBooleanAssertion { location: SourceLocation },

    #[error("Sort mismatch: cannot mix boolean and integer operands in '{operator}' at {location}")]
    SortMismatch { operator: String, location: SourceLocation },

    #[error("Unroll depth {depth} is out of range [1,10]")]
    InvalidUnrollDepth { depth: u32 },

    #[error("Decimal literals are not supported in SMT encoding at {location}")]
    UnsupportedRealLiteral { location: SourceLocation },
}

/// Errors from invoking the SMT solver
#[derive(Error, Debug, Clone)]
pub enum SolverError {
    #[error("Solver returned unknown for query: {context}")]
    Unknown { context: String },

    #[error("No model available after sat result")]
    NoModel,

    #[error("Solver internal error: {message}")]
    Internal { message: String },
}

/// Top-level error type aggregating every pipeline phase
#[derive(Error, Debug, Clone)]
pub enum VerifierError {
    #[error("Lex error: {source}")]
    Lex {
        #[from]
        source: LexError,
    },

    #[error("Parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("Semantic error: {source}")]
    Semantic {
        #[from]
        source: SemanticError,
    },

    #[error("Solver error: {source}")]
    Solver {
        #[from]
        source: SolverError,
    },

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for VerifierError {
    fn from(err: std::io::Error) -> Self {
        VerifierError::Io { message: err.to_string() }
    }
}

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message with location and severity
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceSpan>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: String, location: Option<SourceSpan>) -> Self {
        Self { severity: Severity::Error, message, location, help: None }
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }
}

/// Renders diagnostics to the terminal, with optional color
pub struct ErrorReporter {
    use_colors: bool,
}

impl ErrorReporter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn report_diagnostic(&self, diagnostic: &Diagnostic) {
        let color = if self.use_colors {
            match diagnostic.severity {
                Severity::Error => "\x1b[31m",
                Severity::Warning => "\x1b[33m",
                Severity::Info => "\x1b[34m",
            }
        } else {
            ""
        };
        let reset = if self.use_colors { "\x1b[0m" } else { "" };

        if let Some(span) = &diagnostic.location {
            eprintln!("{}{}{}: {} at {}", color, diagnostic.severity, reset, diagnostic.message, span.start);
        } else {
            eprintln!("{}{}{}: {}", color, diagnostic.severity, reset, diagnostic.message);
        }

        if let Some(help) = &diagnostic.help {
            eprintln!("  = help: {}", help);
        }
    }

    pub fn report_error(&self, error: &VerifierError) {
        let diagnostic = match error {
            VerifierError::Lex { source } => Diagnostic::error(source.to_string(), None),
            VerifierError::Parse { source } => Diagnostic::error(source.to_string(), None),
            VerifierError::Semantic { source } => Diagnostic::error(source.to_string(), None)
                .with_help("check variable declarations and operand sorts".to_string()),
            VerifierError::Solver { source } => Diagnostic::error(source.to_string(), None),
            VerifierError::Io { message } => Diagnostic::error(message.clone(), None),
        };
        self.report_diagnostic(&diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new("prog.vb".to_string(), 10, 5, 100);
        assert_eq!(loc.to_string(), "prog.vb:10:5");
    }

    #[test]
    fn test_diagnostic_with_help() {
        let diag = Diagnostic::error("bad thing".to_string(), None)
            .with_help("try this".to_string());
        assert_eq!(diag.help.as_deref(), Some("try this"));
    }

    #[test]
    fn test_error_conversion_chain() {
        let lex = LexError::UnexpectedCharacter { character: '$', location: SourceLocation::unknown() };
        let parse: ParseError = lex.into();
        let top: VerifierError = parse.into();
        assert!(matches!(top, VerifierError::Parse { .. }));
    }
}
