//! Syntax errors and the per-parse error collector.

use crate::config::compile_time::syntax::MAX_ERROR_COLLECTION;
use crate::logging::codes::{self, Code};
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Internal error raised while parsing; converted to [`ParseError`] when
/// recorded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("Unexpected token: expected {expected}, found '{found}'")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of query: expected {expected}")]
    UnexpectedEndOfInput { expected: String, span: Span },

    #[error("Query is empty")]
    EmptyQuery,

    #[error("Expression nesting exceeds the maximum depth")]
    MaxRecursionDepth { span: Span },

    #[error("List literal must contain at least one element")]
    EmptyListLiteral { span: Span },

    #[error("Unexpected input after the end of the query: '{found}'")]
    TrailingTokens { found: String, span: Span },

    #[error("{message}")]
    DeclarationLimit {
        message: String,
        code: Code,
        span: Span,
    },

    #[error("Internal parser error: {message}")]
    InternalParserError { message: String },
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        SyntaxError::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn end_of_input(expected: &str, span: Span) -> Self {
        SyntaxError::UnexpectedEndOfInput {
            expected: expected.to_string(),
            span,
        }
    }

    pub fn max_recursion_depth(span: Span) -> Self {
        SyntaxError::MaxRecursionDepth { span }
    }

    pub fn empty_list_literal(span: Span) -> Self {
        SyntaxError::EmptyListLiteral { span }
    }

    pub fn trailing_tokens(found: &str, span: Span) -> Self {
        SyntaxError::TrailingTokens {
            found: found.to_string(),
            span,
        }
    }

    pub fn declaration_limit(error: &crate::declarations::DeclarationError, span: Span) -> Self {
        SyntaxError::DeclarationLimit {
            message: error.to_string(),
            code: error.error_code(),
            span,
        }
    }

    pub fn internal(message: &str) -> Self {
        SyntaxError::InternalParserError {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            SyntaxError::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            SyntaxError::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            SyntaxError::EmptyQuery => codes::syntax::EMPTY_QUERY,
            SyntaxError::MaxRecursionDepth { .. } => codes::syntax::MAX_RECURSION_DEPTH,
            SyntaxError::EmptyListLiteral { .. } => codes::syntax::EMPTY_LIST_LITERAL,
            SyntaxError::TrailingTokens { .. } => codes::syntax::TRAILING_TOKENS,
            SyntaxError::DeclarationLimit { code, .. } => *code,
            SyntaxError::InternalParserError { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            SyntaxError::UnexpectedToken { span, .. }
            | SyntaxError::UnexpectedEndOfInput { span, .. }
            | SyntaxError::MaxRecursionDepth { span }
            | SyntaxError::EmptyListLiteral { span }
            | SyntaxError::TrailingTokens { span, .. }
            | SyntaxError::DeclarationLimit { span, .. } => Some(*span),
            SyntaxError::EmptyQuery | SyntaxError::InternalParserError { .. } => None,
        }
    }

    /// Recoverable errors allow skip-and-retry; the rest stop the parse.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            SyntaxError::EmptyQuery
                | SyntaxError::MaxRecursionDepth { .. }
                | SyntaxError::InternalParserError { .. }
        )
    }

    pub fn requires_halt(&self) -> bool {
        !self.is_recoverable()
    }
}

/// One reported error of a failed parse, positioned in the query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        ParseError {
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Ordered error collector for one parse.
///
/// Errors accumulate in discovery order and are inspected exactly once, at
/// the entry point: any recorded error means no `Query` is returned.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<ParseError>,
    truncated: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn record(&mut self, line: u32, column: u32, message: impl Into<String>) {
        if self.errors.len() >= MAX_ERROR_COLLECTION {
            if !self.truncated {
                self.truncated = true;
                log_warning!("Error collection limit reached; further errors suppressed");
            }
            return;
        }
        self.errors.push(ParseError::new(line, column, message));
    }

    pub fn record_at(&mut self, span: Span, message: impl Into<String>) {
        self.record(span.start.line, span.start.column, message);
    }

    /// Record a syntax error, positioning it at its span when it has one.
    pub fn record_syntax(&mut self, error: &SyntaxError) {
        match error.span() {
            Some(span) => self.record_at(span, error.to_string()),
            None => self.record(1, 1, error.to_string()),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }
}
