//! Syntax analysis: the parser driver, the clause and expression grammars,
//! error collection and final query assembly.
//!
//! [`parse_query`] is the front door: text in, either a complete [`Query`]
//! or every error found, never both.

pub mod assembler;
pub mod clauses;
pub mod error;
pub mod expression;
pub mod parser;

pub use error::{Diagnostics, ParseError, SyntaxError, SyntaxResult};
pub use parser::QueryParser;

use crate::grammar::ast::nodes::Query;
use crate::lexical::LexicalAnalyzer;
use crate::logging::codes;

/// Parse one query.
///
/// Lexical and syntax errors are collected together, in discovery order.
/// An `Err` carries at least one error; an `Ok` means the whole input was
/// consumed cleanly.
pub fn parse_query(text: &str) -> Result<Query, Vec<ParseError>> {
    let mut analyzer = LexicalAnalyzer::new();
    let (tokens, lexer_errors) = analyzer.tokenize(text);

    let mut diagnostics = Diagnostics::new();
    for error in &lexer_errors {
        diagnostics.record(error.line(), error.column(), error.to_string());
    }

    let mut parser = QueryParser::new(tokens, diagnostics);
    let query = parser.parse();
    let mut diagnostics = parser.into_diagnostics();

    if query.is_none() && diagnostics.is_empty() {
        // A failed parse must always explain itself, logger or not.
        crate::logging::safe_log_error(
            codes::system::INTERNAL_ERROR,
            "Parse failed without diagnostics",
        );
        diagnostics.record(1, 1, "Internal parser error: parse failed without diagnostics");
    }

    match query {
        Some(query) if !diagnostics.has_errors() => Ok(query),
        _ => Err(diagnostics.into_errors()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_errors_surface_through_parse_query() {
        let errors = parse_query("FROM method AS m WHERE m.name() == \"open").unwrap_err();
        assert!(errors
            .iter()
            .any(|error| error.message.contains("Unterminated")));
    }

    #[test]
    fn test_lexical_errors_come_before_syntax_errors() {
        // '@' is reported by the lexer, the dangling WHERE by the parser.
        let errors = parse_query("FROM @ AS m WHERE").unwrap_err();
        assert!(errors.len() >= 2);
        assert!(errors[0].message.contains("Unrecognized character"));
    }

    #[test]
    fn test_ok_result_has_no_errors() {
        let query = parse_query("FROM method AS m WHERE m.name() == \"x\" SELECT m");
        assert!(query.is_ok());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let errors = parse_query("").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("empty"));
    }
}
