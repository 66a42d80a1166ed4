//! Lexical analysis: query text to tokens.

pub mod analyzer;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};
