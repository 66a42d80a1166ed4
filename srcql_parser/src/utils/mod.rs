//! Shared utilities.

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
