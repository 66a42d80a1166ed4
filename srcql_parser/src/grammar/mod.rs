//! Grammar definitions: keywords and the abstract syntax tree.

pub mod ast;
pub mod keywords;

pub use keywords::Keyword;
