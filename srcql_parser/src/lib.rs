//! SrcQL query parser.
//!
//! Front end for the SrcQL source-code query language: tokenizer, recursive
//! descent parser with single-token error recovery, declaration tables and
//! query assembly. The single entry point is [`parse_query`]; everything
//! else is exposed for consumers that inspect the parsed tree.
//!
//! ```
//! use srcql_parser::parse_query;
//!
//! let query = parse_query(
//!     "FROM method AS m WHERE m.name() LIKE \"Get%\" SELECT m, m.name()",
//! )
//! .unwrap();
//! assert_eq!(query.select_list[0].alias, "m");
//! ```

#[macro_use]
pub mod logging;

pub mod config;
pub mod declarations;
pub mod grammar;
pub mod lexical;
pub mod syntax;
pub mod tokens;
pub mod utils;

pub use grammar::ast::nodes::{
    BinaryOp, ClassDeclaration, ExpressionNode, MethodDeclaration, PredicateDefinition,
    ProjectionItem, ProjectionKind, Query, SelectItem, UnaryOp,
};
pub use grammar::keywords::Keyword;
pub use syntax::{parse_query, ParseError};
pub use utils::{Position, Span};
