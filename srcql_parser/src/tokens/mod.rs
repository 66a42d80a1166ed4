//! Token definitions and the filtered token stream.
//!
//! The tokenizer emits every lexeme it sees, whitespace included, each with
//! its span. [`TokenStream`] then exposes only the significant tokens to the
//! parser while keeping the full sequence around for diagnostics.

pub mod token;
pub mod token_stream;

pub use token::{SpannedToken, StringLiteral, Token};
pub use token_stream::{TokenStream, TokenStreamBuilder};
