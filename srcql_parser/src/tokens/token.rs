//! Token types produced by the tokenizer.

use crate::grammar::keywords::Keyword;
use crate::utils::Spanned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type SpannedToken = Spanned<Token>;

/// A quoted string, split on whether it carries a `%` wildcard.
///
/// The stored content has quotes stripped and `\"` / `\\` escapes resolved.
/// `to_query_string` reverses that, so the round trip through a token is
/// exact for any legal literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringLiteral {
    /// No `%` anywhere in the content.
    Plain(String),
    /// At least one `%`; downstream match logic treats it as a pattern.
    Wildcard(String),
}

impl StringLiteral {
    /// Wrap raw content, classifying on the wildcard marker.
    pub fn from_content(content: String) -> Self {
        if content.contains('%') {
            StringLiteral::Wildcard(content)
        } else {
            StringLiteral::Plain(content)
        }
    }

    pub fn content(&self) -> &str {
        match self {
            StringLiteral::Plain(content) | StringLiteral::Wildcard(content) => content,
        }
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self, StringLiteral::Wildcard(_))
    }

    /// Source spelling: quotes restored, `\` and `"` re-escaped.
    pub fn to_query_string(&self) -> String {
        let mut out = String::with_capacity(self.content().len() + 2);
        out.push('"');
        for ch in self.content().chars() {
            match ch {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                other => out.push(other),
            }
        }
        out.push('"');
        out
    }
}

/// One lexeme of the query language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    Keyword(Keyword),
    Identifier(String),
    StringLiteral(StringLiteral),
    /// Digits with an optional fraction, kept as source text.
    Number(String),

    // Operators and punctuation
    OrOr,
    AndAnd,
    EqualEqual,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    Assign,
    Dot,
    Comma,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    // Insignificant tokens, kept for span bookkeeping
    Space,
    Tab,
    Newline,

    Eof,
}

impl Token {
    /// Whitespace is carried in the stream but never reaches the parser.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Token::Space | Token::Tab | Token::Newline)
    }

    pub fn is_significant(&self) -> bool {
        !self.is_ignorable()
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, Token::Keyword(k) if *k == keyword)
    }

    pub fn as_keyword(&self) -> Option<Keyword> {
        match self {
            Token::Keyword(keyword) => Some(*keyword),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Token::StringLiteral(_) | Token::Number(_))
    }

    /// Source spelling of this token, used for rendering and diagnostics.
    pub fn to_query_string(&self) -> String {
        match self {
            Token::Keyword(keyword) => keyword.as_str().to_string(),
            Token::Identifier(name) => name.clone(),
            Token::StringLiteral(literal) => literal.to_query_string(),
            Token::Number(text) => text.clone(),
            Token::OrOr => "||".to_string(),
            Token::AndAnd => "&&".to_string(),
            Token::EqualEqual => "==".to_string(),
            Token::NotEqual => "!=".to_string(),
            Token::Less => "<".to_string(),
            Token::Greater => ">".to_string(),
            Token::LessEqual => "<=".to_string(),
            Token::GreaterEqual => ">=".to_string(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::Bang => "!".to_string(),
            Token::Assign => "=".to_string(),
            Token::Dot => ".".to_string(),
            Token::Comma => ",".to_string(),
            Token::LeftParen => "(".to_string(),
            Token::RightParen => ")".to_string(),
            Token::LeftBrace => "{".to_string(),
            Token::RightBrace => "}".to_string(),
            Token::LeftBracket => "[".to_string(),
            Token::RightBracket => "]".to_string(),
            Token::Space => " ".to_string(),
            Token::Tab => "\t".to_string(),
            Token::Newline => "\n".to_string(),
            Token::Eof => String::new(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => write!(f, "<end of query>"),
            Token::Space | Token::Tab => write!(f, "<whitespace>"),
            Token::Newline => write!(f, "<newline>"),
            other => write!(f, "{}", other.to_query_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal_classification() {
        let plain = StringLiteral::from_content("GetUser".to_string());
        assert!(!plain.has_wildcard());
        assert_eq!(plain.content(), "GetUser");

        let wildcard = StringLiteral::from_content("Get%".to_string());
        assert!(wildcard.has_wildcard());
    }

    #[test]
    fn test_string_literal_render_escapes() {
        let literal = StringLiteral::from_content("say \"hi\" \\ bye".to_string());
        assert_eq!(literal.to_query_string(), "\"say \\\"hi\\\" \\\\ bye\"");
    }

    #[test]
    fn test_significance() {
        assert!(Token::Identifier("m".to_string()).is_significant());
        assert!(Token::Eof.is_significant());
        assert!(Token::Space.is_ignorable());
        assert!(Token::Tab.is_ignorable());
        assert!(Token::Newline.is_ignorable());
    }

    #[test]
    fn test_keyword_helpers() {
        let token = Token::Keyword(Keyword::From);
        assert!(token.is_keyword(Keyword::From));
        assert!(!token.is_keyword(Keyword::Where));
        assert_eq!(token.as_keyword(), Some(Keyword::From));
        assert_eq!(Token::Comma.as_keyword(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::OrOr.to_string(), "||");
        assert_eq!(Token::Keyword(Keyword::Like).to_string(), "LIKE");
        assert_eq!(Token::Eof.to_string(), "<end of query>");
        assert_eq!(
            Token::Number("10.5".to_string()).to_query_string(),
            "10.5"
        );
    }
}
