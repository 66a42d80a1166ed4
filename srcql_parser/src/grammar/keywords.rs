//! Reserved words of the query language.
//!
//! Keyword matching is case-sensitive: the clause keywords are uppercase
//! (`FROM`, `WHERE`, ...) while the declaration keywords and the `in`
//! operator are lowercase. `from` or `From` is an ordinary identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    /// `FROM` - query root, introduces the select list.
    From,
    /// `FIND` - legacy alias of `FROM`.
    Find,
    /// `WHERE` - introduces the filter expression.
    Where,
    /// `AS` - binds a select-list alias.
    As,
    /// `SELECT` - introduces the projection.
    Select,
    /// `predicate` - starts a predicate declaration.
    Predicate,
    /// `class` - starts a class declaration.
    Class,
    /// `result` - method body assignment inside a class declaration.
    Result,
    /// `LIKE` - wildcard string match, relational precedence.
    Like,
    /// `in` - list membership, relational precedence.
    In,
}

impl Keyword {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Keyword::From => "FROM",
            Keyword::Find => "FIND",
            Keyword::Where => "WHERE",
            Keyword::As => "AS",
            Keyword::Select => "SELECT",
            Keyword::Predicate => "predicate",
            Keyword::Class => "class",
            Keyword::Result => "result",
            Keyword::Like => "LIKE",
            Keyword::In => "in",
        }
    }

    /// Exact-spelling lookup. Returns `None` for any other casing.
    pub fn from_str(word: &str) -> Option<Keyword> {
        match word {
            "FROM" => Some(Keyword::From),
            "FIND" => Some(Keyword::Find),
            "WHERE" => Some(Keyword::Where),
            "AS" => Some(Keyword::As),
            "SELECT" => Some(Keyword::Select),
            "predicate" => Some(Keyword::Predicate),
            "class" => Some(Keyword::Class),
            "result" => Some(Keyword::Result),
            "LIKE" => Some(Keyword::Like),
            "in" => Some(Keyword::In),
            _ => None,
        }
    }

    /// `FROM` or its legacy alias `FIND`.
    pub fn is_query_root(&self) -> bool {
        matches!(self, Keyword::From | Keyword::Find)
    }

    /// Starts an optional trailing clause.
    pub fn is_clause_start(&self) -> bool {
        matches!(self, Keyword::Where | Keyword::Select)
    }

    /// Starts a declaration block before the query root.
    pub fn is_declaration_start(&self) -> bool {
        matches!(self, Keyword::Predicate | Keyword::Class)
    }

    /// Keyword-spelled operator at relational precedence.
    pub fn is_relational_operator(&self) -> bool {
        matches!(self, Keyword::Like | Keyword::In)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every reserved spelling, for diagnostics.
pub fn reserved_keywords() -> &'static [&'static str] {
    &[
        "FROM",
        "FIND",
        "WHERE",
        "AS",
        "SELECT",
        "predicate",
        "class",
        "result",
        "LIKE",
        "in",
    ]
}
