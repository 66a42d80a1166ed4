//! Stable event codes and their metadata.
//!
//! Every log event carries a `Code`. Error codes group by parsing stage:
//! `E0xx` system, `E2x` lexical, `E4x` syntax, `E6x` declarations; `I0xx`
//! are success codes. Metadata (severity, category, description, action)
//! lives in one registry so diagnostics and tooling agree on it.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// A stable, grep-able event code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Code(code)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("E001");
}

pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const STRING_TOO_LARGE: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const TOO_MANY_TOKENS: Code = Code::new("E024");
}

pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E041");
    pub const EMPTY_QUERY: Code = Code::new("E042");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E043");
    pub const EMPTY_LIST_LITERAL: Code = Code::new("E044");
    pub const TRAILING_TOKENS: Code = Code::new("E045");
    pub const TOO_MANY_ERRORS: Code = Code::new("E046");
}

pub mod declarations {
    use super::Code;

    pub const TOO_MANY_PREDICATES: Code = Code::new("E060");
    pub const TOO_MANY_PARAMETERS: Code = Code::new("E061");
    pub const TOO_MANY_CLASSES: Code = Code::new("E062");
}

pub mod success {
    use super::Code;

    pub const INITIALIZATION_COMPLETE: Code = Code::new("I001");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const PARSE_COMPLETE: Code = Code::new("I040");
}

/// Everything the registry knows about one code.
#[derive(Debug, Clone, Copy)]
pub struct ErrorMetadata {
    pub severity: Severity,
    pub category: &'static str,
    pub description: &'static str,
    pub action: &'static str,
    pub requires_halt: bool,
    pub recoverable: bool,
}

fn registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    static REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map = HashMap::new();

        map.insert(
            "E001",
            ErrorMetadata {
                severity: Severity::Critical,
                category: "system",
                description: "Internal parser error",
                action: "Report this query as a parser bug",
                requires_halt: true,
                recoverable: false,
            },
        );

        map.insert(
            "E020",
            ErrorMetadata {
                severity: Severity::Medium,
                category: "lexical",
                description: "Character outside the query alphabet",
                action: "Remove or quote the character",
                requires_halt: false,
                recoverable: true,
            },
        );
        map.insert(
            "E021",
            ErrorMetadata {
                severity: Severity::Medium,
                category: "lexical",
                description: "String literal missing its closing quote",
                action: "Close the string with '\"'",
                requires_halt: false,
                recoverable: true,
            },
        );
        map.insert(
            "E022",
            ErrorMetadata {
                severity: Severity::High,
                category: "lexical",
                description: "String literal exceeds the size limit",
                action: "Shorten the literal",
                requires_halt: false,
                recoverable: true,
            },
        );
        map.insert(
            "E023",
            ErrorMetadata {
                severity: Severity::Medium,
                category: "lexical",
                description: "Identifier exceeds the length limit",
                action: "Shorten the identifier",
                requires_halt: false,
                recoverable: true,
            },
        );
        map.insert(
            "E024",
            ErrorMetadata {
                severity: Severity::High,
                category: "lexical",
                description: "Token count limit reached",
                action: "Split the query",
                requires_halt: true,
                recoverable: false,
            },
        );

        map.insert(
            "E040",
            ErrorMetadata {
                severity: Severity::Medium,
                category: "syntax",
                description: "Token not valid at this point of the grammar",
                action: "Check the query near the reported position",
                requires_halt: false,
                recoverable: true,
            },
        );
        map.insert(
            "E041",
            ErrorMetadata {
                severity: Severity::Medium,
                category: "syntax",
                description: "Query ended while a clause was incomplete",
                action: "Complete the trailing clause",
                requires_halt: false,
                recoverable: true,
            },
        );
        map.insert(
            "E042",
            ErrorMetadata {
                severity: Severity::Medium,
                category: "syntax",
                description: "Query text contains no tokens",
                action: "Provide a FROM clause",
                requires_halt: true,
                recoverable: false,
            },
        );
        map.insert(
            "E043",
            ErrorMetadata {
                severity: Severity::High,
                category: "syntax",
                description: "Expression nesting exceeds the depth limit",
                action: "Flatten the expression",
                requires_halt: true,
                recoverable: false,
            },
        );
        map.insert(
            "E044",
            ErrorMetadata {
                severity: Severity::Medium,
                category: "syntax",
                description: "List literal with no elements",
                action: "Add at least one element",
                requires_halt: false,
                recoverable: true,
            },
        );
        map.insert(
            "E045",
            ErrorMetadata {
                severity: Severity::Medium,
                category: "syntax",
                description: "Tokens remain after the final clause",
                action: "Remove the trailing tokens",
                requires_halt: false,
                recoverable: true,
            },
        );
        map.insert(
            "E046",
            ErrorMetadata {
                severity: Severity::High,
                category: "syntax",
                description: "Error collection limit reached",
                action: "Fix the first reported errors and retry",
                requires_halt: true,
                recoverable: false,
            },
        );

        map.insert(
            "E060",
            ErrorMetadata {
                severity: Severity::High,
                category: "declarations",
                description: "Predicate table is full",
                action: "Reduce predicate declarations",
                requires_halt: false,
                recoverable: true,
            },
        );
        map.insert(
            "E061",
            ErrorMetadata {
                severity: Severity::Medium,
                category: "declarations",
                description: "Predicate parameter list too long",
                action: "Reduce the parameter count",
                requires_halt: false,
                recoverable: true,
            },
        );
        map.insert(
            "E062",
            ErrorMetadata {
                severity: Severity::High,
                category: "declarations",
                description: "Class table is full",
                action: "Reduce class declarations",
                requires_halt: false,
                recoverable: true,
            },
        );

        map.insert(
            "I001",
            ErrorMetadata {
                severity: Severity::Low,
                category: "success",
                description: "Logging initialized",
                action: "None",
                requires_halt: false,
                recoverable: true,
            },
        );
        map.insert(
            "I020",
            ErrorMetadata {
                severity: Severity::Low,
                category: "success",
                description: "Tokenization completed",
                action: "None",
                requires_halt: false,
                recoverable: true,
            },
        );
        map.insert(
            "I040",
            ErrorMetadata {
                severity: Severity::Low,
                category: "success",
                description: "Parse completed",
                action: "None",
                requires_halt: false,
                recoverable: true,
            },
        );

        map
    })
}

pub fn get_severity(code: &str) -> Severity {
    registry()
        .get(code)
        .map(|meta| meta.severity)
        .unwrap_or(Severity::Medium)
}

pub fn get_category(code: &str) -> &'static str {
    registry()
        .get(code)
        .map(|meta| meta.category)
        .unwrap_or("unknown")
}

pub fn get_description(code: &str) -> &'static str {
    registry()
        .get(code)
        .map(|meta| meta.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    registry()
        .get(code)
        .map(|meta| meta.action)
        .unwrap_or("No recommended action")
}

pub fn requires_halt(code: &str) -> bool {
    registry()
        .get(code)
        .map(|meta| meta.requires_halt)
        .unwrap_or(false)
}

pub fn is_recoverable(code: &str) -> bool {
    registry()
        .get(code)
        .map(|meta| meta.recoverable)
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_have_metadata() {
        for code in [
            system::INTERNAL_ERROR,
            lexical::INVALID_CHARACTER,
            lexical::UNTERMINATED_STRING,
            syntax::UNEXPECTED_TOKEN,
            syntax::MAX_RECURSION_DEPTH,
            declarations::TOO_MANY_PREDICATES,
            success::PARSE_COMPLETE,
        ] {
            assert_ne!(get_description(code.as_str()), "Unknown error");
        }
    }

    #[test]
    fn test_halting_codes() {
        assert!(requires_halt(system::INTERNAL_ERROR.as_str()));
        assert!(requires_halt(syntax::MAX_RECURSION_DEPTH.as_str()));
        assert!(!requires_halt(syntax::UNEXPECTED_TOKEN.as_str()));
        assert!(!is_recoverable(syntax::MAX_RECURSION_DEPTH.as_str()));
        assert!(is_recoverable(syntax::UNEXPECTED_TOKEN.as_str()));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_category("E999"), "unknown");
        assert!(!requires_halt("E999"));
    }

    #[test]
    fn test_code_display() {
        assert_eq!(syntax::UNEXPECTED_TOKEN.to_string(), "E040");
        assert_eq!(syntax::UNEXPECTED_TOKEN.as_str(), "E040");
    }
}
