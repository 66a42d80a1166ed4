//! Log event type and severity levels.

use crate::logging::codes::{self, Code};
use crate::utils::Span;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// Event level; lower values are more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One structured log event.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        LogEvent {
            timestamp: Utc::now(),
            level,
            code,
            message: message.to_string(),
            span: None,
            context: HashMap::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        LogEvent::new(LogLevel::Error, code, message)
    }

    pub fn warning(message: &str) -> Self {
        LogEvent::new(LogLevel::Warning, Code::new("W000"), message)
    }

    pub fn info(message: &str) -> Self {
        LogEvent::new(LogLevel::Info, Code::new("I000"), message)
    }

    /// Info-level event with an explicit success code.
    pub fn success(code: Code, message: &str) -> Self {
        LogEvent::new(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        LogEvent::new(LogLevel::Debug, Code::new("D000"), message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.code.as_str())
    }

    /// One-line human format: `[LEVEL] CODE - message at line:col`.
    pub fn format(&self) -> String {
        let mut line = format!("[{}] {} - {}", self.level, self.code, self.message);
        if let Some(span) = &self.span {
            line.push_str(&format!(" at {}", span.start));
        }
        line
    }

    /// Verbose multi-line format with context entries.
    pub fn format_detailed(&self) -> String {
        let mut output = self.format();
        let mut keys: Vec<&String> = self.context.keys().collect();
        keys.sort();
        for key in keys {
            output.push_str(&format!("\n  {}: {}", key, self.context[key]));
        }
        output
    }

    /// Machine-readable JSON line.
    pub fn format_json(&self) -> String {
        let span = self.span.map(|span| {
            serde_json::json!({
                "line": span.start.line,
                "column": span.start.column,
                "end_line": span.end.line,
                "end_column": span.end.column,
            })
        });
        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "span": span,
            "context": self.context,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn test_constructors() {
        let event = LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "bad token");
        assert!(event.is_error());
        assert_eq!(event.code, codes::syntax::UNEXPECTED_TOKEN);

        let event = LogEvent::success(codes::success::PARSE_COMPLETE, "done");
        assert_eq!(event.level, LogLevel::Info);
        assert!(!event.is_error());
    }

    #[test]
    fn test_format_with_span() {
        let mut end = Position::start();
        end.advance_str("FROM");
        let event = LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "bad token")
            .with_span(Span::new(Position::start(), end));
        let formatted = event.format();
        assert!(formatted.starts_with("[ERROR] E040 - bad token"));
        assert!(formatted.ends_with("at 1:1"));
    }

    #[test]
    fn test_format_detailed_sorts_context() {
        let event = LogEvent::info("processing")
            .with_context("zeta", "1")
            .with_context("alpha", "2");
        let detailed = event.format_detailed();
        let alpha = detailed.find("alpha").unwrap();
        let zeta = detailed.find("zeta").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_format_json_is_valid() {
        let event = LogEvent::error(codes::lexical::INVALID_CHARACTER, "bad char")
            .with_context("character", "@");
        let parsed: serde_json::Value = serde_json::from_str(&event.format_json()).unwrap();
        assert_eq!(parsed["code"], "E020");
        assert_eq!(parsed["level"], "ERROR");
        assert_eq!(parsed["context"]["character"], "@");
        assert!(parsed["span"].is_null());
    }

    #[test]
    fn test_halt_lookup() {
        let event = LogEvent::error(codes::syntax::MAX_RECURSION_DEPTH, "too deep");
        assert!(event.requires_halt());
        let event = LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "bad token");
        assert!(!event.requires_halt());
    }
}
