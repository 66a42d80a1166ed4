//! Runtime logging preferences.
//!
//! Resource bounds stay compile-time; only presentation choices (minimum
//! level, output format) are runtime, set once per process either
//! programmatically or from the `SRCQL_LOG` / `SRCQL_LOG_FORMAT` environment
//! variables.

use crate::config::compile_time::logging::{LOG_BUFFER_SIZE, MAX_LOG_MESSAGE_LENGTH};
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct LoggingPreferences {
    pub min_log_level: LogLevel,
    pub use_structured_logging: bool,
    pub enable_console_logging: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        LoggingPreferences {
            min_log_level: LogLevel::Info,
            use_structured_logging: false,
            enable_console_logging: true,
        }
    }
}

impl LoggingPreferences {
    /// Read preferences from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let mut preferences = LoggingPreferences::default();

        if let Ok(level) = std::env::var("SRCQL_LOG") {
            preferences.min_log_level = match level.to_ascii_lowercase().as_str() {
                "error" => LogLevel::Error,
                "warn" | "warning" => LogLevel::Warning,
                "debug" => LogLevel::Debug,
                _ => LogLevel::Info,
            };
        }
        if let Ok(format) = std::env::var("SRCQL_LOG_FORMAT") {
            preferences.use_structured_logging = format.eq_ignore_ascii_case("json");
        }

        preferences
    }
}

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Set preferences once; later calls fail.
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime logging preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

pub fn get_min_log_level() -> LogLevel {
    get_runtime_preferences().min_log_level
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

/// Event cap for the in-memory logger.
pub fn get_log_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

/// Sanity-check the compile-time logging constants.
pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }
    if MAX_LOG_MESSAGE_LENGTH < 80 {
        return Err(format!(
            "Max log message length too small: {}",
            MAX_LOG_MESSAGE_LENGTH
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_config() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_defaults() {
        let preferences = LoggingPreferences::default();
        assert_eq!(preferences.min_log_level, LogLevel::Info);
        assert!(!preferences.use_structured_logging);
        assert!(preferences.enable_console_logging);
    }

    #[test]
    fn test_buffer_size_exposed() {
        assert_eq!(get_log_buffer_size(), LOG_BUFFER_SIZE);
        assert!(get_max_log_message_length() >= 80);
    }
}
