//! Global logging for the parser.
//!
//! Logging is ambient and optional: nothing in the parse path requires it to
//! be initialized, and no parse result ever depends on it. Initialize once
//! per process with [`init_global_logging`], or inject a memory-backed
//! service in tests with [`init_global_logging_with_service`].

pub mod codes;
pub mod config;
pub mod events;
#[macro_use]
pub mod macros;
pub mod service;

use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// Initialize global logging from the runtime preferences.
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());
    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    logging_service.log_event(events::LogEvent::success(
        codes::success::INITIALIZATION_COMPLETE,
        "Global logging initialized",
    ));
    Ok(())
}

/// Initialize with a custom service (primarily for testing).
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Global logger if one was installed; `None` keeps logging a no-op.
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Used by `log_error!`.
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, message);
    if let Some(span) = span {
        event = event.with_span(span);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Used by `log_success!`.
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::success(code, message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Used by `log_info!`.
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::info(message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Log an error even when global logging is not initialized.
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_logging_is_noop() {
        // Macros and support functions must not panic without a logger.
        log_error_with_context(codes::system::INTERNAL_ERROR, "no logger", None, vec![]);
        log_info_with_context("no logger", vec![("key", "value")]);
    }

    #[test]
    fn test_safe_log_error_never_panics() {
        safe_log_error(codes::system::INTERNAL_ERROR, "fallback path");
    }

    #[test]
    fn test_init_with_service_once() {
        // Tests share one process; whichever runs first installs the logger,
        // the second attempt must fail cleanly.
        let (service, _memory) = service::create_test_logger();
        let first = init_global_logging_with_service(Arc::new(service));
        let (service, _memory) = service::create_test_logger();
        let second = init_global_logging_with_service(Arc::new(service));
        assert!(first.is_ok() || second.is_err());
        assert!(is_initialized());
    }
}
