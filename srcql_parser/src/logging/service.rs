//! Logging service and logger backends.
//!
//! `LoggingService` filters by level and hands events to a `Logger`
//! implementation. Backends never fail the caller: logging problems are
//! swallowed, parsing must not depend on whether a log line landed.

use crate::logging::codes::Code;
use crate::logging::config;
use crate::logging::events::{LogEvent, LogLevel};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level-filtering front end over one logger backend.
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        LoggingService {
            logger,
            min_level: config::get_min_log_level(),
        }
    }

    pub fn with_level(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        LoggingService { logger, min_level }
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn error(&self, code: Code, message: &str) {
        self.log_event(LogEvent::error(code, message));
    }

    pub fn info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// Human-readable output; errors go to stderr, the rest to stdout.
#[derive(Debug, Default)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.is_error() {
            eprintln!("{}", event.format());
        } else {
            println!("{}", event.format());
        }
    }
}

/// One JSON object per line on stdout.
#[derive(Debug, Default)]
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        println!("{}", event.format_json());
    }
}

/// Captures events for assertions in tests.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        MemoryLogger::default()
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.get_events()
            .into_iter()
            .filter(|event| event.is_error())
            .collect()
    }

    pub fn has_error_with_code(&self, code: &str) -> bool {
        self.get_errors()
            .iter()
            .any(|event| event.code.as_str() == code)
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        if let Ok(mut events) = self.events.lock() {
            // Bounded retention; oldest events are dropped first.
            if events.len() >= config::get_log_buffer_size() {
                events.remove(0);
            }
            events.push(event.clone());
        }
    }
}

/// Appends one formatted line per event; IO failures are ignored.
pub struct FileLogger {
    path: PathBuf,
}

impl FileLogger {
    pub fn new(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        File::create(path)?;
        Ok(FileLogger {
            path: path.to_path_buf(),
        })
    }
}

impl Logger for FileLogger {
    fn log(&self, event: &LogEvent) {
        if let Ok(mut file) = OpenOptions::new().append(true).open(&self.path) {
            let _ = writeln!(file, "{}", event.format());
        }
    }
}

/// Fans one event out to several backends.
#[derive(Default)]
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
}

impl MultiLogger {
    pub fn new() -> Self {
        MultiLogger::default()
    }

    pub fn add(mut self, logger: Arc<dyn Logger>) -> Self {
        self.loggers.push(logger);
        self
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        for logger in &self.loggers {
            logger.log(event);
        }
    }
}

/// Build the service the runtime preferences describe.
pub fn create_configured_service() -> LoggingService {
    let logger: Arc<dyn Logger> = if config::use_structured_logging() {
        Arc::new(StructuredLogger)
    } else {
        Arc::new(ConsoleLogger)
    };
    LoggingService::new(logger)
}

/// Memory-backed service for tests, with a handle to inspect events.
pub fn create_test_logger() -> (LoggingService, Arc<MemoryLogger>) {
    let memory = Arc::new(MemoryLogger::new());
    let service = LoggingService::with_level(memory.clone(), LogLevel::Debug);
    (service, memory)
}
