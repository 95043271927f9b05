//! Injectable log sinks
//!
//! [`Logger`] is the handle passed to components. It is cheap to clone and
//! sanitizes each message exactly once before emitting it.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::Level;

use super::sanitize::sanitize_log_input;

/// Destination for leveled log messages
pub trait LogSink: Send + Sync {
    /// Emit an already sanitized message
    fn emit(&self, level: Level, message: &str);
}

/// Forwards messages to the `tracing` subscriber installed by the binary
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{}", message),
            Level::WARN => tracing::warn!("{}", message),
            Level::INFO => tracing::info!("{}", message),
            Level::DEBUG => tracing::debug!("{}", message),
            _ => tracing::trace!("{}", message),
        }
    }
}

/// Records messages in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages in emission order
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Recorded messages at the given level
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    /// Check if any recorded message contains the given text
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|(_, message)| message.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn emit(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

/// Sanitizing handle to a [`LogSink`]
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::tracing()
    }
}

impl Logger {
    /// Create a logger writing to the given sink
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Create a logger backed by the `tracing` subscriber
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingSink))
    }

    /// Create a logger recording into memory, returning the sink for inspection
    pub fn memory() -> (Self, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Self::new(sink.clone()), sink)
    }

    /// Sanitize and emit a message at the given level
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        let text = sanitize_log_input(&message.to_string());
        self.sink.emit(level, &text);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::DEBUG, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::INFO, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::WARN, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::ERROR, message);
    }
}
