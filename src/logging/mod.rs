//! Logging for wsbackup
//!
//! Every component receives a [`Logger`] by reference instead of reaching for
//! a process-wide logger. The logger neutralizes control characters before a
//! message reaches its [`LogSink`], so file names and tool output cannot forge
//! extra log lines.
//!
//! The binary wires the logger to [`TracingSink`] after calling
//! [`init_tracing`] once at startup; tests use [`MemorySink`] to inspect what
//! was emitted.

mod sanitize;
mod sink;
mod subscriber;

pub use sanitize::sanitize_log_input;
pub use sink::{LogSink, Logger, MemorySink, TracingSink};
pub use subscriber::init_tracing;
