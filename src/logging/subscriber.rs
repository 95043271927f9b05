//! Process-wide tracing subscriber setup
//!
//! Called once from the binary. Output goes to stdout and, when a log file is
//! configured, is appended to that file without ANSI colors.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{BackupError, BackupResult};

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the `verbose` default of `debug`/`info`.
pub fn init_tracing(log_file: Option<&Path>, verbose: bool) -> BackupResult<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    BackupError::Io(format!("Failed to create log directory: {}", e))
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| BackupError::Io(format!("Failed to open log file: {}", e)))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .map_err(|e| BackupError::Config(format!("Failed to initialize logging: {}", e)))
}
