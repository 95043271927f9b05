//! CLI command handlers
//!
//! Bridges clap argument parsing with the backup manager.

pub mod backup;

pub use backup::{handle_backup_command, BackupCommands, RunArgs};
