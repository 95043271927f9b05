//! Configuration module for wsbackup
//!
//! This module provides configuration management including:
//! - Settings file location
//! - Workspace, backup and log paths for a run
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::{BackupPaths, ConfigPaths};
pub use settings::Settings;
