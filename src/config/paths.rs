//! Path management for wsbackup
//!
//! Two sets of paths are resolved here:
//!
//! - [`ConfigPaths`]: where the settings file lives
//! - [`BackupPaths`]: the workspace being backed up and its output locations
//!
//! ## Settings Resolution Order
//!
//! 1. `WSBACKUP_CONFIG_DIR` environment variable (if set)
//! 2. The platform config directory (`~/.config/workspace-backup` on Linux,
//!    `%APPDATA%\workspace-backup\config` on Windows)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::settings::Settings;
use crate::error::BackupError;
use crate::scan::WorkspaceRoot;

/// Environment variable overriding the settings directory
pub const CONFIG_DIR_ENV: &str = "WSBACKUP_CONFIG_DIR";

/// Locates the settings file
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    config_dir: PathBuf,
}

impl ConfigPaths {
    /// Create a new ConfigPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no platform config directory can be determined.
    pub fn new() -> Result<Self, BackupError> {
        let config_dir = if let Ok(custom) = std::env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "workspace-backup")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    BackupError::Config("Could not determine a config directory".into())
                })?
        };

        Ok(Self { config_dir })
    }

    /// Create ConfigPaths with a custom directory (useful for testing)
    pub fn with_base_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Use an explicit settings file; its parent becomes the config directory
    pub fn from_settings_file(file: &Path) -> Self {
        let config_dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { config_dir }
    }

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Ensure the config directory exists
    pub fn ensure_directories(&self) -> Result<(), BackupError> {
        std::fs::create_dir_all(&self.config_dir)
            .map_err(|e| BackupError::Io(format!("Failed to create config directory: {}", e)))
    }
}

/// Paths used by one backup run
#[derive(Debug, Clone)]
pub struct BackupPaths {
    root: WorkspaceRoot,
    backup_dir: PathBuf,
    log_file: PathBuf,
}

impl BackupPaths {
    /// Derive run paths from a validated workspace root
    pub fn new(root: WorkspaceRoot, settings: &Settings) -> Self {
        let backup_dir = root.path().join(&settings.backup_dir_name);
        let log_file = root.path().join("logs").join("system.log");
        Self {
            root,
            backup_dir,
            log_file,
        }
    }

    /// Get the workspace root
    pub fn root(&self) -> &WorkspaceRoot {
        &self.root
    }

    /// Get the backup output directory (`<workspace>/backup` by default)
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Get the run log file (`<workspace>/logs/system.log`)
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Create the backup directory if it is missing
    pub fn ensure_backup_dir(&self) -> Result<(), BackupError> {
        std::fs::create_dir_all(&self.backup_dir)
            .map_err(|e| BackupError::Io(format!("Failed to create backup directory: {}", e)))
    }
}
