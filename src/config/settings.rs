//! User settings for wsbackup
//!
//! Manages exclusion sets, retention, archiver discovery and timeouts. Every
//! field has a default so partial settings files stay valid.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::ConfigPaths;
use crate::error::BackupError;
use crate::scan::filter::{DEFAULT_EXCLUDED_DIRS, DEFAULT_EXCLUDED_EXTENSIONS};
use crate::scan::ExclusionRules;

/// User settings for wsbackup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Archive name prefix; defaults to the workspace directory name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// Name of the output directory inside the workspace
    #[serde(default = "default_backup_dir_name")]
    pub backup_dir_name: String,

    /// Directory names skipped anywhere in the tree
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// File name suffixes skipped (case-sensitive, leading dot included)
    #[serde(default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,

    /// Number of most recent archives to keep
    #[serde(default = "default_keep_count")]
    pub keep_count: usize,

    /// Timeout for the external archiver in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Report fallback progress every this many files
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Executable names searched on the process search path
    #[serde(default = "default_primary_tool_names")]
    pub primary_tool_names: Vec<String>,

    /// Well-known install locations probed after the search path
    #[serde(default = "default_known_tool_paths")]
    pub known_tool_paths: Vec<PathBuf>,

    /// Whether runs also append to `<workspace>/logs/system.log`
    #[serde(default = "default_log_to_file")]
    pub log_to_file: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_backup_dir_name() -> String {
    "backup".to_string()
}

fn default_excluded_dirs() -> Vec<String> {
    DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
}

fn default_excluded_extensions() -> Vec<String> {
    DEFAULT_EXCLUDED_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_keep_count() -> usize {
    crate::backup::DEFAULT_KEEP_COUNT
}

fn default_timeout_secs() -> u64 {
    3600
}

fn default_progress_interval() -> usize {
    100
}

fn default_primary_tool_names() -> Vec<String> {
    vec!["rar".to_string(), "winrar".to_string()]
}

#[cfg(windows)]
fn default_known_tool_paths() -> Vec<PathBuf> {
    [
        r"C:\Program Files\WinRAR\WinRAR.exe",
        r"C:\Program Files (x86)\WinRAR\WinRAR.exe",
        r"C:\Program Files\WinRAR\Rar.exe",
        r"C:\Program Files (x86)\WinRAR\Rar.exe",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

#[cfg(not(windows))]
fn default_known_tool_paths() -> Vec<PathBuf> {
    ["/usr/bin/rar", "/usr/local/bin/rar", "/opt/homebrew/bin/rar"]
        .iter()
        .map(PathBuf::from)
        .collect()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            project_name: None,
            backup_dir_name: default_backup_dir_name(),
            excluded_dirs: default_excluded_dirs(),
            excluded_extensions: default_excluded_extensions(),
            keep_count: default_keep_count(),
            timeout_secs: default_timeout_secs(),
            progress_interval: default_progress_interval(),
            primary_tool_names: default_primary_tool_names(),
            known_tool_paths: default_known_tool_paths(),
            log_to_file: default_log_to_file(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_or_create(paths: &ConfigPaths) -> Result<Self, BackupError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                BackupError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                BackupError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ConfigPaths) -> Result<(), BackupError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            BackupError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| BackupError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject values that would make a run meaningless or unsafe
    pub fn validate(&self) -> Result<(), BackupError> {
        let name = self.backup_dir_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(BackupError::Config(format!(
                "backup_dir_name must be a single directory name, got '{}'",
                self.backup_dir_name
            )));
        }
        if self.timeout_secs == 0 {
            return Err(BackupError::Config("timeout_secs must be positive".into()));
        }
        if self.progress_interval == 0 {
            return Err(BackupError::Config("progress_interval must be positive".into()));
        }
        Ok(())
    }

    /// Exclusion sets as configured
    pub fn exclusion_rules(&self) -> ExclusionRules {
        ExclusionRules::new(
            self.excluded_dirs.iter().cloned(),
            self.excluded_extensions.iter().cloned(),
        )
    }

    /// Archiver timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
