//! Custom error types for wsbackup
//!
//! This module defines the error hierarchy for the backup run using thiserror
//! for ergonomic error definitions.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The main error type for backup operations
#[derive(Error, Debug)]
pub enum BackupError {
    /// The workspace root is unsafe or cannot be resolved
    #[error("Invalid workspace path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Archive writing errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// The external archiver exited unsuccessfully
    #[error("Archiver exited with {}: {stderr}", describe_code(.code))]
    ToolFailed { code: Option<i32>, stderr: String },

    /// The external archiver did not finish in time
    #[error("Archiver timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The archiver reported success but produced no file
    #[error("Archive file not found after run: {}", .0.display())]
    MissingOutput(PathBuf),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code".to_string(),
    }
}

impl BackupError {
    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a "not found" error for backup archives
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Check if this error must abort the run before any filesystem work
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidPath { .. } | Self::Config(_))
    }

    /// Check if this error is an archiver failure the run can report and survive
    pub fn is_archive_failure(&self) -> bool {
        matches!(
            self,
            Self::Archive(_) | Self::ToolFailed { .. } | Self::Timeout(_) | Self::MissingOutput(_)
        )
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<zip::result::ZipError> for BackupError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

/// Result type alias for backup operations
pub type BackupResult<T> = Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackupError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_invalid_path_is_configuration() {
        let err = BackupError::invalid_path("../etc", "contains a parent-directory segment");
        assert_eq!(
            err.to_string(),
            "Invalid workspace path '../etc': contains a parent-directory segment"
        );
        assert!(err.is_configuration());
        assert!(!err.is_archive_failure());
    }

    #[test]
    fn test_tool_failed_display() {
        let err = BackupError::ToolFailed {
            code: Some(3),
            stderr: "bad switch".into(),
        };
        assert_eq!(err.to_string(), "Archiver exited with code 3: bad switch");
        assert!(err.is_archive_failure());

        let err = BackupError::ToolFailed {
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("no exit code"));
    }

    #[test]
    fn test_timeout_display() {
        let err = BackupError::Timeout(Duration::from_secs(3600));
        assert_eq!(err.to_string(), "Archiver timed out after 3600s");
    }

    #[test]
    fn test_not_found_error() {
        let err = BackupError::backup_not_found("latest");
        assert_eq!(err.to_string(), "Backup not found: latest");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BackupError = io_err.into();
        assert!(matches!(err, BackupError::Io(_)));
    }
}
