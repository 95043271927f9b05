//! Metadata about a produced archive

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::format::{parse_archive_timestamp, ArchiveFormat};
use crate::error::{BackupError, BackupResult};

/// One archive file in the backup directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRecord {
    /// Archive filename
    pub filename: String,
    /// Full path to the archive
    pub path: PathBuf,
    /// Size in bytes
    pub size_bytes: u64,
    /// Last modification time, used for retention ordering
    pub modified: DateTime<Local>,
    /// Timestamp token from the filename, if it has one
    pub created_at: Option<NaiveDateTime>,
}

impl ArchiveRecord {
    /// Read the record for an existing archive file
    pub fn from_path(path: &Path) -> BackupResult<Self> {
        let metadata = fs::metadata(path)
            .map_err(|e| BackupError::Io(format!("Failed to stat {}: {}", path.display(), e)))?;
        let modified = metadata
            .modified()
            .map_err(|e| BackupError::Io(format!("No modification time for {}: {}", path.display(), e)))?;

        Ok(Self::from_parts(path, metadata.len(), modified.into()))
    }

    pub(crate) fn from_parts(path: &Path, size_bytes: u64, modified: DateTime<Local>) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let created_at = parse_archive_timestamp(&filename);

        Self {
            filename,
            path: path.to_path_buf(),
            size_bytes,
            modified,
            created_at,
        }
    }

    /// Format inferred from the extension
    pub fn format(&self) -> Option<ArchiveFormat> {
        ArchiveFormat::from_path(&self.path)
    }
}
