//! Retention pruning
//!
//! Keeps the newest `keep_count` archives in the backup directory, ordered by
//! modification time. Everything else with a recognized archive extension is
//! deleted. Pruning is best effort and never fails a run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::archive::{ArchiveFormat, ArchiveRecord};
use crate::error::{BackupError, BackupResult};
use crate::logging::Logger;

/// Default number of archives kept
pub const DEFAULT_KEEP_COUNT: usize = 250;

/// Outcome of a pruning pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Archives left in place
    pub kept: usize,
    /// Archives removed
    pub deleted: Vec<PathBuf>,
    /// Archives that could not be removed
    pub failed: Vec<PathBuf>,
}

/// Deletes archives beyond the retention limit
pub struct RetentionPruner<'a> {
    log: &'a Logger,
}

impl<'a> RetentionPruner<'a> {
    pub fn new(log: &'a Logger) -> Self {
        Self { log }
    }

    /// Delete all but the newest `keep_count` archives in `backup_dir`
    pub fn prune(&self, backup_dir: &Path, keep_count: usize) -> PruneReport {
        let archives = match list_archives(backup_dir) {
            Ok(archives) => archives,
            Err(e) => {
                self.log.warn(format!("Retention skipped: {}", e));
                return PruneReport::default();
            }
        };

        if archives.len() <= keep_count {
            return PruneReport {
                kept: archives.len(),
                ..PruneReport::default()
            };
        }

        let mut report = PruneReport {
            kept: keep_count,
            ..PruneReport::default()
        };
        for archive in archives.into_iter().skip(keep_count) {
            match fs::remove_file(&archive.path) {
                Ok(()) => {
                    self.log.info(format!("Old backup deleted: {}", archive.filename));
                    report.deleted.push(archive.path);
                }
                Err(e) => {
                    self.log
                        .warn(format!("Failed to delete {}: {}", archive.filename, e));
                    report.failed.push(archive.path);
                }
            }
        }
        report
    }

    /// Archives that `prune` would delete, without touching them
    pub fn preview(&self, backup_dir: &Path, keep_count: usize) -> BackupResult<Vec<ArchiveRecord>> {
        Ok(list_archives(backup_dir)?.into_iter().skip(keep_count).collect())
    }
}

/// Archives directly inside `backup_dir`, newest first
///
/// A missing directory has no archives.
pub fn list_archives(backup_dir: &Path) -> BackupResult<Vec<ArchiveRecord>> {
    if !backup_dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(backup_dir).map_err(|e| {
        BackupError::Io(format!("Failed to read backup directory: {}", e))
    })?;

    let mut archives = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            BackupError::Io(format!("Failed to read directory entry: {}", e))
        })?;

        let path = entry.path();
        if ArchiveFormat::from_path(&path).is_none() {
            continue;
        }
        // One stat per entry from the same scan
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let modified: DateTime<Local> = match metadata.modified() {
            Ok(time) => time.into(),
            Err(_) => continue,
        };
        archives.push(ArchiveRecord::from_parts(&path, metadata.len(), modified));
    }

    archives.sort_by(|a, b| b.modified.cmp(&a.modified));
    Ok(archives)
}
