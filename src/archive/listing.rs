//! Temporary file-list for the external archiver
//!
//! The listing is a named temporary file holding one workspace-relative path
//! per line. It is deleted when the [`FileListing`] is dropped, whichever way
//! the archiver attempt ends.

use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{BackupError, BackupResult};
use crate::logging::Logger;
use crate::scan::{BackupFileEntry, WorkspaceRoot};

/// Scoped listing file
#[derive(Debug)]
pub struct FileListing {
    file: NamedTempFile,
    count: usize,
}

impl FileListing {
    /// Write the listing for `entries`
    ///
    /// Entries whose source lies outside `root` are dropped silently. Names
    /// containing a line break cannot be expressed one per line, so they are
    /// dropped with a warning.
    pub fn create(
        root: &WorkspaceRoot,
        entries: &[BackupFileEntry],
        log: &Logger,
    ) -> BackupResult<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("wsbackup-list-")
            .suffix(".txt")
            .tempfile()
            .map_err(|e| BackupError::Io(format!("Failed to create file list: {}", e)))?;

        let mut count = 0;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            for entry in entries {
                let Some(relative) = root.relative(&entry.source) else {
                    continue;
                };
                if relative.contains(['\n', '\r']) {
                    log.warn(format!("File skipped from list: {}", relative));
                    continue;
                }
                writeln!(writer, "{}", relative)?;
                count += 1;
            }
            writer.flush()?;
        }

        Ok(Self { file, count })
    }

    /// Location of the listing file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of paths written
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
