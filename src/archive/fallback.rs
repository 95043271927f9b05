//! Built-in ZIP archiver
//!
//! Used when no external archiver is installed. The archive is written next to
//! its final location with a `.partial` suffix and renamed only once complete,
//! so a failed attempt never leaves a `.zip` behind.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::primary::remove_partial;
use crate::display::format_megabytes;
use crate::error::{BackupError, BackupResult};
use crate::logging::Logger;
use crate::scan::FileSet;

/// Writes ZIP archives directly
pub struct ZipFallback<'a> {
    progress_interval: usize,
    log: &'a Logger,
}

impl<'a> ZipFallback<'a> {
    pub fn new(progress_interval: usize, log: &'a Logger) -> Self {
        Self {
            progress_interval: progress_interval.max(1),
            log,
        }
    }

    /// Create `target` containing every entry of `files` under its relative path
    ///
    /// Files that cannot be read or added (such as a repeated entry name) are
    /// logged and skipped.
    pub fn create(&self, files: &FileSet, target: &Path) -> BackupResult<()> {
        self.log.info("Using ZIP fallback");

        let partial = partial_path(target);
        let written = self.write_archive(files, &partial).and_then(|skipped| {
            fs::rename(&partial, target).map_err(|e| {
                BackupError::Io(format!("Failed to finalize {}: {}", target.display(), e))
            })?;
            Ok(skipped)
        });

        match written {
            Ok(skipped) => {
                let size = fs::metadata(target).map(|m| m.len()).unwrap_or(0);
                if skipped > 0 {
                    self.log.warn(format!("{} file(s) skipped", skipped));
                }
                self.log
                    .info(format!("ZIP backup successful: {} MB", format_megabytes(size)));
                Ok(())
            }
            Err(e) => {
                remove_partial(&partial, self.log);
                remove_partial(target, self.log);
                Err(e)
            }
        }
    }

    /// Write all entries to `path`, returning the number of skipped files
    fn write_archive(&self, files: &FileSet, path: &Path) -> BackupResult<usize> {
        let file = File::create(path)
            .map_err(|e| BackupError::Io(format!("Failed to create {}: {}", path.display(), e)))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));

        let total = files.len();
        let mut skipped = 0;

        for (index, entry) in files.entries.iter().enumerate() {
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                // Maximum deflate level
                .compression_level(Some(9))
                .large_file(entry.size_bytes >= u64::from(u32::MAX));

            match File::open(&entry.source) {
                Ok(mut source) => {
                    if let Err(e) = zip.start_file(entry.relative_path.as_str(), options) {
                        self.log
                            .warn(format!("File skipped: {}: {}", entry.relative_path, e));
                        skipped += 1;
                    } else if let Err(e) = io::copy(&mut source, &mut zip) {
                        self.log
                            .warn(format!("File skipped: {}: {}", entry.relative_path, e));
                        zip.abort_file()?;
                        skipped += 1;
                    }
                }
                Err(e) => {
                    self.log
                        .warn(format!("File skipped: {}: {}", entry.relative_path, e));
                    skipped += 1;
                }
            }

            let done = index + 1;
            if done % self.progress_interval == 0 {
                let percent = done as f64 / total as f64 * 100.0;
                self.log
                    .info(format!("Progress: {:.1}% ({}/{})", percent, done, total));
            }
        }

        let mut writer = zip.finish()?;
        writer.flush()?;
        Ok(skipped)
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".partial");
    PathBuf::from(name)
}
