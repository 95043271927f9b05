//! External RAR archiver invocation

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::listing::FileListing;
use super::process::{CommandSpec, ProcessOutcome, ProcessRunner};
use crate::display::format_megabytes;
use crate::error::{BackupError, BackupResult};
use crate::logging::Logger;
use crate::scan::{FileSet, WorkspaceRoot};

/// Drives one attempt of the external archiver
pub struct PrimaryArchiver<'a> {
    tool: PathBuf,
    runner: &'a dyn ProcessRunner,
    timeout: Duration,
    log: &'a Logger,
}

impl<'a> PrimaryArchiver<'a> {
    pub fn new(
        tool: impl Into<PathBuf>,
        runner: &'a dyn ProcessRunner,
        timeout: Duration,
        log: &'a Logger,
    ) -> Self {
        Self {
            tool: tool.into(),
            runner,
            timeout,
            log,
        }
    }

    /// Command for archiving the files named in `listing` into `target`
    ///
    /// `a` adds, `-r` recurses, `-m5` is maximum compression and `@file`
    /// reads the file set from the listing.
    pub fn command(&self, root: &WorkspaceRoot, target: &Path, listing: &Path) -> CommandSpec {
        let mut list_arg = OsString::from("@");
        list_arg.push(listing.as_os_str());

        CommandSpec::new(&self.tool)
            .arg("a")
            .arg("-r")
            .arg("-m5")
            .arg(target.as_os_str())
            .arg(list_arg)
            .current_dir(root.path())
    }

    /// Create `target` from `files`
    ///
    /// Success requires exit code 0 and the archive present afterwards. On
    /// failure any partial archive at `target` is removed.
    pub fn create(&self, root: &WorkspaceRoot, files: &FileSet, target: &Path) -> BackupResult<()> {
        let listing = FileListing::create(root, &files.entries, self.log)?;
        self.log.info(format!(
            "Temporary file list: {} ({} entries)",
            listing.path().display(),
            listing.len()
        ));

        let spec = self.command(root, target, listing.path());
        self.log.info(format!("Running command: {}", spec.display_line()));

        let result = self.invoke(&spec, target);
        if result.is_err() {
            remove_partial(target, self.log);
        }
        result
    }

    fn invoke(&self, spec: &CommandSpec, target: &Path) -> BackupResult<()> {
        match self.runner.run(spec, self.timeout)? {
            ProcessOutcome::TimedOut => {
                self.log.error("Archiver process timed out");
                Err(BackupError::Timeout(self.timeout))
            }
            ProcessOutcome::Completed { code: Some(0), .. } => {
                let metadata = fs::metadata(target).map_err(|_| {
                    self.log.error("Backup file not found after archiver run");
                    BackupError::MissingOutput(target.to_path_buf())
                })?;
                self.log.info(format!(
                    "Backup successful: {}, size: {} MB",
                    target.display(),
                    format_megabytes(metadata.len())
                ));
                Ok(())
            }
            ProcessOutcome::Completed { code, stderr, .. } => {
                let shown = code.map_or_else(|| "none".to_string(), |c| c.to_string());
                self.log.error(format!("Archiver error (code: {})", shown));
                self.log.error(format!("Stderr: {}", stderr.trim()));
                Err(BackupError::ToolFailed {
                    code,
                    stderr: stderr.trim().to_string(),
                })
            }
        }
    }
}

/// Delete a partially written archive, if any
pub(crate) fn remove_partial(path: &Path, log: &Logger) {
    if !path.exists() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => log.warn(format!("Removed incomplete archive: {}", path.display())),
        Err(e) => log.warn(format!(
            "Failed to remove incomplete archive {}: {}",
            path.display(),
            e
        )),
    }
}
