//! Archiver selection
//!
//! Discovery decides the route once per run. A primary tool that is found
//! but fails ends the run as a failure; the fallback is not attempted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDateTime;

use super::discovery::ToolDiscovery;
use super::fallback::ZipFallback;
use super::format::{unique_archive_path, ArchiveFormat};
use super::primary::PrimaryArchiver;
use super::process::ProcessRunner;
use super::record::ArchiveRecord;
use crate::error::BackupResult;
use crate::logging::Logger;
use crate::scan::{FileSet, WorkspaceRoot};

/// Which archiver a run used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveRoute {
    /// External tool at the given path
    Primary(PathBuf),
    /// Built-in ZIP writer
    Fallback,
}

impl ArchiveRoute {
    pub fn format(&self) -> ArchiveFormat {
        match self {
            Self::Primary(_) => ArchiveFormat::Rar,
            Self::Fallback => ArchiveFormat::Zip,
        }
    }
}

/// Tunables for an archiving attempt
#[derive(Debug, Clone, Copy)]
pub struct ArchiveOptions {
    pub timeout: Duration,
    pub progress_interval: usize,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3600),
            progress_interval: 100,
        }
    }
}

/// Picks and runs an archiver
pub struct ArchiverStrategy<'a> {
    discovery: &'a ToolDiscovery,
    runner: &'a dyn ProcessRunner,
    options: ArchiveOptions,
    log: &'a Logger,
}

impl<'a> ArchiverStrategy<'a> {
    pub fn new(
        discovery: &'a ToolDiscovery,
        runner: &'a dyn ProcessRunner,
        options: ArchiveOptions,
        log: &'a Logger,
    ) -> Self {
        Self {
            discovery,
            runner,
            options,
            log,
        }
    }

    /// Decide between the external tool and the fallback
    pub fn select(&self) -> ArchiveRoute {
        match self.discovery.discover(self.log) {
            Some(tool) => ArchiveRoute::Primary(tool),
            None => {
                self.log.warn("Primary archiver not found, using ZIP fallback");
                ArchiveRoute::Fallback
            }
        }
    }

    /// Archive `files` into a new timestamped file in `output_dir`
    pub fn run(
        &self,
        root: &WorkspaceRoot,
        files: &FileSet,
        output_dir: &Path,
        project: &str,
        stamp: &NaiveDateTime,
    ) -> BackupResult<ArchiveRecord> {
        let route = self.select();
        let target = unique_archive_path(output_dir, project, stamp, route.format());
        self.log.info(format!("Creating backup: {}", target.display()));

        match &route {
            ArchiveRoute::Primary(tool) => {
                PrimaryArchiver::new(tool, self.runner, self.options.timeout, self.log)
                    .create(root, files, &target)?;
            }
            ArchiveRoute::Fallback => {
                ZipFallback::new(self.options.progress_interval, self.log).create(files, &target)?;
            }
        }

        ArchiveRecord::from_path(&target)
    }
}
