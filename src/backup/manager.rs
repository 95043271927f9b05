//! Backup manager for wsbackup
//!
//! Runs one backup end to end: scan the workspace, archive the file set, then
//! prune old archives. Errors after path validation are logged and reported
//! as a failed run.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Local;

use super::retention::{list_archives, PruneReport, RetentionPruner};
use crate::archive::{
    ArchiveOptions, ArchiveRecord, ArchiverStrategy, ProcessRunner, SystemProcessRunner,
    ToolDiscovery,
};
use crate::config::paths::BackupPaths;
use crate::config::settings::Settings;
use crate::display::{format_elapsed, format_megabytes};
use crate::error::{BackupError, BackupResult};
use crate::logging::Logger;
use crate::scan::{ExclusionFilter, FileEnumerator};

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The archive written by this run
    pub archive: ArchiveRecord,
    /// Number of files archived
    pub file_count: usize,
    /// Total size of the source files in bytes
    pub source_bytes: u64,
    /// Retention result
    pub pruned: PruneReport,
    /// Wall time of the run
    pub elapsed: Duration,
}

/// Manages backup creation and retention for one workspace
pub struct BackupManager {
    paths: BackupPaths,
    settings: Settings,
    log: Logger,
    discovery: ToolDiscovery,
    runner: Box<dyn ProcessRunner>,
}

impl BackupManager {
    /// Create a manager that discovers the archiver from `settings`
    pub fn new(paths: BackupPaths, settings: Settings, log: Logger) -> Self {
        let discovery = ToolDiscovery::from_settings(&settings);
        Self {
            paths,
            settings,
            log,
            discovery,
            runner: Box::new(SystemProcessRunner),
        }
    }

    /// Replace archiver discovery
    pub fn with_discovery(mut self, discovery: ToolDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    /// Replace the process runner used for the external archiver
    pub fn with_runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Archive name prefix for this workspace
    pub fn project_name(&self) -> String {
        self.settings
            .project_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.paths.root().name())
    }

    /// Run a full backup, logging any failure
    ///
    /// Returns the report on success and `None` on failure.
    pub fn run(&self) -> Option<RunReport> {
        let started = Instant::now();
        self.log.info("==================================================");
        self.log.info(format!("Backup started: {}", self.project_name()));

        let result = self.create_backup(started);

        match &result {
            Ok(report) => {
                self.log.info(format!("Backup completed: {}", report.archive.filename));
            }
            Err(e) => {
                self.log.error(format!("Backup failed: {}", e));
            }
        }
        self.log
            .info(format!("Elapsed time: {}", format_elapsed(started.elapsed())));
        self.log.info("==================================================");

        result.ok()
    }

    /// Scan, archive and prune, propagating the first fatal error
    fn create_backup(&self, started: Instant) -> BackupResult<RunReport> {
        let root = self.paths.root();
        let backup_dir = self.paths.backup_dir();
        self.paths.ensure_backup_dir()?;

        let filter = ExclusionFilter::new(self.settings.exclusion_rules(), root, backup_dir);
        let files = FileEnumerator::new(root, &filter, &self.log).enumerate();
        if files.is_empty() {
            self.log.warn("No files to back up");
        }

        let options = ArchiveOptions {
            timeout: self.settings.timeout(),
            progress_interval: self.settings.progress_interval,
        };
        let stamp = Local::now().naive_local();
        let archive = ArchiverStrategy::new(&self.discovery, self.runner.as_ref(), options, &self.log)
            .run(root, &files, backup_dir, &self.project_name(), &stamp)?;

        self.log.info(format!(
            "Archive size: {} MB ({} MB source)",
            format_megabytes(archive.size_bytes),
            format_megabytes(files.total_bytes)
        ));

        let pruned = self.enforce_retention();

        Ok(RunReport {
            archive,
            file_count: files.len(),
            source_bytes: files.total_bytes,
            pruned,
            elapsed: started.elapsed(),
        })
    }

    /// Delete archives beyond the configured keep count
    pub fn enforce_retention(&self) -> PruneReport {
        let report = RetentionPruner::new(&self.log).prune(self.backup_dir(), self.settings.keep_count);
        if !report.deleted.is_empty() {
            self.log.info(format!(
                "Retention: kept {}, deleted {}",
                report.kept,
                report.deleted.len()
            ));
        }
        report
    }

    /// Archives that `enforce_retention` would delete
    pub fn prune_candidates(&self) -> BackupResult<Vec<ArchiveRecord>> {
        RetentionPruner::new(&self.log).preview(self.backup_dir(), self.settings.keep_count)
    }

    /// List all archives, newest first
    pub fn list_backups(&self) -> BackupResult<Vec<ArchiveRecord>> {
        list_archives(self.backup_dir())
    }

    /// Get backup directory path
    pub fn backup_dir(&self) -> &Path {
        self.paths.backup_dir()
    }

    /// Get a specific archive by filename
    pub fn get_backup(&self, filename: &str) -> BackupResult<ArchiveRecord> {
        let path = self.backup_dir().join(filename);
        if filename.contains(['/', '\\']) || !path.is_file() {
            return Err(BackupError::backup_not_found(filename));
        }
        ArchiveRecord::from_path(&path)
    }

    /// Get the most recent archive
    pub fn get_latest_backup(&self) -> BackupResult<Option<ArchiveRecord>> {
        Ok(self.list_backups()?.into_iter().next())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{CommandSpec, FixedProbe, ProcessOutcome};
    use crate::scan::WorkspaceRoot;
    use std::collections::BTreeSet;
    use std::fs::{self, File};
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct FailingRunner;

    impl ProcessRunner for FailingRunner {
        fn run(&self, _spec: &CommandSpec, _timeout: Duration) -> BackupResult<ProcessOutcome> {
            Ok(ProcessOutcome::Completed {
                code: Some(3),
                stdout: String::new(),
                stderr: "write error".into(),
            })
        }
    }

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn create_test_manager(settings: Settings) -> (BackupManager, TempDir, Logger) {
        let temp_dir = TempDir::new().unwrap();
        let ws = temp_dir.path();
        write(ws, "README.md", "# demo");
        write(ws, "src/app.py", "print('app')");
        write(ws, "src/app.pyc", "bytecode");
        write(ws, "node_modules/pkg/index.js", "module.exports = 1");
        write(ws, "data/big.duckdb", "db");
        write(ws, "backup/old_backup_20200101_000000.zip", "stale");
        let stale = ws.join("backup").join("old_backup_20200101_000000.zip");
        filetime::set_file_mtime(&stale, filetime::FileTime::from_unix_time(1_577_836_800, 0)).unwrap();

        let root = WorkspaceRoot::validate(ws).unwrap();
        let paths = BackupPaths::new(root, &settings);
        let log = Logger::memory().0;
        let manager = BackupManager::new(paths, settings, log.clone()).with_discovery(ToolDiscovery::none());
        (manager, temp_dir, log)
    }

    fn zip_entries(path: &Path) -> BTreeSet<String> {
        let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_run_with_fallback() {
        let settings = Settings {
            project_name: Some("demo".into()),
            ..Settings::default()
        };
        let (manager, _temp, _log) = create_test_manager(settings);

        let report = manager.run().unwrap();

        assert!(report.archive.filename.starts_with("demo_backup_"));
        assert!(report.archive.filename.ends_with(".zip"));
        assert_eq!(report.file_count, 2);
        let expected: BTreeSet<String> = ["README.md", "src/app.py"].iter().map(|s| s.to_string()).collect();
        assert_eq!(zip_entries(&report.archive.path), expected);
    }

    #[test]
    fn test_backup_dir_not_included_even_without_exclusions() {
        let settings = Settings {
            excluded_dirs: Vec::new(),
            excluded_extensions: Vec::new(),
            ..Settings::default()
        };
        let (manager, _temp, _log) = create_test_manager(settings);

        let report = manager.run().unwrap();

        let entries = zip_entries(&report.archive.path);
        assert!(entries.contains("node_modules/pkg/index.js"));
        assert!(entries.iter().all(|e| !e.starts_with("backup/")));
    }

    #[test]
    fn test_default_project_name_is_root_name() {
        let (manager, temp, _log) = create_test_manager(Settings::default());
        let expected = temp
            .path()
            .canonicalize()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert_eq!(manager.project_name(), expected);
    }

    #[test]
    fn test_primary_failure_fails_run_without_zip() {
        let (manager, _temp, _log) = create_test_manager(Settings::default());
        let manager = manager
            .with_discovery(ToolDiscovery::none().with_probe(FixedProbe(Some(PathBuf::from("/usr/bin/rar")))))
            .with_runner(FailingRunner);

        assert!(manager.run().is_none());

        let names: Vec<String> = manager
            .list_backups()
            .unwrap()
            .into_iter()
            .map(|r| r.filename)
            .collect();
        assert_eq!(names, vec!["old_backup_20200101_000000.zip"]);
    }

    #[test]
    fn test_failure_is_logged() {
        let (manager, _temp, _) = create_test_manager(Settings::default());
        let (log, sink) = Logger::memory();
        let manager = BackupManager {
            log,
            ..manager
        }
        .with_discovery(ToolDiscovery::none().with_probe(FixedProbe(Some(PathBuf::from("/usr/bin/rar")))))
        .with_runner(FailingRunner);

        assert!(manager.run().is_none());
        assert!(sink.contains("Backup failed"));
        assert!(sink.contains("Elapsed time"));
    }

    #[test]
    fn test_retention_after_run() {
        let settings = Settings {
            keep_count: 1,
            ..Settings::default()
        };
        let (manager, _temp, _log) = create_test_manager(settings);

        let report = manager.run().unwrap();

        assert_eq!(report.pruned.deleted.len(), 1);
        let remaining = manager.list_backups().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].filename, report.archive.filename);
    }

    #[test]
    fn test_get_backup() {
        let (manager, _temp, _log) = create_test_manager(Settings::default());

        let record = manager.get_backup("old_backup_20200101_000000.zip").unwrap();
        assert_eq!(record.size_bytes, 5);

        assert!(manager.get_backup("missing.zip").unwrap_err().is_not_found());
        assert!(manager.get_backup("../README.md").unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_latest_backup() {
        let (manager, _temp, _log) = create_test_manager(Settings::default());

        let report = manager.run().unwrap();
        let latest = manager.get_latest_backup().unwrap().unwrap();
        assert_eq!(latest.filename, report.archive.filename);
    }
}
