//! Workspace file enumeration
//!
//! Walks the tree with `walkdir`, which keeps its own stack of open
//! directories, so very deep trees cannot exhaust the call stack. Excluded
//! directories are pruned before they are opened. Entries come back sorted by
//! name within each directory.

use std::fs;
use std::path::PathBuf;

use walkdir::{DirEntry, WalkDir};

use super::filter::ExclusionFilter;
use super::guard::WorkspaceRoot;
use crate::display::format_megabytes;
use crate::logging::Logger;

/// One file selected for backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFileEntry {
    /// Workspace-relative path with `/` separators
    pub relative_path: String,
    /// Absolute source path
    pub source: PathBuf,
    /// Size in bytes, 0 if it could not be read
    pub size_bytes: u64,
}

/// The result of one scan
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    pub entries: Vec<BackupFileEntry>,
    pub total_bytes: u64,
}

impl FileSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Relative paths of all entries
    pub fn relative_paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.relative_path.as_str())
    }

    fn push(&mut self, entry: BackupFileEntry) {
        self.total_bytes += entry.size_bytes;
        self.entries.push(entry);
    }
}

/// Collects the files of a workspace that survive the exclusion filter
pub struct FileEnumerator<'a> {
    root: &'a WorkspaceRoot,
    filter: &'a ExclusionFilter,
    log: &'a Logger,
}

impl<'a> FileEnumerator<'a> {
    /// Create an enumerator over `root`
    pub fn new(root: &'a WorkspaceRoot, filter: &'a ExclusionFilter, log: &'a Logger) -> Self {
        Self { root, filter, log }
    }

    /// Scan the workspace
    ///
    /// Unreadable directories and entries are logged and skipped, as are
    /// paths that are not valid UTF-8. Unreadable sizes count as 0.
    pub fn enumerate(&self) -> FileSet {
        self.log.info(format!("Scanning workspace: {}", self.root));

        let mut files = FileSet::default();
        let walker = WalkDir::new(self.root.path())
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.prune_dir(entry));

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    let location = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| self.root.to_string());
                    self.log.warn(format!("Failed to scan {}: {}", location, e));
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            if self.filter.should_exclude(path, false) {
                continue;
            }
            let Some(size_bytes) = self.file_size(&entry) else {
                continue;
            };
            let Some(relative_path) = self.root.relative(path) else {
                self.log
                    .warn(format!("Skipping non-UTF-8 path: {}", path.display()));
                continue;
            };

            files.push(BackupFileEntry {
                relative_path,
                source: entry.into_path(),
                size_bytes,
            });
        }

        self.log.info(format!(
            "Found {} files, total size: {} MB",
            files.len(),
            format_megabytes(files.total_bytes)
        ));
        files
    }

    /// True for directories the walk must not descend into
    fn prune_dir(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let path = entry.path();
        let skip = path == self.filter.reserved_dir() || self.filter.should_exclude(path, true);
        if skip {
            self.log.debug(format!("Directory excluded: {}", path.display()));
        }
        skip
    }

    /// Size of a regular file (or a symlink to one), `None` for anything else
    fn file_size(&self, entry: &DirEntry) -> Option<u64> {
        let file_type = entry.file_type();
        if file_type.is_file() {
            return Some(entry.metadata().map(|m| m.len()).unwrap_or(0));
        }
        if !file_type.is_symlink() {
            return None;
        }
        // Symlinked directories are never followed
        match fs::metadata(entry.path()) {
            Ok(target) if target.is_file() => Some(target.len()),
            Ok(_) => None,
            Err(e) => {
                self.log
                    .warn(format!("Skipping {}: {}", entry.path().display(), e));
                None
            }
        }
    }
}
