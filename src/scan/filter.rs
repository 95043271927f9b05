//! Exclusion rules for workspace scans
//!
//! Directories are matched by exact name against every segment of their
//! workspace-relative path. Files are matched by name suffix, which lets
//! multi-part extensions such as `.duckdb.wal` work. Names are compared as
//! raw OS strings, so entries that are not valid UTF-8 are still matched.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::guard::WorkspaceRoot;

/// Directory names excluded when no settings override them
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".venv",
    ".venv311",
    "data",
    "logs",
    "node_modules",
    "__pycache__",
    ".git",
];

/// File suffixes excluded when no settings override them
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    ".pyc",
    ".pyo",
    ".pyd",
    ".rar",
    ".zip",
    ".duckdb",
    ".duckdb.wal",
    ".so",
    ".dll",
    ".exe",
];

/// Directory-name and extension denylists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRules {
    dir_names: BTreeSet<String>,
    extensions: BTreeSet<String>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()),
            DEFAULT_EXCLUDED_EXTENSIONS.iter().map(|s| s.to_string()),
        )
    }
}

impl ExclusionRules {
    /// Build rules from name and extension lists
    ///
    /// Empty entries are dropped.
    pub fn new(
        dir_names: impl IntoIterator<Item = String>,
        extensions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            dir_names: dir_names.into_iter().filter(|d| !d.is_empty()).collect(),
            extensions: extensions.into_iter().filter(|e| !e.is_empty()).collect(),
        }
    }

    /// Rules that exclude nothing
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn dir_names(&self) -> &BTreeSet<String> {
        &self.dir_names
    }

    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    /// Check a single directory name
    pub fn is_excluded_dir_name(&self, name: impl AsRef<OsStr>) -> bool {
        let name = name.as_ref();
        self.dir_names.iter().any(|d| OsStr::new(d) == name)
    }

    /// Check a file name against the extension suffixes
    pub fn is_excluded_file_name(&self, name: impl AsRef<OsStr>) -> bool {
        let name = name.as_ref().as_encoded_bytes();
        self.extensions.iter().any(|ext| name.ends_with(ext.as_bytes()))
    }
}

/// Decides whether a workspace entry is skipped
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    rules: ExclusionRules,
    root: PathBuf,
    reserved_dir: PathBuf,
}

impl ExclusionFilter {
    /// Create a filter for `root`, always excluding `reserved_dir`
    pub fn new(rules: ExclusionRules, root: &WorkspaceRoot, reserved_dir: impl Into<PathBuf>) -> Self {
        Self {
            rules,
            root: root.path().to_path_buf(),
            reserved_dir: reserved_dir.into(),
        }
    }

    pub fn rules(&self) -> &ExclusionRules {
        &self.rules
    }

    /// The backup output directory, never scanned
    pub fn reserved_dir(&self) -> &Path {
        &self.reserved_dir
    }

    /// Check if `path` (absolute, under the root) should be skipped
    pub fn should_exclude(&self, path: &Path, is_dir: bool) -> bool {
        if path.starts_with(&self.reserved_dir) {
            return true;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let segments: Vec<&OsStr> = relative.components().map(|c| c.as_os_str()).collect();

        if is_dir {
            return segments.iter().any(|s| self.rules.is_excluded_dir_name(s));
        }

        let (name, parents) = match segments.split_last() {
            Some(split) => split,
            None => return false,
        };
        parents.iter().any(|s| self.rules.is_excluded_dir_name(s))
            || self.rules.is_excluded_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn filter_for(temp_dir: &TempDir) -> (ExclusionFilter, PathBuf) {
        let root = WorkspaceRoot::validate(temp_dir.path()).unwrap();
        let backup = root.path().join("backup");
        let filter = ExclusionFilter::new(ExclusionRules::default(), &root, &backup);
        (filter, root.path().to_path_buf())
    }

    #[test]
    fn test_excluded_directory_names() {
        let temp_dir = TempDir::new().unwrap();
        let (filter, root) = filter_for(&temp_dir);

        assert!(filter.should_exclude(&root.join("node_modules"), true));
        assert!(filter.should_exclude(&root.join(".git"), true));
        assert!(filter.should_exclude(&root.join("src").join("__pycache__"), true));
        assert!(!filter.should_exclude(&root.join("src"), true));
        assert!(!filter.should_exclude(&root.join("database"), true));
    }

    #[test]
    fn test_deep_segment_excludes_descendants() {
        let temp_dir = TempDir::new().unwrap();
        let (filter, root) = filter_for(&temp_dir);

        let deep = root.join("app").join(".venv").join("lib").join("site");
        assert!(filter.should_exclude(&deep, true));
        assert!(filter.should_exclude(&deep.join("module.py"), false));
    }

    #[test]
    fn test_reserved_backup_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = WorkspaceRoot::validate(temp_dir.path()).unwrap();
        let backup = root.path().join("backup");
        let filter = ExclusionFilter::new(ExclusionRules::empty(), &root, &backup);

        assert!(filter.should_exclude(&backup, true));
        assert!(filter.should_exclude(&backup.join("old.txt"), false));
        assert!(!filter.should_exclude(&root.path().join("backups"), true));
    }

    #[test]
    fn test_excluded_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let (filter, root) = filter_for(&temp_dir);

        assert!(filter.should_exclude(&root.join("mod.pyc"), false));
        assert!(filter.should_exclude(&root.join("lib").join("native.dll"), false));
        assert!(filter.should_exclude(&root.join("store.duckdb"), false));
        assert!(filter.should_exclude(&root.join("store.duckdb.wal"), false));
        assert!(!filter.should_exclude(&root.join("main.py"), false));
        assert!(!filter.should_exclude(&root.join("README.md"), false));
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        let temp_dir = TempDir::new().unwrap();
        let (filter, root) = filter_for(&temp_dir);

        assert!(!filter.should_exclude(&root.join("SETUP.EXE"), false));
        assert!(filter.should_exclude(&root.join("setup.exe"), false));
    }

    #[test]
    fn test_directory_named_like_extension_not_excluded() {
        let temp_dir = TempDir::new().unwrap();
        let (filter, root) = filter_for(&temp_dir);

        assert!(!filter.should_exclude(&root.join("assets.dll"), true));
    }

    #[test]
    fn test_root_ancestors_do_not_count() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("data").join("project");
        std::fs::create_dir_all(&project).unwrap();
        let root = WorkspaceRoot::validate(&project).unwrap();
        let filter = ExclusionFilter::new(ExclusionRules::default(), &root, root.path().join("backup"));

        assert!(!filter.should_exclude(&root.path().join("main.py"), false));
        assert!(!filter.should_exclude(&root.path().join("src"), true));
    }

    #[test]
    fn test_empty_entries_dropped() {
        let rules = ExclusionRules::new(vec![String::new()], vec![String::new()]);
        assert!(rules.dir_names().is_empty());
        assert!(!rules.is_excluded_file_name("anything.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_still_matched() {
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let (filter, root) = filter_for(&temp_dir);

        let bytecode = root.join(OsStr::from_bytes(b"\xffmod.pyc"));
        assert!(filter.should_exclude(&bytecode, false));

        let odd_dir = root.join(OsStr::from_bytes(b"caf\xe9"));
        assert!(!filter.should_exclude(&odd_dir, true));
        assert!(filter.should_exclude(&odd_dir.join("node_modules"), true));
        assert!(filter.should_exclude(&odd_dir.join("lib.so"), false));
        let vendored = root.join("node_modules").join(OsStr::from_bytes(b"\xfe.js"));
        assert!(filter.should_exclude(&vendored, false));
        let notes = odd_dir.join(OsStr::from_bytes(b"\xfenotes.txt"));
        assert!(!filter.should_exclude(&notes, false));
    }
}
