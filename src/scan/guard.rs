//! Workspace root validation
//!
//! A caller-supplied root is resolved once and rejected if it carries a
//! parent-directory segment or names a network share. Symlink tricks below the
//! root are not guarded against here.

use std::fmt;
use std::path::{Component, Path, PathBuf, Prefix};

use crate::error::{BackupError, BackupResult};

/// Canonical, validated workspace directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRoot {
    path: PathBuf,
}

impl WorkspaceRoot {
    /// Resolve and validate a workspace root
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::InvalidPath`] if the path contains `..`, is a
    /// UNC/network path, cannot be resolved, or is not a directory.
    pub fn validate(path: impl AsRef<Path>) -> BackupResult<Self> {
        let raw = path.as_ref();
        let shown = raw.display().to_string();

        if is_network_path(raw) {
            return Err(BackupError::invalid_path(shown, "network paths are not allowed"));
        }
        if has_parent_segment(raw) {
            return Err(BackupError::invalid_path(
                shown,
                "contains a parent-directory segment",
            ));
        }

        let resolved = raw
            .canonicalize()
            .map_err(|e| BackupError::invalid_path(shown.clone(), e.to_string()))?;

        if has_parent_segment(&resolved) || is_network_path(&resolved) {
            return Err(BackupError::invalid_path(shown, "resolves to an unsafe location"));
        }
        if !resolved.is_dir() {
            return Err(BackupError::invalid_path(shown, "not a directory"));
        }

        Ok(Self { path: resolved })
    }

    /// Get the canonical path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final component of the root, used as the default project name
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "workspace".to_string())
    }

    /// Workspace-relative form of `path` with `/` separators
    ///
    /// Returns `None` for paths outside the root and for paths with a
    /// component that is not valid UTF-8.
    pub fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.path).ok()?;
        let parts = rel
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<&str>>>()?;
        if parts.is_empty() {
            return None;
        }
        Some(parts.join("/"))
    }
}

impl AsRef<Path> for WorkspaceRoot {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for WorkspaceRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

fn has_parent_segment(path: &Path) -> bool {
    path.components().any(|c| matches!(c, Component::ParentDir))
}

fn is_network_path(path: &Path) -> bool {
    let text = path.to_string_lossy();
    let verbatim_local = text.starts_with(r"\\?\") || text.starts_with(r"\\.\");
    if (text.starts_with(r"\\") || text.starts_with("//")) && !verbatim_local {
        return true;
    }
    matches!(
        path.components().next(),
        Some(Component::Prefix(prefix))
            if matches!(prefix.kind(), Prefix::UNC(..) | Prefix::VerbatimUNC(..))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_valid_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = WorkspaceRoot::validate(temp_dir.path()).unwrap();

        assert!(root.path().is_absolute());
        assert_eq!(root.path(), temp_dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_parent_segment_rejected() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("project")).unwrap();
        let sneaky = temp_dir.path().join("project").join("..").join("project");

        let err = WorkspaceRoot::validate(&sneaky).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("parent-directory"));
    }

    #[test]
    fn test_network_paths_rejected() {
        for path in [r"\\fileserver\share\project", "//fileserver/share/project"] {
            let err = WorkspaceRoot::validate(path).unwrap_err();
            assert!(
                err.to_string().contains("network"),
                "expected network rejection for {}",
                path
            );
        }
    }

    #[test]
    fn test_missing_directory_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let err = WorkspaceRoot::validate(temp_dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, BackupError::InvalidPath { .. }));
    }

    #[test]
    fn test_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("notes.txt");
        std::fs::write(&file, "x").unwrap();

        let err = WorkspaceRoot::validate(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_relative_uses_forward_slashes() {
        let temp_dir = TempDir::new().unwrap();
        let root = WorkspaceRoot::validate(temp_dir.path()).unwrap();

        let nested = root.path().join("src").join("app").join("main.py");
        assert_eq!(root.relative(&nested).as_deref(), Some("src/app/main.py"));
        assert_eq!(root.relative(root.path()), None);
        assert_eq!(root.relative(Path::new("/somewhere/else.txt")), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let root = WorkspaceRoot::validate(temp_dir.path()).unwrap();

        let first = root.path().join(OsStr::from_bytes(b"\xffa.txt"));
        let second = root.path().join(OsStr::from_bytes(b"\xfea.txt"));
        assert_eq!(root.relative(&first), None);
        assert_eq!(root.relative(&second), None);
        let nested = root.path().join(OsStr::from_bytes(b"caf\xe9")).join("main.py");
        assert_eq!(root.relative(&nested), None);
    }

    #[test]
    fn test_name_is_last_component() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("movie-mcp-prototype");
        std::fs::create_dir(&project).unwrap();

        let root = WorkspaceRoot::validate(&project).unwrap();
        assert_eq!(root.name(), "movie-mcp-prototype");
    }
}
