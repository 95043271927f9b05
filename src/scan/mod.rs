//! Workspace scanning
//!
//! Validates the workspace root, applies the exclusion rules and collects the
//! set of files that go into an archive.

pub mod enumerator;
pub mod filter;
pub mod guard;

pub use enumerator::{BackupFileEntry, FileEnumerator, FileSet};
pub use filter::{ExclusionFilter, ExclusionRules};
pub use guard::WorkspaceRoot;
