//! Backup runs and retention for wsbackup
//!
//! # Architecture
//!
//! - `BackupManager`: runs scan, archive and prune for one workspace
//! - `RetentionPruner`: keeps the newest archives and deletes the rest
//!
//! # Retention Policy
//!
//! Archives are ranked by modification time and the newest 250 are kept by
//! default. Only `.rar` and `.zip` files directly inside the backup directory
//! are considered.
//!
//! # Example
//!
//! ```rust,ignore
//! use wsbackup::backup::BackupManager;
//! use wsbackup::config::{BackupPaths, Settings};
//! use wsbackup::logging::Logger;
//! use wsbackup::scan::WorkspaceRoot;
//!
//! let settings = Settings::default();
//! let root = WorkspaceRoot::validate("/srv/project")?;
//! let manager = BackupManager::new(BackupPaths::new(root, &settings), settings, Logger::tracing());
//!
//! if let Some(report) = manager.run() {
//!     println!("{}", report.archive.filename);
//! }
//! ```

mod manager;
mod retention;

pub use manager::{BackupManager, RunReport};
pub use retention::{list_archives, PruneReport, RetentionPruner, DEFAULT_KEEP_COUNT};
