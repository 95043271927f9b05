//! wsbackup - Workspace archival backup with retention
//!
//! This library archives a project workspace into a single timestamped
//! archive per run, skipping environment, cache and build directories, and
//! prunes the backup directory down to the most recent archives.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Settings and path management
//! - `error`: Custom error types
//! - `logging`: Injectable, sanitizing logger over `tracing`
//! - `scan`: Workspace validation, exclusion rules and file enumeration
//! - `archive`: Archiver discovery, external RAR invocation and ZIP fallback
//! - `backup`: Full backup runs and retention pruning
//! - `cli`: Command handlers
//! - `display`: Terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use wsbackup::config::{BackupPaths, ConfigPaths, Settings};
//! use wsbackup::scan::WorkspaceRoot;
//!
//! let settings = Settings::load_or_create(&ConfigPaths::new()?)?;
//! let root = WorkspaceRoot::validate(".")?;
//! let paths = BackupPaths::new(root, &settings);
//! ```

pub mod archive;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod scan;

pub use error::{BackupError, BackupResult};
