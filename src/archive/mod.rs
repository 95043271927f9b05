//! Archive creation
//!
//! An external RAR tool is preferred when one can be found on the search path
//! or in a known install location. Otherwise a ZIP archive is written
//! in-process.
//!
//! # Output layout
//!
//! One archive per run at
//! `<backup_dir>/<project>_backup_<YYYYMMDD_HHMMSS>.<rar|zip>`.

pub mod discovery;
pub mod fallback;
pub mod format;
pub mod listing;
pub mod primary;
pub mod process;
pub mod record;
pub mod strategy;

pub use discovery::{FixedProbe, KnownLocationsProbe, SearchPathProbe, ToolDiscovery, ToolProbe};
pub use fallback::ZipFallback;
pub use format::ArchiveFormat;
pub use listing::FileListing;
pub use primary::PrimaryArchiver;
pub use process::{CommandSpec, ProcessOutcome, ProcessRunner, SystemProcessRunner};
pub use record::ArchiveRecord;
pub use strategy::{ArchiveOptions, ArchiveRoute, ArchiverStrategy};
