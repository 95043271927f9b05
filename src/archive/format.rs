//! Archive formats and file naming
//!
//! Archives are named `<project>_backup_<YYYYMMDD_HHMMSS>.<ext>`. The
//! timestamp token can be parsed back out of a filename.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Format used by the timestamp token in archive names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const NAME_MARKER: &str = "_backup_";

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Produced by the external RAR tool
    Rar,
    /// Built-in fallback
    Zip,
}

impl ArchiveFormat {
    /// All formats the retention pruner recognizes
    pub const ALL: [ArchiveFormat; 2] = [ArchiveFormat::Rar, ArchiveFormat::Zip];

    /// File extension without the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Rar => "rar",
            Self::Zip => "zip",
        }
    }

    /// Detect the format from a file name's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rar => write!(f, "RAR"),
            Self::Zip => write!(f, "ZIP"),
        }
    }
}

/// Build the archive file name for a run
pub fn archive_file_name(project: &str, stamp: &NaiveDateTime, format: ArchiveFormat) -> String {
    format!(
        "{}{}{}.{}",
        project,
        NAME_MARKER,
        stamp.format(TIMESTAMP_FORMAT),
        format.extension()
    )
}

/// Pick a target path in `dir` that does not exist yet
///
/// A second run within the same second gets `_2`, `_3`, ... appended to the
/// timestamp so earlier archives are never written to.
pub fn unique_archive_path(
    dir: &Path,
    project: &str,
    stamp: &NaiveDateTime,
    format: ArchiveFormat,
) -> PathBuf {
    let candidate = dir.join(archive_file_name(project, stamp, format));
    if !candidate.exists() {
        return candidate;
    }

    let base = format!("{}{}{}", project, NAME_MARKER, stamp.format(TIMESTAMP_FORMAT));
    (2u32..)
        .map(|n| dir.join(format!("{}_{}.{}", base, n, format.extension())))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Parse the timestamp token out of an archive file name
pub fn parse_archive_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    let (_, token) = stem.rsplit_once(NAME_MARKER)?;

    // YYYYMMDD_HHMMSS with an optional _N collision suffix
    let stamp = token.get(..15)?;
    let rest = &token[15..];
    let well_formed = stamp
        .bytes()
        .enumerate()
        .all(|(i, b)| if i == 8 { b == b'_' } else { b.is_ascii_digit() });
    if !well_formed || !(rest.is_empty() || rest.starts_with('_')) {
        return None;
    }

    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}
