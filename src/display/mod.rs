//! Display formatting for terminal output
//!
//! Sizes, ages and the archive table printed by `wsbackup list`.

use chrono::{DateTime, Local};

use crate::archive::ArchiveRecord;

/// Megabytes with two decimals, as used in run logs
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

/// Format a file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format an age in the largest whole unit
pub fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format elapsed wall time for the end-of-run log line
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    format!("{:.2} seconds", elapsed.as_secs_f64())
}

/// Format archives as a table, newest first as given
pub fn format_archive_list(archives: &[ArchiveRecord], now: DateTime<Local>, verbose: bool) -> String {
    if archives.is_empty() {
        return "No backups found.".to_string();
    }

    let name_width = archives
        .iter()
        .map(|a| a.filename.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<3}  {:<name_width$}  {:>10}  {:>6}\n",
        "#",
        "File",
        "Size",
        "Age",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<3}  {:-<name_width$}  {:->10}  {:->6}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for (i, archive) in archives.iter().enumerate() {
        output.push_str(&format!(
            "{:<3}  {:<name_width$}  {:>10}  {:>6}\n",
            i + 1,
            archive.filename,
            format_size(archive.size_bytes),
            format_duration(now.signed_duration_since(archive.modified)),
            name_width = name_width,
        ));

        if verbose {
            output.push_str(&format!(
                "     Modified: {}\n",
                archive.modified.format("%Y-%m-%d %H:%M:%S")
            ));
            if let Some(created) = archive.created_at {
                output.push_str(&format!(
                    "     Created:  {}\n",
                    created.format("%Y-%m-%d %H:%M:%S")
                ));
            }
            output.push_str(&format!("     Path:     {}\n", archive.path.display()));
        }
    }

    let total: u64 = archives.iter().map(|a| a.size_bytes).sum();
    output.push_str(&format!(
        "\nTotal: {} backup(s), {}\n",
        archives.len(),
        format_size(total)
    ));

    output
}
