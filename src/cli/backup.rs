//! Backup CLI commands
//!
//! Implements the run, list and prune commands.

use chrono::Local;
use clap::{Args, Subcommand};

use crate::archive::ToolDiscovery;
use crate::backup::BackupManager;
use crate::config::paths::BackupPaths;
use crate::config::settings::Settings;
use crate::display::{format_archive_list, format_size};
use crate::error::BackupResult;
use crate::logging::Logger;

/// Options for a backup run
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Number of archives to keep after this run
    #[arg(short, long)]
    pub keep: Option<usize>,

    /// Archiver timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Skip archiver discovery and always write a ZIP archive
    #[arg(long)]
    pub fallback_only: bool,
}

/// Backup subcommands
#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Create a new backup and prune old ones
    Run(RunArgs),

    /// List all available backups (details with --verbose)
    List,

    /// Delete old backups according to the retention limit
    Prune {
        /// Number of archives to keep
        #[arg(short, long)]
        keep: Option<usize>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
///
/// Returns `false` when a backup run failed. `verbose` is the global flag.
pub fn handle_backup_command(
    paths: &BackupPaths,
    settings: &Settings,
    log: &Logger,
    verbose: bool,
    cmd: BackupCommands,
) -> BackupResult<bool> {
    match cmd {
        BackupCommands::Run(args) => {
            let mut settings = settings.clone();
            if let Some(keep) = args.keep {
                settings.keep_count = keep;
            }
            if let Some(timeout) = args.timeout {
                settings.timeout_secs = timeout;
            }
            settings.validate()?;

            let mut manager = BackupManager::new(paths.clone(), settings, log.clone());
            if args.fallback_only {
                manager = manager.with_discovery(ToolDiscovery::none());
            }

            Ok(manager.run().is_some())
        }

        BackupCommands::List => {
            let manager = BackupManager::new(paths.clone(), settings.clone(), log.clone());
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("No backups found in {}", manager.backup_dir().display());
                println!("Create one with: wsbackup run");
                return Ok(true);
            }

            println!("Available Backups");
            println!("=================");
            println!();
            print!("{}", format_archive_list(&backups, Local::now(), verbose));
            Ok(true)
        }

        BackupCommands::Prune { keep, force } => {
            let mut settings = settings.clone();
            if let Some(keep) = keep {
                settings.keep_count = keep;
            }
            let keep_count = settings.keep_count;
            let manager = BackupManager::new(paths.clone(), settings, log.clone());

            let total = manager.list_backups()?.len();
            let doomed = manager.prune_candidates()?;

            if doomed.is_empty() {
                println!("No backups to prune.");
                println!("Retention limit: {} (you have {})", keep_count, total);
                return Ok(true);
            }

            println!("Prune Summary");
            println!("=============");
            println!("Retention limit: {}", keep_count);
            println!("Current backups: {}", total);
            println!(
                "To be deleted:   {} ({})",
                doomed.len(),
                format_size(doomed.iter().map(|a| a.size_bytes).sum())
            );
            for archive in &doomed {
                println!("  {}", archive.filename);
            }
            println!();

            if !force {
                println!("To delete old backups, run again with --force flag:");
                println!("  wsbackup prune --force");
                return Ok(true);
            }

            let report = manager.enforce_retention();
            println!("Deleted {} backup(s).", report.deleted.len());
            if !report.failed.is_empty() {
                println!("Failed to delete {} backup(s).", report.failed.len());
            }
            Ok(report.failed.is_empty())
        }
    }
}
