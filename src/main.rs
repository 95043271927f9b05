use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use wsbackup::cli::{handle_backup_command, BackupCommands, RunArgs};
use wsbackup::config::{BackupPaths, ConfigPaths, Settings};
use wsbackup::logging::{init_tracing, Logger};
use wsbackup::scan::WorkspaceRoot;

#[derive(Parser)]
#[command(
    name = "wsbackup",
    author = "Kaylee Beyene",
    version,
    about = "Archive a project workspace and prune old backups",
    long_about = "wsbackup archives a workspace directory into a timestamped RAR \
                  archive (or ZIP when no RAR tool is installed), skipping \
                  environment and build directories, then keeps only the most \
                  recent backups."
)]
struct Cli {
    /// Workspace to back up (defaults to the current directory)
    #[arg(short, long, global = true, env = "WSBACKUP_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Settings file to use instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Backup(BackupCommands),

    /// Write the default settings file
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_paths = match &cli.config {
        Some(file) => ConfigPaths::from_settings_file(file),
        None => ConfigPaths::new()?,
    };
    let settings = Settings::load_or_create(&config_paths)?;

    if let Some(Commands::Init) = cli.command {
        let settings_file = config_paths.settings_file();
        if settings_file.exists() {
            println!("Settings already exist: {}", settings_file.display());
        } else {
            settings.save(&config_paths)?;
            println!("Settings written: {}", settings_file.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let workspace = match cli.workspace {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let root = match WorkspaceRoot::validate(&workspace) {
        Ok(root) => root,
        Err(e) => {
            init_tracing(None, cli.verbose)?;
            Logger::tracing().error(format!("Invalid workspace: {}", e));
            return Ok(ExitCode::FAILURE);
        }
    };
    let paths = BackupPaths::new(root, &settings);

    if let Some(Commands::Config) = cli.command {
        print_config(&config_paths, &paths, &settings);
        return Ok(ExitCode::SUCCESS);
    }

    let log_file = settings.log_to_file.then(|| paths.log_file());
    let file_logging = init_tracing(log_file, cli.verbose);
    if file_logging.is_err() {
        init_tracing(None, cli.verbose)?;
    }
    let log = Logger::tracing();
    if let Err(e) = file_logging {
        log.warn(format!("File logging disabled: {}", e));
    }

    let cmd = match cli.command {
        Some(Commands::Backup(cmd)) => cmd,
        _ => BackupCommands::Run(RunArgs::default()),
    };

    let ok = handle_backup_command(&paths, &settings, &log, cli.verbose, cmd)?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_config(config_paths: &ConfigPaths, paths: &BackupPaths, settings: &Settings) {
    println!("wsbackup Configuration");
    println!("======================");
    println!("Settings file:    {}", config_paths.settings_file().display());
    println!("Workspace:        {}", paths.root());
    println!("Backup directory: {}", paths.backup_dir().display());
    println!("Log file:         {}", paths.log_file().display());
    println!();
    println!("Settings:");
    println!(
        "  Project name:        {}",
        settings
            .project_name
            .clone()
            .unwrap_or_else(|| paths.root().name())
    );
    println!("  Keep count:          {}", settings.keep_count);
    println!("  Archiver timeout:    {}s", settings.timeout_secs);
    println!("  Excluded dirs:       {}", settings.excluded_dirs.join(", "));
    println!("  Excluded extensions: {}", settings.excluded_extensions.join(", "));
    println!("  Archiver names:      {}", settings.primary_tool_names.join(", "));
    println!("  Log to file:         {}", settings.log_to_file);
}
