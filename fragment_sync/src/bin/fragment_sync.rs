use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use fragment_sync::{
    init_logging, load_name_table, Diagnostics, LogLevel, RunMode, SyncConfig, SyncError, SyncPipeline,
    DEFAULT_CONFIG_FILE,
};

/// Keep script fragment headers in sync with the generated name table.
#[derive(Debug, Parser)]
#[command(name = "fragment-sync", version)]
struct CliArgs {
    /// Configuration file; defaults are used if it does not exist
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Workspace root, overriding the configuration
    #[arg(long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    workspace: Option<PathBuf>,

    /// Canonical name table (.yml or .json), overriding the configuration
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    names: Option<PathBuf>,

    /// Logging level, overriding the configuration
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan the workspace and print the fragment index as JSON
    Scan,
    /// Reconcile without writing; exit with 1 if any header would change
    Check,
    /// Reconcile and write changed headers back
    Sync {
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn load_config(args: &CliArgs) -> Result<SyncConfig, SyncError> {
    let mut config = SyncConfig::load_or_default(&args.config)?;
    if let Some(workspace) = &args.workspace {
        config.workspace = workspace.clone();
    }
    if let Some(names) = &args.names {
        config.names = Some(names.clone());
    }
    if let Some(level) = args.log_level {
        config.log.level = level;
    }
    Ok(config)
}

fn run(args: &CliArgs, config: &SyncConfig) -> Result<i32, SyncError> {
    let mut diag = Diagnostics::new();
    let pipeline = SyncPipeline::from_config(config)?;

    if let Command::Scan = args.command {
        let (_, index) = pipeline.import(&mut diag)?;
        println!("{}", serde_json::to_string_pretty(&index.to_nested())?);
        return Ok(0);
    }

    let names_path = config.names.as_deref().ok_or(SyncError::NamesMissing)?;
    let names = load_name_table(names_path, &mut diag)?;

    match args.command {
        Command::Check => {
            let outcome = pipeline.run(&names, RunMode::DryRun, &mut diag)?;
            for record in outcome.records.iter().filter(|r| r.changed) {
                println!(
                    "{}:{}: {} -> {}",
                    record.source_file.display(),
                    record.line,
                    record.header_token(),
                    record.annotation_text()
                );
            }
            Ok(if outcome.report.changes() > 0 { 1 } else { 0 })
        }
        Command::Sync { json } => {
            let outcome = pipeline.run(&names, RunMode::Apply, &mut diag)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.report)?);
            }
            Ok(0)
        }
        Command::Scan => Ok(0),
    }
}

fn main() {
    let args = CliArgs::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            exit(2);
        }
    };

    // Scan output goes to stdout; keep the console log off it.
    let mut log_config = config.log.clone();
    if let Command::Scan = args.command {
        log_config.console = false;
    }
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Error: {e}");
        exit(2);
    }

    match run(&args, &config) {
        Ok(code) => exit(code),
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            exit(2);
        }
    }
}
