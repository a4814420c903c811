//! ReconX CLI
//!
//! Command-line entry point called by the build pipeline

use clap::{Parser, Subcommand, ValueEnum};
use reconx_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    /// Human-readable logs on stderr
    Pretty,
    /// One JSON object per log line on stderr
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "reconx")]
#[command(about = "ReconX - Idempotent reconciliation of generated native project files", long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Lifecycle hooks run by the build pipeline
    Hook(commands::hook::HookArgs),
    /// Reconcile a single document
    Reconcile(commands::reconcile::ReconcileArgs),
    /// Read-only inspection of generated documents
    Inspect(commands::inspect::InspectArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Pretty => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Hook(args) => commands::hook::execute(args),
        Commands::Reconcile(args) => commands::reconcile::execute(args),
        Commands::Inspect(args) => commands::inspect::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
