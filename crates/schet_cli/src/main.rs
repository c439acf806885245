//! Schet CLI: term utilities and event operations against a SQLite store.
//!
//! # Responsibility
//! - Expose the temporal helpers for scripting and manual checks.
//! - Drive the event engine from the shell for local use.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

use commands::{event, term};

#[derive(Parser)]
#[command(name = "schet")]
#[command(about = "Group scheduling: terms, participants and attendance")]
#[command(version)]
struct Cli {
    /// SQLite database file (falls back to SCHET_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Absolute directory for log files (falls back to SCHET_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, convert and order term strings
    Term {
        #[command(subcommand)]
        command: term::TermCommand,
    },
    /// Create, inspect and edit events
    Event {
        #[command(subcommand)]
        command: event::EventCommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = schet_core::CoreConfig::from_env()?;
    if cli.db.is_some() {
        config.db_path = cli.db;
    }
    if cli.log_dir.is_some() {
        config.log_dir = cli.log_dir;
    }
    schet_core::init_from_config(&config)?;

    match cli.command {
        Commands::Term { command } => term::run(command),
        Commands::Event { command } => event::run(command, &config),
    }
}
