//! Paper Trail CLI
//!
//! Inspect change sets and review trail entries from the command line

use clap::{Parser, Subcommand};
use papertrail_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "papertrail")]
#[command(about = "Paper trail - change detection and review for structured content", long_about = None)]
struct Cli {
    /// Emit logs with this profile (development, production)
    #[arg(long, global = true)]
    log: Option<Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute the change set between two versions of a record
    Diff(commands::diff::DiffArgs),
    /// Trail history and review
    Trail(commands::trail::TrailArgs),
}

fn main() {
    let cli = Cli::parse();
    if let Some(profile) = cli.log {
        logging_facility::init(profile);
    }

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Trail(args) => commands::trail::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
