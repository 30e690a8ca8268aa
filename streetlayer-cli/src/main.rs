//! streetlayer CLI - Command-line interface
//!
//! This binary provides a command-line interface to the streetlayer library.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::download::DownloadArgs;

#[derive(Parser)]
#[command(name = "streetlayer")]
#[command(version = streetlayer::VERSION)]
#[command(about = "Acquire street-level imagery along a region's roads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire imagery for a configured region
    Download {
        /// Region name from the [regions] section of config.ini
        #[arg(long)]
        region: String,

        /// Number of points to acquire (4 images each)
        #[arg(long)]
        count: Option<usize>,

        /// Output root directory (images go to <output>/<region>)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Maps API key (overrides config and environment)
        #[arg(long)]
        api_key: Option<String>,

        /// Concurrent workers
        #[arg(long)]
        workers: Option<usize>,

        /// Enable debug logging to the terminal
        #[arg(long)]
        debug: bool,
    },

    /// Show persisted spend and remaining budget
    Budget,

    /// List configured regions
    Regions,

    /// Create a default config file
    Init,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Download {
            region,
            count,
            output,
            api_key,
            workers,
            debug,
        } => commands::download::run(DownloadArgs {
            region,
            count,
            output,
            api_key,
            workers,
            debug,
        }),
        Commands::Budget => commands::budget::run(),
        Commands::Regions => commands::regions::run(),
        Commands::Init => commands::init::run(),
    };

    if let Err(e) = result {
        e.exit();
    }
}
