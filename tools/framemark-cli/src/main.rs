//! Framemark CLI — extract still frames at FCPXML marker timestamps.
//!
//! Usage:
//!   framemark markers <FCPXML>    List markers found in a project file
//!   framemark extract <FCPXML>    Extract one frame per marker
//!   framemark check               Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "framemark",
    about = "Extract still frames from video at FCPXML marker timestamps",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List markers found in a project file
    Markers {
        /// Path to the FCPXML project file
        path: PathBuf,

        /// Print markers as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract one frame per marker
    Extract {
        /// Path to the FCPXML project file
        path: PathBuf,

        /// Output directory for extracted frames
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output quality tier: low, high, ultra
        #[arg(long)]
        quality: Option<String>,

        /// Use faster, lower-quality encode settings
        #[arg(long)]
        fast: bool,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    framemark_common::logging::init_logging(&framemark_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Markers { path, json } => commands::markers::run(path, json),
        Commands::Extract {
            path,
            output,
            quality,
            fast,
        } => commands::extract::run(path, output, quality, fast).await,
        Commands::Check => commands::check::run(),
    }
}
