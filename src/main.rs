use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use wordsprint::Config;

mod cli;

#[derive(Parser)]
#[command(name = "wordsprint")]
#[command(about = "Word goals, timed writing sprints and daily streaks")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.wordsprint/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's totals and the current streak
    Stats,

    /// Count the words in a text file
    Count {
        /// File to count
        file: PathBuf,
    },

    /// Set the word goal
    Goal {
        /// Target word count
        words: u64,
    },

    /// Load a plain text file as the current document
    Import {
        /// File to read
        file: PathBuf,
    },

    /// Write the current document to a plain text file
    Export {
        /// File to write
        file: PathBuf,
    },

    /// Run a timed sprint against a file you are editing
    Sprint {
        /// Sprint length in minutes (defaults to the configured length)
        #[arg(short, long)]
        minutes: Option<u64>,

        /// File whose word count is tracked
        #[arg(short, long)]
        file: PathBuf,

        /// Record the result when interrupted with Ctrl-C instead of discarding it
        #[arg(long)]
        keep_on_interrupt: bool,
    },

    /// Delete today's stats, the streak and typing time
    Reset {
        /// Skip the confirmation guard
        #[arg(long)]
        yes: bool,
    },

    /// Write a default ~/.wordsprint/config.toml
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone();
    let load_config = || Config::load_or_default(config_path.as_deref());

    match cli.command.unwrap_or(Commands::Stats) {
        Commands::Stats => {
            cli::stats::stats_command(&load_config()?).await?;
        }
        Commands::Count { file } => {
            cli::document::count_command(&file)?;
        }
        Commands::Goal { words } => {
            cli::document::goal_command(&load_config()?, words).await?;
        }
        Commands::Import { file } => {
            cli::document::import_command(&load_config()?, &file).await?;
        }
        Commands::Export { file } => {
            cli::document::export_command(&load_config()?, &file).await?;
        }
        Commands::Sprint {
            minutes,
            file,
            keep_on_interrupt,
        } => {
            cli::sprint::sprint_command(&load_config()?, minutes, &file, keep_on_interrupt).await?;
        }
        Commands::Reset { yes } => {
            cli::stats::reset_command(&load_config()?, yes).await?;
        }
        Commands::Init { force } => {
            cli::init::init_command(force)?;
        }
    }

    Ok(())
}
