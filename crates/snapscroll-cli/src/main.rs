use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use snapscroll_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "snapscroll")]
#[command(author, version, about = "Scroll-snapping section decks for the terminal")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Deck to present (shorthand for `run`)
    deck: Option<PathBuf>,

    /// Read configuration from FILE instead of ~/.config/snapscroll/config.toml
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Present a deck full screen
    Run {
        /// Deck file, sections separated by `---`
        deck: PathBuf,
    },
    /// Replay a scripted session against the headless engine
    Simulate {
        /// Script file (TOML)
        script: PathBuf,
        /// Print the trace as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the defaults to the configuration file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config_file {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::load()?,
    };

    let command = match (cli.command, cli.deck) {
        (Some(command), _) => command,
        (None, Some(deck)) => Commands::Run { deck },
        (None, None) => {
            anyhow::bail!("nothing to do: pass a deck file or a subcommand (see --help)")
        }
    };

    // Initialize logging; the deck owns the terminal, so it logs to a file
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    match &command {
        Commands::Run { .. } => {
            let log_path = config.log_path();
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .with_context(|| format!("opening log file {}", log_path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }

    // Handle commands
    match command {
        Commands::Run { deck } => commands::run::run(config, &deck).await,
        Commands::Simulate { script, json } => {
            commands::simulate::run(&config, &script, json).await
        }
        Commands::Config { write } => commands::config::run(&config, write),
    }
}
