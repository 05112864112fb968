//! AI Wargame CLI - Command-line interface
//!
//! Commands:
//! - play: Play a game (human or computer on either side)
//! - config: Write a default configuration file

mod broker;
mod input;
mod play;
mod transcript;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wargame_core::GameConfig;

#[derive(Parser)]
#[command(name = "wargame")]
#[command(about = "Two-player grid wargame with a minimax AI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game
    Play(play::PlayArgs),
    /// Write the default configuration as JSON
    Config {
        #[arg(long, value_name = "FILE", default_value = "wargame.json")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args),
        Commands::Config { output } => {
            GameConfig::default()
                .save(&output)
                .with_context(|| format!("Failed to write config: {}", output.display()))?;
            println!("Wrote default configuration to {}", output.display());
            Ok(())
        }
    }
}
