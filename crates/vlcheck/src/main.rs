//! vlcheck - voice-leading checker for four-part scores
//!
//! Subcommands:
//! - `vlcheck check <score.json>` - Analyse a score and report mistakes
//! - `vlcheck rules` - List the available rules
//! - `vlcheck config` - Show the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use voiceconf::VoiceleadConfig;

mod commands;

#[derive(Parser)]
#[command(name = "vlcheck")]
#[command(about = "Voice-leading checker for four-part scores")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a score JSON file
    Check {
        /// Path to the score (JSON)
        score: PathBuf,

        /// Comma-separated rule identifiers (default: all rules)
        #[arg(short, long, value_delimiter = ',')]
        rules: Option<Vec<String>>,

        /// Print the classified chords as JSON
        #[arg(long)]
        json: bool,

        /// Config file to use instead of ./voicelead.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List rule identifiers and what they check
    Rules,

    /// Show the effective configuration and where it came from
    Config {
        /// Config file to use instead of ./voicelead.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Check { config, .. } | Commands::Config { config } => config.clone(),
        Commands::Rules => None,
    };
    let (config, sources) = VoiceleadConfig::load_with_sources_from(config_path.as_deref())
        .context("Failed to load configuration")?;

    init_tracing(&config.telemetry.log_level);

    match cli.command {
        Commands::Check {
            score, rules, json, ..
        } => {
            commands::check(&score, rules, json, &config)?;
        }
        Commands::Rules => {
            commands::rules();
        }
        Commands::Config { .. } => {
            commands::show_config(&config, &sources);
        }
    }

    Ok(())
}
