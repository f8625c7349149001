//! Retrocast CLI: retro weather-channel forecast videos.
//!
//! Usage:
//!   retrocast [generate]        Fetch, render and encode every location
//!   retrocast preview           Write the stills as PNGs without encoding
//!   retrocast check             Check ffmpeg, API key, font and locations
//!
//! Exit codes: 0 when every location succeeds, 1 when any location fails,
//! 2 on configuration errors.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use retrocast_common::config::{config_file_path, AppConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "retrocast",
    about = "90s cable weather channel forecast videos",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: $XDG_CONFIG_HOME/retrocast/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch forecasts and encode one video per location (default)
    Generate {
        /// Only these location codes (repeatable)
        #[arg(short, long = "location")]
        locations: Vec<String>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Fetch and render, writing the stills as PNGs
    Preview {
        /// Only these location codes (repeatable)
        #[arg(short, long = "location")]
        locations: Vec<String>,

        /// Output directory for the stills
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Check system capabilities and configuration
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(commands::EXIT_CONFIG)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let is_check = matches!(cli.command, Some(Commands::Check));
    // `check` reports a broken config file instead of stopping on it.
    let (mut config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) if is_check => (AppConfig::default(), Some(e)),
        Err(e) => return Err(e.into()),
    };
    config.apply_env();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    retrocast_common::logging::init_logging(&logging);

    config.validate()?;

    match cli.command.unwrap_or(Commands::Generate {
        locations: Vec::new(),
        output_dir: None,
    }) {
        Commands::Generate {
            locations,
            output_dir,
        } => commands::generate::run(config, locations, output_dir),
        Commands::Preview {
            locations,
            output_dir,
        } => commands::preview::run(config, locations, output_dir),
        Commands::Check => {
            let config_path = cli.config.clone().unwrap_or_else(config_file_path);
            commands::check::run(&config, &config_path, config_error.as_ref())
        }
    }
}
