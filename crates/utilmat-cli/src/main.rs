// crates/utilmat-cli/src/main.rs
//
// CLI entrypoint for utilmat.
//
// Parses arguments, loads the TOML configuration, initializes tracing, and
// dispatches to the `build` or `catalog` subcommand.

mod commands;
mod config;
mod output;

use clap::{Parser, Subcommand};
use commands::build::BuildCmd;
use commands::catalog::CatalogCmd;
use config::BuildConfig;

/// utilmat — turn rating events and an item catalog into a utility matrix.
#[derive(Parser, Debug)]
#[command(
    name = "utilmat",
    version = "0.1.0",
    about = "Build user-by-item utility matrices from rating logs, in bounded-size chunks"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "utilmat.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the utility matrix.
    Build(BuildCmd),

    /// Show the column universe derived from a catalog.
    Catalog(CatalogCmd),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // is not found.
    let loaded = BuildConfig::load(&cli.config);
    let log_level = loaded
        .as_ref()
        .map(|cfg| cfg.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", cli.config);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                cli.config,
                e
            );
            BuildConfig::default()
        }
    };

    match &cli.command {
        Commands::Build(cmd) => commands::build::run(cmd, config)?,
        Commands::Catalog(cmd) => commands::catalog::run(cmd, config)?,
    }

    Ok(())
}
