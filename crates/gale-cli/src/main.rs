// crates/gale-cli/src/main.rs
//
// CLI entrypoint for the Gale staking ledger developer tools.
//
// Provides subcommands for simulating scripted ledger scenarios and for
// evaluating the divisor update rule on a single observation.

mod commands;
mod config;
mod output;
mod scenario;

use clap::{Parser, Subcommand};
use commands::divisor::DivisorCmd;
use commands::simulate::SimulateCmd;
use config::GaleConfig;
use output::OutputFormat;

/// Gale CLI: developer tools for the pooled-staking reward ledger.
#[derive(Parser, Debug)]
#[command(
    name = "gale",
    version = "0.1.0",
    about = "Gale staking ledger CLI: scenario simulation and divisor inspection"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "gale.toml")]
    config: String,

    /// Output format ("table" or "json"). Overrides the configured default.
    #[arg(long, global = true)]
    output: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a scenario file against an in-memory ledger.
    Simulate(SimulateCmd),

    /// Evaluate the divisor update rule for one observation.
    Divisor(DivisorCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, load_error) = match GaleConfig::load(&cli.config) {
        Ok(cfg) => (cfg, None),
        Err(e) => (GaleConfig::default(), Some(e.to_string())),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match load_error {
        None => tracing::info!("Loaded configuration from {}", cli.config),
        Some(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            cli.config,
            e
        ),
    }

    let format: OutputFormat = match &cli.output {
        Some(text) => text.parse()?,
        None => config.output_format()?,
    };

    match &cli.command {
        Commands::Simulate(cmd) => commands::simulate::run(cmd, &config, format).await?,
        Commands::Divisor(cmd) => commands::divisor::run(cmd, format).await?,
    }

    Ok(())
}
