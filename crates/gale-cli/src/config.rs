// crates/gale-cli/src/config.rs
//
// Runtime configuration for the Gale CLI.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use gale_core::{Address, GaleError};
use gale_staking::StakerConfig;

use crate::output::OutputFormat;
use crate::scenario::parse_amount;

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct GaleConfig {
    /// Emission per block, as a token amount ("0.1") or raw wei ("5 wei").
    #[serde(default = "default_reward_per_block")]
    pub reward_per_block: String,

    /// Label the staking ledger's address is derived from.
    #[serde(default = "default_staker_label")]
    pub staker_label: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Overridden by `RUST_LOG` when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Default output format: "table" or "json".
    #[serde(default = "default_output")]
    pub output: String,
}

fn default_reward_per_block() -> String {
    "0.1".to_string()
}

fn default_staker_label() -> String {
    "gale-staker".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output() -> String {
    "table".to_string()
}

impl Default for GaleConfig {
    fn default() -> Self {
        Self {
            reward_per_block: default_reward_per_block(),
            staker_label: default_staker_label(),
            log_level: default_log_level(),
            output: default_output(),
        }
    }
}

impl GaleConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: GaleConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Ledger parameters described by this configuration.
    pub fn staker_config(&self) -> Result<StakerConfig, GaleError> {
        let reward_per_block = parse_amount(&self.reward_per_block)
            .map_err(|e| GaleError::Config(format!("reward_per_block: {}", e)))?;
        Ok(StakerConfig {
            address: Address::from_label(&self.staker_label),
            reward_per_block,
        })
    }

    /// Default output format.
    pub fn output_format(&self) -> Result<OutputFormat, GaleError> {
        self.output.parse().map_err(GaleError::Config)
    }
}
