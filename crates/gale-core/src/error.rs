// crates/gale-core/src/error.rs

use thiserror::Error;

/// Ledger-wide error types for the Gale staking ledger.
///
/// Every variant aborts the operation that raised it; the ledger never
/// retries internally and never leaves a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GaleError {
    /// Zero or otherwise unusable amount argument.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Withdrawal requested beyond the participant's current stake.
    #[error("Insufficient stake: requested {requested} but only {staked} staked")]
    InsufficientStake { requested: u128, staked: u128 },

    /// Asset facility refused a transfer (balance or allowance too low).
    #[error("Transfer rejected: {0}")]
    TransferRejected(String),

    /// Reward budget cannot cover a computed settlement.
    #[error("Reward capacity exceeded: settlement of {requested} but only {available} available")]
    CapacityExceeded { requested: u128, available: u128 },

    /// Invalid or unreadable configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for GaleError {
    fn from(e: serde_json::Error) -> Self {
        GaleError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for GaleError {
    fn from(e: toml::de::Error) -> Self {
        GaleError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stake_message() {
        let err = GaleError::InsufficientStake {
            requested: 5,
            staked: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stake: requested 5 but only 3 staked"
        );
    }

    #[test]
    fn test_from_serde_json() {
        let parse: Result<u32, _> = serde_json::from_str("not json");
        let err: GaleError = parse.unwrap_err().into();
        assert!(matches!(err, GaleError::Serialization(_)));
    }

    #[test]
    fn test_from_toml() {
        let parse: Result<std::collections::BTreeMap<String, u32>, _> = toml::from_str("x = ");
        let err: GaleError = parse.unwrap_err().into();
        assert!(matches!(err, GaleError::Serialization(_)));
    }
}
