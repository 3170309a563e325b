// crates/gale-core/src/address.rs
//
// Account addresses for participants, asset holders, and the ledger itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::GaleError;

/// A 20-byte account address.
///
/// Participants, funders, and the staking ledger itself are all identified
/// by an `Address`. Displayed and serialized as `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Derive a deterministic address from a human-readable label.
    ///
    /// Takes the last 20 bytes of `SHA-256(label)`. Used by the simulator and
    /// tests to name accounts ("alice", "staker") without managing keys.
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..]);
        Address(bytes)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Abbreviated form (`0x1234…abcd`) for tables and log lines.
    pub fn short(&self) -> String {
        let full = hex::encode(self.0);
        format!("0x{}…{}", &full[..4], &full[full.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = GaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits)
            .map_err(|e| GaleError::Serialization(format!("Invalid address {}: {}", s, e)))?;
        let bytes: [u8; 20] = raw.try_into().map_err(|raw: Vec<u8>| {
            GaleError::Serialization(format!(
                "Invalid address {}: expected 20 bytes, got {}",
                s,
                raw.len()
            ))
        })?;
        Ok(Address(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
