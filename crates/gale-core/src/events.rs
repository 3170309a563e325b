// crates/gale-core/src/events.rs
//
// Observer-facing events emitted by the staking ledger and by asset
// facilities.

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// An event emitted by the staking ledger on a committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Stake asset was deposited. `divisor` is the participant's stored
    /// divisor after the post-deposit update.
    Deposited {
        participant: Address,
        amount: u128,
        divisor: u128,
    },
    /// Pending rewards were settled and paid out. `divisor` is the stored
    /// divisor after this operation's update.
    RewardPaid {
        participant: Address,
        amount: u128,
        divisor: u128,
    },
    /// Stake asset was returned to the participant.
    Withdrawn { participant: Address, amount: u128 },
}

impl LedgerEvent {
    /// The participant the event concerns.
    pub fn participant(&self) -> Address {
        match self {
            LedgerEvent::Deposited { participant, .. }
            | LedgerEvent::RewardPaid { participant, .. }
            | LedgerEvent::Withdrawn { participant, .. } => *participant,
        }
    }

    /// Short name used in tables and logs.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::Deposited { .. } => "deposited",
            LedgerEvent::RewardPaid { .. } => "reward_paid",
            LedgerEvent::Withdrawn { .. } => "withdrawn",
        }
    }
}

/// Two-party transfer notification recorded by an asset facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: u128,
}
