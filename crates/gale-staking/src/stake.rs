// crates/gale-staking/src/stake.rs
//
// Stake ledger: per-participant staked balances and the pool total.
//
// Participant records are created on first deposit and never removed. A
// record whose stake returns to zero goes dormant but keeps its stored
// divisor, which seeds the smoothing rule when the participant stakes again.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gale_core::{Address, GaleError};

/// Whether a participant currently holds stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantState {
    /// No stake. Either never deposited or fully withdrawn.
    Dormant,
    /// Holds a non-zero stake and accrues rewards.
    Staking,
}

/// Ledger record for a single staking address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Current stake in wei. Zero means dormant.
    pub staked_amount: u128,
    /// Persisted reward-scaling divisor. `None` until the first deposit has
    /// been observed by the divisor engine.
    pub stored_divisor: Option<u128>,
    /// Block at which rewards were last settled.
    pub last_accrual_block: u64,
}

impl Participant {
    /// Fresh record registered at `block`.
    pub fn new(block: u64) -> Self {
        Self {
            staked_amount: 0,
            stored_divisor: None,
            last_accrual_block: block,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ParticipantState {
        if self.staked_amount > 0 {
            ParticipantState::Staking
        } else {
            ParticipantState::Dormant
        }
    }
}

/// Tracks every participant's stake and the aggregate pool total.
///
/// Only moves counters. Asset movement belongs to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct StakeLedger {
    participants: BTreeMap<Address, Participant>,
    total_staked: u128,
}

impl StakeLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a record exists for `participant`, creating it at `block`.
    pub fn register(&mut self, participant: Address, block: u64) -> &mut Participant {
        self.participants
            .entry(participant)
            .or_insert_with(|| Participant::new(block))
    }

    /// Increase `participant`'s stake and the pool total by `amount`.
    ///
    /// Creates the record if needed. Returns the participant's new stake.
    ///
    /// # Errors
    /// Returns `GaleError::InvalidAmount` for a zero amount or when either
    /// counter would overflow.
    pub fn stake(&mut self, participant: Address, amount: u128) -> Result<u128, GaleError> {
        if amount == 0 {
            return Err(GaleError::InvalidAmount(
                "Stake amount must be greater than zero".to_string(),
            ));
        }

        let current = self.stake_of(&participant);
        let overflow = || {
            GaleError::InvalidAmount(format!(
                "Staking {} on top of {} overflows the ledger",
                amount, current
            ))
        };
        let new_stake = current.checked_add(amount).ok_or_else(overflow)?;
        let new_total = self.total_staked.checked_add(amount).ok_or_else(overflow)?;

        self.participants
            .entry(participant)
            .or_insert_with(|| Participant::new(0))
            .staked_amount = new_stake;
        self.total_staked = new_total;
        Ok(new_stake)
    }

    /// Decrease `participant`'s stake and the pool total by `amount`.
    ///
    /// Returns the participant's remaining stake.
    ///
    /// # Errors
    /// Returns `GaleError::InsufficientStake` if `amount` exceeds the stake.
    pub fn unstake(&mut self, participant: &Address, amount: u128) -> Result<u128, GaleError> {
        let staked = self.stake_of(participant);
        if amount > staked {
            return Err(GaleError::InsufficientStake {
                requested: amount,
                staked,
            });
        }

        let remaining = staked - amount;
        if let Some(record) = self.participants.get_mut(participant) {
            record.staked_amount = remaining;
        }
        self.total_staked -= amount;
        Ok(remaining)
    }

    /// Aggregate stake across all participants.
    pub fn current_total(&self) -> u128 {
        self.total_staked
    }

    /// Stake held by `participant` (zero if unknown).
    pub fn stake_of(&self, participant: &Address) -> u128 {
        self.participants
            .get(participant)
            .map(|p| p.staked_amount)
            .unwrap_or(0)
    }

    /// Record for `participant`, if one was ever created.
    pub fn participant(&self, participant: &Address) -> Option<&Participant> {
        self.participants.get(participant)
    }

    /// Mutable record for `participant`, if one was ever created.
    pub fn participant_mut(&mut self, participant: &Address) -> Option<&mut Participant> {
        self.participants.get_mut(participant)
    }

    /// All records, ordered by address.
    pub fn participants(&self) -> impl Iterator<Item = (&Address, &Participant)> {
        self.participants.iter()
    }
}
