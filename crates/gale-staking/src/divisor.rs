// crates/gale-staking/src/divisor.rs
//
// Divisor engine: the per-participant reward-scaling denominator.
//
// A participant's share of each block's emission is `reward_per_block / d`,
// where `d` stands in for the inverse of their pool-ownership fraction:
//
//   fresh = floor(total_staked / staked_amount)      (>= 1, == 1 when sole staker)
//
// The persisted (stored) divisor tracks `fresh` with asymmetric smoothing:
//   1. No stored value yet        -> stored = fresh            (baseline)
//   2. fresh <  stored            -> stored = fresh            (improvement, adopted at once)
//   3. fresh >= stored            -> stored = (stored + fresh) / 2   (degradation, damped)
//
// Improvements are never understated; a late large deposit only dilutes
// existing stakers gradually, one observation at a time.

use serde::{Deserialize, Serialize};

/// Which branch of the update rule produced a new stored divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DivisorUpdateKind {
    /// First observation: the fresh divisor became the baseline.
    Baseline,
    /// The fresh divisor was strictly lower and replaced the stored one.
    Improved,
    /// The fresh divisor was equal or higher and was averaged in.
    Smoothed,
}

/// Result of applying the update rule to one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisorUpdate {
    /// Stored divisor before the observation, if any.
    pub previous: Option<u128>,
    /// Fresh divisor that was observed.
    pub fresh: u128,
    /// Stored divisor after the observation.
    pub divisor: u128,
    /// Branch taken.
    pub kind: DivisorUpdateKind,
}

/// Compute the fresh divisor for a participant.
///
/// Returns `None` when the participant has no stake (no share to scale) or
/// when the stake is not covered by the total, which would violate the
/// pool-total invariant.
pub fn fresh_divisor(total_staked: u128, staked_amount: u128) -> Option<u128> {
    if staked_amount == 0 || staked_amount > total_staked {
        return None;
    }
    Some(total_staked / staked_amount)
}

/// Apply the update rule to one observation and report which branch fired.
pub fn observe_divisor(stored: Option<u128>, fresh: u128) -> DivisorUpdate {
    let (divisor, kind) = match stored {
        None => (fresh, DivisorUpdateKind::Baseline),
        Some(prev) if fresh < prev => (fresh, DivisorUpdateKind::Improved),
        // Overflow-free floor((prev + fresh) / 2).
        Some(prev) => (
            prev / 2 + fresh / 2 + (prev % 2 + fresh % 2) / 2,
            DivisorUpdateKind::Smoothed,
        ),
    };

    DivisorUpdate {
        previous: stored,
        fresh,
        divisor,
        kind,
    }
}

/// Apply the update rule to one observation.
pub fn update_divisor(stored: Option<u128>, fresh: u128) -> u128 {
    observe_divisor(stored, fresh).divisor
}

/// Divisor a participant would hold if observed now, without persisting it.
///
/// With no stake there is nothing to observe and the stored value (if any)
/// is returned unchanged.
pub fn preview_divisor(stored: Option<u128>, total_staked: u128, staked_amount: u128) -> Option<u128> {
    match fresh_divisor(total_staked, staked_amount) {
        Some(fresh) => Some(update_divisor(stored, fresh)),
        None => stored,
    }
}

/// Ratio of the stake held across every pool to a participant's stake in
/// one pool.
///
/// With a single pool `global_total == pool_total`, so this equals
/// [`fresh_divisor`].
pub fn percentage_divisor(global_total: u128, staked_amount: u128) -> Option<u128> {
    fresh_divisor(global_total, staked_amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_divisor_sole_staker() {
        assert_eq!(fresh_divisor(1, 1), Some(1));
        assert_eq!(fresh_divisor(10, 10), Some(1));
    }

    #[test]
    fn test_fresh_divisor_floors() {
        assert_eq!(fresh_divisor(4, 1), Some(4));
        assert_eq!(fresh_divisor(11, 10), Some(1));
        assert_eq!(fresh_divisor(11, 1), Some(11));
        assert_eq!(fresh_divisor(10, 3), Some(3));
    }

    #[test]
    fn test_fresh_divisor_without_stake() {
        assert_eq!(fresh_divisor(100, 0), None);
        assert_eq!(fresh_divisor(0, 0), None);
        assert_eq!(fresh_divisor(5, 6), None);
    }

    #[test]
    fn test_baseline_when_unset() {
        let update = observe_divisor(None, 11);
        assert_eq!(update.divisor, 11);
        assert_eq!(update.kind, DivisorUpdateKind::Baseline);
        assert_eq!(update.previous, None);
    }

    #[test]
    fn test_improvement_overwrites_directly() {
        let update = observe_divisor(Some(11), 1);
        assert_eq!(update.divisor, 1);
        assert_eq!(update.kind, DivisorUpdateKind::Improved);
    }

    #[test]
    fn test_degradation_is_averaged() {
        assert_eq!(update_divisor(Some(1), 4), 2);
        assert_eq!(update_divisor(Some(1), 11), 6);
        assert_eq!(observe_divisor(Some(1), 4).kind, DivisorUpdateKind::Smoothed);
    }

    #[test]
    fn test_equal_fresh_is_stable() {
        let update = observe_divisor(Some(5), 5);
        assert_eq!(update.divisor, 5);
        assert_eq!(update.kind, DivisorUpdateKind::Smoothed);
    }

    #[test]
    fn test_smoothing_converges_to_fresh() {
        let mut stored = Some(1);
        for _ in 0..8 {
            stored = Some(update_divisor(stored, 100));
        }
        // 1 -> 50 -> 75 -> 87 -> 93 -> 96 -> 98 -> 99 -> 99
        assert_eq!(stored, Some(99));
    }

    #[test]
    fn test_smoothing_does_not_overflow() {
        assert_eq!(update_divisor(Some(u128::MAX), u128::MAX), u128::MAX);
        assert_eq!(update_divisor(Some(u128::MAX - 1), u128::MAX), u128::MAX - 1);
    }

    #[test]
    fn test_preview_divisor() {
        assert_eq!(preview_divisor(Some(1), 4, 1), Some(2));
        assert_eq!(preview_divisor(None, 4, 1), Some(4));
        assert_eq!(preview_divisor(Some(3), 4, 0), Some(3));
        assert_eq!(preview_divisor(None, 0, 0), None);
    }

    #[test]
    fn test_percentage_divisor_single_pool() {
        assert_eq!(percentage_divisor(1, 1), Some(1));
        assert_eq!(percentage_divisor(4, 1), fresh_divisor(4, 1));
    }
}
