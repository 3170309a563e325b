// crates/gale-staking/src/rewards.rs
//
// Reward accrual: elapsed blocks -> owed reward, and the emission budget.
//
//   pending = (current_block - last_accrual_block) * reward_per_block / divisor
//
// `divisor` is the participant's stored divisor as it stood before the
// current operation's divisor update: the blocks being paid for elapsed
// under that divisor. Floor division throughout.

use gale_core::GaleError;

use crate::stake::Participant;
use crate::token::WEI_PER_WIND;

/// Reference emission rate: 0.1 WIND per block (10^17 wei).
pub const DEFAULT_REWARD_PER_BLOCK: u128 = WEI_PER_WIND / 10;

/// Total emission across `blocks` blocks at `reward_per_block`.
///
/// # Errors
/// Returns `GaleError::InvalidAmount` if the product overflows `u128`.
pub fn emission_for_blocks(blocks: u64, reward_per_block: u128) -> Result<u128, GaleError> {
    (blocks as u128).checked_mul(reward_per_block).ok_or_else(|| {
        GaleError::InvalidAmount(format!(
            "Emission for {} blocks at {} wei per block overflows",
            blocks, reward_per_block
        ))
    })
}

/// Reward owed to `participant` for the blocks since its last settlement.
///
/// Zero for a participant without stake or without a stored divisor: no
/// share of the pool was held during the interval. A `current_block` behind
/// the accrual marker also yields zero.
pub fn pending_reward(
    participant: &Participant,
    current_block: u64,
    reward_per_block: u128,
) -> Result<u128, GaleError> {
    let divisor = match participant.stored_divisor {
        Some(d) if d > 0 && participant.staked_amount > 0 => d,
        _ => return Ok(0),
    };

    let elapsed = current_block.saturating_sub(participant.last_accrual_block);
    Ok(emission_for_blocks(elapsed, reward_per_block)? / divisor)
}

/// Check that the reward budget can cover a settlement.
///
/// # Errors
/// Returns `GaleError::CapacityExceeded` when `requested > available`.
pub fn ensure_capacity(requested: u128, available: u128) -> Result<(), GaleError> {
    if requested > available {
        return Err(GaleError::CapacityExceeded {
            requested,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staking(amount: u128, divisor: Option<u128>, last: u64) -> Participant {
        Participant {
            staked_amount: amount,
            stored_divisor: divisor,
            last_accrual_block: last,
        }
    }

    #[test]
    fn test_default_rate_is_a_tenth() {
        assert_eq!(DEFAULT_REWARD_PER_BLOCK, 100_000_000_000_000_000);
    }

    #[test]
    fn test_sole_staker_one_block() {
        let p = staking(1, Some(1), 10);
        assert_eq!(
            pending_reward(&p, 11, DEFAULT_REWARD_PER_BLOCK).unwrap(),
            DEFAULT_REWARD_PER_BLOCK
        );
    }

    #[test]
    fn test_divisor_scales_reward() {
        let p = staking(1, Some(4), 0);
        assert_eq!(pending_reward(&p, 2, 100).unwrap(), 50);
    }

    #[test]
    fn test_floor_division() {
        let p = staking(1, Some(3), 0);
        assert_eq!(pending_reward(&p, 1, 100).unwrap(), 33);
    }

    #[test]
    fn test_zero_elapsed_is_zero() {
        let p = staking(5, Some(1), 42);
        assert_eq!(pending_reward(&p, 42, 100).unwrap(), 0);
        assert_eq!(pending_reward(&p, 40, 100).unwrap(), 0);
    }

    #[test]
    fn test_dormant_or_unset_accrues_nothing() {
        assert_eq!(pending_reward(&staking(0, Some(1), 0), 100, 100).unwrap(), 0);
        assert_eq!(pending_reward(&staking(5, None, 0), 100, 100).unwrap(), 0);
    }

    #[test]
    fn test_emission_overflow() {
        let err = emission_for_blocks(2, u128::MAX).unwrap_err();
        match err {
            GaleError::InvalidAmount(msg) => assert!(msg.contains("2 blocks") && msg.contains("overflows")),
            other => panic!("expected InvalidAmount, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_capacity() {
        assert!(ensure_capacity(10, 10).is_ok());
        assert_eq!(
            ensure_capacity(11, 10).unwrap_err(),
            GaleError::CapacityExceeded {
                requested: 11,
                available: 10
            }
        );
    }
}
