// crates/gale-staking/src/lib.rs
//
// gale-staking: the pooled-staking reward ledger.
//
// Participants deposit a stake asset into one shared pool and accrue a reward
// asset emitted at a fixed rate per block. Each participant's share is scaled
// by a smoothed integer divisor (see `divisor`) rather than a per-share
// accumulator.
//
// All monetary values are tracked in wei (1 WIND = 10^18 wei).

pub mod asset;
pub mod clock;
pub mod divisor;
pub mod rewards;
pub mod stake;
pub mod staker;
pub mod token;

// Re-export key types for ergonomic access from downstream crates.
pub use asset::InMemoryAsset;
pub use clock::{AutoMineClock, ManualClock};
pub use divisor::{
    fresh_divisor, observe_divisor, percentage_divisor, preview_divisor, update_divisor,
    DivisorUpdate, DivisorUpdateKind,
};
pub use rewards::{emission_for_blocks, ensure_capacity, pending_reward, DEFAULT_REWARD_PER_BLOCK};
pub use stake::{Participant, ParticipantState, StakeLedger};
pub use staker::{RewardPreview, Staker, StakerConfig};
pub use token::{Wei, Wind, DECIMALS, WEI_PER_WIND};
