// crates/gale-staking/src/staker.rs
//
// Deposit / withdraw / claim orchestration.
//
// Every state-changing operation follows the same sequence:
//   1. settle pending rewards with the divisor that was in force,
//   2. apply the stake change,
//   3. refresh the stored divisor for the post-change pool,
//   4. emit events.
// Emergency withdrawal skips step 1 and 3 entirely.
//
// Operations run against a working copy of the whole ledger (stake records,
// both asset facilities, new events) that replaces the committed state only
// when the operation succeeds. A failed operation leaves nothing behind.

use serde::{Deserialize, Serialize};

use gale_core::{Address, AssetLedger, BlockClock, GaleError, LedgerEvent};

use crate::divisor;
use crate::rewards::{self, DEFAULT_REWARD_PER_BLOCK};
use crate::stake::{Participant, ParticipantState, StakeLedger};

/// Static parameters of a staking ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerConfig {
    /// The ledger's own account. Holds deposited stake and the reward budget.
    #[serde(default = "default_address")]
    pub address: Address,

    /// Reward-asset wei emitted per block to the whole pool.
    #[serde(default = "default_reward_per_block")]
    pub reward_per_block: u128,
}

fn default_address() -> Address {
    Address::from_label("gale-staker")
}

fn default_reward_per_block() -> u128 {
    DEFAULT_REWARD_PER_BLOCK
}

impl Default for StakerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            reward_per_block: default_reward_per_block(),
        }
    }
}

/// What a settlement would pay right now, and the divisor that would be
/// stored afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPreview {
    /// Reward wei payable at the current block.
    pub amount: u128,
    /// Divisor the participant would hold after the update rule.
    pub divisor: Option<u128>,
}

/// Everything an operation may mutate.
#[derive(Debug, Clone)]
struct LedgerState<S, R> {
    stakes: StakeLedger,
    stake_asset: S,
    reward_asset: R,
}

impl<S: AssetLedger, R: AssetLedger> LedgerState<S, R> {
    /// Pay out pending rewards and advance the accrual marker.
    ///
    /// Returns `None` when the participant held no stake over the interval
    /// (nothing to report), otherwise the amount paid.
    fn settle(
        &mut self,
        config: &StakerConfig,
        participant: &Address,
        block: u64,
    ) -> Result<Option<u128>, GaleError> {
        let Some(record) = self.stakes.participant(participant) else {
            return Ok(None);
        };
        let was_staking = record.state() == ParticipantState::Staking;
        let amount = rewards::pending_reward(record, block, config.reward_per_block)?;

        if amount > 0 {
            let available = self.reward_asset.balance_of(&config.address);
            if let Err(e) = rewards::ensure_capacity(amount, available) {
                tracing::warn!(
                    "Settlement for {} rejected: owed {} but budget is {}",
                    participant,
                    amount,
                    available
                );
                return Err(e);
            }
            self.reward_asset
                .transfer(&config.address, participant, amount)?;
        }

        if let Some(record) = self.stakes.participant_mut(participant) {
            tracing::debug!(
                participant = %participant,
                from_block = record.last_accrual_block,
                to_block = block,
                divisor = ?record.stored_divisor,
                amount = %amount,
                "settled rewards"
            );
            record.last_accrual_block = block;
        }

        Ok(was_staking.then_some(amount))
    }

    /// Run the divisor engine against the current pool for `participant`.
    ///
    /// Returns the stored divisor afterwards. A dormant participant keeps
    /// whatever it had.
    fn refresh_divisor(&mut self, participant: &Address) -> Option<u128> {
        let total = self.stakes.current_total();
        let record = self.stakes.participant_mut(participant)?;

        if let Some(fresh) = divisor::fresh_divisor(total, record.staked_amount) {
            let update = divisor::observe_divisor(record.stored_divisor, fresh);
            tracing::debug!(
                "Divisor for {}: {:?} -> {} ({:?}, fresh {})",
                participant,
                update.previous,
                update.divisor,
                update.kind,
                update.fresh
            );
            record.stored_divisor = Some(update.divisor);
        }

        record.stored_divisor
    }
}

/// The pooled-staking reward ledger.
///
/// Generic over the stake-asset facility `S`, the reward-asset facility `R`
/// and the block clock `C`. `&mut self` on every state-changing call is the
/// single lock that serializes transactions.
pub struct Staker<S, R, C> {
    config: StakerConfig,
    state: LedgerState<S, R>,
    clock: C,
    events: Vec<LedgerEvent>,
}

impl<S, R, C> Staker<S, R, C>
where
    S: AssetLedger + Clone,
    R: AssetLedger + Clone,
    C: BlockClock,
{
    /// Create a ledger with no participants.
    ///
    /// The reward budget is whatever reward asset `config.address` holds;
    /// fund it with an ordinary reward-asset transfer to that address.
    pub fn new(config: StakerConfig, stake_asset: S, reward_asset: R, clock: C) -> Self {
        tracing::info!(
            "Staking ledger {} emitting {} wei per block",
            config.address,
            config.reward_per_block
        );
        Self {
            config,
            state: LedgerState {
                stakes: StakeLedger::new(),
                stake_asset,
                reward_asset,
            },
            clock,
            events: Vec::new(),
        }
    }

    /// Run `op` on a working copy and commit it only if it succeeds.
    fn transact<T, F>(&mut self, op: F) -> Result<T, GaleError>
    where
        F: FnOnce(&mut LedgerState<S, R>, &StakerConfig, u64, &mut Vec<LedgerEvent>) -> Result<T, GaleError>,
    {
        let block = self.clock.begin_transaction();
        let mut working = self.state.clone();
        let mut emitted = Vec::new();

        let out = op(&mut working, &self.config, block, &mut emitted)?;

        self.state = working;
        self.events.append(&mut emitted);
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // State-changing operations
    // -----------------------------------------------------------------------

    /// Deposit `amount` of the stake asset from `caller`.
    ///
    /// `caller` must have approved the ledger address for at least `amount`.
    /// Returns the stored divisor after the deposit.
    ///
    /// # Errors
    /// - `InvalidAmount` for a zero amount.
    /// - `TransferRejected` if the pull from `caller` fails.
    /// - `CapacityExceeded` if pending rewards cannot be paid.
    pub fn deposit(&mut self, caller: &Address, amount: u128) -> Result<u128, GaleError> {
        if amount == 0 {
            return Err(GaleError::InvalidAmount(
                "Deposit amount must be greater than zero".to_string(),
            ));
        }

        self.transact(|state, config, block, events| {
            state
                .stake_asset
                .transfer_from(&config.address, caller, &config.address, amount)?;

            state.stakes.register(*caller, block);
            let paid = state.settle(config, caller, block)?;
            state.stakes.stake(*caller, amount)?;
            let divisor = state.refresh_divisor(caller).ok_or_else(|| {
                GaleError::InvalidAmount(format!("Deposit of {} left {} without stake", amount, caller))
            })?;

            if let Some(paid) = paid {
                events.push(LedgerEvent::RewardPaid {
                    participant: *caller,
                    amount: paid,
                    divisor,
                });
            }
            events.push(LedgerEvent::Deposited {
                participant: *caller,
                amount,
                divisor,
            });

            tracing::info!(
                "Block {}: {} deposited {} (divisor {}, pool {})",
                block,
                caller,
                amount,
                divisor,
                state.stakes.current_total()
            );
            Ok(divisor)
        })
    }

    /// Withdraw `amount` of `caller`'s stake, settling rewards first.
    ///
    /// # Errors
    /// - `InvalidAmount` for a zero amount.
    /// - `InsufficientStake` if `amount` exceeds the current stake.
    /// - `CapacityExceeded` if pending rewards cannot be paid.
    pub fn withdraw(&mut self, caller: &Address, amount: u128) -> Result<(), GaleError> {
        if amount == 0 {
            return Err(GaleError::InvalidAmount(
                "Withdrawal amount must be greater than zero".to_string(),
            ));
        }
        let staked = self.staked_amount_of(caller);
        if amount > staked {
            return Err(GaleError::InsufficientStake {
                requested: amount,
                staked,
            });
        }

        self.transact(|state, config, block, events| {
            let paid = state.settle(config, caller, block)?;
            let remaining = state.stakes.unstake(caller, amount)?;
            let divisor = state.refresh_divisor(caller);
            state
                .stake_asset
                .transfer(&config.address, caller, amount)?;

            if let (Some(paid), Some(divisor)) = (paid, divisor) {
                events.push(LedgerEvent::RewardPaid {
                    participant: *caller,
                    amount: paid,
                    divisor,
                });
            }
            events.push(LedgerEvent::Withdrawn {
                participant: *caller,
                amount,
            });

            tracing::info!(
                "Block {}: {} withdrew {} ({} remaining, pool {})",
                block,
                caller,
                amount,
                remaining,
                state.stakes.current_total()
            );
            Ok(())
        })
    }

    /// Settle `on_behalf_of`'s pending rewards. Callable by anyone; the
    /// reward always goes to `on_behalf_of`.
    ///
    /// Returns the amount paid.
    ///
    /// # Errors
    /// Returns `CapacityExceeded` if the reward budget cannot cover it.
    pub fn claim_rewards(&mut self, caller: &Address, on_behalf_of: &Address) -> Result<u128, GaleError> {
        self.transact(|state, config, block, events| {
            let paid = state.settle(config, on_behalf_of, block)?;
            let divisor = state.refresh_divisor(on_behalf_of);

            if let (Some(paid), Some(divisor)) = (paid, divisor) {
                events.push(LedgerEvent::RewardPaid {
                    participant: *on_behalf_of,
                    amount: paid,
                    divisor,
                });
            }

            let paid = paid.unwrap_or(0);
            tracing::debug!(
                "Block {}: {} claimed {} for {}",
                block,
                caller,
                paid,
                on_behalf_of
            );
            Ok(paid)
        })
    }

    /// Return `caller`'s entire stake without settling rewards.
    ///
    /// Pending rewards are forfeited and the reward budget is not touched.
    /// Returns the amount withdrawn.
    ///
    /// # Errors
    /// Returns `InsufficientStake` if `caller` has nothing staked.
    pub fn emergency_withdraw(&mut self, caller: &Address) -> Result<u128, GaleError> {
        let staked = self.staked_amount_of(caller);
        if staked == 0 {
            return Err(GaleError::InsufficientStake {
                requested: 0,
                staked: 0,
            });
        }

        self.transact(|state, config, block, events| {
            state.stakes.unstake(caller, staked)?;
            state
                .stake_asset
                .transfer(&config.address, caller, staked)?;
            events.push(LedgerEvent::Withdrawn {
                participant: *caller,
                amount: staked,
            });

            tracing::warn!(
                "Block {}: {} emergency-withdrew {}, forfeiting unsettled rewards",
                block,
                caller,
                staked
            );
            Ok(staked)
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Stake held by `participant`.
    pub fn staked_amount_of(&self, participant: &Address) -> u128 {
        self.state.stakes.stake_of(participant)
    }

    /// Reward a settlement would pay at the current block and the divisor
    /// that would be stored afterwards.
    pub fn pending_reward_preview(&self, participant: &Address) -> Result<RewardPreview, GaleError> {
        let amount = match self.state.stakes.participant(participant) {
            Some(record) => rewards::pending_reward(
                record,
                self.clock.current_block(),
                self.config.reward_per_block,
            )?,
            None => 0,
        };

        Ok(RewardPreview {
            amount,
            divisor: self.current_divisor_for_pool(participant),
        })
    }

    /// Divisor the update rule would produce for `participant` right now,
    /// without persisting it.
    pub fn current_divisor_for_pool(&self, participant: &Address) -> Option<u128> {
        let record = self.state.stakes.participant(participant)?;
        divisor::preview_divisor(
            record.stored_divisor,
            self.state.stakes.current_total(),
            record.staked_amount,
        )
    }

    /// Stake across all pools divided by `participant`'s stake in this one.
    pub fn percentage_divisor(&self, participant: &Address) -> Option<u128> {
        divisor::percentage_divisor(
            self.state.stakes.current_total(),
            self.staked_amount_of(participant),
        )
    }

    /// Aggregate stake in the pool.
    pub fn total_staked(&self) -> u128 {
        self.state.stakes.current_total()
    }

    /// Reward asset the ledger still holds for payouts.
    pub fn reward_budget(&self) -> u128 {
        self.state.reward_asset.balance_of(&self.config.address)
    }

    /// Emission rate per block.
    pub fn reward_per_block(&self) -> u128 {
        self.config.reward_per_block
    }

    /// The ledger's own account.
    pub fn address(&self) -> Address {
        self.config.address
    }

    /// Record for `participant`, if it ever deposited.
    pub fn participant(&self, participant: &Address) -> Option<&Participant> {
        self.state.stakes.participant(participant)
    }

    /// Lifecycle state of `participant`.
    pub fn participant_state(&self, participant: &Address) -> ParticipantState {
        self.participant(participant)
            .map(Participant::state)
            .unwrap_or(ParticipantState::Dormant)
    }

    /// All participant records, ordered by address.
    pub fn participants(&self) -> impl Iterator<Item = (&Address, &Participant)> {
        self.state.stakes.participants()
    }

    /// Committed events, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Take the committed events, leaving the log empty.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Stake-asset facility.
    pub fn stake_asset(&self) -> &S {
        &self.state.stake_asset
    }

    /// Mutable stake-asset facility, for approvals and transfers made by
    /// participants outside the ledger.
    pub fn stake_asset_mut(&mut self) -> &mut S {
        &mut self.state.stake_asset
    }

    /// Reward-asset facility.
    pub fn reward_asset(&self) -> &R {
        &self.state.reward_asset
    }

    /// Mutable reward-asset facility, used to fund the reward budget.
    pub fn reward_asset_mut(&mut self) -> &mut R {
        &mut self.state.reward_asset
    }

    /// The block clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
