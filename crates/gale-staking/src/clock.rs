// crates/gale-staking/src/clock.rs
//
// Ledger clocks: the block index that drives reward emission.
//
// Two flavors:
//   - ManualClock: advanced externally; transactions run in the current block.
//   - AutoMineClock: development-chain semantics, every state-changing
//     transaction seals a fresh block before it executes.

use std::cell::Cell;

use gale_core::BlockClock;

/// A block clock advanced by its owner.
///
/// Interior mutability lets tests and the simulator advance the clock while
/// the ledger holds a shared reference to it.
#[derive(Debug, Default)]
pub struct ManualClock {
    block: Cell<u64>,
}

impl ManualClock {
    /// Create a clock positioned at `block`.
    pub fn new(block: u64) -> Self {
        Self {
            block: Cell::new(block),
        }
    }

    /// Advance the clock by `blocks`. Saturates at `u64::MAX`.
    pub fn advance(&self, blocks: u64) -> u64 {
        let next = self.block.get().saturating_add(blocks);
        self.block.set(next);
        next
    }

    /// Move the clock to `block`.
    ///
    /// The block index is monotonic: an earlier block is ignored.
    pub fn set(&self, block: u64) {
        let current = self.block.get();
        if block < current {
            tracing::warn!(
                "Ignoring clock rewind from block {} to block {}",
                current,
                block
            );
            return;
        }
        self.block.set(block);
    }
}

impl BlockClock for ManualClock {
    fn current_block(&self) -> u64 {
        self.block.get()
    }
}

/// A clock that seals one block per state-changing transaction.
///
/// Read-only queries observe the last sealed block; `begin_transaction`
/// seals the next block and returns it, so two consecutive transactions are
/// always at least one block apart.
#[derive(Debug, Default)]
pub struct AutoMineClock {
    block: Cell<u64>,
}

impl AutoMineClock {
    /// Create a clock whose last sealed block is `block`.
    pub fn new(block: u64) -> Self {
        Self {
            block: Cell::new(block),
        }
    }

    /// Seal an empty block (a transaction that does not touch the ledger).
    pub fn mine(&self) -> u64 {
        let next = self.block.get().saturating_add(1);
        self.block.set(next);
        next
    }
}

impl BlockClock for AutoMineClock {
    fn current_block(&self) -> u64 {
        self.block.get()
    }

    fn begin_transaction(&self) -> u64 {
        self.mine()
    }
}
