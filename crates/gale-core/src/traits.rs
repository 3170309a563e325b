// crates/gale-core/src/traits.rs

use crate::address::Address;
use crate::error::GaleError;

/// Trait for a fungible-asset transfer facility.
///
/// The staking ledger consumes two of these: one for the stake asset and one
/// for the reward asset. Implemented in memory by gale-staking; any other
/// backend only needs to honor the same failure contract: every refusal is
/// a `GaleError::TransferRejected`, returned before any balance moves.
pub trait AssetLedger {
    /// Balance held by `owner`.
    fn balance_of(&self, owner: &Address) -> u128;

    /// Amount `spender` may still pull from `owner` via `transfer_from`.
    fn allowance(&self, owner: &Address, spender: &Address) -> u128;

    /// Grant `spender` the right to pull up to `amount` from `owner`.
    /// Replaces any previous allowance.
    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128);

    /// Move `amount` from `from` to `to`.
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), GaleError>;

    /// Move `amount` from `owner` to `recipient` on behalf of `spender`,
    /// consuming `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        recipient: &Address,
        amount: u128,
    ) -> Result<(), GaleError>;
}

/// Trait for the monotonically increasing block index.
///
/// Advanced externally; the ledger only reads it.
pub trait BlockClock {
    /// The current block index.
    fn current_block(&self) -> u64;

    /// Block in which a state-changing transaction executes.
    ///
    /// Externally advanced clocks return `current_block()`. Clocks that seal
    /// one block per transaction advance first.
    fn begin_transaction(&self) -> u64 {
        self.current_block()
    }
}

impl<C: BlockClock + ?Sized> BlockClock for &C {
    fn current_block(&self) -> u64 {
        (**self).current_block()
    }

    fn begin_transaction(&self) -> u64 {
        (**self).begin_transaction()
    }
}

impl<C: BlockClock + ?Sized> BlockClock for std::rc::Rc<C> {
    fn current_block(&self) -> u64 {
        (**self).current_block()
    }

    fn begin_transaction(&self) -> u64 {
        (**self).begin_transaction()
    }
}
