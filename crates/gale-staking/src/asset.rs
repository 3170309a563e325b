// crates/gale-staking/src/asset.rs
//
// In-memory fungible asset facility: balances, allowances, and a log of
// two-party transfer notifications.

use std::collections::HashMap;

use gale_core::{Address, AssetLedger, GaleError, Transfer};

/// An in-memory asset with allowance-based delegated transfers.
///
/// Used for both the stake asset and the reward asset. Every rejected call
/// leaves balances, allowances and the transfer log exactly as they were.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAsset {
    symbol: String,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    total_supply: u128,
    transfers: Vec<Transfer>,
}

impl InMemoryAsset {
    /// Create an empty asset with the given ticker symbol.
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ..Self::default()
        }
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Create `amount` new units owned by `to`. Recorded as a transfer from
    /// the zero address.
    ///
    /// # Errors
    /// Returns `GaleError::InvalidAmount` if the supply would overflow.
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), GaleError> {
        let total_supply = self.total_supply.checked_add(amount).ok_or_else(|| {
            GaleError::InvalidAmount(format!("Minting {} {} overflows supply", amount, self.symbol))
        })?;
        self.total_supply = total_supply;
        *self.balances.entry(*to).or_insert(0) += amount;
        self.transfers.push(Transfer {
            from: Address::ZERO,
            to: *to,
            amount,
        });
        Ok(())
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Transfer notifications, oldest first.
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), GaleError> {
        let balance = self.balance_of(from);
        if amount > balance {
            return Err(GaleError::TransferRejected(format!(
                "{} balance of {} is {}, cannot send {}",
                self.symbol, from, balance, amount
            )));
        }

        self.balances.insert(*from, balance - amount);
        *self.balances.entry(*to).or_insert(0) += amount;
        self.transfers.push(Transfer {
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }
}

impl AssetLedger for InMemoryAsset {
    fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.allowances.insert((*owner, *spender), amount);
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), GaleError> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        recipient: &Address,
        amount: u128,
    ) -> Result<(), GaleError> {
        let allowance = self.allowance(owner, spender);
        if amount > allowance {
            return Err(GaleError::TransferRejected(format!(
                "{} allowance of {} for {} is {}, cannot pull {}",
                self.symbol, spender, owner, allowance, amount
            )));
        }

        self.move_balance(owner, recipient, amount)?;
        self.allowances.insert((*owner, *spender), allowance - amount);
        Ok(())
    }
}
