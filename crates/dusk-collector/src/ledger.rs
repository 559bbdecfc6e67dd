//! Sparse in-memory storage for the epoch ledger.
//!
//! Every map reads missing keys as the canonical zero record. User epoch
//! balances are keyed `(user, token, epoch)` and removed once collected, so
//! the maps only hold live positions.

use std::collections::HashMap;

use dusk_core::types::{Address, EpochBalance, TokenInfo};

/// Backing store for [`crate::FeeCollector`].
///
/// All accessors are copy-out; mutation goes through the `*_mut` and
/// `credit_*` methods so callers cannot hold references across writes.
#[derive(Debug, Default, Clone)]
pub struct TokenLedger {
    tokens: HashMap<Address, TokenInfo>,
    epochs: HashMap<(Address, u64), EpochBalance>,
    user_epochs: HashMap<(Address, Address, u64), u128>,
    user_pointers: HashMap<(Address, Address), u64>,
    settlement: HashMap<Address, u128>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Auction state of `token`; fresh tokens read as the default record.
    pub fn token_info(&self, token: Address) -> TokenInfo {
        self.tokens.get(&token).copied().unwrap_or_default()
    }

    pub fn set_token_info(&mut self, token: Address, info: TokenInfo) {
        self.tokens.insert(token, info);
    }

    /// Balances of `(token, epoch)`; untouched epochs read as zero.
    pub fn epoch_balance(&self, token: Address, epoch: u64) -> EpochBalance {
        self.epochs.get(&(token, epoch)).copied().unwrap_or(EpochBalance::ZERO)
    }

    pub fn epoch_balance_mut(&mut self, token: Address, epoch: u64) -> &mut EpochBalance {
        self.epochs.entry((token, epoch)).or_insert(EpochBalance::ZERO)
    }

    /// `user`'s reward-token deposit still sitting in `(token, epoch)`.
    pub fn user_epoch_balance(&self, user: Address, token: Address, epoch: u64) -> u128 {
        self.user_epochs.get(&(user, token, epoch)).copied().unwrap_or(0)
    }

    pub fn credit_user_epoch(&mut self, user: Address, token: Address, epoch: u64, amount: u128) {
        *self.user_epochs.entry((user, token, epoch)).or_insert(0) += amount;
    }

    /// Drop a collected position. Missing entries are fine to clear.
    pub fn clear_user_epoch(&mut self, user: Address, token: Address, epoch: u64) {
        self.user_epochs.remove(&(user, token, epoch));
    }

    /// Oldest epoch of `token` that `user` has not yet settled.
    pub fn user_pointer(&self, user: Address, token: Address) -> u64 {
        self.user_pointers.get(&(user, token)).copied().unwrap_or(0)
    }

    pub fn set_user_pointer(&mut self, user: Address, token: Address, epoch: u64) {
        self.user_pointers.insert((user, token), epoch);
    }

    /// Settlement currency owed to `user` across all tokens.
    pub fn settlement_balance(&self, user: Address) -> u128 {
        self.settlement.get(&user).copied().unwrap_or(0)
    }

    pub fn credit_settlement(&mut self, user: Address, amount: u128) {
        *self.settlement.entry(user).or_insert(0) += amount;
    }

    pub fn clear_settlement(&mut self, user: Address) {
        self.settlement.remove(&user);
    }

    /// Sellable remainder of `token` across its unfinalized epochs.
    ///
    /// Spans `first_unprocessed_epoch ..= current_epoch`; the span is at
    /// most two epochs wide between entrypoint calls.
    pub fn available_balance(&self, token: Address) -> u128 {
        let info = self.token_info(token);
        let mut available = 0u128;
        for epoch in info.first_unprocessed_epoch..=info.current_epoch {
            available += self.epoch_balance(token, epoch).remaining();
        }
        available
    }
}
