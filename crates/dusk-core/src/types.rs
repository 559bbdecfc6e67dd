//! Core ledger types: addresses, per-token auction state, epoch balances.
//!
//! All amounts are u128 at the 18-decimal token convention; epoch indices
//! are u64; timestamps are Unix seconds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 20-byte account or token identifier.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Create an Address from a byte array.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Per-token auction state, created lazily on first interaction.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TokenInfo {
    /// Anchor price of the whole sellable pool at `last_time`.
    pub last_value: u128,
    /// Timestamp (seconds) at which `last_value` was recorded.
    pub last_time: u64,
    /// Latest open epoch index. Non-decreasing.
    pub current_epoch: u64,
    /// Oldest epoch not yet finalized. Non-decreasing, `<= current_epoch`.
    pub first_unprocessed_epoch: u64,
}

/// Aggregate balances of one (token, epoch) pair.
///
/// Epochs are sparse; a never-touched epoch reads as [`EpochBalance::ZERO`].
/// While an epoch is still sellable `traded <= total_supply`; once its
/// depositors have been settled, `total_supply` drops toward zero while
/// `traded` keeps the historical sold amount.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EpochBalance {
    /// Reward tokens deposited into this epoch across all users.
    pub total_supply: u128,
    /// Portion of `total_supply` already sold through the auction.
    pub traded: u128,
    /// Settlement-token proceeds collected for this epoch's sales.
    pub token_balance: u128,
}

impl EpochBalance {
    /// The canonical zero record returned for missing (token, epoch) keys.
    pub const ZERO: Self = Self { total_supply: 0, traded: 0, token_balance: 0 };

    /// Unsold remainder of this epoch, in reward-token units.
    ///
    /// Saturating: a settled epoch's `traded` exceeds its reduced
    /// `total_supply` and has nothing left to sell.
    pub fn remaining(&self) -> u128 {
        self.total_supply.saturating_sub(self.traded)
    }
}
