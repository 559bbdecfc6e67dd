//! Trait interfaces for the Dusk collector.
//!
//! These traits define the contracts between crates:
//! - [`PriceCurve`]: auction price decay math (dusk-decay implements)
//! - [`TokenTransfer`]: the external fungible-token capability the
//!   collector moves value through (host environment implements)

use crate::error::{MathError, TransferError};
use crate::types::Address;

/// Pure computation of the auction price at a point in time.
///
/// Implementations are deterministic functions of the anchor
/// `(last_value, last_time)` and `now`; all arithmetic is integer-only.
pub trait PriceCurve: Send + Sync {
    /// Price of the whole sellable pool at `now`, given the anchor.
    ///
    /// `now < last_time` must not occur from callers and is treated as zero
    /// elapsed time. The result saturates at the curve's floor value, so a
    /// fresh token (`last_value == 0`) prices at the floor.
    fn price_for_time(&self, last_value: u128, last_time: u64, now: u64)
        -> Result<u128, MathError>;
}

/// Custody operations against external fungible tokens.
///
/// The collector trusts the implementation's return value: an `Err` aborts
/// the enclosing entrypoint with no ledger change, an `Ok` means the value
/// moved. Implementations must not call back into the collector.
pub trait TokenTransfer {
    /// Pull `amount` of `token` from `from` into the collector's custody.
    fn transfer_in(&mut self, token: Address, from: Address, amount: u128)
        -> Result<(), TransferError>;

    /// Pay `amount` of `token` out of the collector's custody to `to`.
    fn transfer_out(&mut self, token: Address, to: Address, amount: u128)
        -> Result<(), TransferError>;
}
