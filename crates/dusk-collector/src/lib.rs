//! # dusk-collector: epoch ledger and auction entrypoints.
//!
//! [`FeeCollector`] sells deposited reward tokens through a continuous
//! Dutch auction and accounts the settlement-token proceeds back to the
//! depositors, epoch by epoch. Custody of the actual tokens is delegated
//! to a [`dusk_core::traits::TokenTransfer`] implementation; pricing to a
//! [`dusk_core::traits::PriceCurve`]. The ledger itself never holds value,
//! only the bookkeeping.

pub mod collector;
pub mod ledger;

pub use collector::FeeCollector;
pub use ledger::TokenLedger;
