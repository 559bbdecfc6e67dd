//! # dusk-decay: continuous Dutch-auction price decay engine.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! The auction price decays by a per-second deceleration factor `d < 1`.
//! Rather than multiplying second by second, the engine precomputes
//! `d^(2^i)` for every table index at construction and composes the decay
//! for an arbitrary elapsed time from the binary decomposition of the
//! second count, one fixed-point multiply per set bit. Prices saturate at
//! a configured floor, and any elapsed time wider than the table is already
//! below the floor by construction.

pub mod engine;
pub mod table;

pub use engine::DecayEngine;
pub use table::DecelerationTable;
