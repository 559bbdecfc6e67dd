//! # dusk-core
//! Foundation types, traits and fixed-point math for the Dusk collector.

pub mod constants;
pub mod error;
pub mod math;
pub mod traits;
pub mod types;
