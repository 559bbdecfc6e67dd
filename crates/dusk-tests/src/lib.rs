//! Integration test suite for the Dusk fee collector.
//!
//! The scenario tests replay full deposit/trade/claim lifecycles against
//! the real decay engine; the conservation suite drives random operation
//! sequences and checks that custody always covers the books.

pub mod helpers;
