//! Shared test helpers: an in-memory custody backend and prefunded fixtures.

use std::collections::HashMap;
use std::sync::Once;

use dusk_collector::FeeCollector;
use dusk_core::constants::{DEFAULT_DECELERATION, DEFAULT_MIN_VALUE};
use dusk_core::error::TransferError;
use dusk_core::traits::TokenTransfer;
use dusk_core::types::Address;
use dusk_decay::DecayEngine;

/// The settlement currency of every test fixture.
pub const SETTLEMENT: Address = Address([0x1c; 20]);

/// A reward token most scenarios auction off.
pub const REWARD: Address = Address([0xe7; 20]);

/// Simple address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address([seed; 20])
}

/// In-memory token custody, the test double for the transfer capability.
///
/// Tracks external holdings per `(token, owner)` and the collector's own
/// custody per token, so tests can assert both sides of every move.
#[derive(Debug, Default)]
pub struct MockBank {
    holdings: HashMap<(Address, Address), u128>,
    custody: HashMap<Address, u128>,
}

impl MockBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fund(&mut self, token: Address, owner: Address, amount: u128) {
        *self.holdings.entry((token, owner)).or_default() += amount;
    }

    /// External balance of `owner` in `token`.
    pub fn holding(&self, token: Address, owner: Address) -> u128 {
        self.holdings.get(&(token, owner)).copied().unwrap_or(0)
    }

    /// Amount of `token` held in the collector's custody.
    pub fn in_custody(&self, token: Address) -> u128 {
        self.custody.get(&token).copied().unwrap_or(0)
    }
}

impl TokenTransfer for MockBank {
    fn transfer_in(
        &mut self,
        token: Address,
        from: Address,
        amount: u128,
    ) -> Result<(), TransferError> {
        let have = self.holdings.entry((token, from)).or_default();
        if *have < amount {
            return Err(TransferError::InsufficientBalance { have: *have, need: amount });
        }
        *have -= amount;
        *self.custody.entry(token).or_default() += amount;
        Ok(())
    }

    fn transfer_out(
        &mut self,
        token: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), TransferError> {
        let have = self.custody.entry(token).or_default();
        if *have < amount {
            return Err(TransferError::InsufficientBalance { have: *have, need: amount });
        }
        *have -= amount;
        *self.holdings.entry((token, to)).or_default() += amount;
        Ok(())
    }
}

pub type TestCollector = FeeCollector<MockBank, DecayEngine>;

static TRACING: Once = Once::new();

/// Route collector traces to the test writer; `RUST_LOG` filters as usual.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Collector over the reference deployment parameters (floor of 100 tokens,
/// deceleration 0.9999 per second), with `users` prefunded in both the
/// reward and settlement tokens.
pub fn collector_with_users(users: &[Address]) -> TestCollector {
    init_tracing();
    let mut bank = MockBank::new();
    for &user in users {
        bank.fund(REWARD, user, u128::MAX / 4);
        bank.fund(SETTLEMENT, user, u128::MAX / 4);
    }
    let engine = DecayEngine::new(DEFAULT_DECELERATION, DEFAULT_MIN_VALUE)
        .expect("reference parameters are valid");
    FeeCollector::new(bank, engine, SETTLEMENT)
}
