//! Precomputed repeated-squaring table for the per-second deceleration.

use dusk_core::constants::{DECELERATION_TABLE_SIZE, PRICE_SCALE};
use dusk_core::error::CurveError;
use dusk_core::math::scale_mul;

/// Powers of the deceleration factor at every power-of-two exponent.
///
/// Entry `i` holds `d^(2^i)` at [`PRICE_SCALE`] fixed-point, so the decay
/// over any elapsed-seconds value can be composed from its binary
/// decomposition with one multiply per set bit. Each entry is the square
/// of the previous one, so the sequence is strictly decreasing (for
/// `d < PRICE_SCALE`) and entries shrink toward zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecelerationTable {
    entries: [u128; DECELERATION_TABLE_SIZE],
}

impl DecelerationTable {
    /// Build the table for a per-second deceleration `d`.
    ///
    /// # Errors
    ///
    /// [`CurveError::DecelerationOutOfRange`] unless `0 < d < PRICE_SCALE`;
    /// a factor of zero kills the price in one second and a factor at or
    /// above one never decays.
    pub fn new(deceleration: u128) -> Result<Self, CurveError> {
        if deceleration == 0 || deceleration >= PRICE_SCALE {
            return Err(CurveError::DecelerationOutOfRange(deceleration));
        }

        let mut entries = [0u128; DECELERATION_TABLE_SIZE];
        entries[0] = deceleration;
        for i in 1..DECELERATION_TABLE_SIZE {
            // d^(2^i) = (d^(2^(i-1)))^2. Both factors are below PRICE_SCALE
            // so the scaled product cannot overflow.
            entries[i] = scale_mul(entries[i - 1], entries[i - 1])?;
        }

        Ok(Self { entries })
    }

    /// The multiplier for `2^index` seconds of decay, if within the table.
    pub fn get(&self, index: usize) -> Option<u128> {
        self.entries.get(index).copied()
    }

    /// Number of power-of-two exponents covered.
    pub const fn len(&self) -> usize {
        DECELERATION_TABLE_SIZE
    }

    /// The table is never empty; present for clippy's `len` convention.
    pub const fn is_empty(&self) -> bool {
        false
    }
}
