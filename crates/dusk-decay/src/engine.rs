//! Price evaluation over the deceleration table.

use tracing::trace;

use dusk_core::error::{CurveError, MathError};
use dusk_core::math::scale_mul;
use dusk_core::traits::PriceCurve;

use crate::table::DecelerationTable;

/// Dutch-auction decay engine with a hard price floor.
///
/// Holds the precomputed [`DecelerationTable`] and the floor (`min_value`).
/// Evaluation is O(set bits of elapsed seconds) and allocation-free.
#[derive(Clone, Debug)]
pub struct DecayEngine {
    table: DecelerationTable,
    min_value: u128,
}

impl DecayEngine {
    /// Construct an engine from a per-second deceleration and a floor.
    ///
    /// # Errors
    ///
    /// - [`CurveError::DecelerationOutOfRange`] unless `0 < deceleration < PRICE_SCALE`
    /// - [`CurveError::ZeroFloor`] if `min_value == 0`; a zero floor would
    ///   let the price decay to nothing and zero out trade quotes
    pub fn new(deceleration: u128, min_value: u128) -> Result<Self, CurveError> {
        if min_value == 0 {
            return Err(CurveError::ZeroFloor);
        }
        let table = DecelerationTable::new(deceleration)?;
        Ok(Self { table, min_value })
    }

    /// The configured price floor.
    pub fn min_value(&self) -> u128 {
        self.min_value
    }

    /// Decay `value` by `elapsed` seconds, clamped at the floor.
    fn decay(&self, value: u128, elapsed: u64) -> Result<u128, MathError> {
        if value <= self.min_value {
            return Ok(self.min_value);
        }

        let mut price = value;
        let mut remaining = elapsed;
        let mut bit = 0usize;
        while remaining != 0 {
            if remaining & 1 == 1 {
                match self.table.get(bit) {
                    Some(multiplier) => price = scale_mul(price, multiplier)?,
                    // Decay over 2^bit seconds is below any representable
                    // fraction of the anchor; the floor has long been hit.
                    None => return Ok(self.min_value),
                }
                if price <= self.min_value {
                    return Ok(self.min_value);
                }
            }
            remaining >>= 1;
            bit += 1;
        }

        Ok(price)
    }
}

impl PriceCurve for DecayEngine {
    fn price_for_time(
        &self,
        last_value: u128,
        last_time: u64,
        now: u64,
    ) -> Result<u128, MathError> {
        // A caller clock behind the anchor reads as zero elapsed time.
        let elapsed = now.saturating_sub(last_time);
        let price = self.decay(last_value, elapsed)?;
        trace!(last_value, elapsed, price, "price evaluated");
        Ok(price)
    }
}
