//! Fixed-point multiply-then-divide primitives.
//!
//! All ledger arithmetic is integer-only. Products at the 10^36 scale exceed
//! u128, so intermediates are computed in 256 bits and narrowed back with an
//! explicit overflow check. Divisions floor, which keeps every pro-rata
//! rounding loss inside the pool.

use primitive_types::U256;

use crate::constants::PRICE_SCALE;
use crate::error::MathError;

/// Compute `a * b / denominator` with a 256-bit intermediate.
///
/// # Errors
///
/// - [`MathError::DivisionByZero`] if `denominator == 0`
/// - [`MathError::Overflow`] if the result does not fit in u128
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let wide = U256::from(a) * U256::from(b) / U256::from(denominator);
    if wide > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(wide.as_u128())
}

/// Apply a [`PRICE_SCALE`]-scaled multiplier: `value * multiplier / PRICE_SCALE`.
pub fn scale_mul(value: u128, multiplier: u128) -> Result<u128, MathError> {
    mul_div(value, multiplier, PRICE_SCALE)
}
