//! Protocol constants. All fixed-point fractions are scaled by [`PRICE_SCALE`].

/// Fixed-point scale for all multiplier arithmetic: every fraction is stored
/// as an integer numerator over this implicit denominator.
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000_000_000_000_000_000_000; // 10^36

/// One whole token at the 18-decimal convention used by reward and
/// settlement tokens.
pub const TOKEN_UNIT: u128 = 1_000_000_000_000_000_000;

/// Number of repeated-squaring entries in the deceleration table.
///
/// `table[i]` holds `d^(2^i)`, so the table covers elapsed times up to
/// `2^24 - 1` seconds (about 194 days). At the reference deceleration the
/// high entries have already truncated to zero, so any elapsed time that
/// needs a bit beyond the table has decayed to the floor regardless.
pub const DECELERATION_TABLE_SIZE: usize = 24;

/// Reference per-second deceleration factor: 0.9999, scaled by [`PRICE_SCALE`].
///
/// Price halves roughly every 6 931 seconds (`ln 2 / 0.0001`).
pub const DEFAULT_DECELERATION: u128 = 999_900_000_000_000_000_000_000_000_000_000_000;

/// Reference auction floor: 100 tokens.
pub const DEFAULT_MIN_VALUE: u128 = 100 * TOKEN_UNIT;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_scale_is_1e36() {
        assert_eq!(PRICE_SCALE, 10u128.pow(36));
    }

    #[test]
    fn default_deceleration_is_point_9999() {
        // 0.9999 * 10^36
        assert_eq!(DEFAULT_DECELERATION, PRICE_SCALE / 10_000 * 9_999);
        assert!(DEFAULT_DECELERATION < PRICE_SCALE);
    }

    #[test]
    fn default_min_value_is_100_tokens() {
        assert_eq!(DEFAULT_MIN_VALUE, 100_000_000_000_000_000_000);
    }

    #[test]
    fn table_covers_decay_to_floor() {
        // d^(2^24) for d = 0.9999 is e^(-1677) of the scale, far below one
        // scale unit; the beyond-table short-circuit is therefore exact.
        assert!(DECELERATION_TABLE_SIZE >= 20);
    }
}
