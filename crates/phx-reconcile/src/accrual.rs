//! Power-law streak accrual curve.

/// Coins earned per hour at the curve's linear reference point.
/// Product-defined constant; not tunable.
pub const COIN_RATE: f64 = 10.0;

/// Super-linear growth exponent. Product-defined constant; not tunable.
pub const COIN_EXPONENT: f64 = 1.2;

/// Coins earned by an uninterrupted streak of `hours`.
///
/// `floor(10 × hours^1.2)`, 0 for non-positive hours. Monotone
/// non-decreasing in `hours`.
pub fn streak_coins(hours: f64) -> i64 {
    if hours <= 0.0 {
        return 0;
    }
    (COIN_RATE * hours.powf(COIN_EXPONENT)).floor() as i64
}
