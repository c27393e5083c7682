//! Money rounding primitive used by the block validator.
//!
//! Statement amounts are `i64` minor currency units everywhere; the only
//! fractional value in the system is the 5% minimum-payment computation,
//! which goes through `rust_decimal` to keep ties exact.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Rounds half away from zero's truncation: truncate toward zero, then add
/// one when the fractional remainder is at least 0.5.
///
/// This is the statement generator's own rounding rule, so ties must match
/// it exactly: `2.5` rounds to `3`, but `-2.5` rounds to `-2` because the
/// negative fractional part `-0.5` never reaches the `0.5` threshold.
///
/// Values whose integral part falls outside `i64` saturate at the bounds.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use ptstmt_audit::money::round_half_up;
///
/// assert_eq!(round_half_up(Decimal::new(25, 1)), 3); // 2.5
/// assert_eq!(round_half_up(Decimal::new(-25, 1)), -2); // -2.5
/// ```
pub fn round_half_up(value: Decimal) -> i64 {
    let truncated = value.trunc();
    let frac = value - truncated;

    let rounded = if frac >= Decimal::new(5, 1) {
        truncated + Decimal::ONE
    } else {
        truncated
    };

    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}
