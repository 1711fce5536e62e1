//! Cent-denominated amount utilities.
//!
//! ## Overview
//!
//! Every amount in the engine (capacity, requested, weight, allocation) is a
//! [`Decimal`]. Shares are computed at full decimal precision and only brought
//! down to the minimal currency unit (one cent) by the reconciler.
//!
//! ## Rounding
//!
//! Rounding is half-away-from-zero: `2.345 -> 2.35`, `2.344 -> 2.34`.
//!
//! ## Examples
//!
//! ```
//! use prorata_allocator::types::amount::{round_to_cents, format_amount, parse_amount};
//! use rust_decimal::Decimal;
//!
//! let share = Decimal::new(33_335, 4); // 3.3335
//! assert_eq!(round_to_cents(share), Decimal::new(334, 2));
//!
//! let parsed = parse_amount("capacity", "$1,250.5").unwrap();
//! assert_eq!(format_amount(parsed), "1250.50");
//! ```

use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::InvalidInputError;

/// One cent, the minimal currency unit
pub const CENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Half a cent. Dust below this magnitude is treated as zero.
pub const HALF_CENT: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Number of decimal places in a cent-denominated amount
pub const CENT_SCALE: u32 = 2;

// ============================================================================
// Rounding
// ============================================================================

/// Round to the nearest cent, halves away from zero
///
/// # Example
///
/// ```
/// use prorata_allocator::types::amount::round_to_cents;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_to_cents(Decimal::new(2345, 3)), Decimal::new(235, 2));
/// assert_eq!(round_to_cents(Decimal::new(2344, 3)), Decimal::new(234, 2));
/// ```
pub fn round_to_cents(value: Decimal) -> Decimal {
    to_cent_scale(value.round_dp_with_strategy(CENT_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// Drop everything below one cent
///
/// Used as the ceiling for a claimant whose requested amount carries
/// sub-cent precision: a cent-denominated allocation never exceeds it.
pub fn truncate_to_cents(value: Decimal) -> Decimal {
    to_cent_scale(value.round_dp_with_strategy(CENT_SCALE, RoundingStrategy::ToZero))
}

// `80` and `80.0` both become `80.00`, so serialized amounts always show cents
fn to_cent_scale(mut value: Decimal) -> Decimal {
    value.rescale(CENT_SCALE);
    value
}

// ============================================================================
// Integer cents
// ============================================================================

/// Convert an amount to whole cents (rounded)
///
/// # Returns
///
/// * `Some(i64)` - Number of cents
/// * `None` - If the value does not fit in an i64
pub fn to_cents(value: Decimal) -> Option<i64> {
    round_to_cents(value)
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_i64()
}

/// Convert whole cents to an amount
///
/// ```
/// use prorata_allocator::types::amount::from_cents;
/// use rust_decimal::Decimal;
///
/// assert_eq!(from_cents(1999), Decimal::new(1999, 2));
/// ```
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, CENT_SCALE)
}

/// Magnitude in cents, saturating at `u64::MAX`
pub fn abs_cents(value: Decimal) -> u64 {
    to_cents(value.abs()).map_or(u64::MAX, |c| c.unsigned_abs())
}

// ============================================================================
// Text conversion
// ============================================================================

/// Render an amount with exactly two decimals
///
/// ```
/// use prorata_allocator::types::amount::format_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_amount(Decimal::new(80, 0)), "80.00");
/// assert_eq!(format_amount(Decimal::new(33_3333, 4)), "33.33");
/// ```
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round_to_cents(value))
}

/// Parse an amount typed by a person: `$` signs and `,` grouping are ignored
///
/// # Arguments
///
/// * `field` - Field label used in the error
/// * `text` - Raw text
pub fn parse_amount(field: &str, text: &str) -> Result<Decimal, InvalidInputError> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();

    Decimal::from_str(&cleaned).map_err(|_| InvalidInputError::UnparsableAmount {
        field: field.to_string(),
        text: text.to_string(),
    })
}

/// Convert an f64 into a [`Decimal`], refusing NaN and infinities
pub fn decimal_from_f64(field: &str, value: f64) -> Result<Decimal, InvalidInputError> {
    let non_finite = || InvalidInputError::NonFinite {
        field: field.to_string(),
    };

    if !value.is_finite() {
        return Err(non_finite());
    }
    Decimal::from_f64(value).ok_or_else(non_finite)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_cent_constants() {
        assert_eq!(CENT, dec("0.01"));
        assert_eq!(HALF_CENT, dec("0.005"));
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to_cents(dec("0.005")), dec("0.01"));
        assert_eq!(round_to_cents(dec("0.0049")), dec("0.00"));
        assert_eq!(round_to_cents(dec("3.3333333")), dec("3.33"));
        assert_eq!(round_to_cents(dec("0.6666666")), dec("0.67"));
        assert_eq!(round_to_cents(dec("-0.005")), dec("-0.01"));
    }

    #[test]
    fn test_rounded_amounts_carry_two_decimals() {
        assert_eq!(round_to_cents(dec("80")).to_string(), "80.00");
        assert_eq!(round_to_cents(dec("80.0")).to_string(), "80.00");
        assert_eq!(truncate_to_cents(dec("10")).to_string(), "10.00");
    }

    #[test]
    fn test_truncate_to_cents() {
        assert_eq!(truncate_to_cents(dec("3.339")), dec("3.33"));
        assert_eq!(truncate_to_cents(dec("10")), dec("10"));
    }

    #[test]
    fn test_cents_conversion() {
        assert_eq!(to_cents(dec("10.00")), Some(1000));
        assert_eq!(to_cents(dec("0.015")), Some(2));
        assert_eq!(to_cents(dec("-0.01")), Some(-1));
        assert_eq!(from_cents(1000), dec("10.00"));
        assert_eq!(abs_cents(dec("-0.03")), 3);
        assert_eq!(abs_cents(Decimal::MAX), u64::MAX);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
        assert_eq!(format_amount(dec("1250.5")), "1250.50");
        assert_eq!(format_amount(dec("3.335")), "3.34");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("capacity", "100").unwrap(), dec("100"));
        assert_eq!(parse_amount("capacity", " $1,000.25 ").unwrap(), dec("1000.25"));
        assert_eq!(parse_amount("capacity", "-4").unwrap(), dec("-4"));

        let err = parse_amount("weight", "abc").unwrap_err();
        assert_eq!(
            err,
            InvalidInputError::UnparsableAmount {
                field: "weight".to_string(),
                text: "abc".to_string(),
            }
        );
        assert!(parse_amount("weight", "").is_err());
    }

    #[test]
    fn test_decimal_from_f64_rejects_non_finite() {
        assert_eq!(decimal_from_f64("capacity", 2.5).unwrap(), dec("2.5"));
        assert!(matches!(
            decimal_from_f64("capacity", f64::NAN),
            Err(InvalidInputError::NonFinite { .. })
        ));
        assert!(decimal_from_f64("weight", f64::INFINITY).is_err());
        assert!(decimal_from_f64("weight", f64::NEG_INFINITY).is_err());
    }
}
