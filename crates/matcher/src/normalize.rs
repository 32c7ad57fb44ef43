//! Fixed-precision rounding for weight comparisons.
//!
//! Weights arrive as `f64` and are converted to [`Decimal`] before any
//! arithmetic, so repeated additions carry no binary drift. Two values are
//! equal when they round to the same decimal at the configured precision.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Largest scale a [`Decimal`] can hold.
pub const MAX_PRECISION: u32 = 28;

/// Convert a weight to a decimal. `None` for NaN, infinities and values
/// outside the decimal range.
pub fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

/// Round half away from zero to `precision` fractional digits.
pub fn round(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert then round. `None` when the value has no decimal form.
pub fn round_f64(value: f64, precision: u32) -> Option<Decimal> {
    to_decimal(value).map(|d| round(d, precision))
}

pub fn equal_after_rounding(a: Decimal, b: Decimal, precision: u32) -> bool {
    round(a, precision) == round(b, precision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round(dec("2.345"), 2), dec("2.35"));
        assert_eq!(round(dec("-2.345"), 2), dec("-2.35"));
        assert_eq!(round(dec("2.344"), 2), dec("2.34"));
        assert_eq!(round(dec("0.5"), 0), dec("1"));
    }

    #[test]
    fn float_drift_does_not_break_equality() {
        // 0.1 + 0.2 == 0.30000000000000004 in f64
        let sum = to_decimal(0.1).unwrap() + to_decimal(0.2).unwrap();
        assert!(equal_after_rounding(sum, to_decimal(0.3).unwrap(), 2));

        let raw = 0.1f64 + 0.2f64;
        assert!(equal_after_rounding(to_decimal(raw).unwrap(), dec("0.3"), 2));
    }

    #[test]
    fn equality_respects_precision() {
        assert!(equal_after_rounding(dec("19.996"), dec("20"), 2));
        assert!(!equal_after_rounding(dec("19.994"), dec("20"), 2));
        assert!(equal_after_rounding(dec("19.6"), dec("20"), 0));
        assert!(!equal_after_rounding(dec("19.4"), dec("20"), 0));
    }

    #[test]
    fn non_finite_values_have_no_decimal_form() {
        assert!(to_decimal(f64::NAN).is_none());
        assert!(to_decimal(f64::INFINITY).is_none());
        assert!(to_decimal(f64::NEG_INFINITY).is_none());
        assert!(round_f64(1e40, 2).is_none());
    }

    #[test]
    fn whole_numbers_convert_exactly() {
        assert_eq!(round_f64(20.0, 2), Some(dec("20")));
        assert_eq!(round_f64(7.333, 2), Some(dec("7.33")));
    }
}
