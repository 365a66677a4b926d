//! Money Module
//!
//! Every amount in the wallet is a `rust_decimal::Decimal` in whole currency
//! units (`9.80` means nine units and eighty minor units). All conversions
//! between client text and `Decimal`, and all rounding, go through here.
//!
//! ## Rules
//! 1. Client amounts are strict: positive, finite, at most `minor_units`
//!    decimal places. Extra precision is rejected, never truncated.
//! 2. Derived amounts (commission) are rounded to the minor unit with
//!    midpoint-away-from-zero.
//! 3. Display always shows exactly `minor_units` places.

use rust_decimal::prelude::*;
use thiserror::Error;

/// Money conversion errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount must be greater than zero")]
    NotPositive,

    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Parse a client amount string.
///
/// # Errors
/// * `InvalidFormat` - empty, signed, or not a plain decimal literal
/// * `NotPositive` - zero
/// * `PrecisionOverflow` - more than `minor_units` decimal places
pub fn parse_amount(amount_str: &str, minor_units: u32) -> Result<Decimal, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    // "-0" and "+5" are both rejected, the sign is never meaningful here
    if amount_str.starts_with('-') || amount_str.starts_with('+') {
        return Err(MoneyError::InvalidFormat(format!(
            "signed amount not allowed: {}",
            amount_str
        )));
    }

    let value = Decimal::from_str_exact(amount_str)
        .map_err(|_| MoneyError::InvalidFormat(format!("not a decimal number: {}", amount_str)))?;

    validate_amount(value, minor_units)
}

/// Validate an already-typed amount against the same rules as [`parse_amount`].
pub fn validate_amount(value: Decimal, minor_units: u32) -> Result<Decimal, MoneyError> {
    if value.is_sign_negative() || value.is_zero() {
        return Err(MoneyError::NotPositive);
    }

    let normalized = value.normalize();
    if normalized.scale() > minor_units {
        return Err(MoneyError::PrecisionOverflow {
            provided: normalized.scale(),
            max: minor_units,
        });
    }

    Ok(normalized)
}

/// Round to the currency's minor unit (midpoint away from zero).
#[inline]
pub fn round_minor(value: Decimal, minor_units: u32) -> Decimal {
    value.round_dp_with_strategy(minor_units, RoundingStrategy::MidpointAwayFromZero)
}

/// Format with exactly `minor_units` decimal places, e.g. `9.8` -> `"9.80"`.
pub fn format_amount(value: Decimal, minor_units: u32) -> String {
    let mut v = round_minor(value, minor_units);
    v.rescale(minor_units);
    v.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_valid() {
        assert_eq!(parse_amount("10", 2).unwrap(), Decimal::new(10, 0));
        assert_eq!(parse_amount("10.5", 2).unwrap(), Decimal::new(105, 1));
        assert_eq!(parse_amount(" 0.01 ", 2).unwrap(), Decimal::new(1, 2));
        // trailing zeros do not count towards precision
        assert_eq!(parse_amount("7.500", 2).unwrap(), Decimal::new(75, 1));
    }

    #[test]
    fn test_parse_amount_rejects() {
        assert_eq!(parse_amount("0", 2), Err(MoneyError::NotPositive));
        assert_eq!(parse_amount("0.00", 2), Err(MoneyError::NotPositive));
        assert!(matches!(
            parse_amount("-5", 2),
            Err(MoneyError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_amount("", 2),
            Err(MoneyError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_amount("abc", 2),
            Err(MoneyError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_amount("NaN", 2),
            Err(MoneyError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_amount("inf", 2),
            Err(MoneyError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_sub_minor_unit_amount_rejected_not_rounded() {
        assert_eq!(
            parse_amount("1.005", 2),
            Err(MoneyError::PrecisionOverflow {
                provided: 3,
                max: 2
            })
        );
        assert_eq!(
            validate_amount(Decimal::new(1, 3), 2),
            Err(MoneyError::PrecisionOverflow {
                provided: 3,
                max: 2
            })
        );
        // wider minor units accept what two places would not
        assert_eq!(parse_amount("1.005", 3).unwrap(), Decimal::new(1005, 3));
    }

    #[test]
    fn test_round_minor() {
        // 10.00 * 0.02
        assert_eq!(round_minor(Decimal::new(2000, 4), 2), Decimal::new(20, 2));
        // 0.125 -> 0.13 (midpoint away from zero)
        assert_eq!(round_minor(Decimal::new(125, 3), 2), Decimal::new(13, 2));
        // 0.124 -> 0.12
        assert_eq!(round_minor(Decimal::new(124, 3), 2), Decimal::new(12, 2));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(98, 1), 2), "9.80");
        assert_eq!(format_amount(Decimal::new(30, 0), 2), "30.00");
        assert_eq!(format_amount(Decimal::new(50750, 2), 2), "507.50");
    }
}
