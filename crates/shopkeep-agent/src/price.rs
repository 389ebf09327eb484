// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lenient price normalization for model-extracted prices.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Converts a raw price token to a two-decimal fixed-point value.
///
/// Everything except ASCII digits, `.` and `-` is dropped first, so
/// `"$19.99 USD"` becomes `19.99`. Absent, empty or unparseable input
/// yields `0.00`; this never fails. A zero result does not mean the user
/// asked for a free product.
pub fn convert_to_decimal(raw: Option<&str>) -> Decimal {
    let zero = Decimal::new(0, 2);
    let Some(raw) = raw else {
        return zero;
    };

    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return zero;
    }

    match Decimal::from_str(&cleaned) {
        Ok(value) => {
            let mut value = value.round_dp(2);
            value.rescale(2);
            value
        }
        Err(_) => zero,
    }
}

/// Largest price a catalog entry holds: ten digits, two of them decimal.
pub fn max_catalog_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Whether `price` fits a catalog entry: positive and at most
/// [`max_catalog_price`].
pub fn is_catalog_price(price: Decimal) -> bool {
    price > Decimal::ZERO && price <= max_catalog_price()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_currency_and_units() {
        assert_eq!(convert_to_decimal(Some("$19.99 USD")).to_string(), "19.99");
        assert_eq!(convert_to_decimal(Some("25.50")).to_string(), "25.50");
    }

    #[test]
    fn absent_or_empty_is_zero() {
        assert_eq!(convert_to_decimal(None).to_string(), "0.00");
        assert_eq!(convert_to_decimal(Some("")).to_string(), "0.00");
        assert_eq!(convert_to_decimal(Some("free")).to_string(), "0.00");
    }

    #[test]
    fn unparseable_leftovers_are_zero() {
        assert_eq!(convert_to_decimal(Some("1.2.3")).to_string(), "0.00");
        assert_eq!(convert_to_decimal(Some("--")).to_string(), "0.00");
    }

    #[test]
    fn whole_numbers_gain_two_places() {
        assert_eq!(convert_to_decimal(Some("30")).to_string(), "30.00");
    }

    #[test]
    fn extra_precision_is_rounded() {
        assert_eq!(convert_to_decimal(Some("9.999")).to_string(), "10.00");
    }

    #[test]
    fn negative_sign_is_kept() {
        assert_eq!(convert_to_decimal(Some("-5")).to_string(), "-5.00");
    }

    #[test]
    fn catalog_price_range() {
        assert!(is_catalog_price(convert_to_decimal(Some("0.01"))));
        assert!(is_catalog_price(convert_to_decimal(Some("99999999.99"))));
        assert!(!is_catalog_price(convert_to_decimal(Some("100000000"))));
        assert!(!is_catalog_price(convert_to_decimal(Some("$123456789012"))));
        assert!(!is_catalog_price(convert_to_decimal(Some("0"))));
        assert!(!is_catalog_price(convert_to_decimal(Some("-5"))));
        assert_eq!(max_catalog_price().to_string(), "99999999.99");
    }
}
