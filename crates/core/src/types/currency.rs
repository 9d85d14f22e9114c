//! Currency normalization and minor-unit conversion.
//!
//! Payment providers bill in each currency's smallest unit. Most supported
//! currencies use two decimal places; the zero-decimal ones (yen, won, dong)
//! are billed in whole units and must not be multiplied by 100.

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use rust_decimal::prelude::ToPrimitive;

/// Currency substituted when a request carries an unsupported code.
pub const DEFAULT_CURRENCY: &str = "usd";

/// ISO 4217 codes (lowercase) the checkout accepts.
pub const SUPPORTED_CURRENCIES: &[&str] = &[
    "usd", "eur", "gbp", "cad", "aud", "nzd", "chf", "sek", "nok", "dkk", "sgd", "hkd", "jpy",
    "krw", "vnd",
];

/// Currencies with no minor unit: the charge amount equals the major-unit
/// amount, rounded to a whole number.
pub const ZERO_DECIMAL_CURRENCIES: &[&str] = &["jpy", "krw", "vnd"];

/// Normalize a currency code against the supported allow-list.
///
/// Lowercases the input and substitutes [`DEFAULT_CURRENCY`] when the code
/// is not supported.
#[must_use]
pub fn normalize(code: &str) -> String {
    let lower = code.trim().to_lowercase();
    if SUPPORTED_CURRENCIES.contains(&lower.as_str()) {
        lower
    } else {
        DEFAULT_CURRENCY.to_string()
    }
}

/// Whether a (normalized) currency has no minor unit.
#[must_use]
pub fn is_zero_decimal(code: &str) -> bool {
    ZERO_DECIMAL_CURRENCIES.contains(&code)
}

/// Convert a major-unit amount to the currency's smallest billable unit.
///
/// Two-decimal currencies multiply by 100; zero-decimal currencies round
/// the major-unit amount directly. Returns `None` when the result does not
/// fit in an `i64`.
#[must_use]
pub fn to_minor_units(amount: Decimal, currency: &str) -> Option<i64> {
    let scaled = if is_zero_decimal(currency) {
        amount
    } else {
        amount.checked_mul(Decimal::ONE_HUNDRED)?
    };
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Convert a provider minor-unit amount back to the major unit.
#[must_use]
pub fn from_minor_units(minor: i64, currency: &str) -> Decimal {
    if is_zero_decimal(currency) {
        Decimal::from(minor)
    } else {
        Decimal::new(minor, 2)
    }
}
