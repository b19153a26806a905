//! Monetary primitives with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts wrap `rust_decimal::Decimal` and travel as decimal strings.
//! Inbound money is read with `rust_decimal::serde::str`, so a JSON number
//! is refused instead of going through `f64`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Currency assigned to funds when none is given.
pub const DEFAULT_CURRENCY: &str = "VND";

/// Maximum number of fractional digits stored for money (`NUMERIC(20, 2)`).
pub const MONEY_SCALE: u32 = 2;

/// Reasons a decimal cannot be used as a monetary amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Amount is zero or negative.
    #[error("amount must be greater than zero, got {0}")]
    NotPositive(Decimal),

    /// Amount is negative where zero is allowed.
    #[error("amount must not be negative, got {0}")]
    Negative(Decimal),

    /// Amount has more fractional digits than the ledger stores.
    #[error("amount {0} has more than {MONEY_SCALE} decimal places")]
    TooPrecise(Decimal),
}

/// A strictly positive monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Creates an amount, rejecting zero, negative, and over-precise values.
    ///
    /// # Errors
    ///
    /// Returns `AmountError` if the value is not a valid ledger amount.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }
        check_scale(value)?;
        Ok(Self(value.normalize()))
    }

    /// Returns the inner decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = rust_decimal::serde::str::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validates a balance value (zero allowed, negative rejected).
///
/// # Errors
///
/// Returns `AmountError` if the balance is negative or over-precise.
pub fn validate_balance(value: Decimal) -> Result<Decimal, AmountError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmountError::Negative(value));
    }
    check_scale(value)?;
    Ok(value.normalize())
}

fn check_scale(value: Decimal) -> Result<(), AmountError> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(AmountError::TooPrecise(value));
    }
    Ok(())
}

/// Normalizes a currency code to uppercase, falling back to `default` when blank.
///
/// # Errors
///
/// Returns an error message if the code is not three ASCII letters.
pub fn normalize_currency(code: Option<&str>, default: &str) -> Result<String, String> {
    let code = code.map(str::trim).filter(|c| !c.is_empty()).unwrap_or(default);
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("Invalid currency code: {code}"));
    }
    Ok(code.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_accepts_positive() {
        let amount = Amount::new(dec!(150.50)).unwrap();
        assert_eq!(amount.value(), dec!(150.5));
    }

    #[test]
    fn test_amount_rejects_zero_and_negative() {
        assert_eq!(Amount::new(dec!(0)), Err(AmountError::NotPositive(dec!(0))));
        assert_eq!(
            Amount::new(dec!(-1)),
            Err(AmountError::NotPositive(dec!(-1)))
        );
    }

    #[test]
    fn test_amount_rejects_sub_cent_precision() {
        assert!(matches!(
            Amount::new(dec!(0.001)),
            Err(AmountError::TooPrecise(_))
        ));
        // trailing zeros do not count as precision
        assert!(Amount::new(dec!(1.2300)).is_ok());
    }

    #[test]
    fn test_amount_serializes_as_string() {
        let amount = Amount::new(dec!(1000)).unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"1000\"");
        let parsed: Amount = serde_json::from_str("\"12.34\"").unwrap();
        assert_eq!(parsed.value(), dec!(12.34));
        assert!(serde_json::from_str::<Amount>("\"-5\"").is_err());
    }

    #[test]
    fn test_amount_refuses_json_numbers() {
        assert!(serde_json::from_str::<Amount>("12345678901234567.89").is_err());
        assert!(serde_json::from_str::<Amount>("100").is_err());

        let exact: Amount = serde_json::from_str("\"12345678901234567.89\"").unwrap();
        assert_eq!(exact.value(), dec!(12345678901234567.89));
    }

    #[test]
    fn test_validate_balance() {
        assert_eq!(validate_balance(dec!(0)).unwrap(), dec!(0));
        assert_eq!(validate_balance(dec!(10.10)).unwrap(), dec!(10.1));
        assert!(matches!(
            validate_balance(dec!(-0.01)),
            Err(AmountError::Negative(_))
        ));
    }

    #[test]
    fn test_normalize_currency() {
        assert_eq!(normalize_currency(None, DEFAULT_CURRENCY).unwrap(), "VND");
        assert_eq!(normalize_currency(Some("usd"), DEFAULT_CURRENCY).unwrap(), "USD");
        assert_eq!(normalize_currency(Some("  "), DEFAULT_CURRENCY).unwrap(), "VND");
        assert!(normalize_currency(Some("dollars"), DEFAULT_CURRENCY).is_err());
        assert!(normalize_currency(Some("U$D"), DEFAULT_CURRENCY).is_err());
    }
}
