//! Brazilian real amounts and their display format.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while reading an amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid amount: {0}")]
    Invalid(String),
}

/// An amount in Brazilian reais.
///
/// Displays the way the `pt-BR` locale formats currency: `R$ 1.234,56`,
/// always with two decimal places and half-away-from-zero rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Brl(Decimal);

impl Brl {
    /// Zero reais.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse an amount as sent by the API (`"1234.5"`, `"100.00"`, `"0"`).
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Invalid`] if the text is not a decimal number.
    pub fn parse(text: &str) -> Result<Self, MoneyError> {
        Decimal::from_str(text.trim())
            .map(Self)
            .map_err(|_| MoneyError::Invalid(text.to_owned()))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Returns `true` for an amount of exactly zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl From<Decimal> for Brl {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl FromStr for Brl {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Brl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let mut magnitude = rounded.abs();
        magnitude.rescale(2);

        let text = magnitude.to_string();
        let (units, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        if rounded.is_sign_negative() && !rounded.is_zero() {
            f.write_str("-")?;
        }
        write!(f, "R$ {},{cents}", group_thousands(units))
    }
}

/// Insert `.` between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn brl(text: &str) -> String {
        Brl::parse(text).unwrap().to_string()
    }

    #[test]
    fn test_two_decimal_places() {
        assert_eq!(brl("100"), "R$ 100,00");
        assert_eq!(brl("100.00"), "R$ 100,00");
        assert_eq!(brl("0.5"), "R$ 0,50");
        assert_eq!(brl("0"), "R$ 0,00");
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(brl("1234.56"), "R$ 1.234,56");
        assert_eq!(brl("999.99"), "R$ 999,99");
        assert_eq!(brl("1000"), "R$ 1.000,00");
        assert_eq!(brl("1234567.8"), "R$ 1.234.567,80");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(brl("10.005"), "R$ 10,01");
        assert_eq!(brl("10.004"), "R$ 10,00");
        assert_eq!(brl("-2.345"), "-R$ 2,35");
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        assert_eq!(brl("-0.001"), "R$ 0,00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            Brl::parse("abc"),
            Err(MoneyError::Invalid("abc".to_string()))
        );
        assert!(Brl::parse(" 12.50 ").is_ok());
    }
}
