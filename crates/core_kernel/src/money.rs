//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.
//!
//! Amounts keep their full precision through every intermediate step.
//! Rounding (half-up, two places) happens once, when an amount is turned
//! into a display string.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits shown for every currency
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid percentage: {0} is outside 0..=100")]
    InvalidPercentage(Decimal),

    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),
}

/// An ISO-like currency code used for display only
///
/// No conversion is ever performed between currencies; the code only
/// selects the symbol used when formatting amounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses a three-letter code, normalizing it to uppercase
    pub fn parse(code: &str) -> Result<Self, MoneyError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MoneyError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// US dollar
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Returns the normalized code
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Returns the currency symbol for well-known codes
    pub fn symbol(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "USD" => Some("$"),
            "EUR" => Some("€"),
            "GBP" => Some("£"),
            "JPY" => Some("¥"),
            "INR" => Some("₹"),
            "AUD" => Some("A$"),
            "CAD" => Some("C$"),
            "SGD" => Some("S$"),
            "HKD" => Some("HK$"),
            _ => None,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> String {
        code.0
    }
}

/// A monetary amount
///
/// Money carries no currency of its own: an invoice is single-currency and
/// the code is only needed at the display boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new Money value without rounding
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Creates a zero amount
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies by a scalar (e.g. a quantity)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self(self.0 * factor)
    }

    /// Returns `percent`% of this amount
    pub fn percent_of(&self, percent: Percentage) -> Self {
        Self(self.0 * percent.as_fraction())
    }

    /// Sums a sequence of amounts without intermediate rounding
    pub fn total<I>(amounts: I) -> Self
    where
        I: IntoIterator<Item = Money>,
    {
        amounts.into_iter().sum()
    }

    /// Rounds half away from zero to `dp` places
    pub fn round_half_up(&self, dp: u32) -> Self {
        Self(self.0.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Formats the amount with two decimal places and the currency symbol
    ///
    /// Unknown codes are written as a prefix: `CHF 12.50`.
    pub fn to_display_string(&self, currency: &CurrencyCode) -> String {
        let (sign, magnitude) = self.display_parts();
        match currency.symbol() {
            Some(symbol) => format!("{sign}{symbol}{magnitude}"),
            None => format!("{sign}{} {magnitude}", currency.code()),
        }
    }
}

impl Money {
    /// Sign and rounded magnitude; amounts that round to zero carry no sign
    fn display_parts(&self) -> (&'static str, String) {
        let mut rounded = self.round_half_up(DISPLAY_DECIMAL_PLACES).0;
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
        rounded = rounded.abs();
        rounded.rescale(DISPLAY_DECIMAL_PLACES);
        (sign, rounded.to_string())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, magnitude) = self.display_parts();
        write!(f, "{sign}{magnitude}")
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// A percentage bounded to `0..=100` (discounts, tax rates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Percentage = Percentage(Decimal::ZERO);

    /// Creates a percentage from a value such as `12.5` for 12.5%
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO || value > dec!(100) {
            return Err(MoneyError::InvalidPercentage(value));
        }
        Ok(Self(value))
    }

    /// Returns the percentage value (e.g. `20` for 20%)
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the percentage as a fraction (e.g. `0.2` for 20%)
    pub fn as_fraction(&self) -> Decimal {
        self.0 / dec!(100)
    }

    /// Returns `100 - self`
    pub fn complement(&self) -> Self {
        Self(dec!(100) - self.0)
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for Decimal {
    fn from(percent: Percentage) -> Decimal {
        percent.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation_keeps_precision() {
        let m = Money::new(dec!(100.123456));
        assert_eq!(m.amount(), dec!(100.123456));
    }

    #[test]
    fn test_tiny_negative_displays_without_sign() {
        let usd = CurrencyCode::usd();
        assert_eq!(Money::new(dec!(-0.001)).to_display_string(&usd), "$0.00");
    }

    #[test]
    fn test_percent_of() {
        let base = Money::new(dec!(230));
        let tax = base.percent_of(Percentage::new(dec!(20)).unwrap());
        assert_eq!(tax.amount(), dec!(46));
    }

    #[test]
    fn test_display_rounds_half_up_once() {
        let usd = CurrencyCode::usd();
        assert_eq!(Money::new(dec!(0.125)).to_display_string(&usd), "$0.13");
        assert_eq!(Money::new(dec!(276)).to_display_string(&usd), "$276.00");
        assert_eq!(Money::new(dec!(-2.5)).to_display_string(&usd), "-$2.50");
    }

    #[test]
    fn test_display_unknown_currency_uses_code() {
        let chf = CurrencyCode::parse("chf").unwrap();
        assert_eq!(Money::new(dec!(12.5)).to_display_string(&chf), "CHF 12.50");
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(Percentage::new(dec!(0)).is_ok());
        assert!(Percentage::new(dec!(100)).is_ok());
        assert_eq!(
            Percentage::new(dec!(100.01)),
            Err(MoneyError::InvalidPercentage(dec!(100.01)))
        );
        assert!(Percentage::new(dec!(-1)).is_err());
    }
}
