//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.
//! All amounts are held at two decimal places; every construction rounds
//! half-up so intermediate arithmetic cannot accumulate drift.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub, Neg};
use thiserror::Error;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid rate: {0} (must be between 0 and 100)")]
    InvalidRate(Decimal),

    #[error("Division by zero")]
    DivisionByZero,
}

/// A monetary amount held at two decimal places
///
/// Money uses rust_decimal for precise arithmetic without floating-point
/// errors. Every constructor rounds half-up (midpoint away from zero) to
/// two decimal places, so a `Money` value is always an exact amount in
/// minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Number of decimal places all amounts are held at
    pub const DECIMAL_PLACES: u32 = 2;

    /// Creates a new Money value, rounding half-up to two decimal places
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(
            Self::DECIMAL_PLACES,
            RoundingStrategy::MidpointAwayFromZero,
        ))
    }

    /// Creates Money from an integer amount in minor units (cents)
    pub fn from_minor(minor_units: i64) -> Self {
        Self(Decimal::new(minor_units, Self::DECIMAL_PLACES))
    }

    /// Creates a zero amount
    pub fn zero() -> Self {
        Self(dec!(0))
    }

    /// Returns the underlying decimal amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Multiplies by a scalar factor, rounding the result
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.0 * factor)
    }

    /// Multiplies by an integral quantity, rounding the result
    pub fn times(&self, quantity: u32) -> Self {
        self.multiply(Decimal::from(quantity))
    }

    /// Divides by a scalar
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Self::new(self.0 / divisor))
    }

    /// Clamps a negative amount to zero
    pub fn clamp_non_negative(&self) -> Self {
        if self.is_negative() {
            Self::zero()
        } else {
            *self
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.0 - other.0)
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

/// A tax rate expressed as a percentage between 0 and 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Creates a rate from a percentage value (e.g. 18.0 for 18%)
    pub fn new(percent: Decimal) -> Result<Self, MoneyError> {
        if percent < dec!(0) || percent > dec!(100) {
            return Err(MoneyError::InvalidRate(percent));
        }
        Ok(Self(percent))
    }

    /// The zero rate
    pub fn zero() -> Self {
        Self(dec!(0))
    }

    /// Returns the rate as a percentage
    pub fn percent(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a fraction (e.g. 0.18 for 18%)
    pub fn as_fraction(&self) -> Decimal {
        self.0 / dec!(100)
    }

    /// Applies this rate to an amount, producing the tax portion
    pub fn apply(&self, amount: &Money) -> Money {
        amount.multiply(self.as_fraction())
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_rounds_half_up() {
        assert_eq!(Money::new(dec!(1.005)).amount(), dec!(1.01));
        assert_eq!(Money::new(dec!(1.004)).amount(), dec!(1.00));
        assert_eq!(Money::new(dec!(-1.005)).amount(), dec!(-1.01));
    }

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(100.00));
        let b = Money::new(dec!(50.00));

        assert_eq!((a + b).amount(), dec!(150.00));
        assert_eq!((a - b).amount(), dec!(50.00));
        assert_eq!((-b).amount(), dec!(-50.00));
    }

    #[test]
    fn test_money_times_quantity() {
        let price = Money::new(dec!(19.99));
        assert_eq!(price.times(3).amount(), dec!(59.97));
    }

    #[test]
    fn test_money_sum() {
        let total: Money = vec![
            Money::new(dec!(1.10)),
            Money::new(dec!(2.20)),
            Money::new(dec!(3.30)),
        ]
        .into_iter()
        .sum();
        assert_eq!(total.amount(), dec!(6.60));
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::new(dec!(-5)).clamp_non_negative(), Money::zero());
        assert_eq!(
            Money::new(dec!(5)).clamp_non_negative(),
            Money::new(dec!(5))
        );
    }

    #[test]
    fn test_tax_rate_bounds() {
        assert!(TaxRate::new(dec!(0)).is_ok());
        assert!(TaxRate::new(dec!(100)).is_ok());
        assert!(matches!(
            TaxRate::new(dec!(100.01)),
            Err(MoneyError::InvalidRate(_))
        ));
        assert!(matches!(
            TaxRate::new(dec!(-1)),
            Err(MoneyError::InvalidRate(_))
        ));
    }

    #[test]
    fn test_tax_rate_application() {
        let rate = TaxRate::new(dec!(18)).unwrap();
        let amount = Money::new(dec!(200.00));

        assert_eq!(rate.apply(&amount).amount(), dec!(36.00));
    }
}
