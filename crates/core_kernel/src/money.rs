//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.
//! Amounts are kept at two decimal places with commercial rounding
//! (round half away from zero), matching currency granularity.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use thiserror::Error;

/// Number of decimal places every monetary amount is kept at.
pub const CURRENCY_SCALE: u32 = 2;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Mxn,
    Usd,
}

impl Currency {
    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Mxn => "$",
            Currency::Usd => "US$",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Mxn => "MXN",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Division by zero")]
    DivisionByZero,
}

/// A monetary amount with associated currency
///
/// Money uses rust_decimal for precise arithmetic without floating-point
/// errors. Amounts are normalized to two decimal places at construction,
/// so every value flowing through the ledger is representable in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value, rounding half away from zero to two
    /// decimal places.
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount
                .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero),
            currency,
        }
    }

    /// Creates Money from an integer amount in minor units (cents)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        Self::new(Decimal::new(minor_units, CURRENCY_SCALE), currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self {
            amount: self.amount.abs(),
            currency: self.currency,
        }
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.require_same_currency(other)?;
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch
    ///
    /// The result may be negative; a bank driven below zero by expenses
    /// is a meaningful state, not an error.
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.require_same_currency(other)?;
        Ok(Self::new(self.amount - other.amount, self.currency))
    }

    /// Multiplies by a scalar, rounding the result half away from zero
    /// to two decimal places.
    ///
    /// This is the rounding primitive proportional allocation is built on:
    /// `share.multiply(proportion)` is one bucket's rounded portion.
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }

    /// Divides by a scalar
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Self::new(self.amount / divisor, self.currency))
    }

    /// Returns the full-precision quotient `self / other` as a plain decimal.
    ///
    /// Used to derive a payment's proportion of a sale total; the result is
    /// deliberately not rounded to currency scale.
    pub fn ratio_to(&self, other: &Money) -> Result<Decimal, MoneyError> {
        self.require_same_currency(other)?;
        if other.amount.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(self.amount / other.amount)
    }

    fn require_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency.symbol(), self.amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch in Money::sub")
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation_rounds_to_two_places() {
        let m = Money::new(dec!(100.505), Currency::Mxn);
        assert_eq!(m.amount(), dec!(100.51));

        let m = Money::new(dec!(-100.505), Currency::Mxn);
        assert_eq!(m.amount(), dec!(-100.51));
    }

    #[test]
    fn test_money_creation_uses_commercial_rounding() {
        // Half away from zero, not banker's: .125 goes up, not to even.
        let m = Money::new(dec!(0.125), Currency::Mxn);
        assert_eq!(m.amount(), dec!(0.13));
    }

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050, Currency::Mxn);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(100.00), Currency::Mxn);
        let b = Money::new(dec!(50.00), Currency::Mxn);

        assert_eq!((a + b).amount(), dec!(150.00));
        assert_eq!((a - b).amount(), dec!(50.00));
        assert_eq!((-a).amount(), dec!(-100.00));
    }

    #[test]
    fn test_subtraction_may_go_negative() {
        let a = Money::new(dec!(10.00), Currency::Mxn);
        let b = Money::new(dec!(25.00), Currency::Mxn);

        let diff = a.checked_sub(&b).unwrap();
        assert!(diff.is_negative());
        assert_eq!(diff.amount(), dec!(-15.00));
    }

    #[test]
    fn test_currency_mismatch() {
        let mxn = Money::new(dec!(100.00), Currency::Mxn);
        let usd = Money::new(dec!(100.00), Currency::Usd);

        let result = mxn.checked_add(&usd);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_multiply_rounds_half_away_from_zero() {
        let m = Money::new(dec!(0.05), Currency::Mxn);
        // 0.05 * 0.5 = 0.025 -> 0.03 under commercial rounding
        assert_eq!(m.multiply(dec!(0.5)).amount(), dec!(0.03));
    }

    #[test]
    fn test_divide() {
        let m = Money::new(dec!(100.00), Currency::Mxn);
        assert_eq!(m.divide(dec!(4)).unwrap().amount(), dec!(25.00));
        assert_eq!(m.divide(dec!(0)), Err(MoneyError::DivisionByZero));
    }

    #[test]
    fn test_ratio_to() {
        let payment = Money::new(dec!(25000), Currency::Mxn);
        let total = Money::new(dec!(100000), Currency::Mxn);

        assert_eq!(payment.ratio_to(&total).unwrap(), dec!(0.25));
        assert_eq!(
            total.ratio_to(&Money::zero(Currency::Mxn)),
            Err(MoneyError::DivisionByZero)
        );
    }

    #[test]
    fn test_display() {
        let m = Money::new(dec!(1234.5), Currency::Mxn);
        assert_eq!(m.to_string(), "$ 1234.50");
    }
}
