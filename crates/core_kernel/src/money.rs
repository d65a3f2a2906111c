//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of premium amounts using
//! rust_decimal, so no figure ever passes through binary floating point.
//! Every monetary value carries exactly two decimal places and every rounding
//! step is half-up (midpoint away from zero).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use thiserror::Error;

/// Number of decimal places carried by every monetary amount
pub const MONETARY_SCALE: u32 = 2;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow during calculation")]
    Overflow,
}

/// Rounds a decimal half-up to the given number of places
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// A monetary amount with two-decimal fixed precision
///
/// The amount is rounded half-up on construction, so two `Money` values built
/// from the same raw product always compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new Money value, rounding half-up to two places
    pub fn new(amount: Decimal) -> Self {
        Self(round_half_up(amount, MONETARY_SCALE))
    }

    /// Creates a zero amount
    pub fn zero() -> Self {
        Self(Decimal::new(0, MONETARY_SCALE))
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Checked addition that reports overflow instead of panicking
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Divides by a scalar, rounding the quotient half-up to two places
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::DivisionByZero` for a zero divisor and
    /// `MoneyError::Overflow` when the quotient does not fit.
    pub fn divide_rounded(&self, divisor: Decimal) -> Result<Money, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        self.0
            .checked_div(divisor)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Converts to `f64` for numeric JSON output
    pub fn to_f64(&self) -> Result<f64, MoneyError> {
        self.0
            .to_f64()
            .ok_or_else(|| MoneyError::InvalidAmount(self.0.to_string()))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
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

/// A multiplicative factor expressed from a percentage (e.g. 150 for 150%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 1.50 for 150%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a percentage, rounded half-up to two places
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: round_half_up(percentage / dec!(100), MONETARY_SCALE),
        }
    }

    /// The neutral factor 1
    pub fn one() -> Self {
        Self { value: Decimal::ONE }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }
}
