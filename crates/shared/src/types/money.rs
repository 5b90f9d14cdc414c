//! Fixed-point money.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! `Money` wraps `rust_decimal::Decimal` and is persisted as integer minor
//! units (cents), so applying and reversing an amount is exact.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A signed monetary amount with at most [`Money::SCALE`] fractional digits.
///
/// Serialized as a decimal string (`"100.50"`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

/// Error returned when parsing a money string fails.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid money amount: {0}")]
pub struct MoneyParseError(String);

impl Money {
    /// Number of fractional digits a stored amount may carry.
    pub const SCALE: u32 = 2;

    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wraps a decimal as is; precision is checked at the storage boundary.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Builds an amount from integer minor units (`12_345` is `123.45`).
    #[must_use]
    pub fn from_minor_units(minor: i64) -> Self {
        Self(Decimal::new(minor, Self::SCALE))
    }

    /// Converts to integer minor units.
    ///
    /// Returns `None` when the amount has more than two fractional digits
    /// or does not fit in an `i64`.
    #[must_use]
    pub fn to_minor_units(&self) -> Option<i64> {
        let scaled = self.0.checked_mul(Decimal::ONE_HUNDRED)?;
        if !scaled.fract().is_zero() {
            return None;
        }
        scaled.to_i64()
    }

    /// Adds in minor units.
    ///
    /// Returns `None` when either side is not representable in minor units
    /// or the sum leaves the `i64` range.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let sum = self.to_minor_units()?.checked_add(rhs.to_minor_units()?)?;
        Some(Self::from_minor_units(sum))
    }

    /// Returns the underlying decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self)
            .map_err(|_| MoneyParseError(s.to_string()))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
