use crate::error::EngineError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Rounds a raw decimal to currency precision.
///
/// Two decimal places, half away from zero. Applied exactly once, at the
/// point a value is finalized; rounded values must not be re-rounded
/// downstream.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A non-negative monetary amount with two decimal places of precision.
///
/// Wrapper around `rust_decimal::Decimal` enforcing that award and
/// disbursement amounts can never go negative. A negative result anywhere in
/// a calculation is an invariant violation and must surface as an error, not
/// be clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, EngineError> {
        if value < Decimal::ZERO {
            return Err(EngineError::Validation(format!(
                "amount must not be negative, got {value}"
            )));
        }
        Ok(Self(round_currency(value)))
    }

    /// Builds an amount from a whole number of cents, as carried on the wire.
    pub fn from_cents(cents: u64) -> Self {
        Self(Decimal::new(cents as i64, 2))
    }

    /// Whole cents, for fixed-width encoding.
    pub fn to_cents(&self) -> u64 {
        // The inner value is already rounded to 2dp by every constructor.
        (self.0 * Decimal::ONE_HUNDRED)
            .trunc()
            .try_into()
            .unwrap_or(0)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }

    /// Subtraction that refuses to go below zero.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, EngineError> {
        let result = self.0 - rhs.0;
        if result < Decimal::ZERO {
            return Err(EngineError::CalculationInvariant(format!(
                "subtracting {} from {} yields a negative amount",
                rhs.0, self.0
            )));
        }
        Ok(Self(result))
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = EngineError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
