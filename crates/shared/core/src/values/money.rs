use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Number of decimal places carried by [`Money`]
pub const MONEY_SCALE: u32 = 2;

const MINOR_PER_MAJOR: i64 = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid money: {0:?}")]
    Invalid(String),

    #[error("Money has sub-cent precision: {0:?}")]
    SubMinorUnit(String),

    #[error("Money out of range: {0:?}")]
    OutOfRange(String),
}

/// Exact fixed-point currency value, stored as integer cents.
///
/// Arithmetic is closed over the type and never changes the scale, so
/// `Money` can be used as an ordered map/heap key. Operators saturate at
/// the `i64` bounds instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Build from a raw count of minor units (cents)
    pub const fn from_minor(units: i64) -> Self {
        Money(units)
    }

    /// Build from whole units plus cents, e.g. `Money::new(5, 20)` is 5.20.
    ///
    /// `minor` takes the sign of `major`: `Money::new(-1, 5)` is -1.05.
    pub const fn new(major: i64, minor: i64) -> Self {
        let whole = major.saturating_mul(MINOR_PER_MAJOR);
        if major < 0 {
            Money(whole.saturating_sub(minor))
        } else {
            Money(whole.saturating_add(minor))
        }
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Money(self.0.saturating_abs())
    }
}

impl Money {
    /// Exact decimal value, e.g. for reporting
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MONEY_SCALE)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        // "10101.80000000" is still cent-exact once trailing zeros are dropped
        let value = value.normalize();
        if value.scale() > MONEY_SCALE {
            return Err(MoneyError::SubMinorUnit(value.to_string()));
        }

        let minor = value
            .checked_mul(Decimal::from(MINOR_PER_MAJOR))
            .and_then(|m| m.to_i64())
            .ok_or_else(|| MoneyError::OutOfRange(value.to_string()))?;
        Ok(Money(minor))
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value =
            Decimal::from_str(s.trim()).map_err(|_| MoneyError::Invalid(s.to_string()))?;
        Money::try_from(value).map_err(|e| match e {
            MoneyError::SubMinorUnit(_) => MoneyError::SubMinorUnit(s.to_string()),
            MoneyError::OutOfRange(_) => MoneyError::OutOfRange(s.to_string()),
            other => other,
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MINOR_PER_MAJOR as u64;
        write!(f, "{}{}.{:02}", sign, abs / per, abs % per)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}
