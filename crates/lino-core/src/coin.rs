// crates/lino-core/src/coin.rs
//
// LINO coin amount.
//
// The smallest unit is 1/100000 LINO. Amounts are signed 128-bit integers so
// intermediate differences can be represented; ledger records never persist a
// negative amount.

use std::fmt;
use std::ops::{Add, Sub};

use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dec::{narrow, Dec};
use crate::error::LinoError;

/// Number of base units in one LINO.
pub const COIN_PER_LINO: i128 = 100_000;

/// A LINO amount in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Coin {
    amount: i128,
}

impl Coin {
    /// Create a coin from base units.
    pub const fn new(amount: i128) -> Self {
        Self { amount }
    }

    /// Create a coin from whole LINO.
    pub fn from_lino(lino: i64) -> Self {
        Self {
            amount: lino as i128 * COIN_PER_LINO,
        }
    }

    pub const fn zero() -> Self {
        Self { amount: 0 }
    }

    /// Amount in base units.
    pub const fn amount(&self) -> i128 {
        self.amount
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// `self - other`, refusing to go below zero.
    ///
    /// # Errors
    /// `NegativeCoin` if `other > self`.
    pub fn checked_minus(self, other: Coin) -> Result<Coin, LinoError> {
        if other.amount > self.amount {
            return Err(LinoError::NegativeCoin(format!("{} - {}", self, other)));
        }
        Ok(Self {
            amount: self.amount - other.amount,
        })
    }

    /// Exact decimal view of this amount.
    pub fn to_dec(&self) -> Result<Dec, LinoError> {
        Dec::from_ratio(self.amount, 1)
    }

    /// Truncate a decimal amount toward zero.
    pub fn from_dec_truncated(d: Dec) -> Coin {
        Self {
            amount: d.raw() / Dec::one().raw(),
        }
    }

    /// `trunc(self * rate)`.
    pub fn mul_dec(&self, rate: Dec) -> Result<Coin, LinoError> {
        let p = BigInt::from(self.amount) * BigInt::from(rate.raw()) / BigInt::from(Dec::one().raw());
        Ok(Self {
            amount: narrow(p, "coin multiply")?,
        })
    }

    /// `trunc(self * numerator / denominator)`, exact at any magnitude.
    ///
    /// # Errors
    /// `DivisionByZero` when `denominator` is zero.
    pub fn mul_ratio(&self, numerator: Coin, denominator: Coin) -> Result<Coin, LinoError> {
        if denominator.is_zero() {
            return Err(LinoError::DivisionByZero(format!(
                "{} * {} / 0",
                self, numerator
            )));
        }
        let q = BigInt::from(self.amount) * BigInt::from(numerator.amount)
            / BigInt::from(denominator.amount);
        Ok(Self {
            amount: narrow(q, "coin ratio")?,
        })
    }

    /// `self / other` as a decimal ratio.
    pub fn ratio(&self, other: Coin) -> Result<Dec, LinoError> {
        Dec::from_ratio(self.amount, other.amount)
    }
}

impl Add for Coin {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            amount: self.amount + rhs.amount,
        }
    }
}

impl Sub for Coin {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            amount: self.amount - rhs.amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        let whole = abs / COIN_PER_LINO as u128;
        let frac = abs % COIN_PER_LINO as u128;
        if frac == 0 {
            write!(f, "{}{} LINO", sign, whole)
        } else {
            let frac_str = format!("{:05}", frac);
            write!(f, "{}{}.{} LINO", sign, whole, frac_str.trim_end_matches('0'))
        }
    }
}

impl Serialize for Coin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.amount.to_string())
    }
}

impl<'de> Deserialize<'de> for Coin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let amount = s
            .parse::<i128>()
            .map_err(|e| serde::de::Error::custom(format!("invalid coin {:?}: {}", s, e)))?;
        Ok(Self { amount })
    }
}
