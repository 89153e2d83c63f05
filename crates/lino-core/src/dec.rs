// crates/lino-core/src/dec.rs
//
// Fixed-point decimal with 18 fractional digits.
//
// Every economic ratio (growth rate, allocations, penalty scores, TPS) is a
// `Dec`. Products and quotients are formed in arbitrary precision and then
// truncated toward zero, so every node derives byte-identical results with no
// floating point anywhere in the state transition.

use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LinoError;

/// Number of fractional decimal digits carried by a `Dec`.
pub const DEC_PRECISION: u32 = 18;

/// Raw representation of 1.0.
const ONE_RAW: i128 = 1_000_000_000_000_000_000;

/// Signed fixed-point decimal: `raw / 10^18`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Dec {
    raw: i128,
}

/// Narrow an arbitrary-precision intermediate back into an i128.
pub(crate) fn narrow(value: BigInt, context: &str) -> Result<i128, LinoError> {
    i128::try_from(value).map_err(|_| LinoError::Overflow(context.to_string()))
}

impl Dec {
    pub const fn zero() -> Self {
        Self { raw: 0 }
    }

    pub const fn one() -> Self {
        Self { raw: ONE_RAW }
    }

    /// Build a `Dec` from its raw 10^-18 units.
    pub const fn from_raw(raw: i128) -> Self {
        Self { raw }
    }

    pub const fn raw(&self) -> i128 {
        self.raw
    }

    /// Whole number `n` as a decimal.
    pub fn from_int(n: i64) -> Self {
        Self {
            raw: n as i128 * ONE_RAW,
        }
    }

    /// `numerator / denominator`, truncated to 18 places.
    ///
    /// # Errors
    /// `DivisionByZero` when `denominator == 0`, `Overflow` if the quotient
    /// does not fit.
    pub fn from_ratio(numerator: i128, denominator: i128) -> Result<Self, LinoError> {
        if denominator == 0 {
            return Err(LinoError::DivisionByZero(format!(
                "ratio {}/{}",
                numerator, denominator
            )));
        }
        let q = BigInt::from(numerator) * BigInt::from(ONE_RAW) / BigInt::from(denominator);
        Ok(Self {
            raw: narrow(q, "decimal ratio")?,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    pub fn is_negative(&self) -> bool {
        self.raw < 0
    }

    /// `self * other`, truncated toward zero.
    pub fn mul(&self, other: Dec) -> Result<Dec, LinoError> {
        let p = BigInt::from(self.raw) * BigInt::from(other.raw) / BigInt::from(ONE_RAW);
        Ok(Self {
            raw: narrow(p, "decimal multiply")?,
        })
    }

    /// `self / other`, truncated toward zero.
    pub fn quo(&self, other: Dec) -> Result<Dec, LinoError> {
        if other.raw == 0 {
            return Err(LinoError::DivisionByZero(format!("{} / 0", self)));
        }
        let q = BigInt::from(self.raw) * BigInt::from(ONE_RAW) / BigInt::from(other.raw);
        Ok(Self {
            raw: narrow(q, "decimal quotient")?,
        })
    }

    /// `self / n` for an integer divisor, truncated toward zero.
    pub fn quo_int(&self, n: i64) -> Result<Dec, LinoError> {
        if n == 0 {
            return Err(LinoError::DivisionByZero(format!("{} / 0", self)));
        }
        Ok(Self {
            raw: self.raw / n as i128,
        })
    }

    /// Clamp into `[lo, hi]`.
    pub fn clamp_to(self, lo: Dec, hi: Dec) -> Dec {
        self.max(lo).min(hi)
    }
}

impl Add for Dec {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            raw: self.raw + rhs.raw,
        }
    }
}

impl Sub for Dec {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            raw: self.raw - rhs.raw,
        }
    }
}

impl Neg for Dec {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self { raw: -self.raw }
    }
}

impl fmt::Display for Dec {
    /// Always prints all 18 fractional digits so the text form is canonical.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.raw < 0 { "-" } else { "" };
        let abs = self.raw.unsigned_abs();
        let one = ONE_RAW as u128;
        write!(
            f,
            "{}{}.{:018}",
            sign,
            abs / one,
            abs % one
        )
    }
}

impl FromStr for Dec {
    type Err = LinoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LinoError::Serialization(format!("invalid decimal: {:?}", s));
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        if whole.is_empty()
            || frac.len() > DEC_PRECISION as usize
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: i128 = whole.parse().map_err(|_| invalid())?;
        let mut frac_raw: i128 = 0;
        for (i, b) in frac.bytes().enumerate() {
            let digit = (b - b'0') as i128;
            frac_raw += digit * 10i128.pow(DEC_PRECISION - 1 - i as u32);
        }
        let raw = whole
            .checked_mul(ONE_RAW)
            .and_then(|w| w.checked_add(frac_raw))
            .ok_or_else(|| LinoError::Overflow(format!("decimal {:?}", s)))?;
        Ok(Self {
            raw: if negative { -raw } else { raw },
        })
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
