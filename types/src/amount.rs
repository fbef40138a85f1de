//! Arbitrary-precision currency amounts.
//!
//! All money in bakepay is held as [`Mutez`], the chain's smallest currency unit, on top of
//! an unbounded unsigned integer. Floating point never appears in amount arithmetic.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Number of mutez in one tez.
pub const MUTEZ_PER_TEZ: u32 = 1_000_000;

/// An amount of mutez. Never negative.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mutez(BigUint);

impl Mutez {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn new(raw: BigUint) -> Self {
        Self(raw)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_inner(self) -> BigUint {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if other.0 > self.0 {
            None
        } else {
            Some(Self(&self.0 - &other.0))
        }
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    /// Lossy conversion for informational ratios. Never use the result in money math.
    pub fn to_f64_lossy(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::INFINITY)
    }

    /// Render as a tez amount with six decimals, e.g. `76.000000`.
    pub fn to_tez_string(&self) -> String {
        let unit = BigUint::from(MUTEZ_PER_TEZ);
        let whole = &self.0 / &unit;
        let frac = (&self.0 % &unit).to_u32().unwrap_or_default();
        format!("{whole}.{frac:06}")
    }
}

impl From<u64> for Mutez {
    fn from(v: u64) -> Self {
        Self(BigUint::from(v))
    }
}

impl From<BigUint> for Mutez {
    fn from(v: BigUint) -> Self {
        Self(v)
    }
}

impl Add for Mutez {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Mutez> for &'a Mutez {
    type Output = Mutez;
    fn add(self, rhs: &'a Mutez) -> Mutez {
        Mutez(&self.0 + &rhs.0)
    }
}

impl<'a> Sum<&'a Mutez> for Mutez {
    fn sum<I: Iterator<Item = &'a Mutez>>(iter: I) -> Self {
        iter.fold(Mutez::zero(), |acc, m| Mutez(acc.0 + &m.0))
    }
}

impl fmt::Display for Mutez {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a non-negative decimal integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid mutez amount: {0:?}")]
pub struct ParseMutezError(pub String);

impl FromStr for Mutez {
    type Err = ParseMutezError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseMutezError(s.to_string()));
        }
        BigUint::from_str(trimmed)
            .map(Self)
            .map_err(|_| ParseMutezError(s.to_string()))
    }
}

// Amounts cross the node RPC as decimal strings, so serialize them that way.
impl Serialize for Mutez {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Mutez {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MutezVisitor;

        impl<'de> serde::de::Visitor<'de> for MutezVisitor {
            type Value = Mutez;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a non-negative integer or decimal string")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Mutez::from(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map(Mutez::from)
                    .map_err(|_| E::custom(format!("negative amount {v}")))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(MutezVisitor)
    }
}
