//! The baker's fee rate as an exact rational.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{InvariantViolation, Mutez};

/// Denominator of [`FeeRate`]: one part per billion.
pub const PARTS_PER_BILLION: u64 = 1_000_000_000;

/// Fraction of each gross reward retained by the baker, stored as parts per billion.
///
/// Configuration supplies the rate as a float (`0.05`). It is rounded once to the nearest
/// ppb so that `0.3` means exactly 3/10 rather than the binary float just below it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct FeeRate {
    ppb: u64,
}

impl FeeRate {
    pub const ZERO: Self = Self { ppb: 0 };

    pub fn from_f64(rate: f64) -> Result<Self, InvariantViolation> {
        if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
            return Err(InvariantViolation::FeeRateOutOfRange { rate });
        }
        let ppb = (rate * PARTS_PER_BILLION as f64).round() as u64;
        Ok(Self { ppb })
    }

    pub fn from_ppb(ppb: u64) -> Result<Self, InvariantViolation> {
        if ppb > PARTS_PER_BILLION {
            return Err(InvariantViolation::FeeRateOutOfRange {
                rate: ppb as f64 / PARTS_PER_BILLION as f64,
            });
        }
        Ok(Self { ppb })
    }

    pub fn ppb(&self) -> u64 {
        self.ppb
    }

    pub fn as_f64(&self) -> f64 {
        self.ppb as f64 / PARTS_PER_BILLION as f64
    }

    /// `floor(amount × rate)`.
    pub fn apply(&self, amount: &Mutez) -> Mutez {
        let scaled = amount.as_biguint() * self.ppb;
        Mutez::new(scaled / PARTS_PER_BILLION)
    }
}

impl TryFrom<f64> for FeeRate {
    type Error = InvariantViolation;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        Self::from_f64(rate)
    }
}

impl From<FeeRate> for f64 {
    fn from(rate: FeeRate) -> f64 {
        rate.as_f64()
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_f64() * 100.0)
    }
}
