//! Account addresses.
//!
//! Implicit accounts (`tz1`, `tz2`, `tz3`) are the Blake2b-160 hash of a public key.
//! Originated contracts (`KT1`) carry a 20-byte contract hash.

use std::fmt;
use std::str::FromStr;

use crate::base58;
use crate::curve::{Curve, KeyKind};
use crate::prefix;
use crate::CryptoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Address {
    Implicit { curve: Curve, hash: [u8; 20] },
    Originated { hash: [u8; 20] },
}

impl Address {
    pub fn parse(encoded: &str) -> Result<Self, CryptoError> {
        if encoded.starts_with(prefix::KT1.text) {
            let hash = base58::decode_fixed::<20>(encoded, &prefix::KT1)?;
            return Ok(Self::Originated { hash });
        }
        let (curve, kind) = Curve::classify(encoded)?;
        if kind != KeyKind::Address {
            return Err(CryptoError::UnexpectedKind {
                expected: KeyKind::Address,
                found: kind,
            });
        }
        let hash = base58::decode_fixed::<20>(encoded, &curve.prefixes().address)?;
        Ok(Self::Implicit { curve, hash })
    }

    pub fn hash(&self) -> &[u8; 20] {
        match self {
            Self::Implicit { hash, .. } | Self::Originated { hash } => hash,
        }
    }

    pub fn is_implicit(&self) -> bool {
        matches!(self, Self::Implicit { .. })
    }

    pub fn to_base58(&self) -> String {
        match self {
            Self::Implicit { curve, hash } => base58::encode_check(&curve.prefixes().address, hash),
            Self::Originated { hash } => base58::encode_check(&prefix::KT1, hash),
        }
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}
