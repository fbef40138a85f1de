//! Secret and public keys.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::address::Address;
use crate::base58;
use crate::curve::{Curve, KeyKind};
use crate::hash::blake2b_160;
use crate::prefix;
use crate::CryptoError;

/// A 32-byte secret scalar (or Ed25519 seed), wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    #[zeroize(skip)]
    curve: Curve,
    bytes: [u8; 32],
}

impl SecretKey {
    /// Wrap raw secret bytes. ECDSA scalars outside the group are rejected.
    pub fn from_bytes(curve: Curve, bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let key = Self { curve, bytes };
        (curve.ops().public_key)(&key.bytes)?;
        Ok(key)
    }

    /// Parse `edsk…`, `spsk…` or `p2sk…`.
    ///
    /// Ed25519 keys are accepted both as the 32-byte seed and as the 64-byte
    /// seed ‖ public key form. Encrypted keys (`edesk…` and friends) are recognised
    /// and refused.
    pub fn from_base58(encoded: &str) -> Result<Self, CryptoError> {
        let (curve, kind) = Curve::classify(encoded.trim())?;
        match kind {
            KeyKind::SecretKey => {}
            KeyKind::EncryptedSecretKey => return Err(CryptoError::EncryptedKeyUnsupported(curve)),
            found => {
                return Err(CryptoError::UnexpectedKind {
                    expected: KeyKind::SecretKey,
                    found,
                })
            }
        }
        let encoded = encoded.trim();
        match curve {
            Curve::Ed25519 => Self::ed25519_from_base58(encoded),
            Curve::Secp256k1 | Curve::NistP256 => {
                let bytes = base58::decode_fixed::<32>(encoded, &curve.prefixes().secret_key)?;
                Self::from_bytes(curve, bytes)
            }
        }
    }

    fn ed25519_from_base58(encoded: &str) -> Result<Self, CryptoError> {
        let mut raw = base58::decode_check(encoded)?;
        let result = if let Some(seed) = raw.strip_prefix(prefix::EDSK_SEED.bytes) {
            <[u8; 32]>::try_from(seed)
                .map_err(|_| CryptoError::InvalidLength {
                    kind: prefix::EDSK_SEED.text,
                    expected: 32,
                    actual: seed.len(),
                })
                .and_then(|seed| Self::from_bytes(Curve::Ed25519, seed))
        } else if let Some(expanded) = raw.strip_prefix(prefix::EDSK.bytes) {
            Self::from_expanded_ed25519(expanded)
        } else {
            Err(CryptoError::PrefixMismatch(prefix::EDSK.text))
        };
        raw.zeroize();
        result
    }

    fn from_expanded_ed25519(expanded: &[u8]) -> Result<Self, CryptoError> {
        if expanded.len() != prefix::EDSK.payload_len {
            return Err(CryptoError::InvalidLength {
                kind: prefix::EDSK.text,
                expected: prefix::EDSK.payload_len,
                actual: expanded.len(),
            });
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&expanded[..32]);
        let key = Self::from_bytes(Curve::Ed25519, seed)?;
        seed.zeroize();
        if key.public_key()?.as_bytes() != &expanded[32..] {
            return Err(CryptoError::InvalidSecretKey(
                "public half does not match the seed".into(),
            ));
        }
        Ok(key)
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn expose_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn public_key(&self) -> Result<PublicKey, CryptoError> {
        let bytes = (self.curve.ops().public_key)(&self.bytes)?;
        Ok(PublicKey {
            curve: self.curve,
            bytes,
        })
    }

    /// Short form (`edsk` seed, `spsk`, `p2sk`).
    pub fn to_base58(&self) -> String {
        base58::encode_check(&self.curve.prefixes().secret_key, &self.bytes)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({}, <redacted>)", self.curve)
    }
}

/// A public key of any supported curve. ECDSA keys are SEC1 compressed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    curve: Curve,
    bytes: Vec<u8>,
}

impl PublicKey {
    pub fn from_bytes(curve: Curve, bytes: &[u8]) -> Result<Self, CryptoError> {
        let expected = curve.ops().public_key_len;
        if bytes.len() != expected {
            return Err(CryptoError::InvalidLength {
                kind: curve.prefixes().public_key.text,
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            curve,
            bytes: bytes.to_vec(),
        })
    }

    pub fn from_base58(encoded: &str) -> Result<Self, CryptoError> {
        let (curve, kind) = Curve::classify(encoded)?;
        if kind != KeyKind::PublicKey {
            return Err(CryptoError::UnexpectedKind {
                expected: KeyKind::PublicKey,
                found: kind,
            });
        }
        let bytes = base58::decode_prefixed(encoded, &curve.prefixes().public_key)?;
        Self::from_bytes(curve, &bytes)
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_base58(&self) -> String {
        base58::encode_check(&self.curve.prefixes().public_key, &self.bytes)
    }

    /// Blake2b-160 public key hash.
    pub fn hash(&self) -> [u8; 20] {
        blake2b_160(&self.bytes)
    }

    pub fn address(&self) -> Address {
        Address::Implicit {
            curve: self.curve,
            hash: self.hash(),
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base58())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}
