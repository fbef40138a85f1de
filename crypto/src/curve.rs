//! Curve families and their dispatch table.
//!
//! Every key, address and signature string names its curve through its leading
//! characters. [`Curve::detect`] maps those characters onto one of three families.
//! [`Curve::ops`] returns the static function set implementing that family.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::prefix::{self, Prefix};
use crate::CryptoError;

/// The three supported signature curve families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Curve {
    Ed25519,
    Secp256k1,
    NistP256,
}

/// What a prefixed string encodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    PublicKey,
    SecretKey,
    EncryptedSecretKey,
    Address,
    Signature,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PublicKey => "public key",
            Self::SecretKey => "secret key",
            Self::EncryptedSecretKey => "encrypted secret key",
            Self::Address => "address",
            Self::Signature => "signature",
        };
        f.write_str(s)
    }
}

/// Prefix family of one curve.
#[derive(Debug, Clone, Copy)]
pub struct Prefixes {
    pub public_key: Prefix,
    pub secret_key: Prefix,
    pub encrypted_secret_key: Prefix,
    pub address: Prefix,
    pub signature: Prefix,
}

/// Capability set every curve provides.
///
/// Secret keys are always the 32-byte scalar or seed. Signatures are always 64 bytes
/// (`R ‖ S` for Ed25519, `r ‖ s` for ECDSA) over a 32-byte digest.
pub struct CurveOps {
    pub prefixes: Prefixes,
    /// Public key length in bytes.
    pub public_key_len: usize,
    /// Curve tag used by the binary operation encoding.
    pub tag: u8,
    pub public_key: fn(&[u8; 32]) -> Result<Vec<u8>, CryptoError>,
    pub sign: fn(&[u8; 32], &[u8; 32]) -> Result<[u8; 64], CryptoError>,
    pub verify: fn(&[u8; 32], &[u8; 64], &[u8]) -> bool,
}

static ED25519_OPS: CurveOps = CurveOps {
    prefixes: Prefixes {
        public_key: prefix::EDPK,
        secret_key: prefix::EDSK_SEED,
        encrypted_secret_key: prefix::EDESK,
        address: prefix::TZ1,
        signature: prefix::EDSIG,
    },
    public_key_len: 32,
    tag: 0,
    public_key: ed25519::public_key,
    sign: ed25519::sign,
    verify: ed25519::verify,
};

static SECP256K1_OPS: CurveOps = CurveOps {
    prefixes: Prefixes {
        public_key: prefix::SPPK,
        secret_key: prefix::SPSK,
        encrypted_secret_key: prefix::SPESK,
        address: prefix::TZ2,
        signature: prefix::SPSIG,
    },
    public_key_len: 33,
    tag: 1,
    public_key: secp256k1::public_key,
    sign: secp256k1::sign,
    verify: secp256k1::verify,
};

static NIST_P256_OPS: CurveOps = CurveOps {
    prefixes: Prefixes {
        public_key: prefix::P2PK,
        secret_key: prefix::P2SK,
        encrypted_secret_key: prefix::P2ESK,
        address: prefix::TZ3,
        signature: prefix::P2SIG,
    },
    public_key_len: 33,
    tag: 2,
    public_key: nist_p256::public_key,
    sign: nist_p256::sign,
    verify: nist_p256::verify,
};

/// Textual prefix → (curve, kind). No entry is a prefix of another.
static PREFIX_TABLE: [(&str, Curve, KeyKind); 15] = [
    ("tz1", Curve::Ed25519, KeyKind::Address),
    ("edpk", Curve::Ed25519, KeyKind::PublicKey),
    ("edsk", Curve::Ed25519, KeyKind::SecretKey),
    ("edesk", Curve::Ed25519, KeyKind::EncryptedSecretKey),
    ("edsig", Curve::Ed25519, KeyKind::Signature),
    ("tz2", Curve::Secp256k1, KeyKind::Address),
    ("sppk", Curve::Secp256k1, KeyKind::PublicKey),
    ("spsk", Curve::Secp256k1, KeyKind::SecretKey),
    ("spesk", Curve::Secp256k1, KeyKind::EncryptedSecretKey),
    ("spsig1", Curve::Secp256k1, KeyKind::Signature),
    ("tz3", Curve::NistP256, KeyKind::Address),
    ("p2pk", Curve::NistP256, KeyKind::PublicKey),
    ("p2sk", Curve::NistP256, KeyKind::SecretKey),
    ("p2esk", Curve::NistP256, KeyKind::EncryptedSecretKey),
    ("p2sig", Curve::NistP256, KeyKind::Signature),
];

impl Curve {
    pub const ALL: [Curve; 3] = [Curve::Ed25519, Curve::Secp256k1, Curve::NistP256];

    pub fn ops(self) -> &'static CurveOps {
        match self {
            Self::Ed25519 => &ED25519_OPS,
            Self::Secp256k1 => &SECP256K1_OPS,
            Self::NistP256 => &NIST_P256_OPS,
        }
    }

    pub fn prefixes(self) -> &'static Prefixes {
        &self.ops().prefixes
    }

    /// Classify a base58 key, address or signature by its leading characters.
    pub fn classify(encoded: &str) -> Result<(Curve, KeyKind), CryptoError> {
        PREFIX_TABLE
            .iter()
            .find(|(text, _, _)| encoded.starts_with(text))
            .map(|&(_, curve, kind)| (curve, kind))
            .ok_or_else(|| {
                // Never echo more than a few characters: the input may be a secret key.
                CryptoError::UnknownCurve(encoded.chars().take(4).collect())
            })
    }

    pub fn detect(encoded: &str) -> Result<Curve, CryptoError> {
        Self::classify(encoded).map(|(curve, _)| curve)
    }

    pub fn tag(self) -> u8 {
        self.ops().tag
    }

    pub fn from_tag(tag: u8) -> Option<Curve> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ed25519 => "Ed25519",
            Self::Secp256k1 => "Secp256k1",
            Self::NistP256 => "NistP256",
        };
        f.write_str(s)
    }
}

mod ed25519 {
    use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

    use crate::CryptoError;

    pub(super) fn public_key(secret: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
        let signing_key = SigningKey::from_bytes(secret);
        Ok(signing_key.verifying_key().to_bytes().to_vec())
    }

    pub(super) fn sign(digest: &[u8; 32], secret: &[u8; 32]) -> Result<[u8; 64], CryptoError> {
        let signing_key = SigningKey::from_bytes(secret);
        Ok(signing_key.sign(digest).to_bytes())
    }

    pub(super) fn verify(digest: &[u8; 32], signature: &[u8; 64], public_key: &[u8]) -> bool {
        let Ok(bytes) = <[u8; 32]>::try_from(public_key) else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(&bytes) else {
            return false;
        };
        let sig = ed25519_dalek::Signature::from_bytes(signature);
        verifying_key.verify(digest, &sig).is_ok()
    }
}

mod secp256k1 {
    use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
    use k256::ecdsa::{Signature, SigningKey, VerifyingKey};

    use crate::CryptoError;

    fn signing_key(secret: &[u8; 32]) -> Result<SigningKey, CryptoError> {
        SigningKey::from_slice(secret)
            .map_err(|_| CryptoError::InvalidSecretKey("scalar out of range for secp256k1".into()))
    }

    pub(super) fn public_key(secret: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
        let key = signing_key(secret)?;
        Ok(key.verifying_key().to_encoded_point(true).as_bytes().to_vec())
    }

    pub(super) fn sign(digest: &[u8; 32], secret: &[u8; 32]) -> Result<[u8; 64], CryptoError> {
        let key = signing_key(secret)?;
        let sig: Signature = key
            .sign_prehash(digest)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        // The chain only accepts low-S secp256k1 signatures.
        let sig = sig.normalize_s().unwrap_or(sig);
        let mut out = [0u8; 64];
        out.copy_from_slice(&sig.to_bytes());
        Ok(out)
    }

    pub(super) fn verify(digest: &[u8; 32], signature: &[u8; 64], public_key: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(public_key) else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify_prehash(digest, &sig).is_ok()
    }
}

mod nist_p256 {
    use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
    use p256::ecdsa::{Signature, SigningKey, VerifyingKey};

    use crate::CryptoError;

    fn signing_key(secret: &[u8; 32]) -> Result<SigningKey, CryptoError> {
        SigningKey::from_slice(secret)
            .map_err(|_| CryptoError::InvalidSecretKey("scalar out of range for P-256".into()))
    }

    pub(super) fn public_key(secret: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
        let key = signing_key(secret)?;
        Ok(key.verifying_key().to_encoded_point(true).as_bytes().to_vec())
    }

    pub(super) fn sign(digest: &[u8; 32], secret: &[u8; 32]) -> Result<[u8; 64], CryptoError> {
        let key = signing_key(secret)?;
        let sig: Signature = key
            .sign_prehash(digest)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        let mut out = [0u8; 64];
        out.copy_from_slice(&sig.to_bytes());
        Ok(out)
    }

    pub(super) fn verify(digest: &[u8; 32], signature: &[u8; 64], public_key: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(public_key) else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify_prehash(digest, &sig).is_ok()
    }
}
