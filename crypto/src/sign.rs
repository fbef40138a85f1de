//! Message signing and verification over every supported curve.
//!
//! Messages are hashed with Blake2b-256 and the curve signs the 32-byte digest.

use std::fmt;

use crate::base58;
use crate::curve::{Curve, KeyKind};
use crate::hash::blake2b_256;
use crate::keys::{PublicKey, SecretKey};
use crate::CryptoError;

/// A 64-byte signature tagged with the curve that produced it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    curve: Curve,
    bytes: [u8; 64],
}

impl Signature {
    pub fn new(curve: Curve, bytes: [u8; 64]) -> Self {
        Self { curve, bytes }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }

    /// `edsig…`, `spsig1…` or `p2sig…`.
    pub fn to_base58(&self) -> String {
        base58::encode_check(&self.curve.prefixes().signature, &self.bytes)
    }

    pub fn from_base58(encoded: &str) -> Result<Self, CryptoError> {
        let (curve, kind) = Curve::classify(encoded)?;
        if kind != KeyKind::Signature {
            return Err(CryptoError::UnexpectedKind {
                expected: KeyKind::Signature,
                found: kind,
            });
        }
        let bytes = base58::decode_fixed::<64>(encoded, &curve.prefixes().signature)?;
        Ok(Self { curve, bytes })
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_base58())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

/// Sign `message` with `secret`.
pub fn sign(secret: &SecretKey, message: &[u8]) -> Result<Signature, CryptoError> {
    let digest = blake2b_256(message);
    let ops = secret.curve().ops();
    let bytes = (ops.sign)(&digest, secret.expose_bytes())?;
    Ok(Signature::new(secret.curve(), bytes))
}

/// Verify `signature` over `message`. A curve mismatch between key and signature fails.
pub fn verify(public: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    if public.curve() != signature.curve() {
        return false;
    }
    let digest = blake2b_256(message);
    (public.curve().ops().verify)(&digest, signature.as_bytes(), public.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(curve: Curve, byte: u8) -> SecretKey {
        SecretKey::from_bytes(curve, [byte; 32]).unwrap()
    }

    #[test]
    fn sign_and_verify_all_curves() {
        let big = vec![0x5Au8; 4096];
        for curve in Curve::ALL {
            let sk = secret(curve, 7);
            let pk = sk.public_key().unwrap();
            for msg in [&b""[..], b"payout batch", &big] {
                let sig = sign(&sk, msg).unwrap();
                assert!(verify(&pk, msg, &sig), "{curve} len {}", msg.len());
            }
        }
    }

    #[test]
    fn wrong_message_fails() {
        for curve in Curve::ALL {
            let sk = secret(curve, 7);
            let pk = sk.public_key().unwrap();
            let sig = sign(&sk, b"correct message").unwrap();
            assert!(!verify(&pk, b"wrong message", &sig));
        }
    }

    #[test]
    fn wrong_key_fails() {
        for curve in Curve::ALL {
            let sig = sign(&secret(curve, 7), b"test").unwrap();
            let other = secret(curve, 9).public_key().unwrap();
            assert!(!verify(&other, b"test", &sig));
        }
    }

    #[test]
    fn curve_mismatch_fails() {
        let sig = sign(&secret(Curve::Ed25519, 7), b"test").unwrap();
        let pk = secret(Curve::NistP256, 7).public_key().unwrap();
        assert!(!verify(&pk, b"test", &sig));
    }

    #[test]
    fn ed25519_is_deterministic() {
        let sk = secret(Curve::Ed25519, 99);
        assert_eq!(sign(&sk, b"x").unwrap(), sign(&sk, b"x").unwrap());
    }

    #[test]
    fn secp256k1_signatures_are_low_s() {
        // Half the group order n of secp256k1.
        let half_n = "7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0";
        let half_n = hex::decode(half_n).unwrap();
        let sk = secret(Curve::Secp256k1, 7);
        for i in 0u8..16 {
            let sig = sign(&sk, &[i]).unwrap();
            assert!(sig.as_bytes()[32..] <= half_n[..], "high S for message {i}");
        }
    }

    #[test]
    fn base58_prefixes() {
        let expected = [
            (Curve::Ed25519, "edsig"),
            (Curve::Secp256k1, "spsig1"),
            (Curve::NistP256, "p2sig"),
        ];
        for (curve, prefix) in expected {
            let sig = sign(&secret(curve, 7), b"m").unwrap();
            let encoded = sig.to_base58();
            assert!(encoded.starts_with(prefix), "{encoded}");
            assert_eq!(Signature::from_base58(&encoded).unwrap(), sig);
        }
    }

    #[test]
    fn from_base58_rejects_other_kinds() {
        let err = Signature::from_base58("tz1SUgyRB8T5jXgXAwS33pgRHAKrafyg87Yc").unwrap_err();
        assert_eq!(
            err,
            CryptoError::UnexpectedKind {
                expected: KeyKind::Signature,
                found: KeyKind::Address,
            }
        );
    }
}
