//! The payout wallet: one secret key that signs forged operations.

use crate::address::Address;
use crate::base58;
use crate::hash::blake2b_256;
use crate::keys::{PublicKey, SecretKey};
use crate::prefix;
use crate::sign::{self, Signature};
use crate::CryptoError;

/// Watermark byte prepended to forged manager operations before hashing.
pub const GENERIC_OPERATION_WATERMARK: u8 = 0x03;

/// A forged operation together with its signature, ready for injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOperation {
    /// `forged ‖ signature`.
    pub bytes: Vec<u8>,
    pub signature: Signature,
    /// `o…` hash of the signed bytes.
    pub operation_hash: String,
}

impl SignedOperation {
    /// Lowercase hex of the signed bytes, the injection payload.
    pub fn hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

pub struct Wallet {
    secret: SecretKey,
    public: PublicKey,
    address: Address,
}

impl Wallet {
    /// Load a wallet from a base58 secret key of any supported curve.
    pub fn from_secret_key(encoded: &str) -> Result<Self, CryptoError> {
        Self::new(SecretKey::from_base58(encoded)?)
    }

    pub fn new(secret: SecretKey) -> Result<Self, CryptoError> {
        let public = secret.public_key()?;
        let address = public.address();
        Ok(Self {
            secret,
            public,
            address,
        })
    }

    /// A wallet whose public key belongs to a different secret.
    ///
    /// Every signature it produces fails verification, so `sign_operation`
    /// always errors.
    #[cfg(any(test, feature = "test-util"))]
    pub fn with_mismatched_key(secret: SecretKey, other: &SecretKey) -> Result<Self, CryptoError> {
        let public = other.public_key()?;
        let address = public.address();
        Ok(Self {
            secret,
            public,
            address,
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Sign forged operation bytes (branch included).
    ///
    /// The signature is verified against the wallet's public key before it is
    /// returned. A signature that fails that check is never handed out.
    pub fn sign_operation(&self, forged: &[u8]) -> Result<SignedOperation, CryptoError> {
        let mut message = Vec::with_capacity(forged.len() + 1);
        message.push(GENERIC_OPERATION_WATERMARK);
        message.extend_from_slice(forged);

        let signature = sign::sign(&self.secret, &message)?;
        if !sign::verify(&self.public, &message, &signature) {
            return Err(CryptoError::SignatureSelfCheckFailed {
                curve: self.secret.curve(),
            });
        }

        let mut bytes = Vec::with_capacity(forged.len() + 64);
        bytes.extend_from_slice(forged);
        bytes.extend_from_slice(signature.as_bytes());
        let operation_hash = base58::encode_check(&prefix::OPERATION_HASH, &blake2b_256(&bytes));
        Ok(SignedOperation {
            bytes,
            signature,
            operation_hash,
        })
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address.to_base58())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Curve;

    const GOLDEN_FORGED: &str = "7cc601d2729c90b267e6a79d902f8b048d37fd990f2f7447efefb0cfb2f8e8a46c004b04ad1e57c2f13b61b3d2c95b3073d961a4132ba08d0665a08d0600a0f73600004b04ad1e57c2f13b61b3d2c95b3073d961a4132b006c004b04ad1e57c2f13b61b3d2c95b3073d961a4132ba08d0666a08d0600f0fd3900004b04ad1e57c2f13b61b3d2c95b3073d961a4132b00";

    #[test]
    fn ed25519_golden_signature() {
        let secret = "edsk2iznZUCwZBGHuGLcEK3ax3PfCZjNEhtmqqzChsoYRx3mJNB266";
        let wallet = Wallet::from_secret_key(secret).unwrap();
        let forged = hex::decode(GOLDEN_FORGED).unwrap();
        let signed = wallet.sign_operation(&forged).unwrap();

        assert_eq!(
            hex::encode(signed.signature.as_bytes()),
            "77ee7c35d72c9d2cc158df1544c38689176df751eb1223000e797ad7347bdd0881ee76661b1022edea46226678307c6dc7efb7da32adfd9b5e5565a45c3e8a0f"
        );
        assert_eq!(
            signed.signature.to_base58(),
            "edsigtoVouTsqCBNH1LDJKvLPmwaK6Lqo98RsXGNa7ptS5tyr4wkRzWxhyaXk1bThs5ksRJicNER6nP1Yy8UfUYdfRFWqfDm2PX"
        );
        assert_eq!(
            signed.operation_hash,
            "onkPQn45drML23j6BJYSGcgsn2tUW3jnoFygHjTUsdwrF2PxUc5"
        );
        let signature_hex = hex::encode(signed.signature.as_bytes());
        assert_eq!(signed.hex(), format!("{GOLDEN_FORGED}{signature_hex}"));
    }

    #[test]
    fn signatures_verify_for_all_curves() {
        let forged = hex::decode(GOLDEN_FORGED).unwrap();
        for curve in Curve::ALL {
            let wallet = Wallet::new(SecretKey::from_bytes(curve, [7u8; 32]).unwrap()).unwrap();
            let signed = wallet.sign_operation(&forged).unwrap();
            let mut message = vec![GENERIC_OPERATION_WATERMARK];
            message.extend_from_slice(&forged);
            assert!(sign::verify(wallet.public_key(), &message, &signed.signature));
            assert_eq!(signed.bytes.len(), forged.len() + 64);
            assert!(signed.operation_hash.starts_with('o'));
        }
    }

    #[test]
    fn failed_self_check_returns_no_signature() {
        let forged = hex::decode(GOLDEN_FORGED).unwrap();
        for curve in Curve::ALL {
            let secret = SecretKey::from_bytes(curve, [7u8; 32]).unwrap();
            let other = SecretKey::from_bytes(curve, [9u8; 32]).unwrap();
            let wallet = Wallet::with_mismatched_key(secret, &other).unwrap();
            assert_eq!(
                wallet.sign_operation(&forged),
                Err(CryptoError::SignatureSelfCheckFailed { curve })
            );
        }
    }

    #[test]
    fn wallet_address_matches_key() {
        let secret = "p2sk2PtK6tT2VkXqFcUcQqdnjr1fXt5diWiBohkQu5geq1UNDsDYdF";
        let wallet = Wallet::from_secret_key(secret).unwrap();
        assert_eq!(wallet.address().to_base58(), "tz3heyJNgEyu7skyGBJTKxFNCPwVRjuhk9KT");
        assert!(!format!("{wallet:?}").contains("p2sk"));
    }
}
