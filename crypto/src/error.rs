use thiserror::Error;

use crate::curve::{Curve, KeyKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("unknown curve for prefix {0:?}")]
    UnknownCurve(String),

    #[error("invalid base58: {0}")]
    Base58(String),

    #[error("base58 checksum mismatch")]
    Checksum,

    #[error("expected a {expected} but found a {found}")]
    UnexpectedKind { expected: KeyKind, found: KeyKind },

    #[error("prefix bytes do not match {0}")]
    PrefixMismatch(&'static str),

    #[error("invalid length for {kind}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("encrypted {0} secret keys are not supported, supply the decrypted key")]
    EncryptedKeyUnsupported(Curve),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("signature self-check failed for {curve} key")]
    SignatureSelfCheckFailed { curve: Curve },
}
