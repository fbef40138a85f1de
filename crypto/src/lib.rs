//! Cryptographic primitives for bakepay.
//!
//! - **Ed25519**, **Secp256k1** and **NIST P-256** behind one [`Curve`] dispatch table
//! - **Blake2b** for digests and public key hashes
//! - **base58check** with typed prefixes for every self-describing string (`tz1…`, `edsk…`, `B…`)
//! - [`Wallet`] signs forged operations and re-verifies every signature before returning it

pub mod address;
pub mod base58;
pub mod curve;
pub mod error;
pub mod hash;
pub mod keys;
pub mod prefix;
pub mod sign;
pub mod wallet;

pub use address::Address;
pub use curve::{Curve, CurveOps, KeyKind, Prefixes};
pub use error::CryptoError;
pub use hash::{blake2b_160, blake2b_256};
pub use keys::{PublicKey, SecretKey};
pub use sign::{sign, verify, Signature};
pub use wallet::{SignedOperation, Wallet, GENERIC_OPERATION_WATERMARK};
