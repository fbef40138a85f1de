//! Base58check prefixes.
//!
//! Each prefix pairs the leading bytes prepended before base58check encoding with the
//! leading characters they produce, so decoded payloads are self-describing.

/// A typed base58check prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefix {
    /// Leading characters of the encoded string.
    pub text: &'static str,
    /// Bytes prepended to the payload before encoding.
    pub bytes: &'static [u8],
    /// Payload length in bytes, excluding prefix and checksum.
    pub payload_len: usize,
}

const fn prefix(text: &'static str, bytes: &'static [u8], payload_len: usize) -> Prefix {
    Prefix {
        text,
        bytes,
        payload_len,
    }
}

// Ed25519
pub const TZ1: Prefix = prefix("tz1", &[6, 161, 159], 20);
pub const EDPK: Prefix = prefix("edpk", &[13, 15, 37, 217], 32);
pub const EDSK_SEED: Prefix = prefix("edsk", &[13, 15, 58, 7], 32);
pub const EDSK: Prefix = prefix("edsk", &[43, 246, 78, 7], 64);
pub const EDESK: Prefix = prefix("edesk", &[7, 90, 60, 179, 41], 56);
pub const EDSIG: Prefix = prefix("edsig", &[9, 245, 205, 134, 18], 64);

// Secp256k1
pub const TZ2: Prefix = prefix("tz2", &[6, 161, 161], 20);
pub const SPPK: Prefix = prefix("sppk", &[3, 254, 226, 86], 33);
pub const SPSK: Prefix = prefix("spsk", &[17, 162, 224, 201], 32);
pub const SPESK: Prefix = prefix("spesk", &[9, 237, 241, 174, 150], 56);
pub const SPSIG: Prefix = prefix("spsig1", &[13, 115, 101, 19, 63], 64);

// NIST P-256
pub const TZ3: Prefix = prefix("tz3", &[6, 161, 164], 20);
pub const P2PK: Prefix = prefix("p2pk", &[3, 178, 139, 127], 33);
pub const P2SK: Prefix = prefix("p2sk", &[16, 81, 238, 189], 32);
pub const P2ESK: Prefix = prefix("p2esk", &[9, 48, 57, 115, 171], 56);
pub const P2SIG: Prefix = prefix("p2sig", &[54, 240, 44, 52], 64);

// Curve independent
pub const KT1: Prefix = prefix("KT1", &[2, 90, 121], 20);
pub const BLOCK_HASH: Prefix = prefix("B", &[1, 52], 32);
pub const OPERATION_HASH: Prefix = prefix("o", &[5, 116], 32);
pub const GENERIC_SIGNATURE: Prefix = prefix("sig", &[4, 130, 43], 64);
