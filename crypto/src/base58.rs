//! Base58check encoding with typed prefixes.
//!
//! Checksum: first 4 bytes of SHA-256(SHA-256(prefix ++ payload)).

use sha2::{Digest, Sha256};

use crate::prefix::Prefix;
use crate::CryptoError;

const CHECKSUM_LEN: usize = 4;

fn checksum(raw: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = Sha256::digest(Sha256::digest(raw));
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash[..CHECKSUM_LEN]);
    out
}

/// Encode `prefix.bytes ++ payload` with a trailing checksum.
pub fn encode_check(prefix: &Prefix, payload: &[u8]) -> String {
    let mut raw = Vec::with_capacity(prefix.bytes.len() + payload.len() + CHECKSUM_LEN);
    raw.extend_from_slice(prefix.bytes);
    raw.extend_from_slice(payload);
    let sum = checksum(&raw);
    raw.extend_from_slice(&sum);
    bs58::encode(raw).into_string()
}

/// Decode a base58check string, verify its checksum and return prefix ++ payload.
pub fn decode_check(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| CryptoError::Base58(e.to_string()))?;
    if bytes.len() < CHECKSUM_LEN {
        return Err(CryptoError::Base58("input too short".into()));
    }
    let (raw, sum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if sum != checksum(raw) {
        return Err(CryptoError::Checksum);
    }
    Ok(raw.to_vec())
}

/// Decode a string that must carry `prefix`, returning only the payload.
pub fn decode_prefixed(encoded: &str, prefix: &Prefix) -> Result<Vec<u8>, CryptoError> {
    let raw = decode_check(encoded)?;
    let payload = raw
        .strip_prefix(prefix.bytes)
        .ok_or(CryptoError::PrefixMismatch(prefix.text))?;
    if payload.len() != prefix.payload_len {
        return Err(CryptoError::InvalidLength {
            kind: prefix.text,
            expected: prefix.payload_len,
            actual: payload.len(),
        });
    }
    Ok(payload.to_vec())
}

/// Like [`decode_prefixed`] for fixed-size payloads.
pub fn decode_fixed<const N: usize>(
    encoded: &str,
    prefix: &Prefix,
) -> Result<[u8; N], CryptoError> {
    let payload = decode_prefixed(encoded, prefix)?;
    payload.try_into().map_err(|v: Vec<u8>| CryptoError::InvalidLength {
        kind: prefix.text,
        expected: N,
        actual: v.len(),
    })
}
