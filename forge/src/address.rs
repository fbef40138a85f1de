//! Binary encodings of sources, destinations and branches.

use bakepay_crypto::base58;
use bakepay_crypto::prefix::BLOCK_HASH;
use bakepay_crypto::Address;

use crate::ForgeError;

/// Implicit source: curve tag ‖ 20-byte key hash. Originated accounts cannot sign.
pub fn encode_source(address: &str) -> Result<[u8; 21], ForgeError> {
    match Address::parse(address).map_err(|e| ForgeError::invalid("source", address, e))? {
        Address::Implicit { curve, hash } => {
            let mut out = [0u8; 21];
            out[0] = curve.tag();
            out[1..].copy_from_slice(&hash);
            Ok(out)
        }
        Address::Originated { .. } => Err(ForgeError::Encoding(format!(
            "source {address} is an originated contract"
        ))),
    }
}

/// Contract id: `00 ‖ curve tag ‖ hash` or `01 ‖ hash ‖ 00`.
pub fn encode_destination(address: &str) -> Result<[u8; 22], ForgeError> {
    let mut out = [0u8; 22];
    match Address::parse(address).map_err(|e| ForgeError::invalid("destination", address, e))? {
        Address::Implicit { curve, hash } => {
            out[0] = 0x00;
            out[1] = curve.tag();
            out[2..].copy_from_slice(&hash);
        }
        Address::Originated { hash } => {
            out[0] = 0x01;
            out[1..21].copy_from_slice(&hash);
            out[21] = 0x00;
        }
    }
    Ok(out)
}

pub fn decode_branch(branch: &str) -> Result<[u8; 32], ForgeError> {
    base58::decode_fixed::<32>(branch, &BLOCK_HASH)
        .map_err(|e| ForgeError::invalid("branch", branch, e))
}
