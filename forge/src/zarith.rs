//! Zarith natural numbers: little-endian base-128 groups, high bit set on every
//! byte but the last.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

pub fn write_u64(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

pub fn write_natural(out: &mut Vec<u8>, value: &BigUint) {
    if let Some(small) = value.to_u64() {
        return write_u64(out, small);
    }
    let mut rest = value.clone();
    let mask = BigUint::from(0x7fu8);
    loop {
        let group = (&rest & &mask).to_u8().unwrap_or_default();
        rest >>= 7;
        if rest.is_zero() {
            out.push(group);
            return;
        }
        out.push(group | 0x80);
    }
}

/// Encoded length of `value`, without allocating.
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

pub fn natural_len(value: &BigUint) -> usize {
    match value.to_u64() {
        Some(small) => encoded_len(small),
        None => (value.bits() as usize).div_ceil(7),
    }
}
