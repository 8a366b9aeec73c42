//! Shared helpers for the benchmark suite.

use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::Rng;

/// Random odd starting value with exactly `bits` bits.
pub fn random_start(bits: u32, rng: &mut StdRng) -> BigUint {
    let num_bytes = (bits as usize + 7) / 8;
    let mut bytes = vec![0u8; num_bytes];
    rng.fill(&mut bytes[..]);

    let excess_bits = (num_bytes * 8) as u32 - bits;
    if excess_bits > 0 {
        bytes[0] &= (1u8 << (8 - excess_bits)) - 1;
    }
    bytes[0] |= 1u8 << ((bits - 1) % 8);
    if let Some(last) = bytes.last_mut() {
        *last |= 0x01;
    }

    BigUint::from_bytes_be(&bytes)
}
