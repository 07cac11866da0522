//! Modular arithmetic over arbitrary-precision integers.
//!
//! Every helper reduces its result into `[0, m)`. Callers are expected to check for
//! zero before requesting an inverse; [inv_mod] also refuses zero rather than
//! returning a meaningless value.

use num_bigint::BigUint;
use num_traits::Zero;

/// Compute `(a + b) mod m`.
pub fn add_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    (a + b) % m
}

/// Compute `(a - b) mod m`.
pub fn sub_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    let a = a % m;
    let b = b % m;
    if a >= b {
        a - b
    } else {
        m - b + a
    }
}

/// Compute `(a * b) mod m`.
pub fn mul_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    (a * b) % m
}

/// Compute the inverse of `a` modulo the prime `m`.
///
/// Uses Fermat's little theorem (`a^(m-2) mod m`), so the exponentiation performs the
/// same sequence of operations for every `a` of a given width.
///
/// Returns `None` if `a ≡ 0 (mod m)`.
pub fn inv_mod(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let a = a % m;
    if a.is_zero() {
        return None;
    }
    let exponent = m - 2u32;
    Some(a.modpow(&exponent, m))
}

/// Serialize `value` as a big-endian byte string of exactly `len` bytes.
///
/// Short values are zero-padded on the left. Returns `None` if `value` does not fit.
pub fn to_fixed_bytes(value: &BigUint, len: usize) -> Option<Vec<u8>> {
    if value.is_zero() {
        return Some(vec![0u8; len]);
    }
    let bytes = value.to_bytes_be();
    if bytes.len() > len {
        return None;
    }
    let mut fixed = vec![0u8; len - bytes.len()];
    fixed.extend_from_slice(&bytes);
    Some(fixed)
}

/// Interpret a digest as a big-endian integer.
///
/// The digest is taken as-is (no truncation to the order's bit length).
pub fn hash_to_int(digest: &[u8]) -> BigUint {
    BigUint::from_bytes_be(digest)
}
