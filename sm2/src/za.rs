//! Identity digest ("Za") binding a signer's identifier and public key into every signature.
//!
//! `Za = H(ENTL || ID || a || b || Gx || Gy || X || Y)` where `ENTL` is the bit length of
//! `ID` as a 16-bit big-endian integer and every curve value is a fixed-width big-endian
//! field element. The message representative is then `e = H(Za || M)`.

use crate::{
    arithmetic::{hash_to_int, to_fixed_bytes},
    curve::{CurveParams, FIELD_SIZE},
    Error, Hasher, PublicKey,
};
use num_bigint::BigUint;

/// Identifier bound into signatures when the caller does not supply one.
pub const DEFAULT_IDENTIFIER: &[u8] = b"1234567812345678";

/// Longest identifier (in bytes) whose bit length fits in `ENTL`.
pub const MAX_IDENTIFIER_LENGTH: usize = u16::MAX as usize / 8;

/// Compute the identity digest of `identifier` and `public_key` on `curve`.
///
/// `None` selects [DEFAULT_IDENTIFIER]. `Some(&[])` is a genuinely empty identifier and
/// still contributes its zero length prefix.
pub fn compute_za<H: Hasher>(
    curve: &CurveParams,
    identifier: Option<&[u8]>,
    public_key: &PublicKey,
) -> Result<H::Digest, Error> {
    let identifier = identifier.unwrap_or(DEFAULT_IDENTIFIER);
    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        return Err(Error::IdentifierTooLong(identifier.len()));
    }
    let entl = (identifier.len() * 8) as u16;

    let mut hasher = H::new();
    hasher.update(&entl.to_be_bytes());
    hasher.update(identifier);
    for value in [
        curve.a(),
        curve.b(),
        curve.gx(),
        curve.gy(),
        public_key.x(),
        public_key.y(),
    ] {
        let bytes = to_fixed_bytes(value, FIELD_SIZE).ok_or(Error::InvalidPublicKey)?;
        hasher.update(&bytes);
    }
    Ok(hasher.finalize())
}

/// Compute the message representative `e = H(Za || M)` with a fresh hasher.
pub fn hash_message<H: Hasher>(za: &H::Digest, message: &[u8]) -> BigUint {
    let mut hasher = H::new();
    hasher.update(za.as_ref());
    hasher.update(message);
    hash_to_int(&hasher.finalize())
}
