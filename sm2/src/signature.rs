//! SM2 signatures.

use crate::{
    arithmetic::to_fixed_bytes,
    curve::FIELD_SIZE,
    utils::{hex, read_array},
    Error,
};
use bytes::{Buf, BufMut};
use num_bigint::BigUint;
use std::fmt::{Debug, Display};

/// Length of an encoded [Signature] (`r || s`).
pub const SIGNATURE_LENGTH: usize = 2 * FIELD_SIZE;

/// SM2 Signature `(r, s)`.
///
/// Construction only enforces the encoding width. Whether `r` and `s` lie in `[1, n-1]` is
/// checked by the [crate::Verifier].
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    /// Create a [Signature] from its two components.
    pub fn new(r: BigUint, s: BigUint) -> Result<Self, Error> {
        if r.bits() > (FIELD_SIZE * 8) as u64 || s.bits() > (FIELD_SIZE * 8) as u64 {
            return Err(Error::InvalidSignature);
        }
        Ok(Self { r, s })
    }

    /// Component `r`.
    pub fn r(&self) -> &BigUint {
        &self.r
    }

    /// Component `s`.
    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// Encode as `r || s`, each a fixed-width big-endian integer.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut raw = [0u8; SIGNATURE_LENGTH];
        let (r, s) = raw.split_at_mut(FIELD_SIZE);
        // Width is enforced at construction
        if let Some(bytes) = to_fixed_bytes(&self.r, FIELD_SIZE) {
            r.copy_from_slice(&bytes);
        }
        if let Some(bytes) = to_fixed_bytes(&self.s, FIELD_SIZE) {
            s.copy_from_slice(&bytes);
        }
        raw
    }

    /// Read a [Signature] from `buf`.
    pub fn read_from(buf: &mut impl Buf) -> Result<Self, Error> {
        let raw = read_array::<SIGNATURE_LENGTH>(buf)?;
        Self::try_from(raw.as_slice())
    }

    /// Write the encoded signature to `buf`.
    pub fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.to_bytes());
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.len() != SIGNATURE_LENGTH {
            return Err(Error::InvalidSignatureLength);
        }
        let (r, s) = value.split_at(FIELD_SIZE);
        Ok(Self {
            r: BigUint::from_bytes_be(r),
            s: BigUint::from_bytes_be(s),
        })
    }
}

impl TryFrom<&Vec<u8>> for Signature {
    type Error = Error;
    fn try_from(value: &Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl TryFrom<Vec<u8>> for Signature {
    type Error = Error;
    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.to_bytes()))
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.to_bytes()))
    }
}
