//! SM3 implementation of the `Hasher` trait.
//!
//! This implementation uses the `sm3` crate to generate SM3 digests (GB/T 32905-2016),
//! the hash function mandated for SM2 signatures.
//!
//! # Example
//! ```rust
//! use commonware_sm2::{Hasher, Sm3};
//!
//! // Create a new SM3 hasher
//! let mut hasher = Sm3::new();
//!
//! // Update the hasher with some messages
//! hasher.update(b"hello,");
//! hasher.update(b"world!");
//!
//! // Finalize the hasher to get the digest
//! let digest = hasher.finalize();
//!
//! // Print the digest
//! println!("digest: {:?}", digest);
//! ```

use crate::{utils::hex, Error, Hasher};
use bytes::{Buf, BufMut};
use sm3::{Digest as _, Sm3 as ISm3};
use std::{
    fmt::{Debug, Display},
    ops::Deref,
};

/// Length of an SM3 digest.
pub const DIGEST_LENGTH: usize = 32;

/// Generate an SM3 digest from a message.
pub fn hash(message: &[u8]) -> Digest {
    let array: [u8; DIGEST_LENGTH] = ISm3::digest(message).into();
    Digest::from(array)
}

/// SM3 hasher.
#[derive(Debug)]
pub struct Sm3 {
    hasher: ISm3,
}

impl Default for Sm3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Sm3 {
    fn clone(&self) -> Self {
        // We manually implement `Clone` to avoid cloning the hasher state.
        Self::default()
    }
}

impl Hasher for Sm3 {
    type Digest = Digest;

    fn new() -> Self {
        Self {
            hasher: ISm3::new(),
        }
    }

    fn update(&mut self, message: &[u8]) {
        self.hasher.update(message);
    }

    fn finalize(&mut self) -> Self::Digest {
        let finalized = self.hasher.finalize_reset();
        let array: [u8; DIGEST_LENGTH] = finalized.into();
        Self::Digest::from(array)
    }

    fn reset(&mut self) {
        self.hasher = ISm3::new();
    }
}

/// Digest of an SM3 hashing operation.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Digest([u8; DIGEST_LENGTH]);

impl Digest {
    /// Read a digest from `buf`.
    pub fn read_from(buf: &mut impl Buf) -> Result<Self, Error> {
        crate::utils::read_array(buf).map(Self)
    }

    /// Write the digest to `buf`.
    pub fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.0);
    }
}

impl crate::Digest for Digest {}

impl From<[u8; DIGEST_LENGTH]> for Digest {
    fn from(value: [u8; DIGEST_LENGTH]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; DIGEST_LENGTH] =
            value.try_into().map_err(|_| Error::InvalidDigestLength)?;
        Ok(Self(array))
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Digest {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0))
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0))
    }
}
