//! Sign and verify messages with the SM2 elliptic-curve signature scheme.
//!
//! Signatures are produced over the `sm2p256v1` prime-field curve and bind the signer's
//! identifier and public key into every message digest (the "Za" digest). The hash function
//! is pluggable through the [Hasher] trait, with [Sm3] (mandated by the standard) and
//! [Sha256] provided.
//!
//! # Status
//!
//! `commonware-sm2` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.
//!
//! # Example
//! ```rust
//! use commonware_sm2::{sign, verify, PrivateKey};
//! use rand::rngs::OsRng;
//!
//! // Generate a new private key
//! let private_key = PrivateKey::from_rng(&mut OsRng);
//!
//! // Sign a message under the default identifier
//! let msg = b"hello, world!";
//! let signature = sign(&mut OsRng, &private_key, None, msg).expect("signing failed");
//!
//! // Verify the signature
//! assert!(verify(private_key.public_key(), None, msg, &signature));
//!
//! // The identifier is bound into the signature
//! assert!(!verify(private_key.public_key(), Some(b"alice"), msg, &signature));
//! ```

use rand::{CryptoRng, RngCore};
use std::{
    fmt::{Debug, Display},
    hash::Hash,
    ops::Deref,
};
use thiserror::Error;

pub mod arithmetic;
pub mod curve;
pub use curve::CurveParams;
pub mod keys;
pub use keys::{PrivateKey, PublicKey};
pub mod point;
pub use point::Point;
pub mod sha256;
pub use sha256::Sha256;
pub mod signature;
pub use signature::Signature;
pub mod signer;
pub use signer::Signer;
pub mod sm3;
pub use sm3::Sm3;
pub mod utils;
pub mod verifier;
pub use verifier::{Rejection, Verifier};
pub mod za;
pub use za::{compute_za, DEFAULT_IDENTIFIER};

/// Errors that can occur when constructing curves, decoding keys, or signing.
///
/// Verification never returns an [Error]. A signature that does not verify is reported
/// as `false` (see [Verifier::verify]).
#[derive(Error, Debug)]
pub enum Error {
    #[error("inconsistent curve parameters: {0}")]
    CurveInit(&'static str),
    #[error("random source failed: {0}")]
    RandomSource(rand::Error),
    #[error("degenerate private key")]
    DegeneratePrivateKey,
    #[error("no valid nonce after {0} attempts")]
    AttemptsExhausted(usize),
    #[error("identifier too long: {0} bytes")]
    IdentifierTooLong(usize),
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("invalid private key length")]
    InvalidPrivateKeyLength,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid public key length")]
    InvalidPublicKeyLength,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid signature length")]
    InvalidSignatureLength,
    #[error("invalid digest length")]
    InvalidDigestLength,
    #[error("insufficient bytes")]
    InsufficientBytes,
}

/// A fixed-size digest produced by a [Hasher].
pub trait Digest:
    Copy
    + Send
    + Sync
    + 'static
    + Eq
    + PartialEq
    + Hash
    + Debug
    + Display
    + AsRef<[u8]>
    + Deref<Target = [u8]>
{
}

/// Interface used to absorb bytes and produce a fixed-length [Digest].
///
/// The identity digest and the message digest of a single sign or verify call are two
/// independent computations. Each is performed with a hasher created by [Hasher::new],
/// so no state can leak from one into the other.
///
/// This trait is required to implement the `Clone` trait because it is often
/// part of a struct that is cloned. Implementations do not clone the hasher state.
pub trait Hasher: Clone + Send + Sync + 'static {
    /// Digest generated by the hasher.
    type Digest: Digest;

    /// Create a new hasher.
    fn new() -> Self;

    /// Append message to previously recorded data.
    fn update(&mut self, message: &[u8]);

    /// Hash all recorded data and reset the hasher
    /// to the initial state.
    fn finalize(&mut self) -> Self::Digest;

    /// Reset the hasher without generating a hash.
    ///
    /// This function does not need to be called after `finalize`.
    fn reset(&mut self);
}

/// Sign `message` over `sm2p256v1` with [Sm3], as the standard mandates.
///
/// When `identifier` is `None`, [DEFAULT_IDENTIFIER] is bound into the signature.
pub fn sign<R: RngCore + CryptoRng>(
    rng: &mut R,
    private_key: &PrivateKey,
    identifier: Option<&[u8]>,
    message: &[u8],
) -> Result<Signature, Error> {
    Signer::new(CurveParams::load()).sign::<Sm3, _>(rng, private_key, identifier, message)
}

/// Verify a [Signature] produced by [sign].
pub fn verify(
    public_key: &PublicKey,
    identifier: Option<&[u8]>,
    message: &[u8],
    signature: &Signature,
) -> bool {
    Verifier::new(CurveParams::load()).verify::<Sm3>(public_key, identifier, message, signature)
}
