//! Verify SM2 signatures.
//!
//! Verification is a pure function of its inputs. Malformed inputs are never surfaced as
//! an [crate::Error]: [Verifier::verify] answers `false` and [Verifier::check] explains why.

use crate::{
    arithmetic::add_mod,
    curve::CurveParams,
    za::{compute_za, hash_message},
    Hasher, Point, PublicKey, Signature,
};
use num_traits::Zero;
use thiserror::Error;
use tracing::debug;

/// Reason a signature was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("r or s outside [1, n-1]")]
    SignatureOutOfRange,
    #[error("public key is not a point on the curve")]
    InvalidPublicKey,
    #[error("identifier too long")]
    IdentifierTooLong,
    #[error("r + s is zero modulo n")]
    DegenerateT,
    #[error("signature does not match")]
    Mismatch,
}

/// Checks SM2 signatures over a fixed [CurveParams].
#[derive(Clone, Debug)]
pub struct Verifier<'a> {
    curve: &'a CurveParams,
}

impl<'a> Verifier<'a> {
    /// Create a [Verifier] for `curve`.
    pub fn new(curve: &'a CurveParams) -> Self {
        Self { curve }
    }

    /// Check `signature` over `message` from `identifier` and `public_key`.
    pub fn check<H: Hasher>(
        &self,
        public_key: &PublicKey,
        identifier: Option<&[u8]>,
        message: &[u8],
        signature: &Signature,
    ) -> Result<(), Rejection> {
        let n = self.curve.order();
        let (r, s) = (signature.r(), signature.s());
        if r.is_zero() || r >= n || s.is_zero() || s >= n {
            return Err(Rejection::SignatureOutOfRange);
        }
        let point = public_key.point();
        if !self.curve.is_on_curve(&point) {
            return Err(Rejection::InvalidPublicKey);
        }

        let za = compute_za::<H>(self.curve, identifier, public_key).map_err(|err| match err {
            crate::Error::IdentifierTooLong(_) => Rejection::IdentifierTooLong,
            _ => Rejection::InvalidPublicKey,
        })?;
        let e = hash_message::<H>(&za, message);

        let t = add_mod(r, s, n);
        if t.is_zero() {
            return Err(Rejection::DegenerateT);
        }

        let Point::Affine { x: x1, .. } = self.curve.mul_base_add(s, &t, &point) else {
            return Err(Rejection::Mismatch);
        };
        if add_mod(&e, &x1, n) != *r {
            return Err(Rejection::Mismatch);
        }
        Ok(())
    }

    /// Returns `true` iff `signature` is valid (see [Verifier::check]).
    pub fn verify<H: Hasher>(
        &self,
        public_key: &PublicKey,
        identifier: Option<&[u8]>,
        message: &[u8],
        signature: &Signature,
    ) -> bool {
        match self.check::<H>(public_key, identifier, message, signature) {
            Ok(()) => true,
            Err(reason) => {
                debug!(?reason, "rejected signature");
                false
            }
        }
    }
}
