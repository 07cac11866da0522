//! Produce SM2 signatures.
//!
//! # Algorithm
//!
//! Given a private scalar `d` with public key `P = d·G`:
//!
//! 1. `Za = H(ENTL || ID || a || b || Gx || Gy || Px || Py)`
//! 2. `e = H(Za || M)`
//! 3. Draw `k` uniformly from `[1, n-1]` and compute `(x1, y1) = k·G`
//! 4. `r = (e + x1) mod n`, restarting at (3) if `r = 0` or `r + k = n`
//! 5. `s = (1 + d)⁻¹ · (k - r·d) mod n`, restarting at (3) if `s = 0`
//!
//! Since `k - r·d = (k + r) - r·(1 + d)`, step (5) is evaluated as `(1 + d)⁻¹ · (k + r) - r`,
//! so `d` itself is only needed to derive `(1 + d)⁻¹`.
//!
//! Restarts are bounded by [Config::max_attempts] so that a broken random source is
//! reported as [Error::AttemptsExhausted] instead of looping forever.
//!
//! # Example
//! ```rust
//! use commonware_sm2::{signer::Config, CurveParams, PrivateKey, Signer, Sm3, Verifier};
//! use rand::rngs::OsRng;
//!
//! let curve = CurveParams::load();
//! let private_key = PrivateKey::generate(curve, &mut OsRng);
//! let signer = Signer::with_config(curve, Config { max_attempts: 1_024 });
//!
//! let signature = signer
//!     .sign::<Sm3, _>(&mut OsRng, &private_key, Some(b"alice"), b"hello")
//!     .expect("signing failed");
//! assert!(Verifier::new(curve).verify::<Sm3>(
//!     private_key.public_key(),
//!     Some(b"alice"),
//!     b"hello",
//!     &signature,
//! ));
//! ```

use crate::{
    arithmetic::{add_mod, inv_mod, mul_mod, sub_mod},
    curve::CurveParams,
    za::{compute_za, hash_message},
    Error, Hasher, Point, PrivateKey, Signature,
};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use tracing::{trace, warn};
use zeroize::Zeroizing;

/// Default cap on random draws per signature.
pub const DEFAULT_MAX_ATTEMPTS: usize = 32_768;

/// Configuration for a [Signer].
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of random draws (including rejected samples) before giving up.
    pub max_attempts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Produces SM2 signatures over a fixed [CurveParams].
#[derive(Clone, Debug)]
pub struct Signer<'a> {
    curve: &'a CurveParams,
    cfg: Config,
}

impl<'a> Signer<'a> {
    /// Create a [Signer] with the default [Config].
    pub fn new(curve: &'a CurveParams) -> Self {
        Self::with_config(curve, Config::default())
    }

    /// Create a [Signer] with the provided [Config].
    pub fn with_config(curve: &'a CurveParams, cfg: Config) -> Self {
        Self { curve, cfg }
    }

    /// Sign `message` on behalf of `identifier` (see [compute_za] for `None`).
    ///
    /// Fails if the random source fails, if `private_key` is degenerate (`d = n-1`, or
    /// outside `[1, n-1]` for this curve), or if no usable nonce is found within
    /// [Config::max_attempts] draws.
    pub fn sign<H: Hasher, R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        private_key: &PrivateKey,
        identifier: Option<&[u8]>,
        message: &[u8],
    ) -> Result<Signature, Error> {
        let n = self.curve.order();
        let d_plus_one_inv = {
            let d = private_key.scalar();
            if d.is_zero() || d >= n - 1u32 {
                return Err(Error::DegeneratePrivateKey);
            }
            inv_mod(&(d + BigUint::one()), n).ok_or(Error::DegeneratePrivateKey)?
        };

        let za = compute_za::<H>(self.curve, identifier, private_key.public_key())?;
        let e = hash_message::<H>(&za, message);

        for attempt in 1..=self.cfg.max_attempts {
            let Some(k) = self.sample_nonce(rng)? else {
                trace!(attempt, "rejected nonce outside [1, n-1]");
                continue;
            };
            let Point::Affine { x: x1, .. } = self.curve.mul_base(&k) else {
                continue;
            };

            let r = add_mod(&e, &x1, n);
            if r.is_zero() || (&r + &k) == *n {
                trace!(attempt, "degenerate r");
                continue;
            }

            let s = sub_mod(&mul_mod(&d_plus_one_inv, &add_mod(&k, &r, n), n), &r, n);
            if s.is_zero() {
                trace!(attempt, "degenerate s");
                continue;
            }
            return Signature::new(r, s);
        }

        warn!(
            max_attempts = self.cfg.max_attempts,
            "exhausted signing attempts"
        );
        Err(Error::AttemptsExhausted(self.cfg.max_attempts))
    }

    /// Draw a candidate nonce, returning `None` if it falls outside `[1, n-1]`.
    fn sample_nonce<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<Option<BigUint>, Error> {
        let n = self.curve.order();
        let bits = n.bits();
        let mut raw = Zeroizing::new(vec![0u8; ((bits + 7) / 8) as usize]);
        rng.try_fill_bytes(&mut raw[..])
            .map_err(Error::RandomSource)?;

        // Mask the excess high bits so rejection happens at most half the time
        let excess = (raw.len() as u64) * 8 - bits;
        if excess > 0 {
            raw[0] &= 0xff >> excess;
        }
        let k = BigUint::from_bytes_be(&raw[..]);
        if k.is_zero() || k >= *n {
            return Ok(None);
        }
        Ok(Some(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arithmetic::to_fixed_bytes, curve::FIELD_SIZE, utils::from_hex_formatted, Verifier, Sm3,
    };
    use rand::{rngs::OsRng, SeedableRng};
    use std::collections::VecDeque;

    const PRIVATE_KEY: &str = "5be7e4b09a761bf5562ddf8e6a33184e00d0c09c942c6adbad1141d5d08431f0";
    const MESSAGE: &[u8] = b"test message";

    /// Replays queued byte strings, then repeats the final one.
    struct Replay {
        queue: VecDeque<Vec<u8>>,
        last: Vec<u8>,
    }

    impl Replay {
        fn new(chunks: Vec<Vec<u8>>) -> Self {
            Self {
                queue: chunks.into(),
                last: vec![0u8; FIELD_SIZE],
            }
        }
    }

    impl RngCore for Replay {
        fn next_u32(&mut self) -> u32 {
            let mut bytes = [0u8; 4];
            self.fill_bytes(&mut bytes);
            u32::from_be_bytes(bytes)
        }

        fn next_u64(&mut self) -> u64 {
            let mut bytes = [0u8; 8];
            self.fill_bytes(&mut bytes);
            u64::from_be_bytes(bytes)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            if let Some(next) = self.queue.pop_front() {
                self.last = next;
            }
            for (i, byte) in dest.iter_mut().enumerate() {
                *byte = self.last.get(i).copied().unwrap_or(0);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for Replay {}

    /// A random source that always fails.
    struct Broken;

    impl RngCore for Broken {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source unavailable"))
        }
    }

    impl CryptoRng for Broken {}

    fn vector_private_key() -> PrivateKey {
        PrivateKey::try_from(from_hex_formatted(PRIVATE_KEY).unwrap()).unwrap()
    }

    fn hex_scalar(value: &str) -> BigUint {
        BigUint::from_bytes_be(&from_hex_formatted(value).unwrap())
    }

    #[test]
    fn test_sign_fixed_nonce() {
        let curve = CurveParams::load();
        let k = from_hex_formatted(
            "6CB28D99385C175C94F94E934817663FC176D925DD72B727260DBAAE1FB2F96F",
        )
        .unwrap();
        let mut rng = Replay::new(vec![k]);
        let signature = Signer::new(curve)
            .sign::<Sm3, _>(&mut rng, &vector_private_key(), None, MESSAGE)
            .unwrap();
        assert_eq!(
            signature.r(),
            &hex_scalar("5122c9f32b8ba1216382625b6b4e66a7d6a65b5bb87f4b2978622ed339f50d4c")
        );
        assert_eq!(
            signature.s(),
            &hex_scalar("c9626a5f5c9603259d7c62436ef4680d1cfffc6ca5f8b063f734c5a5cf2aaaae")
        );
    }

    #[test]
    fn test_sign_retries_degenerate_nonce() {
        let curve = CurveParams::load();
        let n = to_fixed_bytes(curve.order(), FIELD_SIZE).unwrap();
        let k = from_hex_formatted(
            "6CB28D99385C175C94F94E934817663FC176D925DD72B727260DBAAE1FB2F96F",
        )
        .unwrap();

        // k = 0 and k = n are rejected before the usable nonce is drawn
        let mut rng = Replay::new(vec![vec![0u8; FIELD_SIZE], n, k]);
        let signature = Signer::new(curve)
            .sign::<Sm3, _>(&mut rng, &vector_private_key(), None, MESSAGE)
            .unwrap();
        assert_eq!(
            signature.r(),
            &hex_scalar("5122c9f32b8ba1216382625b6b4e66a7d6a65b5bb87f4b2978622ed339f50d4c")
        );
    }

    #[test]
    fn test_sign_attempts_exhausted() {
        let curve = CurveParams::load();
        let mut rng = Replay::new(vec![]);
        let signer = Signer::with_config(curve, Config { max_attempts: 16 });
        let result = signer.sign::<Sm3, _>(&mut rng, &vector_private_key(), None, MESSAGE);
        assert!(matches!(result, Err(Error::AttemptsExhausted(16))));
    }

    #[test]
    fn test_sign_zero_attempts() {
        let curve = CurveParams::load();
        let signer = Signer::with_config(curve, Config { max_attempts: 0 });
        let result = signer.sign::<Sm3, _>(&mut OsRng, &vector_private_key(), None, MESSAGE);
        assert!(matches!(result, Err(Error::AttemptsExhausted(0))));
    }

    #[test]
    fn test_sign_broken_random_source() {
        let curve = CurveParams::load();
        let result =
            Signer::new(curve).sign::<Sm3, _>(&mut Broken, &vector_private_key(), None, MESSAGE);
        assert!(matches!(result, Err(Error::RandomSource(_))));
    }

    #[test]
    fn test_sign_degenerate_private_key() {
        let curve = CurveParams::load();
        let n_minus_one = to_fixed_bytes(&(curve.order() - 1u32), FIELD_SIZE).unwrap();
        let private_key = PrivateKey::from_bytes(curve, &n_minus_one).unwrap();
        let result = Signer::new(curve).sign::<Sm3, _>(&mut OsRng, &private_key, None, MESSAGE);
        assert!(matches!(result, Err(Error::DegeneratePrivateKey)));
    }

    #[test]
    fn test_sign_identifier_too_long() {
        let curve = CurveParams::load();
        let identifier = vec![0u8; crate::za::MAX_IDENTIFIER_LENGTH + 1];
        let result = Signer::new(curve).sign::<Sm3, _>(
            &mut OsRng,
            &vector_private_key(),
            Some(identifier.as_slice()),
            MESSAGE,
        );
        assert!(matches!(result, Err(Error::IdentifierTooLong(_))));
    }

    #[test]
    fn test_signature_components_in_range() {
        let curve = CurveParams::load();
        let signer = Signer::new(curve);
        let private_key = PrivateKey::from_seed(3);
        let n = curve.order();
        for i in 0..16u8 {
            let signature = signer
                .sign::<Sm3, _>(&mut OsRng, &private_key, None, &[i])
                .unwrap();
            assert!(!signature.r().is_zero() && signature.r() < n);
            assert!(!signature.s().is_zero() && signature.s() < n);
        }
    }

    #[test]
    fn test_sign_and_verify_small_order() {
        // y² = x³ + 2x + 2 over F_17 with G = (5, 1) of order 19
        let curve = CurveParams::new(
            BigUint::from(17u32),
            BigUint::from(2u32),
            BigUint::from(2u32),
            BigUint::from(5u32),
            BigUint::from(1u32),
            BigUint::from(19u32),
            BigUint::from(1u32),
        )
        .unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let signer = Signer::new(&curve);
        let verifier = Verifier::new(&curve);
        for i in 0..16u8 {
            let private_key = PrivateKey::generate(&curve, &mut rng);
            let signature = signer
                .sign::<Sm3, _>(&mut rng, &private_key, None, &[i])
                .unwrap();
            assert!(signature.r() < curve.order() && signature.s() < curve.order());
            assert!(verifier.verify::<Sm3>(private_key.public_key(), None, &[i], &signature));
        }
    }

    #[test]
    fn test_sign_and_verify_alternate_curve() {
        let curve = CurveParams::load();
        let g2 = curve.mul_base(&BigUint::from(2u32));
        let alternate = CurveParams::new(
            curve.p().clone(),
            curve.a().clone(),
            curve.b().clone(),
            g2.x().unwrap().clone(),
            g2.y().unwrap().clone(),
            curve.order().clone(),
            curve.cofactor().clone(),
        )
        .unwrap();
        let private_key = PrivateKey::generate(&alternate, &mut OsRng);
        let signature = Signer::new(&alternate)
            .sign::<Sm3, _>(&mut OsRng, &private_key, None, MESSAGE)
            .unwrap();
        assert!(Verifier::new(&alternate).verify::<Sm3>(
            private_key.public_key(),
            None,
            MESSAGE,
            &signature
        ));
        assert!(!Verifier::new(curve).verify::<Sm3>(
            private_key.public_key(),
            None,
            MESSAGE,
            &signature
        ));
    }
}
