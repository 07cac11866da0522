//! SM2 private and public keys.
//!
//! Private keys are 32-byte big-endian scalars in `[1, n-1]`. Public keys are encoded as
//! uncompressed SEC1 points (`0x04 || X || Y`).

use crate::{
    arithmetic::to_fixed_bytes,
    curve::{CurveParams, FIELD_SIZE},
    utils::{hex, read_array},
    Error, Point,
};
use bytes::{Buf, BufMut};
use num_bigint::BigUint;
use num_traits::Zero;
use rand::{CryptoRng, Rng, SeedableRng};
use std::fmt::{Debug, Display};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Length of an encoded [PrivateKey].
pub const PRIVATE_KEY_LENGTH: usize = FIELD_SIZE;

/// Length of an encoded [PublicKey] (`0x04 || X || Y`).
pub const PUBLIC_KEY_LENGTH: usize = 1 + 2 * FIELD_SIZE;

const UNCOMPRESSED_TAG: u8 = 0x04;

/// SM2 Private Key.
///
/// The raw scalar is zeroized on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    raw: [u8; PRIVATE_KEY_LENGTH],
    #[zeroize(skip)]
    public_key: PublicKey,
}

impl PrivateKey {
    /// Create a [PrivateKey] from a big-endian scalar on `curve`.
    ///
    /// The scalar must lie in `[1, n-1]`.
    pub fn from_bytes(curve: &CurveParams, bytes: &[u8]) -> Result<Self, Error> {
        let raw: [u8; PRIVATE_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| Error::InvalidPrivateKeyLength)?;
        let raw = Zeroizing::new(raw);
        let d = BigUint::from_bytes_be(&raw[..]);
        if d.is_zero() || d >= *curve.order() {
            return Err(Error::InvalidPrivateKey);
        }
        let public_key = PublicKey::from_point(curve, &curve.mul_base(&d))?;
        Ok(Self {
            raw: *raw,
            public_key,
        })
    }

    /// Generate a [PrivateKey] on `curve` with a scalar drawn uniformly from `[1, n-2]`.
    ///
    /// `n-1` is excluded because `1 + d` must be invertible modulo `n` when signing.
    pub fn generate<R: Rng + CryptoRng>(curve: &CurveParams, rng: &mut R) -> Self {
        let upper = curve.order() - 1u32;
        let bits = curve.order().bits();
        let len = ((bits + 7) / 8) as usize;
        let excess = (len as u64) * 8 - bits;
        loop {
            // Draw only as many bytes as the order needs, right-aligned
            let mut raw = Zeroizing::new([0u8; PRIVATE_KEY_LENGTH]);
            let draw = &mut raw[PRIVATE_KEY_LENGTH - len..];
            rng.fill_bytes(draw);
            if excess > 0 {
                draw[0] &= 0xff >> excess;
            }
            let d = BigUint::from_bytes_be(&raw[..]);
            if d.is_zero() || d >= upper {
                continue;
            }
            if let Ok(private_key) = Self::from_bytes(curve, &raw[..]) {
                return private_key;
            }
        }
    }

    /// Create a fresh `sm2p256v1` [PrivateKey] using the supplied RNG.
    pub fn from_rng<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        Self::generate(CurveParams::load(), rng)
    }

    /// Create a `sm2p256v1` [PrivateKey] from a seed.
    ///
    /// # Warning
    ///
    /// This function is insecure and should only be used for examples
    /// and testing.
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        Self::from_rng(&mut rng)
    }

    /// Returns the [PublicKey] `d·G`.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Returns the secret scalar `d`.
    ///
    /// The returned integer is not zeroized on drop. Callers should drop it as soon as
    /// it is no longer needed.
    pub(crate) fn scalar(&self) -> BigUint {
        BigUint::from_bytes_be(&self.raw[..])
    }

    /// Read a `sm2p256v1` [PrivateKey] from `buf`.
    pub fn read_from(buf: &mut impl Buf) -> Result<Self, Error> {
        let raw = Zeroizing::new(read_array::<PRIVATE_KEY_LENGTH>(buf)?);
        Self::try_from(&raw[..])
    }

    /// Write the raw scalar to `buf`.
    pub fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.raw[..]);
    }
}

impl AsRef<[u8]> for PrivateKey {
    fn as_ref(&self) -> &[u8] {
        &self.raw[..]
    }
}

impl Eq for PrivateKey {}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        // Compare every byte regardless of where the first difference occurs
        let diff = self
            .raw
            .iter()
            .zip(other.raw.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        diff == 0
    }
}

impl TryFrom<&[u8]> for PrivateKey {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(CurveParams::load(), value)
    }
}

impl TryFrom<&Vec<u8>> for PrivateKey {
    type Error = Error;
    fn try_from(value: &Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl TryFrom<Vec<u8>> for PrivateKey {
    type Error = Error;
    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let value = Zeroizing::new(value);
        Self::try_from(value.as_slice())
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Display for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// SM2 Public Key.
///
/// Always a finite point whose coordinates fit in [FIELD_SIZE] bytes. Keys decoded from
/// bytes or built with [PublicKey::from_point] are also known to lie on the curve. Keys
/// built with [PublicKey::from_coordinates] are not, and are re-checked during verification.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct PublicKey {
    x: BigUint,
    y: BigUint,
}

impl PublicKey {
    /// Create a [PublicKey] from a point on `curve`.
    pub fn from_point(curve: &CurveParams, point: &Point) -> Result<Self, Error> {
        if !curve.is_on_curve(point) {
            return Err(Error::InvalidPublicKey);
        }
        let Point::Affine { x, y } = point else {
            return Err(Error::InvalidPublicKey);
        };
        Self::from_coordinates(x.clone(), y.clone())
    }

    /// Create a [PublicKey] from raw coordinates without checking curve membership.
    pub fn from_coordinates(x: BigUint, y: BigUint) -> Result<Self, Error> {
        if x.bits() > (FIELD_SIZE * 8) as u64 || y.bits() > (FIELD_SIZE * 8) as u64 {
            return Err(Error::InvalidPublicKey);
        }
        Ok(Self { x, y })
    }

    /// x-coordinate.
    pub fn x(&self) -> &BigUint {
        &self.x
    }

    /// y-coordinate.
    pub fn y(&self) -> &BigUint {
        &self.y
    }

    /// Returns the key as an affine [Point].
    pub fn point(&self) -> Point {
        Point::new(self.x.clone(), self.y.clone())
    }

    /// Encode as `0x04 || X || Y`.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        let mut raw = [0u8; PUBLIC_KEY_LENGTH];
        raw[0] = UNCOMPRESSED_TAG;
        for (value, chunk) in [&self.x, &self.y]
            .into_iter()
            .zip(raw[1..].chunks_exact_mut(FIELD_SIZE))
        {
            // Width is enforced at construction
            if let Some(bytes) = to_fixed_bytes(value, FIELD_SIZE) {
                chunk.copy_from_slice(&bytes);
            }
        }
        raw
    }

    /// Decode an uncompressed point and check that it lies on `curve`.
    pub fn from_bytes(curve: &CurveParams, bytes: &[u8]) -> Result<Self, Error> {
        let raw: [u8; PUBLIC_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| Error::InvalidPublicKeyLength)?;
        if raw[0] != UNCOMPRESSED_TAG {
            return Err(Error::InvalidPublicKey);
        }
        let x = BigUint::from_bytes_be(&raw[1..1 + FIELD_SIZE]);
        let y = BigUint::from_bytes_be(&raw[1 + FIELD_SIZE..]);
        Self::from_point(curve, &Point::new(x, y))
    }

    /// Read a `sm2p256v1` [PublicKey] from `buf`.
    pub fn read_from(buf: &mut impl Buf) -> Result<Self, Error> {
        let raw = read_array::<PUBLIC_KEY_LENGTH>(buf)?;
        Self::try_from(raw.as_slice())
    }

    /// Write the encoded key to `buf`.
    pub fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.to_bytes());
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(CurveParams::load(), value)
    }
}

impl TryFrom<&Vec<u8>> for PublicKey {
    type Error = Error;
    fn try_from(value: &Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl TryFrom<Vec<u8>> for PublicKey {
    type Error = Error;
    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.to_bytes()))
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.to_bytes()))
    }
}
