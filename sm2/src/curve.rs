//! Curve parameter sets.
//!
//! [CurveParams::load] returns the `sm2p256v1` parameters recommended by GM/T 0003.5-2012,
//! constructed once per process. Alternate parameter sets (useful for negative testing) can
//! be built with [CurveParams::new], which runs the same consistency checks.

use crate::{
    arithmetic::{add_mod, mul_mod},
    point::{self, Point},
    Error,
};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::sync::OnceLock;

/// Byte length of field elements and scalars.
pub const FIELD_SIZE: usize = 32;

const SM2_P: &str = "FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00000000FFFFFFFFFFFFFFFF";
const SM2_A: &str = "FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00000000FFFFFFFFFFFFFFFC";
const SM2_B: &str = "28E9FA9E9D9F5E344D5A9E4BCF6509A7F39789F515AB8F92DDBCBD414D940E93";
const SM2_GX: &str = "32C4AE2C1F1981195F9904466A39C9948FE30BBFF2660BE1715A4589334C74C7";
const SM2_GY: &str = "BC3736A2F4F6779C59BDCEE36B692153D0A9877CC62A474002DF32E52139F0A0";
const SM2_N: &str = "FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFF7203DF6B21C6052B53BBF40939D54123";
const SM2_H: &str = "01";

static SM2P256V1: OnceLock<CurveParams> = OnceLock::new();

/// Immutable description of a prime-field curve `y² = x³ + a·x + b` with a base point of
/// prime order `n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurveParams {
    p: BigUint,
    a: BigUint,
    b: BigUint,
    gx: BigUint,
    gy: BigUint,
    generator: Point,
    n: BigUint,
    h: BigUint,
}

fn parse(hex: &str) -> Result<BigUint, Error> {
    BigUint::parse_bytes(hex.as_bytes(), 16).ok_or(Error::CurveInit("malformed constant"))
}

impl CurveParams {
    /// Build a parameter set, rejecting any internally inconsistent combination.
    ///
    /// The check covers field width, coefficient ranges, the discriminant, base point
    /// membership, and `n·G = O`. It performs a full scalar multiplication.
    pub fn new(
        p: BigUint,
        a: BigUint,
        b: BigUint,
        gx: BigUint,
        gy: BigUint,
        n: BigUint,
        h: BigUint,
    ) -> Result<Self, Error> {
        if p.bits() > (FIELD_SIZE * 8) as u64 || n.bits() > (FIELD_SIZE * 8) as u64 {
            return Err(Error::CurveInit("parameters wider than field size"));
        }
        if p <= BigUint::from(3u32) || (&p % 2u32).is_zero() {
            return Err(Error::CurveInit("modulus must be an odd prime"));
        }
        if a >= p || b >= p || gx >= p || gy >= p {
            return Err(Error::CurveInit("coefficient not reduced"));
        }
        if n <= BigUint::one() || h.is_zero() {
            return Err(Error::CurveInit("invalid order or cofactor"));
        }

        // 4a³ + 27b² ≠ 0 (mod p)
        let a3 = mul_mod(&mul_mod(&a, &a, &p), &a, &p);
        let b2 = mul_mod(&b, &b, &p);
        let discriminant = add_mod(&(a3 * 4u32), &(b2 * 27u32), &p);
        if discriminant.is_zero() {
            return Err(Error::CurveInit("singular curve"));
        }

        let generator = Point::new(gx.clone(), gy.clone());
        let curve = Self {
            p,
            a,
            b,
            gx,
            gy,
            generator,
            n,
            h,
        };
        if !curve.is_on_curve(&curve.generator) {
            return Err(Error::CurveInit("base point not on curve"));
        }
        if !curve.mul(&curve.generator, &curve.n).is_infinity() {
            return Err(Error::CurveInit("base point order mismatch"));
        }
        Ok(curve)
    }

    /// Build the `sm2p256v1` parameter set from its compiled-in constants.
    pub fn sm2p256v1() -> Result<Self, Error> {
        Self::new(
            parse(SM2_P)?,
            parse(SM2_A)?,
            parse(SM2_B)?,
            parse(SM2_GX)?,
            parse(SM2_GY)?,
            parse(SM2_N)?,
            parse(SM2_H)?,
        )
    }

    /// Returns the process-wide `sm2p256v1` parameter set, constructing it on first use.
    ///
    /// Concurrent first callers block until a single initialization completes.
    ///
    /// # Panics
    ///
    /// Panics if the compiled-in constants are inconsistent (a corrupted build).
    pub fn load() -> &'static Self {
        SM2P256V1.get_or_init(|| match Self::sm2p256v1() {
            Ok(curve) => curve,
            Err(err) => panic!("sm2p256v1 initialization failed: {err}"),
        })
    }

    /// Returns true iff `point` is finite, has reduced coordinates, and satisfies
    /// `y² ≡ x³ + a·x + b (mod p)`.
    pub fn is_on_curve(&self, point: &Point) -> bool {
        let Point::Affine { x, y } = point else {
            return false;
        };
        if *x >= self.p || *y >= self.p {
            return false;
        }
        let p = &self.p;
        let lhs = mul_mod(y, y, p);
        let x3 = mul_mod(&mul_mod(x, x, p), x, p);
        let rhs = add_mod(&add_mod(&x3, &mul_mod(&self.a, x, p), p), &self.b, p);
        lhs == rhs
    }

    /// Field modulus.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Coefficient `a`.
    pub fn a(&self) -> &BigUint {
        &self.a
    }

    /// Coefficient `b`.
    pub fn b(&self) -> &BigUint {
        &self.b
    }

    /// Base point `G`.
    pub fn generator(&self) -> &Point {
        &self.generator
    }

    /// x-coordinate of `G`.
    pub fn gx(&self) -> &BigUint {
        &self.gx
    }

    /// y-coordinate of `G`.
    pub fn gy(&self) -> &BigUint {
        &self.gy
    }

    /// Order `n` of `G`.
    pub fn order(&self) -> &BigUint {
        &self.n
    }

    /// Cofactor `h`.
    pub fn cofactor(&self) -> &BigUint {
        &self.h
    }

    /// Compute `P + Q`.
    pub fn add(&self, lhs: &Point, rhs: &Point) -> Point {
        point::add(self, lhs, rhs)
    }

    /// Compute `k·P`.
    pub fn mul(&self, point: &Point, scalar: &BigUint) -> Point {
        point::mul(self, point, scalar)
    }

    /// Compute `k·G`.
    pub fn mul_base(&self, scalar: &BigUint) -> Point {
        point::mul(self, &self.generator, scalar)
    }

    /// Compute `u·G + v·Q`.
    pub fn mul_base_add(&self, u: &BigUint, v: &BigUint, point: &Point) -> Point {
        point::mul_add(self, u, &self.generator, v, point)
    }
}
