//! Points on a short Weierstrass curve `y² = x³ + a·x + b` over a prime field.
//!
//! Callers work with affine [Point]s. Internally, addition and doubling run in Jacobian
//! coordinates so that a scalar multiplication performs a single field inversion.

use crate::{
    arithmetic::{inv_mod, mul_mod, sub_mod},
    curve::CurveParams,
};
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// An affine curve point or the group identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Point {
    /// The point at infinity (group identity).
    Infinity,
    /// A finite point `(x, y)`.
    Affine { x: BigUint, y: BigUint },
}

impl Point {
    /// Create a finite point. No curve membership check is performed.
    pub fn new(x: BigUint, y: BigUint) -> Self {
        Self::Affine { x, y }
    }

    /// Returns true if this is the point at infinity.
    pub fn is_infinity(&self) -> bool {
        matches!(self, Self::Infinity)
    }

    /// Returns the x-coordinate of a finite point.
    pub fn x(&self) -> Option<&BigUint> {
        match self {
            Self::Infinity => None,
            Self::Affine { x, .. } => Some(x),
        }
    }

    /// Returns the y-coordinate of a finite point.
    pub fn y(&self) -> Option<&BigUint> {
        match self {
            Self::Infinity => None,
            Self::Affine { y, .. } => Some(y),
        }
    }
}

/// `(X, Y, Z)` represents the affine point `(X/Z², Y/Z³)`. `Z = 0` is infinity.
#[derive(Clone, Debug)]
struct Jacobian {
    x: BigUint,
    y: BigUint,
    z: BigUint,
}

impl Jacobian {
    fn infinity() -> Self {
        Self {
            x: BigUint::one(),
            y: BigUint::one(),
            z: BigUint::zero(),
        }
    }

    fn from_affine(point: &Point) -> Self {
        match point {
            Point::Infinity => Self::infinity(),
            Point::Affine { x, y } => Self {
                x: x.clone(),
                y: y.clone(),
                z: BigUint::one(),
            },
        }
    }

    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    fn to_affine(&self, curve: &CurveParams) -> Point {
        let p = curve.p();
        let Some(z_inv) = inv_mod(&self.z, p) else {
            return Point::Infinity;
        };
        let z_inv2 = mul_mod(&z_inv, &z_inv, p);
        let z_inv3 = mul_mod(&z_inv2, &z_inv, p);
        Point::Affine {
            x: mul_mod(&self.x, &z_inv2, p),
            y: mul_mod(&self.y, &z_inv3, p),
        }
    }

    fn double(&self, curve: &CurveParams) -> Self {
        if self.is_infinity() || self.y.is_zero() {
            return Self::infinity();
        }
        let p = curve.p();
        let xx = mul_mod(&self.x, &self.x, p);
        let yy = mul_mod(&self.y, &self.y, p);
        let yyyy = mul_mod(&yy, &yy, p);
        let zz = mul_mod(&self.z, &self.z, p);

        // S = 4·X·Y², M = 3·X² + a·Z⁴
        let s = (&self.x * &yy * 4u32) % p;
        let m = (&xx * 3u32 + mul_mod(curve.a(), &mul_mod(&zz, &zz, p), p)) % p;

        let x3 = sub_mod(&mul_mod(&m, &m, p), &(&s * 2u32), p);
        let y3 = sub_mod(&mul_mod(&m, &sub_mod(&s, &x3, p), p), &(yyyy * 8u32), p);
        let z3 = (&self.y * &self.z * 2u32) % p;
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    fn add(&self, other: &Self, curve: &CurveParams) -> Self {
        if self.is_infinity() {
            return other.clone();
        }
        if other.is_infinity() {
            return self.clone();
        }
        let p = curve.p();
        let z1z1 = mul_mod(&self.z, &self.z, p);
        let z2z2 = mul_mod(&other.z, &other.z, p);
        let u1 = mul_mod(&self.x, &z2z2, p);
        let u2 = mul_mod(&other.x, &z1z1, p);
        let s1 = mul_mod(&self.y, &mul_mod(&other.z, &z2z2, p), p);
        let s2 = mul_mod(&other.y, &mul_mod(&self.z, &z1z1, p), p);

        if u1 == u2 {
            if s1 == s2 {
                return self.double(curve);
            }
            return Self::infinity();
        }

        let h = sub_mod(&u2, &u1, p);
        let r = sub_mod(&s2, &s1, p);
        let hh = mul_mod(&h, &h, p);
        let hhh = mul_mod(&h, &hh, p);
        let v = mul_mod(&u1, &hh, p);

        let x3 = sub_mod(
            &sub_mod(&mul_mod(&r, &r, p), &hhh, p),
            &(&v * 2u32),
            p,
        );
        let y3 = sub_mod(
            &mul_mod(&r, &sub_mod(&v, &x3, p), p),
            &mul_mod(&s1, &hhh, p),
            p,
        );
        let z3 = mul_mod(&mul_mod(&self.z, &other.z, p), &h, p);
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }
}

/// Iterate over the bits of `scalar` from most to least significant.
fn bits(scalar: &BigUint, width: usize) -> impl Iterator<Item = bool> {
    let bytes = scalar.to_bytes_be();
    let padding = width.saturating_sub(bytes.len());
    std::iter::repeat(0u8)
        .take(padding)
        .chain(bytes)
        .flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
}

/// Compute `P + Q`.
pub(crate) fn add(curve: &CurveParams, lhs: &Point, rhs: &Point) -> Point {
    Jacobian::from_affine(lhs)
        .add(&Jacobian::from_affine(rhs), curve)
        .to_affine(curve)
}

/// Compute `k·P` with left-to-right double-and-add.
pub(crate) fn mul(curve: &CurveParams, point: &Point, scalar: &BigUint) -> Point {
    let base = Jacobian::from_affine(point);
    let mut acc = Jacobian::infinity();
    for bit in bits(scalar, 0) {
        acc = acc.double(curve);
        if bit {
            acc = acc.add(&base, curve);
        }
    }
    acc.to_affine(curve)
}

/// Compute `u·P + v·Q` with a single pass over both scalars (Shamir's trick).
pub(crate) fn mul_add(
    curve: &CurveParams,
    u: &BigUint,
    lhs: &Point,
    v: &BigUint,
    rhs: &Point,
) -> Point {
    let lhs = Jacobian::from_affine(lhs);
    let rhs = Jacobian::from_affine(rhs);
    let both = lhs.add(&rhs, curve);

    let width = ((u.bits().max(v.bits()) + 7) / 8) as usize;
    let mut acc = Jacobian::infinity();
    for (a, b) in bits(u, width).zip(bits(v, width)) {
        acc = acc.double(curve);
        match (a, b) {
            (true, true) => acc = acc.add(&both, curve),
            (true, false) => acc = acc.add(&lhs, curve),
            (false, true) => acc = acc.add(&rhs, curve),
            (false, false) => {}
        }
    }
    acc.to_affine(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::from_hex_formatted;

    fn scalar(value: u64) -> BigUint {
        BigUint::from(value)
    }

    fn hex_point(x: &str, y: &str) -> Point {
        Point::new(
            BigUint::from_bytes_be(&from_hex_formatted(x).unwrap()),
            BigUint::from_bytes_be(&from_hex_formatted(y).unwrap()),
        )
    }

    #[test]
    fn test_double_generator() {
        let curve = CurveParams::load();
        let expected = hex_point(
            "56cefd60d7c87c000d58ef57fa73ba4d9c0dfa08c08a7331495c2e1da3f2bd52",
            "31b7e7e6cc8189f668535ce0f8eaf1bd6de84c182f6c8e716f780d3a970a23c3",
        );
        let g = curve.generator();
        assert_eq!(add(curve, g, g), expected);
        assert_eq!(mul(curve, g, &scalar(2)), expected);
        assert!(curve.is_on_curve(&expected));
    }

    #[test]
    fn test_identity() {
        let curve = CurveParams::load();
        let g = curve.generator();
        assert_eq!(add(curve, g, &Point::Infinity), *g);
        assert_eq!(add(curve, &Point::Infinity, g), *g);
        assert_eq!(mul(curve, g, &scalar(0)), Point::Infinity);
        assert_eq!(mul(curve, &Point::Infinity, &scalar(7)), Point::Infinity);
    }

    #[test]
    fn test_add_inverse() {
        let curve = CurveParams::load();
        let g = curve.generator();
        let neg = Point::new(
            g.x().unwrap().clone(),
            curve.p() - g.y().unwrap(),
        );
        assert_eq!(add(curve, g, &neg), Point::Infinity);
    }

    #[test]
    fn test_order() {
        let curve = CurveParams::load();
        let g = curve.generator();
        assert_eq!(mul(curve, g, curve.order()), Point::Infinity);
        let n_minus_one = curve.order() - 1u32;
        let neg = mul(curve, g, &n_minus_one);
        assert_eq!(neg.x(), g.x());
        assert_eq!(add(curve, &neg, g), Point::Infinity);
    }

    #[test]
    fn test_scalar_mul_distributes() {
        let curve = CurveParams::load();
        let g = curve.generator();
        let p3 = mul(curve, g, &scalar(3));
        let p5 = mul(curve, g, &scalar(5));
        assert_eq!(add(curve, &p3, &p5), mul(curve, g, &scalar(8)));
        assert_eq!(mul(curve, &p3, &scalar(5)), mul(curve, g, &scalar(15)));
    }

    #[test]
    fn test_mul_add_matches_separate() {
        let curve = CurveParams::load();
        let g = curve.generator();
        let q = mul(curve, g, &scalar(0xdead_beef));
        let u = scalar(0x1234_5678_9abc);
        let v = scalar(0x42);
        let expected = add(curve, &mul(curve, g, &u), &mul(curve, &q, &v));
        assert_eq!(mul_add(curve, &u, g, &v, &q), expected);
        assert_eq!(mul_add(curve, &v, &q, &u, g), expected);
    }

    #[test]
    fn test_mul_add_equal_points() {
        let curve = CurveParams::load();
        let g = curve.generator();
        assert_eq!(
            mul_add(curve, &scalar(2), g, &scalar(3), g),
            mul(curve, g, &scalar(5))
        );
        assert_eq!(
            mul_add(curve, &scalar(0), g, &scalar(0), g),
            Point::Infinity
        );
    }
}
