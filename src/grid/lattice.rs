//! Integer lattice linear algebra
//!
//! Two dimensional integer vectors and matrices used both for physical key
//! positions and for abstract scale positions.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// A point in the integer lattice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatticeVector {
    /// First coordinate
    pub x: i32,
    /// Second coordinate
    pub y: i32,
}

/// The lattice origin
pub const ZERO_VECTOR: LatticeVector = LatticeVector::new(0, 0);

impl LatticeVector {
    /// Create a vector from its coordinates
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Scalar product
    pub fn dot(self, other: Self) -> i32 {
        self.x * other.x + self.y * other.y
    }

    /// Vector with both coordinates exchanged
    pub fn swapped(self) -> Self {
        Self::new(self.y, self.x)
    }
}

impl Add for LatticeVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for LatticeVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for LatticeVector {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<i32> for LatticeVector {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl AddAssign for LatticeVector {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for LatticeVector {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for LatticeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl FromStr for LatticeVector {
    type Err = String;

    /// Parses `"x,y"`, optionally wrapped in parentheses.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let inner = s.trim().trim_start_matches('(').trim_end_matches(')');
        let (x, y) = inner
            .split_once(',')
            .ok_or_else(|| format!("expected 'x,y', got '{}'", s))?;
        let x = x
            .trim()
            .parse()
            .map_err(|e| format!("invalid x coordinate '{}': {}", x.trim(), e))?;
        let y = y
            .trim()
            .parse()
            .map_err(|e| format!("invalid y coordinate '{}': {}", y.trim(), e))?;
        Ok(Self::new(x, y))
    }
}

/// Determinant of the matrix with columns `a` and `b`
pub fn det(a: LatticeVector, b: LatticeVector) -> i32 {
    a.x * b.y - a.y * b.x
}

fn det_wide(a11: i64, a12: i64, a21: i64, a22: i64) -> i64 {
    a11 * a22 - a12 * a21
}

/// A 2x2 integer matrix acting on column vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatticeMatrix {
    /// Row 1, column 1
    pub m11: i32,
    /// Row 1, column 2
    pub m12: i32,
    /// Row 2, column 1
    pub m21: i32,
    /// Row 2, column 2
    pub m22: i32,
}

impl LatticeMatrix {
    /// The identity transform
    pub const IDENTITY: Self = Self::new(1, 0, 0, 1);

    /// Create a matrix from its entries, row by row
    pub const fn new(m11: i32, m12: i32, m21: i32, m22: i32) -> Self {
        Self { m11, m12, m21, m22 }
    }

    /// Matrix determinant
    pub fn determinant(&self) -> i32 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    /// Whether the transform is invertible over the integers
    pub fn is_unimodular(&self) -> bool {
        self.determinant().abs() == 1
    }

    /// Apply the transform to a vector
    pub fn apply(&self, v: LatticeVector) -> LatticeVector {
        LatticeVector::new(
            self.m11 * v.x + self.m12 * v.y,
            self.m21 * v.x + self.m22 * v.y,
        )
    }

    /// Returns the matrix `M` with `M·a = x` and `M·b = y`.
    ///
    /// Solved with Cramer's rule over the integers. Fails when `a` and `b`
    /// are linearly dependent, or when the solution is not integral (the two
    /// bases generate incompatible sublattices).
    pub fn find_transform(
        a: LatticeVector,
        x: LatticeVector,
        b: LatticeVector,
        y: LatticeVector,
    ) -> Result<Self> {
        let (ax, ay, bx, by) = (a.x as i64, a.y as i64, b.x as i64, b.y as i64);
        let (xx, xy, yx, yy) = (x.x as i64, x.y as i64, y.x as i64, y.y as i64);

        let d = det_wide(ax, bx, ay, by);
        if d == 0 {
            return Err(Error::DegenerateLattice { a, b });
        }

        let numerators = [
            det_wide(xx, yx, ay, by),
            det_wide(ax, bx, xx, yx),
            det_wide(xy, yy, ay, by),
            det_wide(ax, bx, xy, yy),
        ];

        let mut entries = [0i32; 4];
        for (entry, numerator) in entries.iter_mut().zip(numerators) {
            if numerator % d != 0 {
                return Err(Error::InexactTransform { a, x, b, y, det: d });
            }
            *entry = i32::try_from(numerator / d).map_err(|_| Error::Overflow)?;
        }

        Ok(Self::new(entries[0], entries[1], entries[2], entries[3]))
    }
}

impl Default for LatticeMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<LatticeVector> for LatticeMatrix {
    type Output = LatticeVector;

    fn mul(self, rhs: LatticeVector) -> LatticeVector {
        self.apply(rhs)
    }
}

impl Mul for LatticeMatrix {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.m11 * rhs.m11 + self.m12 * rhs.m21,
            self.m11 * rhs.m12 + self.m12 * rhs.m22,
            self.m21 * rhs.m11 + self.m22 * rhs.m21,
            self.m21 * rhs.m12 + self.m22 * rhs.m22,
        )
    }
}

/// Greatest common divisor, always nonnegative
pub fn gcd(a: i32, b: i32) -> i32 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a as i32
}

/// Inverse of `a` modulo `m`, via the extended Euclidean algorithm.
///
/// Returns `None` when `m <= 0` or `gcd(a, m) != 1`.
pub fn modular_inverse(a: i32, m: i32) -> Option<i32> {
    if m <= 0 {
        return None;
    }
    let m = m as i64;
    let (mut old_r, mut r) = ((a as i64).rem_euclid(m), m);
    let (mut old_s, mut s) = (1i64, 0i64);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    if old_r != 1 && m != 1 {
        return None;
    }
    Some(old_s.rem_euclid(m) as i32)
}

/// Floating point modulo with a result in `[0, y)` for positive `y`
pub fn posfmod(x: f32, y: f32) -> f32 {
    x.rem_euclid(y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_arithmetic() {
        let a = LatticeVector::new(2, 5);
        let b = LatticeVector::new(1, 3);
        assert_eq!(a + b, LatticeVector::new(3, 8));
        assert_eq!(a - b, LatticeVector::new(1, 2));
        assert_eq!(-a, LatticeVector::new(-2, -5));
        assert_eq!(a * 3, LatticeVector::new(6, 15));
        assert_eq!(a.dot(b), 17);
        assert_eq!(det(a, b), 1);
        assert_eq!(det(b, a), -1);
    }

    #[test]
    fn test_parse_vector() {
        assert_eq!("2,5".parse::<LatticeVector>(), Ok(LatticeVector::new(2, 5)));
        assert_eq!(" (-1, 3) ".parse::<LatticeVector>(), Ok(LatticeVector::new(-1, 3)));
        assert!("2;5".parse::<LatticeVector>().is_err());
        assert!("a,5".parse::<LatticeVector>().is_err());
    }

    #[test]
    fn test_find_transform_maps_basis() {
        let a = LatticeVector::new(3, 2);
        let b = LatticeVector::new(2, 1);
        let x = LatticeVector::new(2, 5);
        let y = LatticeVector::new(1, 3);

        let m = LatticeMatrix::find_transform(a, x, b, y).unwrap();
        assert_eq!(m * a, x);
        assert_eq!(m * b, y);

        let inv = LatticeMatrix::find_transform(x, a, y, b).unwrap();
        assert_eq!(m * inv, LatticeMatrix::IDENTITY);
        assert_eq!(inv * m, LatticeMatrix::IDENTITY);
    }

    #[test]
    fn test_find_transform_rejects_dependent_vectors() {
        let a = LatticeVector::new(1, 2);
        let b = LatticeVector::new(2, 4);
        let err = LatticeMatrix::find_transform(a, a, b, b).unwrap_err();
        assert_eq!(err, Error::DegenerateLattice { a, b });
    }

    #[test]
    fn test_find_transform_rejects_inexact_division() {
        // (2,0),(0,1) spans an index-2 sublattice; (2,5),(1,3) spans all of Z^2
        let result = LatticeMatrix::find_transform(
            LatticeVector::new(2, 0),
            LatticeVector::new(2, 5),
            LatticeVector::new(0, 1),
            LatticeVector::new(1, 3),
        );
        assert!(matches!(result, Err(Error::InexactTransform { det: 2, .. })));
    }

    #[test]
    fn test_find_transform_allows_exact_non_unimodular() {
        let m = LatticeMatrix::find_transform(
            LatticeVector::new(0, 1),
            LatticeVector::new(0, 1),
            LatticeVector::new(2, 1),
            LatticeVector::new(-2, -1),
        )
        .unwrap();
        assert_eq!(m, LatticeMatrix::new(-1, 0, -1, 1));
        assert_eq!(m * m, LatticeMatrix::IDENTITY);
    }

    #[test]
    fn test_gcd_and_inverse() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(-4, 6), 2);
        assert_eq!(gcd(0, 5), 5);
        assert_eq!(gcd(2, 5), 1);

        assert_eq!(modular_inverse(2, 7), Some(4));
        assert_eq!(modular_inverse(5, 12), Some(5));
        assert_eq!(modular_inverse(3, 10), Some(7));
        assert_eq!(modular_inverse(-2, 7), Some(3));
        assert_eq!(modular_inverse(2, 4), None);
        assert_eq!(modular_inverse(0, 1), Some(0));
        assert_eq!(modular_inverse(1, 0), None);

        for m in 2..20 {
            for a in 1..m {
                if let Some(inv) = modular_inverse(a, m) {
                    assert_eq!((a * inv) % m, 1, "a={} m={}", a, m);
                } else {
                    assert_ne!(gcd(a, m), 1);
                }
            }
        }
    }

    #[test]
    fn test_posfmod() {
        assert!((posfmod(1.25, 1.0) - 0.25).abs() < 1e-6);
        assert!((posfmod(-0.25, 1.0) - 0.75).abs() < 1e-6);
        assert_eq!(posfmod(0.0, 1.0), 0.0);
    }
}
