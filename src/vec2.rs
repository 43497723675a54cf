// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simple 2D vector.

use core::ops::{Add, Mul, Neg, Sub};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A 2D floating point vector.
///
/// The stroker keeps face directions in this form: unit length in device
/// space, or arbitrary length in user space before transformation.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    /// The x-coordinate.
    pub x: f64,
    /// The y-coordinate.
    pub y: f64,
}

impl Vec2 {
    /// The vector (0, 0).
    pub const ZERO: Vec2 = Vec2::new(0., 0.);

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Vec2 {
        Vec2 { x, y }
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Cross product of two vectors.
    ///
    /// This is signed so that (0, 1) × (1, 0) = -1.
    #[inline]
    pub fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Magnitude of vector.
    #[inline]
    pub fn hypot(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Magnitude squared of vector.
    #[inline]
    pub fn hypot2(self) -> f64 {
        self.dot(self)
    }

    /// Scale to unit length, returning the unit vector and the original
    /// magnitude.
    ///
    /// Axis aligned vectors are normalized exactly. The zero vector is
    /// returned unchanged with a magnitude of zero.
    pub fn normalize(self) -> (Vec2, f64) {
        if self.x == 0.0 {
            if self.y == 0.0 {
                (self, 0.0)
            } else if self.y > 0.0 {
                (Vec2::new(0.0, 1.0), self.y)
            } else {
                (Vec2::new(0.0, -1.0), -self.y)
            }
        } else if self.y == 0.0 {
            if self.x > 0.0 {
                (Vec2::new(1.0, 0.0), self.x)
            } else {
                (Vec2::new(-1.0, 0.0), -self.x)
            }
        } else {
            let mag = self.hypot();
            (Vec2::new(self.x / mag, self.y / mag), mag)
        }
    }

    /// Is this vector finite?
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Vec2 {
    #[inline]
    fn from(v: (f64, f64)) -> Vec2 {
        Vec2 { x: v.0, y: v.1 }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    #[inline]
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    #[inline]
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn mul(self, other: f64) -> Vec2 {
        Vec2::new(self.x * other, self.y * other)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn products() {
        let a = Vec2::new(0., 1.);
        let b = Vec2::new(1., 0.);
        assert_eq!(a.dot(b), 0.);
        assert_eq!(a.cross(b), -1.);
        assert_eq!(Vec2::new(3., 4.).hypot(), 5.);
    }

    #[test]
    fn normalize_axis_aligned() {
        assert_eq!(Vec2::new(0., -7.).normalize(), (Vec2::new(0., -1.), 7.));
        assert_eq!(Vec2::new(2.5, 0.).normalize(), (Vec2::new(1., 0.), 2.5));
        assert_eq!(Vec2::ZERO.normalize(), (Vec2::ZERO, 0.));
    }

    #[test]
    fn normalize_diagonal() {
        let (v, mag) = Vec2::new(3., -4.).normalize();
        assert!((mag - 5.).abs() < 1e-12);
        assert!((v.x - 0.6).abs() < 1e-12);
        assert!((v.y + 0.8).abs() < 1e-12);
    }
}
