// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Affine transforms.

use core::ops::{Mul, MulAssign};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;
use crate::{Error, Vec2};

/// Tolerance used when classifying a transform as a pure rotation, one
/// fixed point unit in device space.
const SCALING_EPSILON: f64 = 1.0 / 256.0;

/// A 2D affine transform.
///
/// The coefficients are `[xx, yx, xy, yy, x0, y0]`, so that a point
/// `(x, y)` maps to `(xx * x + xy * y + x0, yx * x + yy * y + y0)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Affine([f64; 6]);

impl Affine {
    /// The identity transform.
    pub const IDENTITY: Affine = Affine::scale(1.0);

    /// Construct an affine transform from coefficients.
    #[inline]
    pub const fn new(c: [f64; 6]) -> Affine {
        Affine(c)
    }

    /// An affine transform representing uniform scaling.
    #[inline]
    pub const fn scale(s: f64) -> Affine {
        Affine([s, 0.0, 0.0, s, 0.0, 0.0])
    }

    /// An affine transform representing non-uniform scaling.
    #[inline]
    pub const fn scale_non_uniform(sx: f64, sy: f64) -> Affine {
        Affine([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// An affine transform representing rotation by `th` radians.
    #[inline]
    pub fn rotate(th: f64) -> Affine {
        let (s, c) = th.sin_cos();
        Affine([c, s, -s, c, 0.0, 0.0])
    }

    /// An affine transform representing translation.
    #[inline]
    pub fn translate<V: Into<Vec2>>(p: V) -> Affine {
        let p = p.into();
        Affine([1.0, 0.0, 0.0, 1.0, p.x, p.y])
    }

    /// Get the coefficients of the transform.
    #[inline]
    pub const fn as_coeffs(self) -> [f64; 6] {
        self.0
    }

    /// Compute the determinant of this transform.
    #[inline]
    pub fn determinant(self) -> f64 {
        self.0[0] * self.0[3] - self.0[1] * self.0[2]
    }

    /// Compute the inverse transform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMatrix`] if the transform is singular or has
    /// non-finite coefficients.
    pub fn inverse(self) -> Result<Affine, Error> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(Error::InvalidMatrix);
        }
        let inv_det = det.recip();
        let [a, b, c, d, x0, y0] = self.0;
        Ok(Affine([
            inv_det * d,
            -inv_det * b,
            -inv_det * c,
            inv_det * a,
            inv_det * (c * y0 - d * x0),
            inv_det * (b * x0 - a * y0),
        ]))
    }

    /// Transform a displacement, ignoring the translation component.
    #[inline]
    pub fn transform_distance(self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.0[0] * v.x + self.0[2] * v.y,
            self.0[1] * v.x + self.0[3] * v.y,
        )
    }

    /// Whether this is exactly the identity transform.
    #[inline]
    pub fn is_identity(self) -> bool {
        self.0 == [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
    }

    /// Whether the linear part preserves lengths, up to one fixed point unit.
    ///
    /// This accepts rotations by multiples of a quarter turn and
    /// reflections, which is enough for the stroker to skip the expensive
    /// major axis computation.
    pub fn has_unity_scale(self) -> bool {
        let det = self.determinant();
        if (det * det - 1.0).abs() < SCALING_EPSILON {
            let [xx, yx, xy, yy, _, _] = self.0;
            if xy.abs() < SCALING_EPSILON && yx.abs() < SCALING_EPSILON {
                return true;
            }
            if xx.abs() < SCALING_EPSILON && yy.abs() < SCALING_EPSILON {
                return true;
            }
        }
        false
    }

    /// The length of the major axis of the ellipse a circle of `radius` maps to.
    pub fn transformed_circle_major_axis(self, radius: f64) -> f64 {
        if self.has_unity_scale() {
            return radius;
        }
        let [a, b, c, d, _, _] = self.0;
        let i = a * a + b * b;
        let j = c * c + d * d;
        let f = 0.5 * (i + j);
        let g = 0.5 * (i - j);
        let h = a * c + b * d;
        radius * (f + g.hypot(h)).sqrt()
    }

    /// Is this transform finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }
}

impl Default for Affine {
    #[inline]
    fn default() -> Affine {
        Affine::IDENTITY
    }
}

impl Mul<Vec2> for Affine {
    type Output = Vec2;

    /// Transform a position, including the translation component.
    #[inline]
    fn mul(self, other: Vec2) -> Vec2 {
        Vec2::new(
            self.0[0] * other.x + self.0[2] * other.y + self.0[4],
            self.0[1] * other.x + self.0[3] * other.y + self.0[5],
        )
    }
}

impl Mul for Affine {
    type Output = Affine;

    #[inline]
    fn mul(self, other: Affine) -> Affine {
        Affine([
            self.0[0] * other.0[0] + self.0[2] * other.0[1],
            self.0[1] * other.0[0] + self.0[3] * other.0[1],
            self.0[0] * other.0[2] + self.0[2] * other.0[3],
            self.0[1] * other.0[2] + self.0[3] * other.0[3],
            self.0[0] * other.0[4] + self.0[2] * other.0[5] + self.0[4],
            self.0[1] * other.0[4] + self.0[3] * other.0[5] + self.0[5],
        ])
    }
}

impl MulAssign for Affine {
    #[inline]
    fn mul_assign(&mut self, other: Affine) {
        *self = self.mul(other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: Affine, b: Affine) {
        for (x, y) in a.0.iter().zip(b.0.iter()) {
            assert!((x - y).abs() < 1e-9, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn affine_inverse() {
        let a = Affine::new([0.1, 1.2, 2.3, 3.4, 4.5, 5.6]);
        let a_inv = a.inverse().unwrap();
        assert_near(a * a_inv, Affine::IDENTITY);
        assert_near(a_inv * a, Affine::IDENTITY);
    }

    #[test]
    fn singular_has_no_inverse() {
        let a = Affine::new([1.0, 2.0, 2.0, 4.0, 0.0, 0.0]);
        assert_eq!(a.inverse(), Err(Error::InvalidMatrix));
        assert_eq!(
            Affine::scale(f64::INFINITY).inverse(),
            Err(Error::InvalidMatrix)
        );
    }

    #[test]
    fn distance_ignores_translation() {
        let a = Affine::translate((10.0, 20.0)) * Affine::scale(2.0);
        assert_eq!(a.transform_distance(Vec2::new(1.0, -1.0)), Vec2::new(2.0, -2.0));
        assert_eq!(a * Vec2::new(1.0, -1.0), Vec2::new(12.0, 18.0));
    }

    #[test]
    fn unity_scale() {
        assert!(Affine::IDENTITY.has_unity_scale());
        assert!(Affine::new([0.0, 1.0, -1.0, 0.0, 3.0, 3.0]).has_unity_scale());
        assert!(Affine::scale_non_uniform(1.0, -1.0).has_unity_scale());
        assert!(!Affine::scale(2.0).has_unity_scale());
        assert!(!Affine::rotate(0.5).has_unity_scale());
    }

    #[test]
    fn circle_major_axis() {
        assert_eq!(Affine::IDENTITY.transformed_circle_major_axis(3.0), 3.0);
        let r = Affine::scale_non_uniform(2.0, 5.0).transformed_circle_major_axis(1.0);
        assert!((r - 5.0).abs() < 1e-12);
        let r = Affine::rotate(0.5).transformed_circle_major_axis(2.0);
        assert!((r - 2.0).abs() < 1e-12);
    }
}
