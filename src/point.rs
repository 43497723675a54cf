// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A 2D point in fixed point device space.

use core::fmt;
use core::ops::{Add, AddAssign, Sub};

use crate::fixed::{self, Fixed};
use crate::Slope;

/// A 2D point with [`Fixed`] coordinates.
///
/// Equality is exact.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// The x coordinate.
    pub x: Fixed,
    /// The y coordinate.
    pub y: Fixed,
}

impl Point {
    /// The point (0, 0).
    pub const ORIGIN: Point = Point::new(0, 0);

    /// Create a new `Point` with the provided fixed point coordinates.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Point { x, y }
    }

    /// Create a point from whole device units.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Point::new(fixed::from_int(x), fixed::from_int(y))
    }

    /// Create a point from floating point device coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use strokepoly::Point;
    /// let p = Point::from_f64(1.5, -0.25);
    /// assert_eq!(p, Point::new(384, -64));
    /// ```
    #[inline]
    pub fn from_f64(x: f64, y: f64) -> Self {
        Point::new(fixed::from_f64(x), fixed::from_f64(y))
    }

    /// The coordinates as floating point device units.
    #[inline]
    pub fn to_f64(self) -> (f64, f64) {
        (fixed::to_f64(self.x), fixed::to_f64(self.y))
    }

    /// Squared Euclidean distance, in squared fixed units.
    ///
    /// The coordinate deltas wrap like the underlying `i32` arithmetic, but
    /// their squares never overflow.
    #[inline]
    #[allow(
        clippy::cast_sign_loss,
        reason = "a sum of two squares is never negative"
    )]
    pub fn distance_squared(self, other: Point) -> u64 {
        let dx = i64::from(self.x.wrapping_sub(other.x));
        let dy = i64::from(self.y.wrapping_sub(other.y));
        (dx * dx) as u64 + (dy * dy) as u64
    }
}

impl From<(Fixed, Fixed)> for Point {
    #[inline(always)]
    fn from(v: (Fixed, Fixed)) -> Point {
        Point { x: v.0, y: v.1 }
    }
}

impl From<Point> for (Fixed, Fixed) {
    #[inline(always)]
    fn from(v: Point) -> (Fixed, Fixed) {
        (v.x, v.y)
    }
}

impl Add<Slope> for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Slope) -> Self {
        Point::new(self.x.wrapping_add(other.dx), self.y.wrapping_add(other.dy))
    }
}

impl AddAssign<Slope> for Point {
    #[inline]
    fn add_assign(&mut self, other: Slope) {
        *self = *self + other;
    }
}

impl Sub<Slope> for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Slope) -> Self {
        Point::new(self.x.wrapping_sub(other.dx), self.y.wrapping_sub(other.dy))
    }
}

impl Sub<Point> for Point {
    type Output = Slope;

    #[inline]
    fn sub(self, other: Point) -> Slope {
        Slope::between(other, self)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.to_f64();
        write!(formatter, "(")?;
        fmt::Display::fmt(&x, formatter)?;
        write!(formatter, ", ")?;
        fmt::Display::fmt(&y, formatter)?;
        write!(formatter, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let p = Point::from_ints(3, 4);
        assert_eq!(p + Slope::new(256, -512), Point::from_ints(4, 2));
        assert_eq!(p - Point::from_ints(1, 1), Slope::new(512, 768));
        assert_eq!(p - Slope::new(768, 1024), Point::ORIGIN);
    }

    #[test]
    fn distance() {
        let p1 = Point::new(0, 10);
        let p2 = Point::new(0, 5);
        assert_eq!(p1.distance_squared(p2), 25);

        let p1 = Point::new(-11, 1);
        let p2 = Point::new(-7, -2);
        assert_eq!(p1.distance_squared(p2), 25);
    }

    #[test]
    fn distance_does_not_overflow() {
        let p1 = Point::new(i32::MAX, i32::MAX);
        let p2 = Point::new(i32::MIN + 1, i32::MIN + 1);
        // The deltas wrap to -2, -2.
        assert_eq!(p1.distance_squared(p2), 8);
        let p3 = Point::new(0, i32::MAX);
        let expected = (i32::MAX as u64) * (i32::MAX as u64);
        assert_eq!(Point::ORIGIN.distance_squared(p3), expected);
    }

    #[test]
    fn display() {
        let p = Point::new(384, -64);
        assert_eq!(format!("{}", p), "(1.5, -0.25)");
        assert_eq!(format!("{:?}", p), "(384, -64)");
    }
}
