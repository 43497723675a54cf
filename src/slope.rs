// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Direction vectors in fixed point.

use core::cmp::Ordering;
use core::ops::Neg;

use crate::{Fixed, Point};

/// A direction, stored as the fixed point delta between two points.
///
/// Slopes are ordered by angle. The order is total: it is used to decide
/// whether a path turns clockwise or counter-clockwise at a vertex, and to
/// walk the vertices of a [`Pen`](crate::Pen).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slope {
    /// The horizontal delta.
    pub dx: Fixed,
    /// The vertical delta.
    pub dy: Fixed,
}

impl Slope {
    /// The zero slope.
    pub const ZERO: Slope = Slope::new(0, 0);

    /// Create a new slope from its deltas.
    #[inline]
    pub const fn new(dx: Fixed, dy: Fixed) -> Slope {
        Slope { dx, dy }
    }

    /// The slope pointing from `a` to `b`.
    #[inline]
    pub const fn between(a: Point, b: Point) -> Slope {
        Slope::new(b.x.wrapping_sub(a.x), b.y.wrapping_sub(a.y))
    }

    /// Whether both deltas are zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Whether the two slopes point in opposing quadrants.
    #[inline]
    pub const fn is_backwards(self, other: Slope) -> bool {
        (self.dx ^ other.dx) < 0 || (self.dy ^ other.dy) < 0
    }

    /// Compare two slopes by angle.
    ///
    /// The comparison uses the sign of `self.dy * other.dx - other.dy * self.dx`.
    /// Zero slopes are equal to each other and greater than every other
    /// slope. Of two slopes that differ by exactly a half turn, the one with
    /// a positive `dx` (or zero `dx` and negative `dy`) is the greater one.
    pub fn compare(self, other: Slope) -> Ordering {
        let a = i64::from(self.dy) * i64::from(other.dx);
        let b = i64::from(other.dy) * i64::from(self.dx);
        match a.cmp(&b) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match (self.is_zero(), other.is_zero()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        if self.is_backwards(other) {
            if self.dx > 0 || (self.dx == 0 && self.dy < 0) {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        } else {
            Ordering::Equal
        }
    }

    /// Convert to a floating point vector in device units.
    #[inline]
    pub fn to_vec2(self) -> crate::Vec2 {
        crate::Vec2::new(crate::fixed::to_f64(self.dx), crate::fixed::to_f64(self.dy))
    }
}

impl Neg for Slope {
    type Output = Slope;

    #[inline]
    fn neg(self) -> Slope {
        Slope::new(self.dx.wrapping_neg(), self.dy.wrapping_neg())
    }
}

impl From<(Fixed, Fixed)> for Slope {
    #[inline]
    fn from((dx, dy): (Fixed, Fixed)) -> Slope {
        Slope::new(dx, dy)
    }
}
