// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lines.

use crate::fixed::{self, Fixed};
use crate::{Point, Slope};

/// A line through two fixed point points.
///
/// Polygon edges store the full line they lie on; the edge itself is the
/// part of the line between two scanlines.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// The first point.
    pub p1: Point,
    /// The second point.
    pub p2: Point,
}

impl Line {
    /// Create a new line.
    #[inline]
    pub fn new(p1: impl Into<Point>, p2: impl Into<Point>) -> Line {
        Line {
            p1: p1.into(),
            p2: p2.into(),
        }
    }

    /// The direction from `p1` to `p2`.
    #[inline]
    pub fn slope(&self) -> Slope {
        self.p2 - self.p1
    }

    /// Whether both points lie on the same scanline.
    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.p1.y == self.p2.y
    }

    /// The x coordinate where the line crosses the scanline `y`.
    ///
    /// An endpoint's own x is returned exactly when `y` is on that
    /// endpoint. Otherwise the result is rounded toward `p1.x`. Horizontal
    /// lines return `p1.x`.
    pub fn x_for_y(&self, y: Fixed) -> Fixed {
        let (p1, p2) = (self.p1, self.p2);
        if y == p1.y {
            return p1.x;
        }
        if y == p2.y {
            return p2.x;
        }
        let dy = p2.y - p1.y;
        if dy == 0 {
            return p1.x;
        }
        p1.x + fixed::mul_div(y - p1.y, p2.x - p1.x, dy)
    }

    /// The y coordinate where the line crosses the vertical `x`.
    ///
    /// The mirror of [`x_for_y`](Self::x_for_y).
    pub fn y_for_x(&self, x: Fixed) -> Fixed {
        let (p1, p2) = (self.p1, self.p2);
        if x == p1.x {
            return p1.y;
        }
        if x == p2.x {
            return p2.y;
        }
        let dx = p2.x - p1.x;
        if dx == 0 {
            return p1.y;
        }
        p1.y + fixed::mul_div(x - p1.x, p2.y - p1.y, dx)
    }

    /// Shift both points.
    #[inline]
    #[must_use]
    pub fn translate(&self, delta: Slope) -> Line {
        Line::new(self.p1 + delta, self.p2 + delta)
    }
}
