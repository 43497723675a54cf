// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An axis aligned box in fixed point device space.

use crate::fixed::Fixed;
use crate::Point;

/// An axis aligned box.
///
/// `p1` is the minimum (top-left in y-down device space) corner and `p2`
/// the maximum corner. Containment is inclusive on every side.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// The minimum corner.
    pub p1: Point,
    /// The maximum corner.
    pub p2: Point,
}

impl Rect {
    /// A new box from its minimum and maximum corners.
    #[inline]
    pub const fn new(p1: Point, p2: Point) -> Rect {
        Rect { p1, p2 }
    }

    /// A new box spanning two arbitrary points.
    ///
    /// The result will have non-negative width and height.
    #[inline]
    pub fn from_points(a: impl Into<Point>, b: impl Into<Point>) -> Rect {
        let a = a.into();
        let b = b.into();
        Rect {
            p1: Point::new(a.x.min(b.x), a.y.min(b.y)),
            p2: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// A new box from whole device unit coordinates.
    #[inline]
    pub const fn from_ints(x0: i32, y0: i32, x1: i32, y1: i32) -> Rect {
        Rect::new(Point::from_ints(x0, y0), Point::from_ints(x1, y1))
    }

    /// The width of the box.
    #[inline]
    pub fn width(&self) -> Fixed {
        self.p2.x - self.p1.x
    }

    /// The height of the box.
    #[inline]
    pub fn height(&self) -> Fixed {
        self.p2.y - self.p1.y
    }

    /// Whether the box encloses no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.p2.x <= self.p1.x || self.p2.y <= self.p1.y
    }

    /// Whether `point` lies inside the box or on its boundary.
    #[inline]
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.p1.x && point.x <= self.p2.x && point.y >= self.p1.y && point.y <= self.p2.y
    }

    /// The smallest box enclosing both boxes.
    #[inline]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            p1: Point::new(self.p1.x.min(other.p1.x), self.p1.y.min(other.p1.y)),
            p2: Point::new(self.p2.x.max(other.p2.x), self.p2.y.max(other.p2.y)),
        }
    }

    /// Grow the box so that it contains `point`.
    #[inline]
    pub fn add_point(&mut self, point: Point) {
        self.p1.x = self.p1.x.min(point.x);
        self.p1.y = self.p1.y.min(point.y);
        self.p2.x = self.p2.x.max(point.x);
        self.p2.y = self.p2.y.max(point.y);
    }

    /// Expand the box by `dx` horizontally and `dy` vertically on each side.
    #[inline]
    #[must_use]
    pub fn inflate(&self, dx: Fixed, dy: Fixed) -> Rect {
        Rect {
            p1: Point::new(self.p1.x.saturating_sub(dx), self.p1.y.saturating_sub(dy)),
            p2: Point::new(self.p2.x.saturating_add(dx), self.p2.y.saturating_add(dy)),
        }
    }

    /// The union of a list of boxes, or `None` if the list is empty.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        let mut iter = boxes.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, b| acc.union(b)))
    }
}

impl From<(Point, Point)> for Rect {
    #[inline]
    fn from(points: (Point, Point)) -> Rect {
        Rect::from_points(points.0, points.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_inclusive() {
        let r = Rect::from_ints(0, 0, 10, 5);
        assert!(r.contains_point(Point::ORIGIN));
        assert!(r.contains_point(Point::from_ints(10, 5)));
        assert!(r.contains_point(Point::from_ints(3, 5)));
        assert!(!r.contains_point(Point::new(-1, 0)));
        assert!(!r.contains_point(Point::new(0, r.p2.y + 1)));
    }

    #[test]
    fn from_points_normalizes() {
        let r = Rect::from_points((512, -5), (-3, 40));
        assert_eq!(r, Rect::new(Point::new(-3, -5), Point::new(512, 40)));
        assert_eq!(r.width(), 515);
        assert_eq!(r.height(), 45);
    }

    #[test]
    fn union_and_growth() {
        let a = Rect::from_ints(0, 0, 1, 1);
        let b = Rect::from_ints(5, -2, 6, 0);
        assert_eq!(a.union(&b), Rect::from_ints(0, -2, 6, 1));
        assert_eq!(Rect::union_all(&[a, b]), Some(Rect::from_ints(0, -2, 6, 1)));
        let none: [Rect; 0] = [];
        assert_eq!(Rect::union_all(&none), None);

        let mut c = a;
        c.add_point(Point::from_ints(-4, 3));
        assert_eq!(c, Rect::from_ints(-4, 0, 1, 3));
        assert_eq!(a.inflate(256, 512), Rect::from_ints(-1, -2, 2, 3));
        assert!(!a.is_empty());
        assert!(Rect::from_ints(0, 0, 0, 4).is_empty());
    }
}
