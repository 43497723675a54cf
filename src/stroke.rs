// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroke styles.

use core::borrow::Borrow;
use core::f64::consts::{FRAC_1_SQRT_2, SQRT_2};

use smallvec::SmallVec;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;
use crate::{Affine, PathFixed};

/// Defines the connection between two segments of a stroke.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Join {
    /// A straight line connecting the segments.
    Bevel,
    /// The segments are extended to their natural intersection point.
    #[default]
    Miter,
    /// An arc between the segments.
    Round,
}

/// Defines the shape to be drawn at the ends of a stroke.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cap {
    /// Flat cap.
    #[default]
    Butt,
    /// Rounded cap with radius equal to half the stroke width.
    Round,
    /// Square cap with dimensions equal to half the stroke width.
    Square,
}

/// Collection of values representing lengths in a dash pattern.
pub type Dashes = SmallVec<[f64; 4]>;

/// Describes the visual style of a stroke.
///
/// Lengths are in user space, that is before the transform passed to
/// [`stroke_to_polygon`](crate::stroke_to_polygon) is applied.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stroke {
    /// Width of the stroke.
    pub width: f64,
    /// Style for connecting segments of the stroke.
    pub join: Join,
    /// Limit for miter joins, as a ratio of the miter length to the width.
    pub miter_limit: f64,
    /// Style for capping both ends of an open subpath.
    pub cap: Cap,
    /// Lengths of dashes in alternating on/off order.
    pub dash_pattern: Dashes,
    /// Offset of the first dash.
    pub dash_offset: f64,
}

/// Options for path stroking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StrokeOpts {
    merge_points: bool,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width: 2.0,
            join: Join::Miter,
            miter_limit: 10.0,
            cap: Cap::Butt,
            dash_pattern: Default::default(),
            dash_offset: 0.0,
        }
    }
}

impl Stroke {
    /// Creates a new stroke with the specified width.
    pub fn new(width: f64) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    /// Builder method for setting the join style.
    pub fn with_join(mut self, join: Join) -> Self {
        self.join = join;
        self
    }

    /// Builder method for setting the limit for miter joins.
    pub fn with_miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = limit;
        self
    }

    /// Builder method for setting the cap style.
    pub fn with_caps(mut self, cap: Cap) -> Self {
        self.cap = cap;
        self
    }

    /// Builder method for setting the dashing parameters.
    pub fn with_dashes<P>(mut self, offset: f64, pattern: P) -> Self
    where
        P: IntoIterator,
        P::Item: Borrow<f64>,
    {
        self.dash_offset = offset;
        self.dash_pattern.clear();
        self.dash_pattern
            .extend(pattern.into_iter().map(|dash| *dash.borrow()));
        self
    }

    /// Whether the stroke is dashed.
    #[inline]
    pub fn is_dashed(&self) -> bool {
        !self.dash_pattern.is_empty()
    }

    /// The length of one full repetition of the dash pattern.
    ///
    /// A pattern with an odd number of entries alternates which entries
    /// are on, so it repeats after twice its sum. Zero for undashed styles.
    pub fn dash_period(&self) -> f64 {
        let period: f64 = self.dash_pattern.iter().sum();
        if self.dash_pattern.len() % 2 == 1 {
            period * 2.0
        } else {
            period
        }
    }

    /// The farthest, in device units along each axis, that the outline of
    /// `path` stroked with this style can reach from the path itself.
    ///
    /// Returns `(dx, dy)`. This is exact for transforms without rotation
    /// and an upper bound otherwise.
    pub fn max_distance_from_path(&self, path: &PathFixed, ctm: &Affine) -> (f64, f64) {
        let mut expansion = 0.5;
        if self.cap == Cap::Square {
            expansion = FRAC_1_SQRT_2;
        }
        if self.join == Join::Miter
            && !path.is_rectilinear()
            && expansion < SQRT_2 * self.miter_limit
        {
            expansion = SQRT_2 * self.miter_limit;
        }
        expansion *= self.width;

        if ctm.has_unity_scale() {
            (expansion, expansion)
        } else {
            let [xx, yx, xy, yy, _, _] = ctm.as_coeffs();
            (expansion * xx.hypot(xy), expansion * yy.hypot(yx))
        }
    }
}

impl StrokeOpts {
    /// Merge consecutive outline points closer than the tolerance.
    ///
    /// Off by default. Merging trims redundant vertices from the output
    /// but can shift joins by up to the tolerance.
    pub fn merge_points(mut self, yes: bool) -> Self {
        self.merge_points = yes;
        self
    }

    /// Whether close outline points are merged.
    #[inline]
    pub fn merges_points(&self) -> bool {
        self.merge_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    fn pt(x: i32, y: i32) -> Point {
        Point::from_ints(x, y)
    }

    #[test]
    fn defaults() {
        let style = Stroke::default();
        assert_eq!(style.width, 2.0);
        assert_eq!(style.join, Join::Miter);
        assert_eq!(style.miter_limit, 10.0);
        assert_eq!(style.cap, Cap::Butt);
        assert!(!style.is_dashed());
        assert!(!StrokeOpts::default().merges_points());
    }

    #[test]
    fn builder() {
        let style = Stroke::new(3.0)
            .with_join(Join::Round)
            .with_caps(Cap::Square)
            .with_miter_limit(2.0)
            .with_dashes(1.0, [4.0, 2.0, 1.0]);
        assert_eq!(style.width, 3.0);
        assert_eq!(style.join, Join::Round);
        assert_eq!(style.cap, Cap::Square);
        assert_eq!(style.dash_offset, 1.0);
        assert_eq!(style.dash_pattern.as_slice(), &[4.0, 2.0, 1.0]);
        assert_eq!(style.dash_period(), 14.0);
        assert_eq!(Stroke::new(1.0).with_dashes(0.0, &[3.0, 1.0]).dash_period(), 4.0);
    }

    #[test]
    fn max_distance() {
        let mut square = PathFixed::new();
        square.move_to(pt(0, 0));
        square.line_to(pt(10, 0));
        square.line_to(pt(10, 10));

        let mut diagonal = PathFixed::new();
        diagonal.move_to(pt(0, 0));
        diagonal.line_to(pt(10, 10));

        let id = Affine::IDENTITY;
        let butt = Stroke::new(4.0).with_join(Join::Bevel);
        assert_eq!(butt.max_distance_from_path(&square, &id), (2.0, 2.0));

        let capped = butt.clone().with_caps(Cap::Square);
        let (dx, dy) = capped.max_distance_from_path(&square, &id);
        assert!((dx - 4.0 * FRAC_1_SQRT_2).abs() < 1e-12);
        assert_eq!(dx, dy);

        // Miters only matter off the axes.
        let miter = Stroke::new(4.0).with_miter_limit(3.0);
        assert_eq!(miter.max_distance_from_path(&square, &id), (2.0, 2.0));
        let (dx, _) = miter.max_distance_from_path(&diagonal, &id);
        assert!((dx - 12.0 * SQRT_2).abs() < 1e-12);

        let stretched = Affine::scale_non_uniform(2.0, 3.0);
        assert_eq!(butt.max_distance_from_path(&square, &stretched), (4.0, 6.0));
    }
}
