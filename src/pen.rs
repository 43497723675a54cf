// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polygonal approximation of a round pen.

use core::cmp::Ordering;
use core::f64::consts::PI;

use smallvec::SmallVec;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;
use crate::common::round_up_to_even;
use crate::fixed;
use crate::{Affine, Error, Point, Slope, Vec2};

/// A vertex of a [`Pen`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PenVertex {
    /// Offset from the pen center.
    pub point: Point,
    /// Direction from the previous vertex to this one.
    pub slope_cw: Slope,
    /// Direction from this vertex to the next one.
    pub slope_ccw: Slope,
}

/// A convex polygon approximating a disc under a transform.
///
/// The stroker traces round joins and caps by walking the pen's
/// vertices between two directions. Vertices are ordered by angle, in
/// increasing slope order.
#[derive(Clone, Debug)]
pub struct Pen {
    radius: f64,
    tolerance: f64,
    vertices: SmallVec<[PenVertex; 32]>,
}

/// The number of pen vertices needed to keep a circle of `radius`, seen
/// through `ctm`, within `tolerance` of its polygonal approximation.
///
/// The result is 1 for a pen much smaller than the tolerance, otherwise
/// even and at least 4.
pub fn vertices_needed(tolerance: f64, radius: f64, ctm: &Affine) -> usize {
    let major_axis = ctm.transformed_circle_major_axis(radius);
    if tolerance >= 4.0 * major_axis {
        1
    } else if tolerance >= major_axis {
        4
    } else {
        let divisor = (1.0 - tolerance / major_axis).acos();
        if divisor == 0.0 {
            // The tolerance vanishes next to the radius.
            return 4;
        }
        let n = (2.0 * PI / divisor).ceil();
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "a positive count of vertices, saturating on overflow"
        )]
        let n = n as usize;
        round_up_to_even(n).max(4)
    }
}

impl Pen {
    /// Build a pen of `radius` user units transformed by `ctm`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMemory`] if the vertices could not be allocated.
    pub fn new(radius: f64, tolerance: f64, ctm: &Affine) -> Result<Pen, Error> {
        let reflect = ctm.determinant() < 0.0;
        let n = vertices_needed(tolerance, radius, ctm);

        let mut vertices: SmallVec<[PenVertex; 32]> = SmallVec::new();
        vertices.try_reserve_exact(n)?;
        for i in 0..n {
            #[allow(
                clippy::cast_precision_loss,
                reason = "vertex counts are far below 2^52"
            )]
            let mut theta = 2.0 * PI * i as f64 / n as f64;
            if reflect {
                theta = -theta;
            }
            let (sin, cos) = theta.sin_cos();
            let d = ctm.transform_distance(Vec2::new(radius * cos, radius * sin));
            vertices.push(PenVertex {
                point: Point::new(fixed::from_f64(d.x), fixed::from_f64(d.y)),
                slope_cw: Slope::ZERO,
                slope_ccw: Slope::ZERO,
            });
        }

        for i in 0..n {
            let prev = vertices[(i + n - 1) % n].point;
            let next = vertices[(i + 1) % n].point;
            let v = &mut vertices[i];
            v.slope_cw = v.point - prev;
            v.slope_ccw = next - v.point;
        }

        Ok(Pen {
            radius,
            tolerance,
            vertices,
        })
    }

    /// The radius in user units.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// The tolerance the pen was built for.
    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The vertices, in angular order.
    #[inline]
    pub fn vertices(&self) -> &[PenVertex] {
        &self.vertices
    }

    /// The number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the pen has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The range of vertices to visit, walking clockwise, when the stroke
    /// direction turns from `in_slope` to `out_slope`.
    ///
    /// Returns `(start, stop)`. The walk starts at `start` and advances,
    /// wrapping around, until it reaches `stop` (exclusive).
    pub fn find_active_cw_vertices(&self, in_slope: Slope, out_slope: Slope) -> (usize, usize) {
        let n = self.vertices.len();
        let v = &self.vertices;

        let mut lo = 0;
        let mut hi = n;
        let mut i = (lo + hi) >> 1;
        loop {
            if v[i].slope_cw.compare(in_slope) == Ordering::Less {
                lo = i;
            } else {
                hi = i;
            }
            i = (lo + hi) >> 1;
            if hi - lo <= 1 {
                break;
            }
        }
        if v[i].slope_cw.compare(in_slope) == Ordering::Less {
            i += 1;
            if i == n {
                i = 0;
            }
        }
        let start = i;

        if out_slope.compare(v[i].slope_ccw) != Ordering::Less {
            lo = i;
            hi = i + n;
            i = (lo + hi) >> 1;
            loop {
                let j = if i >= n { i - n } else { i };
                if v[j].slope_cw.compare(out_slope) == Ordering::Greater {
                    hi = i;
                } else {
                    lo = i;
                }
                i = (lo + hi) >> 1;
                if hi - lo <= 1 {
                    break;
                }
            }
            if i >= n {
                i -= n;
            }
        }
        (start, i)
    }

    /// The range of vertices to visit, walking counter-clockwise, when the
    /// stroke direction turns from `in_slope` to `out_slope`.
    ///
    /// Returns `(start, stop)`. The walk starts at `start` and retreats,
    /// wrapping around, until it reaches `stop` (exclusive).
    pub fn find_active_ccw_vertices(&self, in_slope: Slope, out_slope: Slope) -> (usize, usize) {
        let n = self.vertices.len();
        let v = &self.vertices;

        let mut lo = 0;
        let mut hi = n;
        let mut i = (lo + hi) >> 1;
        loop {
            if in_slope.compare(v[i].slope_ccw) == Ordering::Less {
                lo = i;
            } else {
                hi = i;
            }
            i = (lo + hi) >> 1;
            if hi - lo <= 1 {
                break;
            }
        }
        if in_slope.compare(v[i].slope_ccw) == Ordering::Less {
            i += 1;
            if i == n {
                i = 0;
            }
        }
        let start = i;

        if v[i].slope_cw.compare(out_slope) != Ordering::Greater {
            lo = i;
            hi = i + n;
            i = (lo + hi) >> 1;
            loop {
                let j = if i >= n { i - n } else { i };
                if out_slope.compare(v[j].slope_ccw) == Ordering::Greater {
                    hi = i;
                } else {
                    lo = i;
                }
                i = (lo + hi) >> 1;
                if hi - lo <= 1 {
                    break;
                }
            }
            if i >= n {
                i -= n;
            }
        }
        (start, i)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn vertex_counts() {
        let id = Affine::IDENTITY;
        assert_eq!(vertices_needed(10.0, 1.0, &id), 1);
        assert_eq!(vertices_needed(1.5, 1.0, &id), 4);
        assert_eq!(vertices_needed(1.0, 1.0, &id), 4);
        let n = vertices_needed(0.1, 10.0, &id);
        assert_eq!(n % 2, 0);
        // acos(0.99) is about 0.1415, so 2pi / 0.1415 rounds up to 45, then 46.
        assert_eq!(n, 46);
        // Scaling the pen up needs more vertices.
        assert!(vertices_needed(0.1, 10.0, &Affine::scale(4.0)) > n);
    }

    #[test]
    fn vanishing_tolerance() {
        let id = Affine::IDENTITY;
        assert_eq!(vertices_needed(1e-18, 2.0, &id), 4);
        assert_eq!(vertices_needed(0.0, 2.0, &id), 4);
        let pen = Pen::new(2.0, 1e-18, &id).unwrap();
        assert_eq!(pen.len(), 4);
    }

    #[test]
    fn square_pen() {
        let pen = Pen::new(1.0, 1.0, &Affine::IDENTITY).unwrap();
        let points: Vec<Point> = pen.vertices().iter().map(|v| v.point).collect();
        assert_eq!(
            points,
            [
                Point::new(256, 0),
                Point::new(0, 256),
                Point::new(-256, 0),
                Point::new(0, -256),
            ]
        );
        assert_eq!(pen.vertices()[0].slope_cw, Slope::new(256, 256));
        assert_eq!(pen.vertices()[0].slope_ccw, Slope::new(-256, 256));
    }

    #[test]
    fn reflection_reverses_order() {
        let flip = Affine::scale_non_uniform(1.0, -1.0);
        let pen = Pen::new(1.0, 1.0, &flip).unwrap();
        // The angles are negated, then the y axis is flipped back.
        assert_eq!(pen.vertices()[1].point, Point::new(0, 256));
    }

    #[test]
    fn adjacent_slopes_agree() {
        let pen = Pen::new(5.0, 0.05, &Affine::IDENTITY).unwrap();
        assert!(pen.len() > 8);
        for w in pen.vertices().windows(2) {
            assert_eq!(w[0].slope_ccw, w[1].slope_cw);
        }
    }

    fn walk(pen: &Pen, (start, stop): (usize, usize), clockwise: bool) -> Vec<Point> {
        let n = pen.len();
        let mut i = start;
        let mut visited = Vec::new();
        while i != stop {
            visited.push(pen.vertices()[i].point);
            i = if clockwise { (i + 1) % n } else { (i + n - 1) % n };
        }
        visited
    }

    #[test]
    fn active_vertices_for_turns() {
        let pen = Pen::new(1.0, 1.0, &Affine::IDENTITY).unwrap();
        let east = Slope::new(256, 0);
        let south = Slope::new(0, 256);
        let west = Slope::new(-256, 0);

        // A quarter turn lands exactly on the neighboring vertices, so there
        // is nothing in between.
        let range = pen.find_active_cw_vertices(east, south);
        assert_eq!(range.0, range.1);

        // Turning around clockwise passes the vertex ahead of the pen.
        let range = pen.find_active_cw_vertices(east, west);
        assert_eq!(walk(&pen, range, true), [Point::new(256, 0)]);

        // A round cap walks counter-clockwise from one side to the other.
        let range = pen.find_active_ccw_vertices(east, west);
        assert_eq!(
            walk(&pen, range, false),
            [Point::new(0, 256), Point::new(256, 0), Point::new(0, -256)]
        );
    }
}
