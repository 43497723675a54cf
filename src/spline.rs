// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flattening of cubic Bézier segments.

use crate::{Error, Point, Rect, Slope};

/// Subdivision depth after which a piece is emitted regardless of error.
///
/// Each level halves the control polygon, so by this depth every piece of
/// a curve with `i32` coordinates has collapsed onto a single point.
const MAX_DEPTH: u32 = 32;

/// A cubic Bézier segment in fixed point, ready to be flattened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spline {
    knots: Knots,
    initial_slope: Slope,
    final_slope: Slope,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Knots {
    a: Point,
    b: Point,
    c: Point,
    d: Point,
}

impl Spline {
    /// Prepare the curve `a, b, c, d` for flattening.
    ///
    /// Returns `None` when the curve has no usable tangent at one of its
    /// ends, in which case it should be treated as a straight segment from
    /// `a` to `d`.
    pub fn new(a: Point, b: Point, c: Point, d: Point) -> Option<Spline> {
        if a == b && c == d {
            return None;
        }

        let initial_slope = if a != b {
            b - a
        } else if a != c {
            c - a
        } else if a != d {
            d - a
        } else {
            return None;
        };

        let final_slope = if c != d {
            d - c
        } else if b != d {
            d - b
        } else {
            return None;
        };

        Some(Spline {
            knots: Knots { a, b, c, d },
            initial_slope,
            final_slope,
        })
    }

    /// The direction of the curve at its start.
    #[inline]
    pub fn initial_slope(&self) -> Slope {
        self.initial_slope
    }

    /// The direction of the curve at its end.
    #[inline]
    pub fn final_slope(&self) -> Slope {
        self.final_slope
    }

    /// The start point.
    #[inline]
    pub fn start(&self) -> Point {
        self.knots.a
    }

    /// The end point.
    #[inline]
    pub fn end(&self) -> Point {
        self.knots.d
    }

    /// Flatten the curve, calling `add_point` with each vertex of the
    /// approximating polyline and the tangent there.
    ///
    /// `tolerance` bounds, in device units, how far the control points of
    /// each flattened piece may stray from its chord. The start point is
    /// not reported; the end point is always reported last, with the final
    /// slope. Repeated points are skipped.
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first error from `add_point`.
    pub fn decompose<F>(&self, tolerance: f64, mut add_point: F) -> Result<(), Error>
    where
        F: FnMut(Point, Slope) -> Result<(), Error>,
    {
        let mut last_point = self.knots.a;
        let mut emit = |point: Point, knot: Point| {
            if point == last_point {
                return Ok(());
            }
            last_point = point;
            add_point(point, knot - point)
        };
        decompose_into(self.knots, tolerance * tolerance, 0, &mut emit)?;
        add_point(self.knots.d, self.final_slope)
    }

    /// Whether the curve could touch `bounds`.
    ///
    /// This is conservative: it tests the control points and their
    /// bounding box, not the curve itself.
    pub fn intersects(a: Point, b: Point, c: Point, d: Point, bounds: &Rect) -> bool {
        if [a, b, c, d].iter().any(|p| bounds.contains_point(*p)) {
            return true;
        }
        let mut hull = Rect::new(a, a);
        hull.add_point(b);
        hull.add_point(c);
        hull.add_point(d);
        !(hull.p2.x <= bounds.p1.x
            || hull.p1.x >= bounds.p2.x
            || hull.p2.y <= bounds.p1.y
            || hull.p1.y >= bounds.p2.y)
    }
}

fn decompose_into<F>(
    s1: Knots,
    tolerance_squared: f64,
    depth: u32,
    emit: &mut F,
) -> Result<(), Error>
where
    F: FnMut(Point, Point) -> Result<(), Error>,
{
    if depth >= MAX_DEPTH || error_squared(&s1) < tolerance_squared {
        return emit(s1.a, s1.b);
    }
    let (s1, s2) = de_casteljau(&s1);
    decompose_into(s1, tolerance_squared, depth + 1, emit)?;
    decompose_into(s2, tolerance_squared, depth + 1, emit)
}

#[inline]
fn lerp_half(a: Point, b: Point) -> Point {
    Point::new(
        a.x.wrapping_add(b.x.wrapping_sub(a.x) >> 1),
        a.y.wrapping_add(b.y.wrapping_sub(a.y) >> 1),
    )
}

/// Split at `t = 0.5`.
fn de_casteljau(s: &Knots) -> (Knots, Knots) {
    let ab = lerp_half(s.a, s.b);
    let bc = lerp_half(s.b, s.c);
    let cd = lerp_half(s.c, s.d);
    let abbc = lerp_half(ab, bc);
    let bccd = lerp_half(bc, cd);
    let mid = lerp_half(abbc, bccd);
    (
        Knots {
            a: s.a,
            b: ab,
            c: abbc,
            d: mid,
        },
        Knots {
            a: mid,
            b: bccd,
            c: cd,
            d: s.d,
        },
    )
}

/// Upper bound on the squared distance between the curve and its chord,
/// taken as the larger distance of the two control points from the chord
/// segment.
fn error_squared(k: &Knots) -> f64 {
    let b = (k.b - k.a).to_vec2();
    let c = (k.c - k.a).to_vec2();
    let (mut bdx, mut bdy) = (b.x, b.y);
    let (mut cdx, mut cdy) = (c.x, c.y);

    if k.a != k.d {
        let d = (k.d - k.a).to_vec2();
        let v = d.hypot2();

        let u = bdx * d.x + bdy * d.y;
        if u >= v {
            bdx -= d.x;
            bdy -= d.y;
        } else if u > 0.0 {
            bdx -= u / v * d.x;
            bdy -= u / v * d.y;
        }

        let u = cdx * d.x + cdy * d.y;
        if u >= v {
            cdx -= d.x;
            cdy -= d.y;
        } else if u > 0.0 {
            cdx -= u / v * d.x;
            cdy -= u / v * d.y;
        }
    }

    let berr = bdx * bdx + bdy * bdy;
    let cerr = cdx * cdx + cdy * cdy;
    berr.max(cerr)
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn pt(x: i32, y: i32) -> Point {
        Point::from_ints(x, y)
    }

    fn flatten(spline: &Spline, tolerance: f64) -> Vec<(Point, Slope)> {
        let mut out = Vec::new();
        spline
            .decompose(tolerance, |p, s| {
                out.push((p, s));
                Ok(())
            })
            .unwrap();
        out
    }

    #[test]
    fn degenerate_curves_are_rejected() {
        assert!(Spline::new(pt(0, 0), pt(0, 0), pt(5, 5), pt(5, 5)).is_none());
        assert!(Spline::new(pt(1, 1), pt(1, 1), pt(1, 1), pt(1, 1)).is_none());
        // Both control points on the end point: no final tangent.
        assert!(Spline::new(pt(0, 0), pt(3, 3), pt(3, 3), pt(3, 3)).is_none());
    }

    #[test]
    fn tangent_fallbacks() {
        let s = Spline::new(pt(0, 0), pt(0, 0), pt(4, 0), pt(4, 4)).unwrap();
        assert_eq!(s.initial_slope(), Slope::new(1024, 0));
        assert_eq!(s.final_slope(), Slope::new(0, 1024));
        let s = Spline::new(pt(0, 0), pt(2, 0), pt(4, 4), pt(4, 4)).unwrap();
        assert_eq!(s.final_slope(), Slope::new(512, 1024));
    }

    #[test]
    fn flattening_ends_on_end_point() {
        let s = Spline::new(pt(0, 0), pt(0, 10), pt(10, 10), pt(10, 0)).unwrap();
        let coarse = flatten(&s, 2.0);
        let fine = flatten(&s, 0.05);
        assert!(coarse.len() < fine.len());
        for pts in [&coarse, &fine] {
            let (last, slope) = *pts.last().unwrap();
            assert_eq!(last, pt(10, 0));
            assert_eq!(slope, s.final_slope());
            assert!(pts.iter().all(|(p, _)| *p != pt(0, 0)));
            assert!(pts.windows(2).all(|w| w[0].0 != w[1].0));
        }
    }

    #[test]
    fn flattening_is_within_tolerance() {
        let s = Spline::new(pt(0, 0), pt(30, 60), pt(90, -20), pt(100, 40)).unwrap();
        let tolerance = 0.25;
        let pts = flatten(&s, tolerance);
        // Every flattened vertex lies on the curve to within a fixed point
        // rounding error, so check them against the polynomial.
        let eval = |t: f64| {
            let mt = 1.0 - t;
            let w = [mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t];
            let xs = [0.0, 30.0, 90.0, 100.0];
            let ys = [0.0, 60.0, -20.0, 40.0];
            (
                w.iter().zip(xs).map(|(w, x)| w * x).sum::<f64>(),
                w.iter().zip(ys).map(|(w, y)| w * y).sum::<f64>(),
            )
        };
        for (p, _) in &pts {
            let (x, y) = p.to_f64();
            let nearest = (0..=2000)
                .map(|i| {
                    let (cx, cy) = eval(f64::from(i) / 2000.0);
                    (cx - x).hypot(cy - y)
                })
                .fold(f64::INFINITY, f64::min);
            assert!(nearest < 0.2, "{p:?} is {nearest} from the curve");
        }
    }

    #[test]
    fn straight_curve_is_a_single_segment() {
        let s = Spline::new(pt(0, 0), pt(1, 0), pt(2, 0), pt(3, 0)).unwrap();
        let pts = flatten(&s, 0.1);
        assert_eq!(pts, [(pt(3, 0), Slope::new(256, 0))]);
    }

    #[test]
    fn callback_errors_propagate() {
        let s = Spline::new(pt(0, 0), pt(0, 10), pt(10, 10), pt(10, 0)).unwrap();
        let mut calls = 0;
        let result = s.decompose(0.1, |_, _| {
            calls += 1;
            if calls == 3 {
                Err(Error::NoMemory)
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err(Error::NoMemory));
        assert_eq!(calls, 3);
    }

    #[test]
    fn hull_intersection() {
        let bounds = Rect::from_ints(0, 0, 10, 10);
        assert!(Spline::intersects(pt(5, 5), pt(20, 20), pt(30, 30), pt(40, 40), &bounds));
        assert!(Spline::intersects(pt(-5, 5), pt(-5, -20), pt(20, -20), pt(20, 5), &bounds));
        assert!(!Spline::intersects(pt(-5, 11), pt(0, 20), pt(10, 20), pt(15, 11), &bounds));
        assert!(!Spline::intersects(pt(20, 0), pt(30, 5), pt(30, 5), pt(20, 10), &bounds));
    }
}
