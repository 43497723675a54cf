// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion of stroked paths into polygons.
//!
//! The stroker walks a path once and grows two rails of outline points,
//! one on each side of the path. The `cw` rail is fed to the polygon with
//! a winding of +1 and the `ccw` rail with -1, so that together with the
//! caps they describe the stroke area under the non-zero fill rule. The
//! rails are left open; the polygon never closes a contour implicitly.

use core::cmp::Ordering;
use core::mem;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;
use crate::fixed;
use crate::{
    dash_path, Affine, Cap, Contour, Error, Join, PathFixed, PathSink, Pen, Point, Polygon, Rect,
    Slope, Spline, Stroke, StrokeOpts, Vec2,
};

/// The geometry of the stroke across one point of the path.
#[derive(Clone, Copy, Debug)]
struct StrokeFace {
    /// The outline point counter-clockwise of the path.
    ccw: Point,
    /// The point on the path.
    point: Point,
    /// The outline point clockwise of the path.
    cw: Point,
    /// Unit direction in user space.
    usr_vector: Vec2,
    /// Direction in device space, as given.
    dev_vector: Slope,
    /// Unit direction in device space.
    dev_slope: Vec2,
    /// Length of `dev_vector` in device units.
    length: f64,
}

impl StrokeFace {
    /// The same face, seen travelling the other way.
    fn reversed(&self) -> StrokeFace {
        StrokeFace {
            ccw: self.cw,
            cw: self.ccw,
            usr_vector: -self.usr_vector,
            dev_vector: -self.dev_vector,
            ..*self
        }
    }
}

/// One of the two outline rails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Cw,
    Ccw,
}

/// State of the subpath being stroked.
#[derive(Clone, Copy, Debug, Default)]
struct Subpath {
    first_point: Point,
    current_point: Point,
    /// Set once the subpath has started, even with no segments.
    has_initial_sub_path: bool,
    /// Kept for the closing join.
    first_face: Option<StrokeFace>,
    current_face: Option<StrokeFace>,
}

/// Whether turning from `in_face` to `out_face` is a clockwise turn.
fn join_is_clockwise(in_face: &StrokeFace, out_face: &StrokeFace) -> bool {
    in_face.dev_vector.compare(out_face.dev_vector) == Ordering::Less
}

/// The side of `d1` that `d2` lies on.
fn turn_sign(d1: Vec2, d2: Vec2) -> Ordering {
    d1.cross(d2).partial_cmp(&0.0).unwrap_or(Ordering::Equal)
}

/// Append `point` to `contour`, unless it merges into the last point.
fn push_point(contour: &mut Contour, merge: Option<u64>, point: Point) -> Result<(), Error> {
    if let (Some(tolerance), Some(last)) = (merge, contour.last()) {
        if point.distance_squared(*last) < tolerance {
            return Ok(());
        }
    }
    contour.add_point(point)
}

struct Stroker<'a> {
    style: &'a Stroke,
    ctm: Affine,
    ctm_inverse: Affine,
    ctm_det_positive: bool,
    tolerance: f64,
    half_line_width: f64,
    /// Joins whose directions have a dot product below this are rounded.
    spline_cusp_tolerance: f64,
    /// Squared distance in fixed units under which outline points merge.
    contour_tolerance: Option<u64>,
    pen: Option<Pen>,
    /// Expanded limits of the polygon; fans and curves outside are culled.
    bounds: Option<Rect>,
    cw: Contour,
    ccw: Contour,
    subpath: Subpath,
    polygon: &'a mut Polygon,
}

impl<'a> Stroker<'a> {
    /// Prepare to stroke `path`.
    ///
    /// Returns `None` if the stroke is too thin to cover anything.
    fn new(
        path: &PathFixed,
        style: &'a Stroke,
        ctm: Affine,
        ctm_inverse: Affine,
        tolerance: f64,
        opts: StrokeOpts,
        polygon: &'a mut Polygon,
    ) -> Result<Option<Stroker<'a>>, Error> {
        let half_line_width = style.width / 2.0;

        let bounds = polygon.limit().map(|limit| {
            let (dx, dy) = style.max_distance_from_path(path, &ctm);
            limit.inflate(fixed::from_f64(dx), fixed::from_f64(dy))
        });

        // A round join is only worth it where the arc rises more than the
        // tolerance above its chord.
        let [xx, yx, ..] = ctm.as_coeffs();
        let scaled_hlw = (half_line_width * xx).hypot(half_line_width * yx);
        let spline_cusp_tolerance = if scaled_hlw <= tolerance {
            -1.0
        } else {
            let t = 1.0 - tolerance / scaled_hlw;
            2.0 * t * t - 1.0
        };

        let pen = if path.has_curve_to() || style.join == Join::Round || style.cap == Cap::Round
        {
            let pen = Pen::new(half_line_width, tolerance, &ctm)?;
            if pen.len() <= 1 {
                log::debug!(
                    "stroke of width {} is below tolerance {tolerance}, nothing to draw",
                    style.width
                );
                return Ok(None);
            }
            Some(pen)
        } else {
            None
        };

        let contour_tolerance = if opts.merges_points() {
            let t = tolerance * f64::from(fixed::ONE);
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "a squared distance, saturating on overflow"
            )]
            let t = (t * t) as u64;
            Some(t)
        } else {
            None
        };

        Ok(Some(Stroker {
            style,
            ctm,
            ctm_inverse,
            ctm_det_positive: ctm.determinant() >= 0.0,
            tolerance,
            half_line_width,
            spline_cusp_tolerance,
            contour_tolerance,
            pen,
            bounds,
            cw: Contour::new(1),
            ccw: Contour::new(-1),
            subpath: Subpath::default(),
            polygon,
        }))
    }

    fn contour_mut(&mut self, side: Side) -> &mut Contour {
        match side {
            Side::Cw => &mut self.cw,
            Side::Ccw => &mut self.ccw,
        }
    }

    fn contour_add_point(&mut self, side: Side, point: Point) -> Result<(), Error> {
        let merge = self.contour_tolerance;
        push_point(self.contour_mut(side), merge, point)
    }

    fn within_tolerance(&self, p1: Point, p2: Point) -> bool {
        self.contour_tolerance
            .is_some_and(|tolerance| p1.distance_squared(p2) < tolerance)
    }

    /// Move the last point of a rail, and for a closing join its first one.
    fn replace_ends(&mut self, side: Side, point: Point, first_too: bool) {
        let contour = self.contour_mut(side);
        if let Some(last) = contour.last_mut() {
            *last = point;
        }
        if first_too {
            if let Some(first) = contour.first_mut() {
                *first = point;
            }
        }
    }

    /// Hand a rail to the polygon and start it afresh.
    fn deliver(&mut self, side: Side) -> Result<(), Error> {
        let contour = match side {
            Side::Cw => &mut self.cw,
            Side::Ccw => &mut self.ccw,
        };
        log::trace!("{contour:?}");
        self.polygon.add_contour(contour)?;
        contour.reset();
        Ok(())
    }

    fn compute_face(&self, point: Point, dev_slope: Slope) -> StrokeFace {
        let (unit, length) = dev_slope.to_vec2().normalize();
        let hlw = self.half_line_width;

        // The offset must be perpendicular in user space, so rotate there
        // and map back, minding reflections.
        let (usr_vector, offset) = if self.ctm_inverse.is_identity() {
            (unit, Vec2::new(-unit.y * hlw, unit.x * hlw))
        } else {
            let (usr, _) = self.ctm_inverse.transform_distance(unit).normalize();
            let face = if self.ctm_det_positive {
                Vec2::new(-usr.y * hlw, usr.x * hlw)
            } else {
                Vec2::new(usr.y * hlw, -usr.x * hlw)
            };
            (usr, self.ctm.transform_distance(face))
        };

        let offset_ccw = Slope::new(fixed::from_f64(offset.x), fixed::from_f64(offset.y));
        StrokeFace {
            ccw: point + offset_ccw,
            point,
            cw: point - offset_ccw,
            usr_vector,
            dev_vector: dev_slope,
            dev_slope: unit,
            length,
        }
    }

    /// Trace the pen around `midpt` while the direction turns from
    /// `in_vector` to `out_vector`.
    fn add_fan(
        &mut self,
        in_vector: Slope,
        out_vector: Slope,
        midpt: Point,
        clockwise: bool,
        side: Side,
    ) -> Result<(), Error> {
        if self.bounds.is_some_and(|b| !b.contains_point(midpt)) {
            return Ok(());
        }
        let Some(pen) = self.pen.as_ref() else {
            return Ok(());
        };
        let merge = self.contour_tolerance;
        let contour = match side {
            Side::Cw => &mut self.cw,
            Side::Ccw => &mut self.ccw,
        };
        let vertices = pen.vertices();
        let n = vertices.len();
        if clockwise {
            let (mut start, stop) = pen.find_active_cw_vertices(in_vector, out_vector);
            while start != stop {
                push_point(contour, merge, midpt + (vertices[start].point - Point::ORIGIN))?;
                start += 1;
                if start == n {
                    start = 0;
                }
            }
        } else {
            let (mut start, stop) = pen.find_active_ccw_vertices(in_vector, out_vector);
            while start != stop {
                push_point(contour, merge, midpt + (vertices[start].point - Point::ORIGIN))?;
                if start == 0 {
                    start = n;
                }
                start -= 1;
            }
        }
        Ok(())
    }

    /// The outer corner of a miter join, or `None` to bevel instead.
    fn miter_point(
        &self,
        in_face: &StrokeFace,
        out_face: &StrokeFace,
        inpt: Point,
        outpt: Point,
    ) -> Option<Point> {
        let in_dot_out = in_face.dev_slope.dot(out_face.dev_slope);
        let ml = self.style.miter_limit;
        // The miter length over the width is 1 / sin(psi / 2) for an angle
        // psi between the segments; compare squares to avoid the root.
        if 2.0 > ml * ml * (1.0 + in_dot_out) {
            log::trace!("miter limit {ml} exceeded at {:?}", in_face.point);
            return None;
        }

        let (x1, y1) = inpt.to_f64();
        let Vec2 { x: dx1, y: dy1 } = in_face.dev_slope;
        let (x2, y2) = outpt.to_f64();
        let Vec2 { x: dx2, y: dy2 } = out_face.dev_slope;

        // Intersect the two outer edges, solving for x on the edge with the
        // larger dy.
        let my = ((x2 - x1) * dy1 * dy2 - y2 * dx2 * dy1 + y1 * dx1 * dy2)
            / (dx1 * dy2 - dx2 * dy1);
        let mx = if dy1.abs() >= dy2.abs() {
            (my - y1) * dx1 / dy1 + x1
        } else {
            (my - y2) * dx2 / dy2 + x2
        };

        // Nearly parallel edges can throw the intersection far away after
        // rounding; only keep it if it lies between the two faces.
        let (ix, iy) = in_face.point.to_f64();
        let face1 = Vec2::new(x1 - ix, y1 - iy);
        let face2 = Vec2::new(x2 - ix, y2 - iy);
        let miter = Vec2::new(mx - ix, my - iy);
        if turn_sign(face1, miter) != turn_sign(face2, miter) {
            Some(Point::from_f64(mx, my))
        } else {
            log::trace!("miter at {:?} falls outside the join, beveling", in_face.point);
            None
        }
    }

    fn outer_join(
        &mut self,
        in_face: &StrokeFace,
        out_face: &StrokeFace,
        clockwise: bool,
        closing: bool,
    ) -> Result<(), Error> {
        if in_face.cw == out_face.cw && in_face.ccw == out_face.ccw {
            return Ok(());
        }
        let (inpt, outpt, side) = if clockwise {
            (in_face.cw, out_face.cw, Side::Cw)
        } else {
            (in_face.ccw, out_face.ccw, Side::Ccw)
        };

        if closing && self.within_tolerance(inpt, outpt) {
            let contour = self.contour_mut(side);
            if let Some(last) = contour.last().copied() {
                if let Some(first) = contour.first_mut() {
                    *first = last;
                }
            }
            return Ok(());
        }

        match self.style.join {
            Join::Round => {
                if in_face.dev_slope.dot(out_face.dev_slope) < self.spline_cusp_tolerance {
                    self.add_fan(
                        in_face.dev_vector,
                        out_face.dev_vector,
                        in_face.point,
                        clockwise,
                        side,
                    )?;
                }
            }
            Join::Miter => {
                if let Some(p) = self.miter_point(in_face, out_face, inpt, outpt) {
                    self.replace_ends(side, p, closing);
                    return Ok(());
                }
            }
            Join::Bevel => {}
        }
        self.contour_add_point(side, outpt)
    }

    fn inner_join(
        &mut self,
        in_face: &StrokeFace,
        out_face: &StrokeFace,
        clockwise: bool,
    ) -> Result<(), Error> {
        let (outpt, side) = if clockwise {
            (out_face.ccw, Side::Ccw)
        } else {
            (out_face.cw, Side::Cw)
        };
        self.contour_add_point(side, in_face.point)?;
        self.contour_add_point(side, outpt)
    }

    fn inner_close(&mut self, in_face: &StrokeFace, out_face: &StrokeFace) -> Result<(), Error> {
        let (inpt, side) = if join_is_clockwise(in_face, out_face) {
            (out_face.ccw, Side::Ccw)
        } else {
            (out_face.cw, Side::Cw)
        };
        self.contour_add_point(side, in_face.point)?;
        self.contour_add_point(side, inpt)?;
        let contour = self.contour_mut(side);
        if let Some(last) = contour.last().copied() {
            if let Some(first) = contour.first_mut() {
                *first = last;
            }
        }
        Ok(())
    }

    fn add_cap(&mut self, face: &StrokeFace, side: Side) -> Result<(), Error> {
        match self.style.cap {
            Cap::Round => {
                self.add_fan(face.dev_vector, -face.dev_vector, face.point, false, side)?;
            }
            Cap::Square => {
                let d = self
                    .ctm
                    .transform_distance(face.usr_vector * self.half_line_width);
                let forward = Slope::new(fixed::from_f64(d.x), fixed::from_f64(d.y));
                self.contour_add_point(side, face.ccw + forward)?;
                self.contour_add_point(side, face.cw + forward)?;
            }
            Cap::Butt => {}
        }
        self.contour_add_point(side, face.cw)
    }

    fn add_leading_cap(&mut self, face: &StrokeFace, side: Side) -> Result<(), Error> {
        self.add_cap(&face.reversed(), side)
    }

    fn add_trailing_cap(&mut self, face: &StrokeFace, side: Side) -> Result<(), Error> {
        self.add_cap(face, side)
    }

    /// Finish an open subpath: cap both ends and deliver the rails.
    fn add_caps(&mut self) -> Result<(), Error> {
        let subpath = self.subpath;
        if subpath.has_initial_sub_path
            && subpath.first_face.is_none()
            && subpath.current_face.is_none()
            && self.style.cap == Cap::Round
        {
            // A degenerate subpath becomes a dot; any direction will do.
            let face = self.compute_face(subpath.first_point, Slope::new(fixed::ONE, 0));
            self.add_leading_cap(&face, Side::Ccw)?;
            self.add_trailing_cap(&face, Side::Ccw)?;
            if let Some(first) = self.ccw.first().copied() {
                self.ccw.add_point(first)?;
            }
            log::debug!("dot at {:?}", subpath.first_point);
            return self.deliver(Side::Ccw);
        }

        if let Some(face) = subpath.current_face {
            self.add_trailing_cap(&face, Side::Ccw)?;
        }
        if !self.cw.is_empty() {
            log::debug!(
                "open subpath from {:?}: {} + {} outline points",
                subpath.first_point,
                self.cw.len(),
                self.ccw.len()
            );
        }
        self.deliver(Side::Ccw)?;

        if let Some(face) = subpath.first_face {
            self.ccw.add_point(face.cw)?;
            self.add_leading_cap(&face, Side::Ccw)?;
            self.deliver(Side::Ccw)?;
        }
        self.deliver(Side::Cw)
    }

    /// Advance along a flattened curve to `point`, heading along `tangent`.
    fn spline_to(&mut self, point: Point, tangent: Slope) -> Result<(), Error> {
        let Some(current) = self.subpath.current_face else {
            return Ok(());
        };

        if tangent.is_zero() {
            // The curve doubles back on itself: turn around in place.
            let face = current.reversed();
            let clockwise = join_is_clockwise(&current, &face);
            let side = if clockwise { Side::Cw } else { Side::Ccw };
            self.add_fan(current.dev_vector, face.dev_vector, current.point, clockwise, side)?;
            self.subpath.current_face = Some(face);
            return Ok(());
        }

        let face = self.compute_face(point, tangent);
        if face.dev_slope.dot(current.dev_slope) < self.spline_cusp_tolerance {
            let clockwise = join_is_clockwise(&current, &face);
            let delta = face.point - current.point;
            self.contour_add_point(Side::Cw, current.cw + delta)?;
            self.contour_add_point(Side::Ccw, current.ccw + delta)?;
            let side = if clockwise { Side::Cw } else { Side::Ccw };
            self.add_fan(current.dev_vector, face.dev_vector, current.point, clockwise, side)?;
        }
        self.contour_add_point(Side::Cw, face.cw)?;
        self.contour_add_point(Side::Ccw, face.ccw)?;

        self.subpath.current_face = Some(face);
        self.subpath.current_point = face.point;
        Ok(())
    }

    /// Start the rails with the first face of a subpath.
    fn begin_rails(&mut self, face: &StrokeFace) -> Result<(), Error> {
        if self.subpath.first_face.is_none() {
            self.subpath.first_face = Some(*face);
        }
        self.contour_add_point(Side::Cw, face.cw)?;
        self.contour_add_point(Side::Ccw, face.ccw)
    }

    fn stroke(mut self, path: &PathFixed) -> Result<(), Error> {
        path.interpret(&mut self)?;
        self.add_caps()
    }
}

impl PathSink for Stroker<'_> {
    fn move_to(&mut self, p: Point) -> Result<(), Error> {
        self.add_caps()?;
        self.subpath = Subpath {
            first_point: p,
            current_point: p,
            has_initial_sub_path: true,
            ..Subpath::default()
        };
        Ok(())
    }

    fn line_to(&mut self, p: Point) -> Result<(), Error> {
        self.subpath.has_initial_sub_path = true;
        let p1 = self.subpath.current_point;
        if p1 == p {
            return Ok(());
        }

        let dev_slope = p - p1;
        let start = self.compute_face(p1, dev_slope);
        log::trace!("segment {p1:?} -> {p:?}, length {:.3}", start.length);
        if let Some(current) = self.subpath.current_face {
            let turn = current.dev_vector.compare(start.dev_vector);
            if turn != Ordering::Equal {
                let clockwise = turn == Ordering::Less;
                if !self.within_tolerance(current.ccw, start.ccw)
                    || !self.within_tolerance(current.cw, start.cw)
                {
                    self.outer_join(&current, &start, clockwise, false)?;
                    self.inner_join(&current, &start, clockwise)?;
                }
            }
        } else {
            self.begin_rails(&start)?;
        }

        let face = StrokeFace {
            point: p,
            ccw: start.ccw + dev_slope,
            cw: start.cw + dev_slope,
            ..start
        };
        self.subpath.current_face = Some(face);
        self.subpath.current_point = p;
        self.contour_add_point(Side::Cw, face.cw)?;
        self.contour_add_point(Side::Ccw, face.ccw)
    }

    fn curve_to(&mut self, b: Point, c: Point, d: Point) -> Result<(), Error> {
        let a = self.subpath.current_point;
        if self
            .bounds
            .is_some_and(|bounds| !Spline::intersects(a, b, c, d, &bounds))
        {
            return self.line_to(d);
        }
        let Some(spline) = Spline::new(a, b, c, d) else {
            return self.line_to(d);
        };

        let face = self.compute_face(a, spline.initial_slope());
        if let Some(current) = self.subpath.current_face {
            let clockwise = join_is_clockwise(&current, &face);
            self.outer_join(&current, &face, clockwise, false)?;
            self.inner_join(&current, &face, clockwise)?;
        } else {
            self.begin_rails(&face)?;
        }
        self.subpath.current_face = Some(face);

        let tolerance = self.tolerance;
        spline.decompose(tolerance, |point, tangent| self.spline_to(point, tangent))
    }

    fn close_path(&mut self) -> Result<(), Error> {
        self.line_to(self.subpath.first_point)?;

        if let (Some(first), Some(current)) = (self.subpath.first_face, self.subpath.current_face) {
            let clockwise = join_is_clockwise(&current, &first);
            self.outer_join(&current, &first, clockwise, true)?;
            self.inner_close(&current, &first)?;
            log::debug!(
                "closed subpath at {:?}: {} + {} outline points",
                self.subpath.first_point,
                self.cw.len(),
                self.ccw.len()
            );
            self.deliver(Side::Cw)?;
            self.deliver(Side::Ccw)?;
        } else {
            self.add_caps()?;
        }

        let subpath = mem::take(&mut self.subpath);
        self.subpath.first_point = subpath.first_point;
        self.subpath.current_point = subpath.current_point;
        Ok(())
    }
}

/// Convert the outline of `path` stroked with `style` into polygon edges.
///
/// The path is in device space; `style` lengths are in user space and
/// `ctm` maps user space to device space. Curves, round joins and round
/// caps are approximated to within `tolerance` device units. If `polygon`
/// has limits, geometry that cannot reach them is skipped and the rest is
/// clipped to them.
///
/// The edges are appended to `polygon`; fill them with the non-zero
/// winding rule.
///
/// # Errors
///
/// Returns [`Error::InvalidMatrix`] if `ctm` is not invertible,
/// [`Error::InvalidDash`] for an unusable dash pattern, and
/// [`Error::NoMemory`] if the outline could not be allocated.
///
/// # Examples
///
/// ```
/// use strokepoly::{stroke_to_polygon, Affine, PathFixed, Point, Polygon, Stroke, StrokeOpts};
///
/// let mut path = PathFixed::new();
/// path.move_to(Point::from_ints(0, 0));
/// path.line_to(Point::from_ints(100, 0));
///
/// let mut polygon = Polygon::new();
/// let style = Stroke::new(10.0);
/// stroke_to_polygon(&path, &style, &Affine::IDENTITY, 0.1, &StrokeOpts::default(), &mut polygon)
///     .unwrap();
/// assert_eq!(polygon.winding_at(Point::from_ints(50, 0)), -1);
/// assert_eq!(polygon.winding_at(Point::from_ints(50, 6)), 0);
/// ```
pub fn stroke_to_polygon(
    path: &PathFixed,
    style: &Stroke,
    ctm: &Affine,
    tolerance: f64,
    opts: &StrokeOpts,
    polygon: &mut Polygon,
) -> Result<(), Error> {
    let ctm_inverse = ctm.inverse()?;
    if style.is_dashed() {
        let dashed = dash_path(
            path,
            &style.dash_pattern,
            style.dash_offset,
            &ctm_inverse,
            tolerance,
        )?;
        return stroke_solid(&dashed, style, *ctm, ctm_inverse, tolerance, *opts, polygon);
    }
    stroke_solid(path, style, *ctm, ctm_inverse, tolerance, *opts, polygon)
}

fn stroke_solid(
    path: &PathFixed,
    style: &Stroke,
    ctm: Affine,
    ctm_inverse: Affine,
    tolerance: f64,
    opts: StrokeOpts,
    polygon: &mut Polygon,
) -> Result<(), Error> {
    match Stroker::new(path, style, ctm, ctm_inverse, tolerance, opts, polygon)? {
        Some(stroker) => stroker.stroke(path),
        None => Ok(()),
    }
}
