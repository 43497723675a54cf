// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Splitting paths into dashes.

use alloc::vec::Vec;

use crate::{Affine, Error, PathEl, PathFixed, PathSink, Point, Spline};

/// Where the walk is in the dash pattern.
#[derive(Clone, Copy, Debug)]
struct DashPhase {
    ix: usize,
    remaining: f64,
    on: bool,
}

impl DashPhase {
    fn new(dashes: &[f64], offset: f64) -> DashPhase {
        let mut period: f64 = dashes.iter().sum();
        if dashes.len() % 2 == 1 {
            period *= 2.0;
        }
        let mut offset = offset % period;
        if offset < 0.0 {
            offset += period;
        }

        let mut ix = 0;
        let mut on = true;
        // Stop as soon as the offset is used up, so that a leading zero
        // length dash is not skipped.
        while offset > 0.0 && offset >= dashes[ix] {
            offset -= dashes[ix];
            on = !on;
            ix = (ix + 1) % dashes.len();
        }
        DashPhase {
            ix,
            remaining: dashes[ix] - offset,
            on,
        }
    }

    fn advance(&mut self, dashes: &[f64]) {
        self.ix = (self.ix + 1) % dashes.len();
        self.remaining = dashes[self.ix];
        self.on = !self.on;
    }
}

/// A [`PathSink`] that emits only the "on" parts of a dash pattern.
///
/// Lengths are measured in user space: device deltas are mapped through
/// the inverse transform before being compared against the pattern.
struct Dasher<'a> {
    dashes: &'a [f64],
    ctm_inverse: Affine,
    tolerance: f64,
    initial: DashPhase,
    phase: DashPhase,
    out: PathFixed,
    start: Point,
    current: Point,
    /// The leading dash of the current subpath, held back until we know
    /// whether the subpath closes into it.
    stash: Vec<PathEl>,
    stashing: bool,
}

impl<'a> Dasher<'a> {
    fn new(dashes: &'a [f64], offset: f64, ctm_inverse: Affine, tolerance: f64) -> Dasher<'a> {
        let initial = DashPhase::new(dashes, offset);
        Dasher {
            dashes,
            ctm_inverse,
            tolerance,
            initial,
            phase: initial,
            out: PathFixed::new(),
            start: Point::ORIGIN,
            current: Point::ORIGIN,
            stash: Vec::new(),
            stashing: false,
        }
    }

    fn emit(&mut self, el: PathEl) -> Result<(), Error> {
        if self.stashing {
            self.stash.try_reserve(1)?;
            self.stash.push(el);
        } else {
            self.out.try_reserve(1)?;
            push_el(&mut self.out, el);
        }
        Ok(())
    }

    /// Emit the held back leading dash as a subpath of its own.
    fn flush_stash(&mut self) -> Result<(), Error> {
        self.out.try_reserve(self.stash.len())?;
        for el in self.stash.drain(..) {
            push_el(&mut self.out, el);
        }
        self.stashing = false;
        Ok(())
    }

    fn user_length(&self, p0: Point, p1: Point) -> f64 {
        self.ctm_inverse
            .transform_distance((p1 - p0).to_vec2())
            .hypot()
    }

    fn dash_line(&mut self, p0: Point, p1: Point) -> Result<(), Error> {
        let len = self.user_length(p0, p1);
        if len == 0.0 {
            return Ok(());
        }
        let (x0, y0) = p0.to_f64();
        let d = (p1 - p0).to_vec2();
        let mut walked = 0.0;
        while self.phase.remaining < len - walked {
            walked += self.phase.remaining;
            let t = walked / len;
            let p = Point::from_f64(x0 + t * d.x, y0 + t * d.y);
            if self.phase.on {
                self.emit(PathEl::LineTo(p))?;
                // The leading dash is complete.
                self.stashing = false;
            } else {
                self.emit(PathEl::MoveTo(p))?;
            }
            self.phase.advance(self.dashes);
        }
        self.phase.remaining -= len - walked;
        if self.phase.on {
            self.emit(PathEl::LineTo(p1))?;
        }
        Ok(())
    }
}

fn push_el(path: &mut PathFixed, el: PathEl) {
    match el {
        PathEl::MoveTo(p) => path.move_to(p),
        PathEl::LineTo(p) => path.line_to(p),
        PathEl::CurveTo(b, c, d) => path.curve_to(b, c, d),
        PathEl::ClosePath => path.close_path(),
    }
}

impl PathSink for Dasher<'_> {
    fn move_to(&mut self, p: Point) -> Result<(), Error> {
        self.flush_stash()?;
        self.phase = self.initial;
        self.start = p;
        self.current = p;
        self.stashing = self.phase.on;
        if self.phase.on {
            self.emit(PathEl::MoveTo(p))?;
        }
        Ok(())
    }

    fn line_to(&mut self, p: Point) -> Result<(), Error> {
        self.dash_line(self.current, p)?;
        self.current = p;
        Ok(())
    }

    fn curve_to(&mut self, b: Point, c: Point, d: Point) -> Result<(), Error> {
        let Some(spline) = Spline::new(self.current, b, c, d) else {
            return self.line_to(d);
        };
        let tolerance = self.tolerance;
        spline.decompose(tolerance, |p, _| self.line_to(p))
    }

    fn close_path(&mut self) -> Result<(), Error> {
        self.dash_line(self.current, self.start)?;
        self.current = self.start;
        if self.stashing {
            // The whole subpath is a single dash.
            self.stash.try_reserve(1)?;
            self.stash.push(PathEl::ClosePath);
        } else if self.phase.on && !self.stash.is_empty() {
            // The trailing dash runs into the leading one.
            self.out.try_reserve(self.stash.len())?;
            for el in self.stash.drain(1..) {
                push_el(&mut self.out, el);
            }
            self.stash.clear();
        }
        self.flush_stash()
    }
}

/// Split `path` into the "on" dashes of `dashes`, starting `offset` into
/// the pattern.
///
/// Dash lengths are in user space; `ctm_inverse` maps device deltas back
/// to it. Curves are flattened to within `tolerance` device units first.
/// Each subpath restarts the pattern. A closed subpath that begins and
/// ends inside a dash has those two pieces joined into one.
///
/// # Errors
///
/// Returns [`Error::InvalidDash`] if the pattern is empty, has a negative
/// or non-finite entry, or sums to zero, and [`Error::NoMemory`] if the
/// output could not be allocated.
pub fn dash_path(
    path: &PathFixed,
    dashes: &[f64],
    offset: f64,
    ctm_inverse: &Affine,
    tolerance: f64,
) -> Result<PathFixed, Error> {
    if dashes.is_empty()
        || dashes.iter().any(|d| *d < 0.0 || !d.is_finite())
        || dashes.iter().all(|d| *d == 0.0)
        || !offset.is_finite()
    {
        return Err(Error::InvalidDash);
    }
    let mut dasher = Dasher::new(dashes, offset, *ctm_inverse, tolerance);
    path.interpret(&mut dasher)?;
    dasher.flush_stash()?;
    Ok(dasher.out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: i32, y: i32) -> Point {
        Point::from_ints(x, y)
    }

    fn line(x1: i32) -> PathFixed {
        let mut path = PathFixed::new();
        path.move_to(pt(0, 0));
        path.line_to(pt(x1, 0));
        path
    }

    #[test]
    fn invalid_patterns() {
        let path = line(10);
        let id = Affine::IDENTITY;
        for dashes in [&[][..], &[0.0, 0.0], &[1.0, -1.0], &[f64::NAN]] {
            assert_eq!(
                dash_path(&path, dashes, 0.0, &id, 0.1),
                Err(Error::InvalidDash)
            );
        }
        assert_eq!(
            dash_path(&path, &[1.0], f64::INFINITY, &id, 0.1),
            Err(Error::InvalidDash)
        );
    }

    #[test]
    fn splits_a_line() {
        let dashed = dash_path(&line(10), &[3.0, 2.0], 0.0, &Affine::IDENTITY, 0.1).unwrap();
        // The leading dash is held back in case the subpath closes, so it
        // comes last.
        assert_eq!(
            dashed.elements(),
            [
                PathEl::MoveTo(pt(5, 0)),
                PathEl::LineTo(pt(8, 0)),
                PathEl::MoveTo(pt(0, 0)),
                PathEl::LineTo(pt(3, 0)),
            ]
        );
    }

    #[test]
    fn offset_and_odd_patterns() {
        // An odd pattern alternates: on 2, off 1, on 1, off 2, ...
        let dashed = dash_path(&line(9), &[2.0, 1.0, 1.0], 1.0, &Affine::IDENTITY, 0.1).unwrap();
        assert_eq!(
            dashed.elements(),
            [
                PathEl::MoveTo(pt(2, 0)),
                PathEl::LineTo(pt(3, 0)),
                PathEl::MoveTo(pt(5, 0)),
                PathEl::LineTo(pt(6, 0)),
                PathEl::MoveTo(pt(7, 0)),
                PathEl::LineTo(pt(9, 0)),
                PathEl::MoveTo(pt(0, 0)),
                PathEl::LineTo(pt(1, 0)),
            ]
        );
        // Negative offsets wrap around the period.
        let wrapped = dash_path(&line(9), &[2.0, 1.0, 1.0], -7.0, &Affine::IDENTITY, 0.1).unwrap();
        assert_eq!(wrapped, dashed);
    }

    #[test]
    fn lengths_are_in_user_space() {
        let ctm = Affine::scale(2.0);
        let inverse = ctm.inverse().unwrap();
        let dashed = dash_path(&line(20), &[3.0, 2.0], 0.0, &inverse, 0.1).unwrap();
        assert_eq!(
            dashed.elements(),
            [
                PathEl::MoveTo(pt(10, 0)),
                PathEl::LineTo(pt(16, 0)),
                PathEl::MoveTo(pt(0, 0)),
                PathEl::LineTo(pt(6, 0)),
            ]
        );
    }

    #[test]
    fn closed_subpath_joins_first_and_last_dash() {
        let mut square = PathFixed::new();
        square.move_to(pt(0, 0));
        square.line_to(pt(10, 0));
        square.line_to(pt(10, 10));
        square.line_to(pt(0, 10));
        square.close_path();

        // 40 units of perimeter with a period of 9 ends inside a dash.
        let dashed = dash_path(&square, &[6.0, 3.0], 0.0, &Affine::IDENTITY, 0.1).unwrap();
        let els = dashed.elements();
        // The last dash starts at (0, 4) and continues through the start
        // point to (6, 0) without a break.
        let tail = &els[els.len() - 3..];
        assert_eq!(
            tail,
            [
                PathEl::MoveTo(pt(0, 4)),
                PathEl::LineTo(pt(0, 0)),
                PathEl::LineTo(pt(6, 0)),
            ]
        );
        assert!(!els.contains(&PathEl::ClosePath));
        assert_eq!(els[0], PathEl::MoveTo(pt(9, 0)));

        // A dash longer than the perimeter keeps the subpath closed.
        let solid = dash_path(&square, &[100.0, 1.0], 0.0, &Affine::IDENTITY, 0.1).unwrap();
        assert_eq!(
            solid.elements(),
            [
                PathEl::MoveTo(pt(0, 0)),
                PathEl::LineTo(pt(10, 0)),
                PathEl::LineTo(pt(10, 10)),
                PathEl::LineTo(pt(0, 10)),
                PathEl::LineTo(pt(0, 0)),
                PathEl::ClosePath,
            ]
        );
    }

    #[test]
    fn curves_are_flattened() {
        let mut path = PathFixed::new();
        path.move_to(pt(0, 0));
        path.curve_to(pt(0, 20), pt(20, 20), pt(20, 0));
        let dashed = dash_path(&path, &[1000.0, 1.0], 0.0, &Affine::IDENTITY, 0.1).unwrap();
        assert!(!dashed.has_curve_to());
        assert!(dashed.elements().len() > 4);
        assert_eq!(dashed.current_point(), Some(pt(20, 0)));
    }
}
