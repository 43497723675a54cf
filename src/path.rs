// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paths in fixed point device space.

use alloc::vec::Vec;

use crate::{Error, Point};

/// The element of a [`PathFixed`].
///
/// A valid path has `MoveTo` at the beginning of each subpath.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathEl {
    /// Start a new subpath.
    MoveTo(Point),
    /// A straight segment from the current point.
    LineTo(Point),
    /// A cubic Bézier segment from the current point, with two control
    /// points and an end point.
    CurveTo(Point, Point, Point),
    /// Connect back to the start of the subpath.
    ClosePath,
}

/// A consumer of path events.
///
/// [`PathFixed::interpret`] feeds a path into a sink one element at a
/// time, and stops at the first error the sink reports.
pub trait PathSink {
    /// Start a new subpath at `p`.
    ///
    /// # Errors
    ///
    /// Any error aborts the interpretation of the path.
    fn move_to(&mut self, p: Point) -> Result<(), Error>;

    /// Continue the subpath with a straight segment to `p`.
    ///
    /// # Errors
    ///
    /// Any error aborts the interpretation of the path.
    fn line_to(&mut self, p: Point) -> Result<(), Error>;

    /// Continue the subpath with a cubic Bézier segment.
    ///
    /// # Errors
    ///
    /// Any error aborts the interpretation of the path.
    fn curve_to(&mut self, b: Point, c: Point, d: Point) -> Result<(), Error>;

    /// Close the current subpath.
    ///
    /// # Errors
    ///
    /// Any error aborts the interpretation of the path.
    fn close_path(&mut self) -> Result<(), Error>;
}

/// A path made of lines and cubic Bézier segments, possibly with multiple
/// subpaths, in fixed point device coordinates.
///
/// The builder methods keep the element list well formed: a segment
/// without a current point starts a subpath, consecutive `move_to` calls
/// collapse into one, and a segment following `close_path` is preceded by
/// an implicit `MoveTo` back to the start of the closed subpath.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct PathFixed {
    elements: Vec<PathEl>,
    current: Option<Point>,
    start: Point,
    needs_move: bool,
}

impl PathFixed {
    /// Create a new, empty path.
    pub fn new() -> PathFixed {
        Default::default()
    }

    /// Start a new subpath at `p`.
    pub fn move_to(&mut self, p: impl Into<Point>) {
        let p = p.into();
        match self.elements.last_mut() {
            Some(PathEl::MoveTo(last)) => *last = p,
            _ => self.elements.push(PathEl::MoveTo(p)),
        }
        self.current = Some(p);
        self.start = p;
        self.needs_move = false;
    }

    fn begin_segment(&mut self) {
        if self.needs_move {
            self.elements.push(PathEl::MoveTo(self.start));
            self.needs_move = false;
        }
    }

    /// Add a straight segment to `p`.
    ///
    /// Without a current point this is a `move_to`.
    pub fn line_to(&mut self, p: impl Into<Point>) {
        let p = p.into();
        if self.current.is_none() {
            self.move_to(p);
            return;
        }
        self.begin_segment();
        self.elements.push(PathEl::LineTo(p));
        self.current = Some(p);
    }

    /// Add a cubic Bézier segment.
    ///
    /// Without a current point the subpath starts at `b`.
    pub fn curve_to(&mut self, b: impl Into<Point>, c: impl Into<Point>, d: impl Into<Point>) {
        let (b, c, d) = (b.into(), c.into(), d.into());
        if self.current.is_none() {
            self.move_to(b);
        }
        self.begin_segment();
        self.elements.push(PathEl::CurveTo(b, c, d));
        self.current = Some(d);
    }

    /// Close the current subpath.
    ///
    /// The current point returns to the start of the subpath. Closing
    /// without a current point, or closing twice, does nothing.
    pub fn close_path(&mut self) {
        if self.current.is_none() || self.needs_move {
            return;
        }
        self.elements.push(PathEl::ClosePath);
        self.current = Some(self.start);
        self.needs_move = true;
    }

    /// Reserve space for at least `additional` more elements.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.elements.try_reserve(additional)?;
        Ok(())
    }

    /// The current point, if any.
    #[inline]
    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    /// Get the path elements.
    #[inline]
    pub fn elements(&self) -> &[PathEl] {
        &self.elements
    }

    /// Returns `true` if the path contains no segments.
    pub fn is_empty(&self) -> bool {
        !self
            .elements
            .iter()
            .any(|el| matches!(el, PathEl::LineTo(..) | PathEl::CurveTo(..)))
    }

    /// Whether any segment is a curve.
    pub fn has_curve_to(&self) -> bool {
        self.elements
            .iter()
            .any(|el| matches!(el, PathEl::CurveTo(..)))
    }

    /// Whether every segment, including the closing ones, is horizontal
    /// or vertical.
    pub fn is_rectilinear(&self) -> bool {
        let axis_aligned = |a: Point, b: Point| a.x == b.x || a.y == b.y;
        let mut start = Point::ORIGIN;
        let mut last = Point::ORIGIN;
        for el in &self.elements {
            match *el {
                PathEl::MoveTo(p) => {
                    start = p;
                    last = p;
                }
                PathEl::LineTo(p) => {
                    if !axis_aligned(last, p) {
                        return false;
                    }
                    last = p;
                }
                PathEl::CurveTo(..) => return false,
                PathEl::ClosePath => {
                    if !axis_aligned(last, start) {
                        return false;
                    }
                    last = start;
                }
            }
        }
        true
    }

    /// Feed every element to `sink`, in order.
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first error reported by the sink.
    pub fn interpret(&self, sink: &mut impl PathSink) -> Result<(), Error> {
        for el in &self.elements {
            match *el {
                PathEl::MoveTo(p) => sink.move_to(p)?,
                PathEl::LineTo(p) => sink.line_to(p)?,
                PathEl::CurveTo(b, c, d) => sink.curve_to(b, c, d)?,
                PathEl::ClosePath => sink.close_path()?,
            }
        }
        Ok(())
    }
}

impl PathSink for PathFixed {
    fn move_to(&mut self, p: Point) -> Result<(), Error> {
        PathFixed::move_to(self, p);
        Ok(())
    }

    fn line_to(&mut self, p: Point) -> Result<(), Error> {
        PathFixed::line_to(self, p);
        Ok(())
    }

    fn curve_to(&mut self, b: Point, c: Point, d: Point) -> Result<(), Error> {
        PathFixed::curve_to(self, b, c, d);
        Ok(())
    }

    fn close_path(&mut self) -> Result<(), Error> {
        PathFixed::close_path(self);
        Ok(())
    }
}

impl FromIterator<PathEl> for PathFixed {
    fn from_iter<T: IntoIterator<Item = PathEl>>(iter: T) -> Self {
        let mut path = PathFixed::new();
        for el in iter {
            match el {
                PathEl::MoveTo(p) => path.move_to(p),
                PathEl::LineTo(p) => path.line_to(p),
                PathEl::CurveTo(b, c, d) => path.curve_to(b, c, d),
                PathEl::ClosePath => path.close_path(),
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: i32, y: i32) -> Point {
        Point::from_ints(x, y)
    }

    #[test]
    fn builder_normalizes() {
        let mut path = PathFixed::new();
        path.line_to(pt(1, 1));
        path.move_to(pt(2, 2));
        path.line_to(pt(3, 2));
        path.close_path();
        path.close_path();
        path.line_to(pt(4, 4));
        assert_eq!(
            path.elements(),
            [
                PathEl::MoveTo(pt(2, 2)),
                PathEl::LineTo(pt(3, 2)),
                PathEl::ClosePath,
                PathEl::MoveTo(pt(2, 2)),
                PathEl::LineTo(pt(4, 4)),
            ]
        );
        assert_eq!(path.current_point(), Some(pt(4, 4)));
    }

    #[test]
    fn curve_without_current_point() {
        let mut path = PathFixed::new();
        path.curve_to(pt(1, 0), pt(2, 1), pt(3, 3));
        assert_eq!(path.elements()[0], PathEl::MoveTo(pt(1, 0)));
        assert!(path.has_curve_to());
        assert!(!path.is_rectilinear());
        assert!(!path.is_empty());
    }

    #[test]
    fn rectilinear_includes_closing_segment() {
        let mut path = PathFixed::new();
        path.move_to(pt(0, 0));
        path.line_to(pt(5, 0));
        path.line_to(pt(5, 5));
        assert!(path.is_rectilinear());
        path.close_path();
        assert!(!path.is_rectilinear());
        assert!(!path.has_curve_to());

        let mut empty = PathFixed::new();
        empty.move_to(pt(1, 1));
        assert!(empty.is_empty());
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<PathEl>,
        fail_after: Option<usize>,
    }

    impl Recorder {
        fn record(&mut self, el: PathEl) -> Result<(), Error> {
            if self.fail_after == Some(self.events.len()) {
                return Err(Error::NoMemory);
            }
            self.events.push(el);
            Ok(())
        }
    }

    impl PathSink for Recorder {
        fn move_to(&mut self, p: Point) -> Result<(), Error> {
            self.record(PathEl::MoveTo(p))
        }
        fn line_to(&mut self, p: Point) -> Result<(), Error> {
            self.record(PathEl::LineTo(p))
        }
        fn curve_to(&mut self, b: Point, c: Point, d: Point) -> Result<(), Error> {
            self.record(PathEl::CurveTo(b, c, d))
        }
        fn close_path(&mut self) -> Result<(), Error> {
            self.record(PathEl::ClosePath)
        }
    }

    #[test]
    fn interpret_stops_on_error() {
        let path: PathFixed = [
            PathEl::MoveTo(pt(0, 0)),
            PathEl::LineTo(pt(1, 0)),
            PathEl::CurveTo(pt(1, 1), pt(2, 2), pt(3, 3)),
            PathEl::ClosePath,
        ]
        .into_iter()
        .collect();

        let mut all = Recorder::default();
        path.interpret(&mut all).unwrap();
        assert_eq!(all.events, path.elements());

        let mut partial = Recorder {
            fail_after: Some(2),
            ..Default::default()
        };
        assert_eq!(path.interpret(&mut partial), Err(Error::NoMemory));
        assert_eq!(partial.events.len(), 2);

        let mut copy = PathFixed::new();
        path.interpret(&mut copy).unwrap();
        assert_eq!(copy.elements(), path.elements());
    }
}
