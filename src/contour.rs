// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Growable point sequences for the rails of a stroke.

use alloc::vec::Vec;
use core::fmt;

use arrayvec::ArrayVec;

use crate::fixed;
use crate::{Error, Point};

/// Number of points a contour holds before it touches the heap.
const INLINE_POINTS: usize = 64;

/// An ordered sequence of points, traced in a given direction.
///
/// The stroker accumulates each side of a stroke into a contour and hands
/// the finished contour to a [`Polygon`](crate::Polygon), which turns
/// consecutive points into edges whose winding is the contour's
/// direction.
///
/// The first points live inline. Once those are used up, storage grows
/// in chunks, each twice the capacity of the one before, so appending
/// never moves points that are already stored.
#[derive(Clone)]
pub struct Contour {
    direction: i32,
    head: ArrayVec<Point, INLINE_POINTS>,
    /// Every chunk except the last one is full.
    chunks: Vec<Vec<Point>>,
}

/// Per point state while simplifying.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Vertex {
    Kept,
    Deleted,
}

impl Contour {
    /// Create an empty contour.
    ///
    /// `direction` is the winding contributed by each edge of the contour,
    /// normally `1` or `-1`.
    pub fn new(direction: i32) -> Contour {
        Contour {
            direction,
            head: ArrayVec::new(),
            chunks: Vec::new(),
        }
    }

    /// The winding direction of the contour.
    #[inline]
    pub fn direction(&self) -> i32 {
        self.direction
    }

    /// The number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.head.len() + self.chunks.iter().map(Vec::len).sum::<usize>()
    }

    /// Whether the contour holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_empty()
    }

    /// The number of points that fit without allocating.
    pub fn capacity(&self) -> usize {
        INLINE_POINTS + self.chunks.iter().map(Vec::capacity).sum::<usize>()
    }

    /// Iterate over the points in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Point> + '_ {
        self.head.iter().chain(self.chunks.iter().flatten())
    }

    fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Point> + '_ {
        self.head.iter_mut().chain(self.chunks.iter_mut().flatten())
    }

    /// The first point, if any.
    #[inline]
    pub fn first(&self) -> Option<&Point> {
        self.head.first()
    }

    /// The first point, if any, for in place adjustment.
    #[inline]
    pub fn first_mut(&mut self) -> Option<&mut Point> {
        self.head.first_mut()
    }

    /// The most recently added point, if any.
    #[inline]
    pub fn last(&self) -> Option<&Point> {
        match self.chunks.last() {
            Some(tail) => tail.last(),
            None => self.head.last(),
        }
    }

    /// The most recently added point, if any, for in place adjustment.
    #[inline]
    pub fn last_mut(&mut self) -> Option<&mut Point> {
        match self.chunks.last_mut() {
            Some(tail) => tail.last_mut(),
            None => self.head.last_mut(),
        }
    }

    /// Append a point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMemory`] if a new chunk could not be allocated.
    /// The contour is left unchanged in that case.
    pub fn add_point(&mut self, point: Point) -> Result<(), Error> {
        let tail_capacity = match self.chunks.last_mut() {
            None => match self.head.try_push(point) {
                Ok(()) => return Ok(()),
                Err(_) => INLINE_POINTS,
            },
            Some(tail) if tail.len() < tail.capacity() => {
                tail.push(point);
                return Ok(());
            }
            Some(tail) => tail.capacity(),
        };
        self.chunks.try_reserve(1)?;
        let mut chunk = Vec::new();
        chunk.try_reserve_exact(tail_capacity * 2)?;
        chunk.push(point);
        self.chunks.push(chunk);
        Ok(())
    }

    /// Remove the most recently added point.
    ///
    /// A heap chunk left empty by the removal is released.
    pub fn remove_last(&mut self) {
        match self.chunks.last_mut() {
            Some(tail) => {
                tail.pop();
                if tail.is_empty() {
                    self.chunks.pop();
                }
            }
            None => {
                self.head.pop();
            }
        }
    }

    /// Reverse the order of the points in place and flip the direction.
    pub fn reverse(&mut self) {
        self.direction = -self.direction;
        let mut points = self.iter_mut();
        while let (Some(a), Some(b)) = (points.next(), points.next_back()) {
            core::mem::swap(a, b);
        }
    }

    /// Append every point of `src`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMemory`] if storage could not grow; the points
    /// added up to that point are kept.
    pub fn add(&mut self, src: &Contour) -> Result<(), Error> {
        for point in src.iter() {
            self.add_point(*point)?;
        }
        Ok(())
    }

    /// Append every point of `src`, last to first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMemory`] if storage could not grow.
    pub fn add_reversed(&mut self, src: &Contour) -> Result<(), Error> {
        for point in src.iter().rev() {
            self.add_point(*point)?;
        }
        Ok(())
    }

    /// Remove all points and release heap chunks. The direction is kept.
    pub fn reset(&mut self) {
        self.head.clear();
        self.chunks = Vec::new();
    }

    /// Shorten the contour to `len` points, releasing chunks that empty out.
    fn truncate(&mut self, len: usize) {
        if len <= self.head.len() {
            self.head.truncate(len);
            self.chunks = Vec::new();
            return;
        }
        let mut remaining = len - self.head.len();
        let mut keep = 0;
        for chunk in &mut self.chunks {
            if remaining == 0 {
                break;
            }
            chunk.truncate(remaining);
            remaining -= chunk.len();
            keep += 1;
        }
        self.chunks.truncate(keep);
    }

    /// Remove points that do not contribute to the shape of the contour.
    ///
    /// `tolerance` is a distance in device units. Points closer than that
    /// to the previously kept point are dropped first; the remaining points
    /// are then thinned with Douglas-Peucker, repeatedly, until a pass
    /// removes nothing. The first and last points are always kept, and the
    /// point count never grows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMemory`] if the working state could not be
    /// allocated; the contour is unchanged in that case.
    pub fn simplify(&mut self, tolerance: f64) -> Result<(), Error> {
        let n = self.len();
        if n <= 2 {
            return Ok(());
        }

        let tolerance = tolerance * f64::from(fixed::ONE);
        let tolerance = tolerance * tolerance;

        let mut points = Vec::new();
        points.try_reserve_exact(n)?;
        points.extend(self.iter().copied());
        let mut state = Vec::new();
        state.try_reserve_exact(n)?;

        // Vertex reduction.
        let mut last = points[0];
        state.push(Vertex::Kept);
        for (i, &p) in points.iter().enumerate().skip(1) {
            if i == n - 1 || last.distance_squared(p) as f64 > tolerance {
                last = p;
                state.push(Vertex::Kept);
            } else {
                state.push(Vertex::Deleted);
            }
        }

        // Douglas-Peucker, anchored on the point furthest from the start.
        let mut pending = Vec::new();
        loop {
            let first = points[0];
            let mut furthest = 0;
            let mut max = 0;
            for (i, p) in points.iter().enumerate() {
                if state[i] == Vertex::Deleted {
                    continue;
                }
                let d = first.distance_squared(*p);
                if d > max {
                    furthest = i;
                    max = d;
                }
            }
            if max == 0 {
                break;
            }

            pending.push((0, furthest));
            if furthest != n - 1 {
                pending.push((furthest, n - 1));
            }
            let mut simplified = false;
            while let Some((a, b)) = pending.pop() {
                match simplify_chain(&points, &mut state, tolerance, a, b) {
                    Chain::Split(mid) => {
                        pending.push((a, mid));
                        pending.push((mid, b));
                    }
                    Chain::Simplified => simplified = true,
                    Chain::Unchanged => {}
                }
            }
            if !simplified {
                break;
            }
        }

        let mut kept = points
            .iter()
            .zip(&state)
            .filter(|(_, s)| **s == Vertex::Kept)
            .map(|(p, _)| *p);
        let mut len = 0;
        for (slot, p) in self.iter_mut().zip(&mut kept) {
            *slot = p;
            len += 1;
        }
        self.truncate(len);
        Ok(())
    }
}

/// Result of examining one chain between two anchors.
enum Chain {
    /// The chain must be split at this index.
    Split(usize),
    /// Every interior point was deleted.
    Simplified,
    /// Nothing left to do.
    Unchanged,
}

/// Delete the interior points of `first..last` if they all lie within
/// tolerance of the chord, or report where to split.
fn simplify_chain(
    points: &[Point],
    state: &mut [Vertex],
    tolerance: f64,
    first: usize,
    last: usize,
) -> Chain {
    if first + 1 >= last {
        return Chain::Unchanged;
    }
    let x0 = i128::from(points[first].x);
    let y0 = i128::from(points[first].y);
    let nx = i128::from(points[last].y) - y0;
    let ny = x0 - i128::from(points[last].x);

    let mut count = 0;
    let mut max_error = 0_u128;
    let mut furthest = None;
    for (i, (p, s)) in points
        .iter()
        .zip(state.iter())
        .enumerate()
        .take(last)
        .skip(first + 1)
    {
        if *s == Vertex::Deleted {
            continue;
        }
        let d = nx * (x0 - i128::from(p.x)) + ny * (y0 - i128::from(p.y));
        let err = d.unsigned_abs().saturating_mul(d.unsigned_abs());
        if err > max_error {
            max_error = err;
            furthest = Some(i);
        }
        count += 1;
    }
    if count == 0 {
        return Chain::Unchanged;
    }

    let norm = (nx * nx + ny * ny) as f64;
    match furthest {
        Some(mid) if max_error as f64 > tolerance * norm => Chain::Split(mid),
        _ => {
            for s in &mut state[first + 1..last] {
                *s = Vertex::Deleted;
            }
            Chain::Simplified
        }
    }
}

impl fmt::Debug for Contour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Points<'a>(&'a Contour);
        impl fmt::Debug for Points<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_list()
                    .entries(self.0.iter().map(|p| p.to_f64()))
                    .finish()
            }
        }
        f.debug_struct("Contour")
            .field("direction", &self.direction)
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("points", &Points(self))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contour_from(direction: i32, points: &[(i32, i32)]) -> Contour {
        let mut c = Contour::new(direction);
        for &(x, y) in points {
            c.add_point(Point::from_ints(x, y)).unwrap();
        }
        c
    }

    fn points_of(c: &Contour) -> Vec<Point> {
        c.iter().copied().collect()
    }

    #[test]
    fn grows_in_doubling_chunks() {
        let mut c = Contour::new(1);
        for i in 0..900 {
            c.add_point(Point::new(i, -i)).unwrap();
        }
        assert_eq!(c.len(), 900);
        // 64 inline, then 128, 256, 512.
        assert_eq!(c.capacity(), 64 + 128 + 256 + 512);
        assert_eq!(c.first(), Some(&Point::new(0, 0)));
        assert_eq!(c.last(), Some(&Point::new(899, -899)));
        assert!(c.iter().enumerate().all(|(i, p)| p.x == i as i32));
    }

    #[test]
    fn remove_last_releases_chunks() {
        let mut c = Contour::new(1);
        for i in 0..65 {
            c.add_point(Point::new(i, 0)).unwrap();
        }
        assert_eq!(c.capacity(), 64 + 128);
        c.remove_last();
        assert_eq!(c.capacity(), 64);
        assert_eq!(c.last(), Some(&Point::new(63, 0)));
        for _ in 0..64 {
            c.remove_last();
        }
        assert!(c.is_empty());
        assert_eq!(c.last(), None);
        c.remove_last();
        assert!(c.is_empty());
    }

    #[test]
    fn reverse_twice_restores() {
        for n in [0, 1, 2, 3, 64, 65, 200] {
            let mut c = Contour::new(-1);
            for i in 0..n {
                c.add_point(Point::new(i * 3, i * i)).unwrap();
            }
            let before = points_of(&c);
            c.reverse();
            assert_eq!(c.direction(), 1);
            let mut reversed = before.clone();
            reversed.reverse();
            assert_eq!(points_of(&c), reversed);
            c.reverse();
            assert_eq!(c.direction(), -1);
            assert_eq!(points_of(&c), before);
        }
    }

    #[test]
    fn add_and_add_reversed() {
        let a = contour_from(1, &[(0, 0), (1, 0), (1, 1)]);
        let mut b = contour_from(-1, &[(5, 5)]);
        b.add(&a).unwrap();
        b.add_reversed(&a).unwrap();
        let expected: Vec<Point> = [(5, 5), (0, 0), (1, 0), (1, 1), (1, 1), (1, 0), (0, 0)]
            .iter()
            .map(|&(x, y)| Point::from_ints(x, y))
            .collect();
        assert_eq!(points_of(&b), expected);
        assert_eq!(b.direction(), -1);
    }

    #[test]
    fn reset_keeps_direction() {
        let mut c = contour_from(-1, &[(0, 0); 100]);
        c.reset();
        assert!(c.is_empty());
        assert_eq!(c.capacity(), 64);
        assert_eq!(c.direction(), -1);
    }

    #[test]
    fn end_adjustment() {
        let mut c = contour_from(1, &[(0, 0), (1, 1), (2, 2)]);
        *c.first_mut().unwrap() = Point::new(7, 7);
        *c.last_mut().unwrap() = Point::new(9, 9);
        assert_eq!(c.first(), Some(&Point::new(7, 7)));
        assert_eq!(c.last(), Some(&Point::new(9, 9)));
    }

    #[test]
    fn simplify_collinear() {
        let pts: Vec<(i32, i32)> = (0..=10).map(|i| (i, 0)).collect();
        let mut c = contour_from(1, &pts);
        c.simplify(0.1).unwrap();
        assert_eq!(
            points_of(&c),
            [Point::from_ints(0, 0), Point::from_ints(10, 0)]
        );
    }

    #[test]
    fn simplify_keeps_corners() {
        let mut c = contour_from(
            1,
            &[(0, 0), (5, 0), (10, 0), (10, 5), (10, 10), (5, 10), (0, 10)],
        );
        c.simplify(0.5).unwrap();
        assert_eq!(
            points_of(&c),
            [
                Point::from_ints(0, 0),
                Point::from_ints(10, 0),
                Point::from_ints(10, 10),
                Point::from_ints(0, 10),
            ]
        );
    }

    #[test]
    fn simplify_drops_close_points() {
        let mut c = Contour::new(1);
        for p in [(0, 0), (10, 0), (20, 200), (512, 512), (2560, 0)] {
            c.add_point(Point::from(p)).unwrap();
        }
        c.simplify(1.0).unwrap();
        // (10, 0) and (20, 200) are within one device unit of the start.
        assert_eq!(
            points_of(&c),
            [Point::new(0, 0), Point::new(512, 512), Point::new(2560, 0)]
        );
    }

    #[test]
    fn simplify_closed_loop_keeps_ends() {
        let mut c = contour_from(1, &[(0, 0), (4, 0), (4, 4), (0, 4), (0, 0)]);
        c.simplify(0.25).unwrap();
        assert_eq!(c.len(), 5);
        assert_eq!(c.first(), c.last());
    }

    #[test]
    fn simplify_is_monotonic_in_tolerance() {
        // A wobbly spiral across several chunks.
        let mut base = Contour::new(1);
        for i in 0..500_i32 {
            let t = f64::from(i) * 0.05;
            let r = 50.0 + f64::from(i) * 0.2 + if i % 3 == 0 { 0.7 } else { 0.0 };
            let p = Point::from_f64(r * t.cos(), r * t.sin());
            base.add_point(p).unwrap();
        }
        let mut previous = usize::MAX;
        for tolerance in [0.01, 0.1, 0.5, 1.0, 4.0, 16.0] {
            let mut c = base.clone();
            c.simplify(tolerance).unwrap();
            assert!(c.len() <= previous, "tolerance {tolerance}");
            assert!(c.len() >= 2);
            assert_eq!(c.first(), base.first());
            assert_eq!(c.last(), base.last());
            previous = c.len();
        }
        assert!(previous < base.len());
    }

    #[test]
    fn simplify_compacts_chunks() {
        let pts: Vec<(i32, i32)> = (0..300).map(|i| (i, 0)).collect();
        let mut c = contour_from(1, &pts);
        assert!(c.capacity() > 64);
        c.simplify(0.5).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.capacity(), 64);
        assert_eq!(c.last(), Some(&Point::from_ints(299, 0)));
    }

    #[test]
    fn debug_dump() {
        let c = contour_from(-1, &[(1, 2)]);
        let s = format!("{c:?}");
        assert!(s.contains("direction: -1"), "{s}");
        assert!(s.contains("(1.0, 2.0)"), "{s}");
    }
}
