// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge lists for scanline rasterization.

use smallvec::SmallVec;

use crate::fixed::{self, Fixed};
use crate::{Contour, Error, Line, Point, Rect, Slope};

/// A directed edge of a [`Polygon`].
///
/// The edge covers the part of `line` between the scanlines `top`
/// (inclusive) and `bottom` (exclusive). `line.p1.y < line.p2.y` always
/// holds, so `winding` records the original direction: `1` if the edge
/// was traced downward, `-1` if upward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// The line the edge lies on.
    pub line: Line,
    /// The first scanline covered by the edge.
    pub top: Fixed,
    /// The scanline just past the edge.
    pub bottom: Fixed,
    /// The signed winding contribution.
    pub winding: i32,
}

impl Edge {
    /// The x coordinate of the edge on scanline `y`.
    #[inline]
    pub fn x_for_y(&self, y: Fixed) -> Fixed {
        self.line.x_for_y(y)
    }
}

/// An unordered collection of directed edges.
///
/// A polygon is the interface between the stroker and a scan converter.
/// Edges are kept in insertion order; horizontal edges carry no winding
/// and are never stored.
///
/// Optional limit boxes clip every added edge. Edges, or parts of edges,
/// to the side of a box are replaced by vertical edges along the box
/// boundary with the same winding, so the winding number inside the boxes
/// is unaffected by clipping and is zero everywhere outside them.
///
/// Allocation failure is sticky: after the first failure every further
/// mutation is ignored and [`status`](Polygon::status) reports the error.
#[derive(Clone, Debug)]
pub struct Polygon {
    status: Result<(), Error>,
    extents: Rect,
    limit: Option<Rect>,
    limits: SmallVec<[Rect; 4]>,
    edges: SmallVec<[Edge; 32]>,
}

impl Default for Polygon {
    fn default() -> Self {
        Self::new()
    }
}

impl Polygon {
    /// Create an empty polygon without limits.
    pub fn new() -> Polygon {
        Polygon {
            status: Ok(()),
            extents: Rect::new(
                Point::new(Fixed::MAX, Fixed::MAX),
                Point::new(Fixed::MIN, Fixed::MIN),
            ),
            limit: None,
            limits: SmallVec::new(),
            edges: SmallVec::new(),
        }
    }

    /// Create an empty polygon that clips edges to the union of `boxes`.
    pub fn with_limits(boxes: &[Rect]) -> Polygon {
        let mut polygon = Polygon::new();
        polygon.set_limits(boxes);
        polygon
    }

    /// Create a polygon from the outlines of axis aligned boxes.
    ///
    /// Each box contributes its left side, winding down, and its right
    /// side, winding up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMemory`] if the edges could not be stored.
    pub fn from_boxes(boxes: &[Rect]) -> Result<Polygon, Error> {
        let mut polygon = Polygon::new();
        if boxes.len() > polygon.edges.inline_size() / 2 {
            polygon.edges.try_reserve_exact(2 * boxes.len())?;
        }
        for b in boxes {
            polygon.add_edge(b.p1, Point::new(b.p1.x, b.p2.y), 1);
            polygon.add_edge(b.p2, Point::new(b.p2.x, b.p1.y), 1);
        }
        polygon.status.map(|()| polygon)
    }

    /// Restrict further edges to the union of `boxes`.
    ///
    /// An empty slice removes the limits. Edges already added are not
    /// affected.
    pub fn set_limits(&mut self, boxes: &[Rect]) {
        self.limits = SmallVec::from_slice(boxes);
        self.limit = Rect::union_all(boxes);
    }

    /// The limit boxes.
    #[inline]
    pub fn limits(&self) -> &[Rect] {
        &self.limits
    }

    /// The union of the limit boxes, if there are any.
    #[inline]
    pub fn limit(&self) -> Option<Rect> {
        self.limit
    }

    /// The edges, in insertion order.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The number of edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether no edges were stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The bounding box of all edges.
    ///
    /// The x extents are measured where each edge crosses its own `top` and
    /// `bottom`, not at the endpoints of its line. For an empty polygon the
    /// box is inverted, with `p1` at the maximum and `p2` at the minimum.
    #[inline]
    pub fn extents(&self) -> Rect {
        self.extents
    }

    /// Whether every edge so far could be stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMemory`] once any allocation has failed.
    #[inline]
    pub fn status(&self) -> Result<(), Error> {
        self.status
    }

    fn grow(&mut self) -> bool {
        let additional = 3 * self.edges.capacity();
        match self.edges.try_reserve_exact(additional) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("polygon edge storage exhausted at {} edges", self.edges.len());
                self.status = Err(e.into());
                false
            }
        }
    }

    fn push_edge(&mut self, p1: Point, p2: Point, top: Fixed, bottom: Fixed, winding: i32) {
        debug_assert!(top < bottom, "edge must span at least one scanline");

        if self.edges.len() == self.edges.capacity() && !self.grow() {
            return;
        }
        self.edges.push(Edge {
            line: Line::new(p1, p2),
            top,
            bottom,
            winding,
        });

        let ext = &mut self.extents;
        ext.p1.y = ext.p1.y.min(top);
        ext.p2.y = ext.p2.y.max(bottom);

        let line = Line::new(p1, p2);
        if p1.x < ext.p1.x || p1.x > ext.p2.x {
            let x = if top != p1.y { line.x_for_y(top) } else { p1.x };
            ext.p1.x = ext.p1.x.min(x);
            ext.p2.x = ext.p2.x.max(x);
        }
        if p2.x < ext.p1.x || p2.x > ext.p2.x {
            let x = if bottom != p2.y {
                line.x_for_y(bottom)
            } else {
                p2.x
            };
            ext.p1.x = ext.p1.x.min(x);
            ext.p2.x = ext.p2.x.max(x);
        }
    }

    /// Add the part of `p1 -> p2` between `top` and `bottom`, clipped to
    /// each limit box in turn.
    fn add_clipped_edge(&mut self, p1: Point, p2: Point, top: Fixed, bottom: Fixed, winding: i32) {
        let line = Line::new(p1, p2);
        for n in 0..self.limits.len() {
            let limits = self.limits[n];
            if top >= limits.p2.y || bottom <= limits.p1.y {
                continue;
            }

            let bot_left = Point::new(limits.p1.x, limits.p2.y);
            let top_right = Point::new(limits.p2.x, limits.p1.y);

            let mut top_y = top.max(limits.p1.y);
            let mut bot_y = bottom.min(limits.p2.y);

            let pleft = p1.x.min(p2.x);
            let pright = p1.x.max(p2.x);

            if limits.p1.x <= pleft && pright <= limits.p2.x {
                // Entirely within the horizontal range of the box.
                self.push_edge(p1, p2, top_y, bot_y, winding);
            } else if pright <= limits.p1.x {
                // Left of the box: follow its left side.
                self.push_edge(limits.p1, bot_left, top_y, bot_y, winding);
            } else if limits.p2.x <= pleft {
                // Right of the box: follow its right side.
                self.push_edge(top_right, limits.p2, top_y, bot_y, winding);
            } else {
                // The edge crosses one or both vertical sides. The parts
                // outside the box become vertical side edges and the rest
                // of the edge is narrowed to lie inside.
                let top_left_to_bottom_right = (p1.x <= p2.x) == (p1.y <= p2.y);
                if top_left_to_bottom_right {
                    let mut left_y = if pleft >= limits.p1.x {
                        top_y
                    } else {
                        let y = line.y_for_x(limits.p1.x);
                        if line.x_for_y(y) < limits.p1.x {
                            y + 1
                        } else {
                            y
                        }
                    };
                    left_y = left_y.min(bot_y);
                    if top_y < left_y {
                        self.push_edge(limits.p1, bot_left, top_y, left_y, winding);
                        top_y = left_y;
                    }

                    let mut right_y = if pright <= limits.p2.x {
                        bot_y
                    } else {
                        let y = line.y_for_x(limits.p2.x);
                        if line.x_for_y(y) > limits.p2.x {
                            y - 1
                        } else {
                            y
                        }
                    };
                    right_y = right_y.max(top_y);
                    if bot_y > right_y {
                        self.push_edge(top_right, limits.p2, right_y, bot_y, winding);
                        bot_y = right_y;
                    }
                } else {
                    let mut right_y = if pright <= limits.p2.x {
                        top_y
                    } else {
                        let y = line.y_for_x(limits.p2.x);
                        if line.x_for_y(y) > limits.p2.x {
                            y + 1
                        } else {
                            y
                        }
                    };
                    right_y = right_y.min(bot_y);
                    if top_y < right_y {
                        self.push_edge(top_right, limits.p2, top_y, right_y, winding);
                        top_y = right_y;
                    }

                    let mut left_y = if pleft >= limits.p1.x {
                        bot_y
                    } else {
                        let y = line.y_for_x(limits.p1.x);
                        if line.x_for_y(y) < limits.p1.x {
                            y - 1
                        } else {
                            y
                        }
                    };
                    left_y = left_y.max(top_y);
                    if bot_y > left_y {
                        self.push_edge(limits.p1, bot_left, left_y, bot_y, winding);
                        bot_y = left_y;
                    }
                }

                if top_y != bot_y {
                    self.push_edge(p1, p2, top_y, bot_y, winding);
                }
            }
        }
    }

    /// Add a directed edge from `p1` to `p2`.
    ///
    /// Horizontal edges are dropped. The edge is stored top to bottom, with
    /// `winding` negated if that reverses it.
    pub fn add_edge(&mut self, p1: Point, p2: Point, winding: i32) {
        if self.status.is_err() || p1.y == p2.y {
            return;
        }
        let (p1, p2, winding) = if p1.y > p2.y {
            (p2, p1, -winding)
        } else {
            (p1, p2, winding)
        };
        match self.limit {
            Some(limit) => {
                if p2.y <= limit.p1.y || p1.y >= limit.p2.y {
                    return;
                }
                self.add_clipped_edge(p1, p2, p1.y, p2.y, winding);
            }
            None => self.push_edge(p1, p2, p1.y, p2.y, winding),
        }
    }

    /// Add the part of `line` between the scanlines `top` and `bottom`.
    ///
    /// `line` must already run top to bottom. Horizontal lines and empty
    /// ranges are ignored.
    ///
    /// # Errors
    ///
    /// Returns the sticky status, see [`status`](Polygon::status).
    pub fn add_line(
        &mut self,
        line: &Line,
        top: Fixed,
        bottom: Fixed,
        winding: i32,
    ) -> Result<(), Error> {
        if self.status.is_err() || line.is_horizontal() || bottom <= top {
            return self.status;
        }
        match self.limit {
            Some(limit) => {
                if line.p2.y <= limit.p1.y || line.p1.y >= limit.p2.y {
                    return self.status;
                }
                self.add_clipped_edge(line.p1, line.p2, top, bottom, winding);
            }
            None => self.push_edge(line.p1, line.p2, top, bottom, winding),
        }
        self.status
    }

    /// Add an edge for each pair of consecutive points of `contour`, with
    /// the contour's direction as winding.
    ///
    /// The contour is not implicitly closed.
    ///
    /// # Errors
    ///
    /// Returns the sticky status, see [`status`](Polygon::status).
    pub fn add_contour(&mut self, contour: &Contour) -> Result<(), Error> {
        let mut points = contour.iter();
        let Some(mut prev) = points.next().copied() else {
            return self.status;
        };
        for &p in points {
            self.add_edge(prev, p, contour.direction());
            prev = p;
        }
        self.status
    }

    /// Shift every edge by whole device units.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        let dx = fixed::from_int(dx);
        let dy = fixed::from_int(dy);

        self.extents.p1.x += dx;
        self.extents.p2.x += dx;
        self.extents.p1.y += dy;
        self.extents.p2.y += dy;

        let delta = Slope::new(dx, dy);
        for e in &mut self.edges {
            e.top += dy;
            e.bottom += dy;
            e.line = e.line.translate(delta);
        }
    }

    /// The winding number at `point`.
    ///
    /// This sums the windings of the edges that cover the scanline of
    /// `point` and cross it strictly to the left of `point`.
    pub fn winding_at(&self, point: Point) -> i32 {
        self.edges
            .iter()
            .filter(|e| e.top <= point.y && point.y < e.bottom)
            .filter(|e| e.x_for_y(point.y) < point.x)
            .map(|e| e.winding)
            .sum()
    }
}
