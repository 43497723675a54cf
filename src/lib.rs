// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion of stroked paths into polygons, in fixed point.
//!
//! The strokepoly library takes a path of lines and cubic Bézier curves in
//! device space, together with a stroke style (width, joins, caps, miter
//! limit and dashes) and a user to device transform, and produces the
//! directed edges of a polygon covering the stroke. The edges are meant to
//! be filled with the non-zero winding rule by a scanline rasterizer.
//!
//! Coordinates are [`Fixed`] point numbers with 8 fractional bits. Points,
//! slopes, contours and polygon edges are exact; only face offsets, miter
//! points and pen vertices go through floating point before being rounded.
//!
//! # Examples
//!
//! Stroking an open corner and sampling the result:
//!
//! ```
//! use strokepoly::{
//!     stroke_to_polygon, Affine, Join, PathFixed, Point, Polygon, Stroke, StrokeOpts,
//! };
//!
//! let mut path = PathFixed::new();
//! path.move_to(Point::from_ints(0, 0));
//! path.line_to(Point::from_ints(10, 0));
//! path.line_to(Point::from_ints(10, 10));
//!
//! let style = Stroke::new(2.0).with_join(Join::Miter);
//! let mut polygon = Polygon::new();
//! let opts = StrokeOpts::default();
//! stroke_to_polygon(&path, &style, &Affine::IDENTITY, 0.1, &opts, &mut polygon)?;
//!
//! // Inside the mitered corner, and inside the turn.
//! assert_ne!(polygon.winding_at(Point::from_f64(10.8, -0.8)), 0);
//! assert_eq!(polygon.winding_at(Point::from_ints(5, 5)), 0);
//! # Ok::<(), strokepoly::Error>(())
//! ```
//!
//! Clipping to limit boxes while stroking:
//!
//! ```
//! use strokepoly::{
//!     stroke_to_polygon, Affine, PathFixed, Point, Polygon, Rect, Stroke, StrokeOpts,
//! };
//!
//! let mut path = PathFixed::new();
//! path.move_to(Point::from_ints(-100, 5));
//! path.line_to(Point::from_ints(100, 5));
//!
//! let mut polygon = Polygon::with_limits(&[Rect::from_ints(0, 0, 10, 10)]);
//! let style = Stroke::new(4.0);
//! let opts = StrokeOpts::default();
//! stroke_to_polygon(&path, &style, &Affine::IDENTITY, 0.1, &opts, &mut polygon)?;
//! assert_eq!(polygon.extents(), Rect::from_ints(0, 3, 10, 7));
//! # Ok::<(), strokepoly::Error>(())
//! ```
//!
//! # Features
//!
//! This crate either uses the standard library or the [`libm`] crate for
//! math functionality. The `std` feature is enabled by default, but can be
//! disabled, as long as the `libm` feature is enabled. This is useful for
//! `no_std` environments. The `alloc` crate is used regardless.
//!
//! The `serde` and `schemars` features derive serialization and JSON
//! schemas for the value types.
//!
//! # Logging
//!
//! Diagnostics go through the [`log`] facade: dropped strokes and
//! allocation failures at `debug`, degraded joins and contour dumps at
//! `trace`.
//!
//! [`libm`]: https://docs.rs/libm
//! [`log`]: https://docs.rs/log

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::doc_markdown, rustdoc::broken_intra_doc_links)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(unused_qualifications)]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    reason = "fixed point constants and geometry formulas"
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("strokepoly requires either the `std` or `libm` feature");

extern crate alloc;

mod affine;
mod common;
mod contour;
mod dash;
mod error;
pub mod fixed;
mod line;
mod path;
mod pen;
mod point;
mod polygon;
mod rect;
mod slope;
mod spline;
mod stroke;
mod stroker;
mod vec2;

pub use crate::affine::*;
pub use crate::contour::*;
pub use crate::dash::*;
pub use crate::error::*;
pub use crate::fixed::Fixed;
pub use crate::line::*;
pub use crate::path::*;
pub use crate::pen::*;
pub use crate::point::*;
pub use crate::polygon::*;
pub use crate::rect::*;
pub use crate::slope::*;
pub use crate::spline::*;
pub use crate::stroke::*;
pub use crate::stroker::*;
pub use crate::vec2::*;
