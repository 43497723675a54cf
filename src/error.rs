// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The error type shared by every fallible operation in this crate.

use alloc::collections::TryReserveError;

use smallvec::CollectionAllocErr;

/// Failure raised while building contours, polygons or strokes.
///
/// Numeric corner cases (near parallel miters, zero length segments) never
/// produce an error; they degrade to simpler geometry instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A buffer could not grow to hold more points or edges.
    #[error("out of memory while growing geometry storage")]
    NoMemory,
    /// The transformation matrix is singular or not finite.
    #[error("transformation matrix is not invertible")]
    InvalidMatrix,
    /// The dash pattern has a negative entry or no positive length at all.
    #[error("invalid dash pattern")]
    InvalidDash,
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Self::NoMemory
    }
}

impl From<CollectionAllocErr> for Error {
    fn from(_: CollectionAllocErr) -> Self {
        Self::NoMemory
    }
}
