// Copyright 2025 the Strokepoly Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 24.8 signed fixed point numbers.
//!
//! All device space geometry in this crate is stored as [`Fixed`] values, so
//! that edge intersections and winding decisions are exact and reproducible
//! on every platform. Products are always widened to `i64` before they are
//! compared or divided.

/// A signed fixed point number with [`FRAC_BITS`] fractional bits.
pub type Fixed = i32;

/// Number of fractional bits in a [`Fixed`].
pub const FRAC_BITS: u32 = 8;

/// The value `1.0`.
pub const ONE: Fixed = 1 << FRAC_BITS;

/// The smallest representable positive value.
pub const EPSILON: Fixed = 1;

/// Adding this to a double moves the binary point of the mantissa so that
/// its low 32 bits hold the fixed point value, rounded half to even.
const MAGIC_NUMBER: f64 = ((1_i64 << (52 - FRAC_BITS)) as f64) * 1.5;

/// Convert an integer to fixed point.
#[inline]
pub const fn from_int(i: i32) -> Fixed {
    i << FRAC_BITS
}

/// Convert to floating point.
#[inline]
pub fn to_f64(f: Fixed) -> f64 {
    f64::from(f) / f64::from(ONE)
}

/// Convert from floating point, rounding to the nearest representable value
/// (ties to even).
///
/// Values outside the representable range wrap.
#[inline]
#[allow(
    clippy::cast_possible_truncation,
    reason = "the low word of the biased mantissa is the result"
)]
pub fn from_f64(d: f64) -> Fixed {
    (d + MAGIC_NUMBER).to_bits() as u32 as i32
}

/// The integer part, rounding toward negative infinity.
#[inline]
pub const fn floor_int(f: Fixed) -> i32 {
    f >> FRAC_BITS
}

/// Compute `a * b / c` with a 64 bit intermediate product, rounding the
/// quotient toward zero.
#[inline]
#[allow(
    clippy::cast_possible_truncation,
    reason = "the quotient of collinear coordinates fits in 32 bits"
)]
pub fn mul_div(a: Fixed, b: Fixed, c: Fixed) -> Fixed {
    (i64::from(a) * i64::from(b) / i64::from(c)) as i32
}
