// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons.
//!
//! Re-exports the `approx` assertion macros, which handle floating-point
//! precision issues that `assert_eq!` cannot.

pub use approx::{assert_abs_diff_eq, assert_relative_eq};

/// Epsilon for f64 comparisons of values that went through a few arithmetic steps.
pub const F64_EPSILON: f64 = 1e-9;
