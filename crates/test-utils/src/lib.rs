//! Shared test utilities for the mapserver-render workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Test data path helpers
//! - Skip macros for optional test data
//! - Synthetic feature generators
//! - The reference rendering fixtures
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{require_test_file, fixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro to skip a test if the required file is not found.
///
/// Useful for tests that depend on system resources such as installed
/// TrueType fonts that may be missing on minimal CI images.
///
/// # Usage
///
/// ```ignore
/// use test_utils::require_test_file;
///
/// #[test]
/// fn test_fixture() {
///     let path = require_test_file!("multipolygonz-duplicate.geojson");
///     // Test code using path...
/// }
/// ```
///
/// If the file is not found, the test will print a skip message and return early.
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Set TEST_DATA_DIR to its directory.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Relative floating-point equality. The tolerance scales with the larger
/// magnitude of the two values, and is absolute below 1.0.
///
/// ```ignore
/// use test_utils::assert_relative_eq;
///
/// assert_relative_eq!(20037508.3427, 20037508.3428, 1e-6); // passes
/// ```
#[macro_export]
macro_rules! assert_relative_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let scale = left.abs().max(right.abs()).max(1.0);
        $crate::assert_approx_eq!(left, right, $tolerance as f64 * scale);
    }};
}

/// Macro for approximate equality of coordinate pairs.
///
/// ```ignore
/// use test_utils::assert_coords_approx_eq;
///
/// assert_coords_approx_eq!((1.0001, 2.0001), (1.0, 2.0), 0.001);
/// ```
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}

/// Assert the RGBA value of one pixel of anything exposing
/// `get_pixel(x, y) -> Option<[u8; 4]>`.
///
/// ```ignore
/// assert_pixel_eq!(image, 5, 5, [200, 0, 0, 255]);
/// ```
#[macro_export]
macro_rules! assert_pixel_eq {
    ($image:expr, $x:expr, $y:expr, $expected:expr) => {{
        let actual = $image.get_pixel($x, $y);
        let expected: [u8; 4] = $expected;
        if actual != Some(expected) {
            panic!(
                "pixel ({}, {}) mismatch\n  actual: `{:?}`,\nexpected: `{:?}`",
                $x, $y, actual, expected
            );
        }
    }};
}
