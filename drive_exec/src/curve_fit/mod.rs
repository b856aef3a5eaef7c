//! # Curve fitting module
//!
//! Provides the smooth parametric curves used to represent the lane
//! boundaries. A curve is a clamped B-spline `C(u)` with 2D control points,
//! defined for a parameter `u` in `[0, 1]`, where `u = 0` is the first point
//! of the fitted sequence and `u = 1` the last.
//!
//! Fitting is a smoothing fit: the fewest knots are used such that the sum of
//! squared distances between the data points and the curve does not exceed
//! the smoothing factor. A smoothing factor of zero therefore interpolates the
//! points.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod bspline;
mod fit;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use bspline::*;
pub use fit::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Degree of the fitted curves (cubic).
pub const DEFAULT_DEGREE: usize = 3;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while fitting a curve.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CurveFitError {
    #[error("A degree {degree} curve needs more than {degree} points, found {num_points}")]
    TooFewPoints {
        degree: usize,
        num_points: usize
    },

    #[error("The curve degree must be at least 1")]
    InvalidDegree,

    #[error("The smoothing factor must be finite and non-negative, found {0}")]
    InvalidSmoothing(f64),

    #[error("The least squares system could not be solved: {0}")]
    SingularSystem(&'static str),
}
