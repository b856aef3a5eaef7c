//! Direction and curvature helpers for waypoint paths.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Added to vector norms during normalisation so that zero length segments
/// give a zero direction rather than NaN.
pub const NORM_EPSILON: f64 = 1e-10;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Normalise a vector, guarding against zero length.
pub fn normalize(v: &Vector2<f64>) -> Vector2<f64> {
    v / (v.norm() + NORM_EPSILON)
}

/// Unit direction of each segment of the path.
pub fn segment_directions(points: &[Vector2<f64>]) -> Vec<Vector2<f64>> {
    points
        .windows(2)
        .map(|w| normalize(&(w[1] - w[0])))
        .collect()
}

/// Sum of the cosines of the angles between consecutive segments.
///
/// A straight path of `n` points has an alignment of `n - 2`.
pub fn alignment(points: &[Vector2<f64>]) -> f64 {
    segment_directions(points)
        .windows(2)
        .map(|w| w[0].dot(&w[1]))
        .sum()
}

/// Sum of `1 - cos(theta)` over consecutive segments, zero for a straight
/// path and larger for sharper turns.
pub fn curvature_term(points: &[Vector2<f64>]) -> f64 {
    segment_directions(points)
        .windows(2)
        .map(|w| 1.0 - w[0].dot(&w[1]))
        .sum()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
