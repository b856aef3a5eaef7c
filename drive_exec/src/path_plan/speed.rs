//! Target speed prediction from path curvature.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{curvature_term, WaypointPath};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Predict the target speed for the path.
///
/// Only the first `num_used` waypoints are considered. The speed decays
/// exponentially from `max_speed` on a straight path towards `min_speed` as
/// the curvature term grows, and is never negative.
pub fn predict_speed(
    path: &WaypointPath,
    num_used: usize,
    max_speed: f64,
    min_speed: f64,
    k_v: f64
) -> f64 {
    let used = &path.points[..num_used.min(path.len())];

    speed_from_curvature(curvature_term(used), max_speed, min_speed, k_v)
}

/// Map a curvature term to a speed.
pub fn speed_from_curvature(curvature: f64, max_speed: f64, min_speed: f64, k_v: f64) -> f64 {
    ((max_speed - min_speed) * (-k_v * curvature).exp() + min_speed).max(0.0)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
