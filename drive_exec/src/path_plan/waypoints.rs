//! Waypoint prediction from the lane boundary curves.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::{DVector, Vector2};
use serde::{Deserialize, Serialize};

// Internal
use super::{
    normalize, alignment, minimise,
    Objective, OptimiserParams, PathPlanError, NORM_EPSILON};
use crate::curve_fit::BoundaryCurve;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered path of waypoints in frame coordinates, nearest point first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WaypointPath {
    pub points: Vec<Vector2<f64>>,
}

/// Objective of the path smoothing problem.
///
/// The variables are the waypoint coordinates flattened as
/// `[x0, y0, x1, y1, ...]`. The objective is the sum of squared distances to
/// the centreline minus `beta` times the alignment of consecutive segments.
pub struct SmoothingObjective {
    center: DVector<f64>,
    beta: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the path is derived from the boundary centreline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointType {
    /// Use the centreline directly.
    Center,

    /// Smooth the centreline by optimisation.
    Smooth,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WaypointPath {
    pub fn new(points: Vec<Vector2<f64>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Flatten the path into `[x0, y0, x1, y1, ...]`.
    pub fn to_flat(&self) -> DVector<f64> {
        DVector::from_iterator(
            2 * self.points.len(),
            self.points.iter().flat_map(|p| p.iter().copied())
        )
    }

    /// Build a path from a flattened `[x0, y0, x1, y1, ...]` vector.
    pub fn from_flat(flat: &DVector<f64>) -> Self {
        Self {
            points: flat
                .as_slice()
                .chunks(2)
                .map(|c| Vector2::new(c[0], c[1]))
                .collect()
        }
    }
}

impl SmoothingObjective {
    pub fn new(center: &WaypointPath, beta: f64) -> Self {
        Self {
            center: center.to_flat(),
            beta
        }
    }
}

impl Objective for SmoothingObjective {
    fn value(&self, x: &DVector<f64>) -> f64 {
        let path = WaypointPath::from_flat(x);

        (x - &self.center).norm_squared() - self.beta * alignment(&path.points)
    }

    fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        let points = WaypointPath::from_flat(x).points;

        let mut grad = (x - &self.center) * 2.0;

        if points.len() < 3 {
            return grad
        }

        let deltas: Vec<Vector2<f64>> = points.windows(2).map(|w| w[1] - w[0]).collect();
        let dirs: Vec<Vector2<f64>> = deltas.iter().map(normalize).collect();

        for (i, d) in deltas.iter().enumerate() {
            // Derivative of the alignment with respect to this segment's
            // direction is the sum of its neighbours' directions.
            let mut dc_du = Vector2::zeros();
            if i > 0 {
                dc_du += dirs[i - 1];
            }
            if i + 1 < dirs.len() {
                dc_du += dirs[i + 1];
            }

            // Chain through the normalisation u = d / (|d| + eps)
            let n = d.norm();
            let denom = n + NORM_EPSILON;
            let mut dc_dd = dc_du / denom;
            if n > 0.0 {
                dc_dd -= d * (d.dot(&dc_du) / (n * denom * denom));
            }

            // The segment runs from point i to point i + 1
            for k in 0..2 {
                grad[2 * (i + 1) + k] -= self.beta * dc_dd[k];
                grad[2 * i + k] += self.beta * dc_dd[k];
            }
        }

        grad
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Predict the waypoint path from the pair of boundary curves.
///
/// Both curves are sampled at `num_waypoints` uniformly spaced parameters and
/// averaged to give the centreline, which is smoothed if `way_type` is
/// `Smooth`.
///
/// # Errors
/// - `NoCurveEstablished` if either curve is missing.
/// - `InvalidNumWaypoints` if fewer than 2 waypoints are requested.
pub fn predict(
    left: Option<&BoundaryCurve>,
    right: Option<&BoundaryCurve>,
    num_waypoints: usize,
    way_type: WaypointType,
    smoothing_beta: f64,
    optimiser: &OptimiserParams
) -> Result<WaypointPath, PathPlanError> {
    let (left, right) = match (left, right) {
        (Some(l), Some(r)) => (l, r),
        (l, r) => return Err(PathPlanError::NoCurveEstablished {
            left_missing: l.is_none(),
            right_missing: r.is_none()
        })
    };

    if num_waypoints < 2 {
        return Err(PathPlanError::InvalidNumWaypoints(num_waypoints))
    }

    let center = centerline(left, right, num_waypoints);

    match way_type {
        WaypointType::Center => Ok(center),
        WaypointType::Smooth => Ok(smooth(&center, smoothing_beta, optimiser))
    }
}

/// Average the samples of both curves at uniformly spaced parameters.
pub fn centerline(
    left: &BoundaryCurve,
    right: &BoundaryCurve,
    num_waypoints: usize
) -> WaypointPath {
    let points = left
        .sample(num_waypoints)
        .into_iter()
        .zip(right.sample(num_waypoints).into_iter())
        .map(|(l, r)| (l + r) / 2.0)
        .collect();

    WaypointPath::new(points)
}

/// Smooth a path by minimising the smoothing objective, starting from and
/// anchored to the given centreline.
pub fn smooth(
    center: &WaypointPath,
    beta: f64,
    optimiser: &OptimiserParams
) -> WaypointPath {
    let objective = SmoothingObjective::new(center, beta);
    let min = minimise(&objective, center.to_flat(), optimiser);

    if !min.converged {
        debug!(
            "Path smoothing did not converge in {} iterations, using best path found",
            min.num_iters
        );
    }

    WaypointPath::from_flat(&min.x)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
