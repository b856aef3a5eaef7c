//! Parameters structure for PathPlan

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::{OptimiserParams, PathPlanError, WaypointType};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for path planning and speed prediction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Params {

    /// Number of waypoints in the path.
    pub num_waypoints: usize,

    /// How the path is derived from the centreline.
    pub way_type: WaypointType,

    /// Weight of the segment alignment reward when smoothing.
    pub smoothing_beta: f64,

    /// Parameters of the smoothing minimiser.
    pub optimiser: OptimiserParams,

    /// Number of waypoints, nearest first, used to predict the speed.
    pub num_waypoints_used: usize,

    /// Speed on a straight path.
    pub max_speed: f64,

    /// Speed approached on a very sharp path.
    pub min_speed: f64,

    /// Rate at which the speed decays with curvature.
    pub k_v: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            num_waypoints: 6,
            way_type: WaypointType::Smooth,
            smoothing_beta: 30.0,
            optimiser: OptimiserParams::default(),
            num_waypoints_used: 4,
            max_speed: 30.0,
            min_speed: 15.0,
            k_v: 2.5,
        }
    }
}

impl Params {
    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), PathPlanError> {
        if self.num_waypoints < 2 {
            return Err(PathPlanError::InvalidNumWaypoints(self.num_waypoints))
        }
        if !self.smoothing_beta.is_finite() {
            return Err(PathPlanError::InvalidParams(
                "smoothing_beta must be finite".into()
            ))
        }
        if !(self.max_speed.is_finite() && self.min_speed.is_finite() && self.k_v.is_finite()) {
            return Err(PathPlanError::InvalidParams(
                "speed prediction parameters must be finite".into()
            ))
        }

        Ok(())
    }
}
