//! Parameters structure for LaneDet

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::LaneDetError;
use crate::frame::{FRAME_HEIGHT, FRAME_WIDTH};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for lane detection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Params {

    /// Number of rows at the top of the frame, in front of the vehicle, which
    /// are used for detection. The remaining rows are discarded.
    ///
    /// Units: pixels
    pub cut_size: usize,

    /// Gradient magnitudes below this threshold are set to zero.
    pub gradient_threshold: f64,

    /// Minimum column separation between two peaks of the same row.
    ///
    /// Units: pixels
    pub min_peak_distance: usize,

    /// Smoothing factor of the boundary spline fits, the upper bound on the
    /// sum of squared distances between the chain and the curve.
    ///
    /// Units: pixels^2
    pub spline_smoothness: f64,

    /// Position of the vehicle as `[column, row]` in the cut band, with row 0
    /// nearest the vehicle.
    ///
    /// Units: pixels
    pub car_position: [usize; 2],

    /// A chain is not extended to a candidate this many columns or more away
    /// from its last point.
    ///
    /// Units: pixels
    pub max_chain_gap: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            cut_size: 68,
            gradient_threshold: 14.0,
            min_peak_distance: 3,
            spline_smoothness: 10.0,
            car_position: [48, 0],
            max_chain_gap: 100,
        }
    }
}

impl Params {
    /// Check that the parameters can be used with the fixed frame size.
    pub fn validate(&self) -> Result<(), LaneDetError> {
        if self.cut_size < 2 || self.cut_size > FRAME_HEIGHT {
            return Err(LaneDetError::InvalidParams(format!(
                "cut_size must be between 2 and {}, found {}",
                FRAME_HEIGHT, self.cut_size
            )))
        }
        if !self.gradient_threshold.is_finite() {
            return Err(LaneDetError::InvalidParams(
                "gradient_threshold must be finite".into()
            ))
        }
        if !self.spline_smoothness.is_finite() || self.spline_smoothness < 0.0 {
            return Err(LaneDetError::InvalidParams(format!(
                "spline_smoothness must be non-negative, found {}",
                self.spline_smoothness
            )))
        }
        if self.car_position[0] >= FRAME_WIDTH || self.car_position[1] >= self.cut_size {
            return Err(LaneDetError::InvalidParams(format!(
                "car_position {:?} is outside of the cut band",
                self.car_position
            )))
        }

        Ok(())
    }
}
