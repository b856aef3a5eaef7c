//! Parameters structure for LatCtrl

use serde::Deserialize;

use super::LatCtrlError;

/// Parameters for the Stanley controller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Gain on the cross-track error.
    pub gain: f64,

    /// Fraction of the change in command removed on each cycle, between 0
    /// (no damping) and 1 (the command never changes).
    pub damping: f64,

    /// Maximum steering angle, which maps to a normalised command of 1.
    ///
    /// Units: radians
    pub max_steer_rad: f64,

    /// Added to the speed to avoid dividing by zero when stationary.
    pub speed_epsilon: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            gain: 0.025,
            damping: 0.0125,
            max_steer_rad: 0.4,
            speed_epsilon: 1e-6,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), LatCtrlError> {
        if !(self.max_steer_rad.is_finite() && self.max_steer_rad > 0.0) {
            return Err(LatCtrlError::InvalidParams(format!(
                "max_steer_rad must be positive, found {}", self.max_steer_rad
            )))
        }
        if !(self.speed_epsilon > 0.0) {
            return Err(LatCtrlError::InvalidParams(
                "speed_epsilon must be positive".into()
            ))
        }
        if !(self.gain.is_finite() && self.damping.is_finite()) {
            return Err(LatCtrlError::InvalidParams(
                "gain and damping must be finite".into()
            ))
        }

        Ok(())
    }
}
