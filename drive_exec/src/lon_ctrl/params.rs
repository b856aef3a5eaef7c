//! Parameters structure for LonCtrl

use serde::Deserialize;

use super::LonCtrlError;

/// Parameters for the speed controller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// The integral accumulator is limited to plus or minus this value.
    pub integral_windup_limit: f64,

    pub max_gas: f64,
    pub max_brake: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            k_p: 0.01,
            k_i: 0.0,
            k_d: 0.0,
            integral_windup_limit: 10.0,
            max_gas: 0.8,
            max_brake: 0.8,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), LonCtrlError> {
        if !(self.integral_windup_limit >= 0.0) {
            return Err(LonCtrlError::InvalidParams(format!(
                "integral_windup_limit must be non-negative, found {}",
                self.integral_windup_limit
            )))
        }
        if !(self.max_gas >= 0.0 && self.max_brake >= 0.0) {
            return Err(LonCtrlError::InvalidParams(
                "max_gas and max_brake must be non-negative".into()
            ))
        }

        Ok(())
    }
}
