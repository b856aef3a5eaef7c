//! # Lateral control module
//!
//! Lateral control steers the vehicle onto the planned path using a Stanley
//! controller. The path must be given in vehicle coordinates, with the
//! vehicle at the origin facing along the positive x axis and the y axis
//! positive to the left.
//!
//! The raw Stanley command combines the heading error to the first path
//! segment with the speed-scaled cross-track error to the first waypoint. It
//! is then damped towards the previous damped command, limited to the
//! maximum steering angle and normalised to `[-1, 1]`.
//!
//! The damped command is remembered before it is limited, so a limited
//! command keeps pulling the next cycle's command past the limit.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;
use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LatCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum LatCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Could not initialise the archives: {0}")]
    ArchiveError(ArchiveError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}
