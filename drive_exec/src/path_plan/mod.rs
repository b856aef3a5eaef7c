//! # Path planning module
//!
//! Path planning turns the pair of lane boundary curves into the path the
//! vehicle should follow over the next few metres, and predicts the speed at
//! which that path can be driven.
//!
//! The path is found by sampling both boundaries at the same parameters and
//! averaging the samples to get the centreline. The centreline can then be
//! smoothed by minimising a trade-off between the distance to the centreline
//! and the alignment of consecutive path segments. The target speed decays
//! from the maximum to the minimum speed as the near part of the path bends.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod geometry;
mod optim;
mod params;
mod speed;
mod state;
mod waypoints;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use geometry::*;
pub use optim::*;
pub use params::*;
pub use speed::*;
pub use state::*;
pub use waypoints::*;
use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during path planning.
#[derive(Debug, thiserror::Error)]
pub enum PathPlanError {
    #[error(
        "No boundary curve has been established yet (left: {left_missing}, right: {right_missing} missing)"
    )]
    NoCurveEstablished {
        left_missing: bool,
        right_missing: bool
    },

    #[error("At least 2 waypoints are required, found {0}")]
    InvalidNumWaypoints(usize),

    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Could not initialise the archives: {0}")]
    ArchiveError(ArchiveError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}
