//! # Lane detection module
//!
//! Lane detection extracts the two lane boundaries from the camera frame and
//! represents each of them as a smooth parametric curve. Processing involves:
//!
//!  1. Cutting the frame down to the band of rows in front of the vehicle and
//!     converting it to grayscale.
//!  2. Computing the thresholded gradient magnitude of the band.
//!  3. Finding the local maxima of each row, which form the pool of candidate
//!     boundary points.
//!  4. Finding the starting point of each boundary on the nearest row with
//!     any candidates, then chaining the remaining candidates row by row.
//!  5. Fitting a smoothing spline to each chain.
//!
//! Detection is allowed to fail. If no starting points are found, or a chain
//! is too short to fit, the boundary found on a previous cycle is kept.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod chain;
mod edges;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use chain::*;
pub use edges::*;
pub use params::*;
pub use state::*;
use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Chains with this many points or fewer are never fitted.
pub const MAX_UNFIT_CHAIN_LEN: usize = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LaneDet operation.
#[derive(Debug, thiserror::Error)]
pub enum LaneDetError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Could not initialise the archives: {0}")]
    ArchiveError(ArchiveError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}
