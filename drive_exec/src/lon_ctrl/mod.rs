//! # Longitudinal control module
//!
//! Longitudinal control tracks the target speed with a PID controller running
//! at a fixed unit time step. The controller's signal is mapped onto either
//! the gas or the brake pedal, never both.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod pid;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use pid::*;
pub use state::*;
use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LonCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum LonCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Could not initialise the archives: {0}")]
    ArchiveError(ArchiveError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}
