//! # Drive library.
//!
//! This library provides the single-cycle perception, planning and control
//! pipeline used to drive a vehicle around a bounded track from a top-down
//! camera frame.
//!
//! The cycle is:
//!
//!  1. `lane_det` extracts the two lane boundaries from the frame and fits a
//!     smooth curve to each of them.
//!  2. `path_plan` turns the boundary pair into a waypoint path and predicts
//!     a target speed from the path's curvature.
//!  3. `lat_ctrl` steers onto the path with a Stanley controller.
//!  4. `lon_ctrl` tracks the target speed with a PID controller.
//!
//! `autopilot` wires the stages together for one cycle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autopilot - runs all stages of the pipeline for one cycle
pub mod autopilot;

/// Curve fitting - smoothing parametric B-spline curves
pub mod curve_fit;

/// Camera frame - the raster input to the pipeline
pub mod frame;

/// Lane detection - extracts the lane boundary curves from a frame
pub mod lane_det;

/// Lateral control - Stanley steering controller
pub mod lat_ctrl;

/// Longitudinal control - PID gas and brake controller
pub mod lon_ctrl;

/// Path planning - waypoint and target speed prediction
pub mod path_plan;
