//! Implementations for the LatCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{Params, LatCtrlError};
use crate::path_plan::WaypointPath;
use util::{
    params,
    maths::{clamp_sym, sign, wrap_to_pi},
    module::State,
    archive::{Archived, Archiver, ArchiveError},
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lateral control module state
#[derive(Default)]
pub struct LatCtrl {
    pub(crate) params: Params,

    /// Damped command from the previous cycle, before limiting.
    ///
    /// Units: radians
    pub(crate) prev_delta_rad: f64,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// Input data to lateral control.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// Path in vehicle coordinates.
    pub path: WaypointPath,

    /// Current speed of the vehicle.
    pub speed: f64,
}

/// Status report for LatCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    pub heading_error_rad: f64,
    pub cross_track_error: f64,
    pub raw_steer_rad: f64,
    pub damped_steer_rad: f64,

    /// True if the damped command exceeded the maximum steering angle.
    pub steer_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LatCtrl {
    /// Create a new controller from a set of parameters without archiving.
    pub fn new(params: Params) -> Result<Self, LatCtrlError> {
        params.validate()?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// Compute the normalised steering command in `[-1, 1]` for the path.
    ///
    /// Positive commands steer to the left.
    pub fn steer(&mut self, path: &WaypointPath, speed: f64) -> f64 {
        self.report = StatusReport::default();

        let heading_error_rad = heading_error(path);
        let cross_track_error = cross_track_error(path);

        let raw = heading_error_rad + (self.params.gain * cross_track_error)
            .atan2(speed + self.params.speed_epsilon);

        let delta = raw - self.params.damping * (raw - self.prev_delta_rad);
        self.prev_delta_rad = delta;

        let (limited, steer_limited) = clamp_sym(delta, self.params.max_steer_rad);
        let cmd = limited / self.params.max_steer_rad;

        self.report = StatusReport {
            heading_error_rad,
            cross_track_error,
            raw_steer_rad: raw,
            damped_steer_rad: delta,
            steer_limited,
        };

        trace!("LatCtrl output: {:.4} ({:?})", cmd, self.report);

        cmd
    }
}

impl State for LatCtrl {
    type InitData = &'static str;
    type InitError = LatCtrlError;

    type InputData = InputData;
    type OutputData = f64;
    type StatusReport = StatusReport;
    type ProcError = LatCtrlError;

    /// Initialise the LatCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)
            .map_err(LatCtrlError::ParamLoadError)?;
        self.params.validate()?;

        self.arch_report = Archiver::from_path(
            session, "lat_ctrl/status_report.csv"
        ).map_err(LatCtrlError::ArchiveError)?;

        self.prev_delta_rad = 0.0;

        Ok(())
    }

    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let cmd = self.steer(&input_data.path, input_data.speed);

        Ok((cmd, self.report))
    }
}

impl Archived for LatCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Angle of the first path segment relative to the vehicle heading, wrapped
/// into `(-pi, pi]`. Zero if the path has fewer than 2 points.
pub fn heading_error(path: &WaypointPath) -> f64 {
    match path.points.as_slice() {
        [p0, p1, ..] => {
            let d = p1 - p0;
            wrap_to_pi(d[1].atan2(d[0]))
        },
        _ => 0.0
    }
}

/// Distance from the vehicle to the first waypoint, signed by the waypoint's
/// lateral coordinate. Zero for an empty path.
pub fn cross_track_error(path: &WaypointPath) -> f64 {
    match path.points.first() {
        Some(p0) => p0.norm() * sign(p0[1]),
        None => 0.0
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
