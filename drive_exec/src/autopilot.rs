//! # Autopilot
//!
//! The autopilot runs the full pipeline once per simulation tick:
//!
//!  1. Lane detection finds the boundary curves in the frame.
//!  2. Path planning predicts the waypoints and the target speed.
//!  3. The waypoints are moved into vehicle coordinates.
//!  4. Lateral control computes the steering command.
//!  5. Longitudinal control computes the gas and brake commands.
//!
//! Each stage owns its own state, so independent vehicles need independent
//! autopilots.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use crate::{
    frame::Frame,
    lane_det::{self, LaneDet, LaneDetError, BoundaryPair},
    lat_ctrl::{self, LatCtrl, LatCtrlError},
    lon_ctrl::{self, LonCtrl, LonCtrlError},
    path_plan::{self, PathPlan, PathPlanError, WaypointPath}};
use util::{
    module::State,
    archive::{Archived, Archiver, ArchiveError},
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The full driving pipeline.
#[derive(Default)]
pub struct Autopilot {
    pub lane_det: LaneDet,
    pub path_plan: PathPlan,
    pub lat_ctrl: LatCtrl,
    pub lon_ctrl: LonCtrl,

    cmd: ActuatorCmd,
    arch_cmd: Archiver,

    /// True if every stage ran on the last tick.
    tick_complete: bool,
}

/// Parameters of every stage, for building an autopilot without a session.
#[derive(Debug, Clone, Default)]
pub struct Params {
    pub lane_det: lane_det::Params,
    pub path_plan: path_plan::Params,
    pub lat_ctrl: lat_ctrl::Params,
    pub lon_ctrl: lon_ctrl::Params,
}

/// Parameter file of each stage, relative to the parameters directory.
#[derive(Debug, Clone, Copy)]
pub struct ParamFiles {
    pub lane_det: &'static str,
    pub path_plan: &'static str,
    pub lat_ctrl: &'static str,
    pub lon_ctrl: &'static str,
}

/// Input data for a single tick.
#[derive(Debug, Clone)]
pub struct InputData {
    pub frame: Frame,

    /// Current speed of the vehicle.
    pub speed: f64,
}

/// Actuator demands sent to the vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ActuatorCmd {
    /// Normalised steering, positive to the left, in `[-1, 1]`
    pub steer: f64,

    /// Gas pedal in `[0, max_gas]`
    pub gas: f64,

    /// Brake pedal in `[0, max_brake]`
    pub brake: f64,
}

/// Reports from every stage for a single tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusReport {
    pub lane_det: lane_det::StatusReport,
    pub path_plan: path_plan::StatusReport,
    pub lat_ctrl: lat_ctrl::StatusReport,
    pub lon_ctrl: lon_ctrl::StatusReport,
    pub target_speed: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur in the autopilot.
#[derive(Debug, thiserror::Error)]
pub enum AutopilotError {
    #[error("Lane detection error: {0}")]
    LaneDetError(LaneDetError),

    #[error("Path planning error: {0}")]
    PathPlanError(PathPlanError),

    #[error("Lateral control error: {0}")]
    LatCtrlError(LatCtrlError),

    #[error("Longitudinal control error: {0}")]
    LonCtrlError(LonCtrlError),

    #[error("Could not initialise the archives: {0}")]
    ArchiveError(ArchiveError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ParamFiles {
    fn default() -> Self {
        Self {
            lane_det: "lane_det.toml",
            path_plan: "path_plan.toml",
            lat_ctrl: "lat_ctrl.toml",
            lon_ctrl: "lon_ctrl.toml",
        }
    }
}

impl Autopilot {
    /// Build an autopilot from in-memory parameters without archiving.
    pub fn new(params: Params) -> Result<Self, AutopilotError> {
        Ok(Self {
            lane_det: LaneDet::new(params.lane_det)?,
            path_plan: PathPlan::new(params.path_plan)?,
            lat_ctrl: LatCtrl::new(params.lat_ctrl)?,
            lon_ctrl: LonCtrl::new(params.lon_ctrl)?,
            ..Default::default()
        })
    }

    /// Run the pipeline on one frame.
    ///
    /// # Errors
    /// - `PathPlanError::NoCurveEstablished` if a boundary has never been
    ///   detected. The caller decides how to command the vehicle in this
    ///   case. Detection still runs, so a later frame can recover.
    pub fn tick(&mut self, frame: &Frame, speed: f64)
        -> Result<(ActuatorCmd, StatusReport), AutopilotError>
    {
        let mut report = StatusReport::default();
        self.tick_complete = false;

        let (boundaries, ld_report) = self.lane_det.proc(frame)?;
        report.lane_det = ld_report;

        let (plan, pp_report) = self.path_plan.proc(&boundaries)?;
        report.path_plan = pp_report;
        report.target_speed = plan.target_speed;

        let anchor = self.lane_det.params().car_position;
        let vehicle_path = to_vehicle_frame(&plan.path, anchor);

        let (steer, lat_report) = self.lat_ctrl.proc(&lat_ctrl::InputData {
            path: vehicle_path,
            speed
        })?;
        report.lat_ctrl = lat_report;

        let (pedals, lon_report) = self.lon_ctrl.proc(&lon_ctrl::InputData {
            speed,
            target_speed: plan.target_speed
        })?;
        report.lon_ctrl = lon_report;

        self.cmd = ActuatorCmd {
            steer,
            gas: pedals.gas,
            brake: pedals.brake
        };

        self.tick_complete = true;

        trace!("Autopilot output: {:?}", self.cmd);

        Ok((self.cmd, report))
    }

    /// The current boundary curves.
    pub fn boundaries(&self) -> &BoundaryPair {
        self.lane_det.boundaries()
    }
}

impl State for Autopilot {
    type InitData = ParamFiles;
    type InitError = AutopilotError;

    type InputData = InputData;
    type OutputData = ActuatorCmd;
    type StatusReport = StatusReport;
    type ProcError = AutopilotError;

    /// Initialise every stage from its parameter file.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        self.lane_det.init(init_data.lane_det, session)?;
        self.path_plan.init(init_data.path_plan, session)?;
        self.lat_ctrl.init(init_data.lat_ctrl, session)?;
        self.lon_ctrl.init(init_data.lon_ctrl, session)?;

        self.arch_cmd = Archiver::from_path(session, "autopilot/actuator_cmd.csv")
            .map_err(AutopilotError::ArchiveError)?;

        Ok(())
    }

    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.tick(&input_data.frame, input_data.speed)
    }
}

impl Archived for Autopilot {
    /// Write the archives of every stage which ran on the last tick.
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.lane_det.write()?;

        if !self.tick_complete {
            return Ok(())
        }

        self.path_plan.write()?;
        self.lat_ctrl.write()?;
        self.lon_ctrl.write()?;
        self.arch_cmd.serialise(self.cmd)
    }
}

impl From<LaneDetError> for AutopilotError {
    fn from(e: LaneDetError) -> Self {
        Self::LaneDetError(e)
    }
}

impl From<PathPlanError> for AutopilotError {
    fn from(e: PathPlanError) -> Self {
        Self::PathPlanError(e)
    }
}

impl From<LatCtrlError> for AutopilotError {
    fn from(e: LatCtrlError) -> Self {
        Self::LatCtrlError(e)
    }
}

impl From<LonCtrlError> for AutopilotError {
    fn from(e: LonCtrlError) -> Self {
        Self::LonCtrlError(e)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Move a path from frame coordinates into vehicle coordinates.
///
/// `anchor` is the vehicle's `[column, row]` in the frame. In vehicle
/// coordinates x points forward (increasing row) and y points left
/// (decreasing column).
pub fn to_vehicle_frame(path: &WaypointPath, anchor: [usize; 2]) -> WaypointPath {
    let col = anchor[0] as f64;
    let row = anchor[1] as f64;

    WaypointPath::new(
        path.points
            .iter()
            .map(|p| Vector2::new(p[1] - row, col - p[0]))
            .collect()
    )
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
