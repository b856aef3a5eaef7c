//! Implementations for the LonCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{Params, LonCtrlError, PidController};
use util::{
    params,
    maths::clamp,
    module::State,
    archive::{Archived, Archiver, ArchiveError},
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Longitudinal control module state
pub struct LonCtrl {
    pub(crate) params: Params,

    pid: PidController,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// Input data to longitudinal control.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    pub speed: f64,
    pub target_speed: f64,
}

/// Pedal demands, each between 0 and its maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PedalCmd {
    pub gas: f64,
    pub brake: f64,
}

/// Status report for LonCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Target speed minus current speed
    pub error: f64,
    pub integral: f64,
    pub control: f64,
    pub integral_limited: bool,
    pub gas_limited: bool,
    pub brake_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LonCtrl {
    fn default() -> Self {
        let params = Params::default();
        let pid = pid_from_params(&params);

        Self {
            params,
            pid,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        }
    }
}

impl LonCtrl {
    /// Create a new controller from a set of parameters without archiving.
    pub fn new(params: Params) -> Result<Self, LonCtrlError> {
        params.validate()?;

        Ok(Self {
            pid: pid_from_params(&params),
            params,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        })
    }

    /// Compute the pedal demands to bring the speed to the target.
    pub fn control(&mut self, speed: f64, target_speed: f64) -> PedalCmd {
        let error = target_speed - speed;
        let out = self.pid.get(error);

        let mut report = StatusReport {
            error,
            integral: out.integral,
            control: out.control,
            integral_limited: out.integral_limited,
            ..Default::default()
        };

        let cmd = if out.control >= 0.0 {
            let (gas, limited) = clamp(out.control, 0.0, self.params.max_gas);
            report.gas_limited = limited;
            PedalCmd { gas, brake: 0.0 }
        }
        else {
            let (brake, limited) = clamp(-out.control, 0.0, self.params.max_brake);
            report.brake_limited = limited;
            PedalCmd { gas: 0.0, brake }
        };

        self.report = report;

        trace!("LonCtrl output: {:?}", cmd);

        cmd
    }
}

impl State for LonCtrl {
    type InitData = &'static str;
    type InitError = LonCtrlError;

    type InputData = InputData;
    type OutputData = PedalCmd;
    type StatusReport = StatusReport;
    type ProcError = LonCtrlError;

    /// Initialise the LonCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)
            .map_err(LonCtrlError::ParamLoadError)?;
        self.params.validate()?;

        self.pid = pid_from_params(&self.params);

        self.arch_report = Archiver::from_path(
            session, "lon_ctrl/status_report.csv"
        ).map_err(LonCtrlError::ArchiveError)?;

        Ok(())
    }

    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let cmd = self.control(input_data.speed, input_data.target_speed);

        Ok((cmd, self.report))
    }
}

impl Archived for LonCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn pid_from_params(params: &Params) -> PidController {
    PidController::new(
        params.k_p, params.k_i, params.k_d, params.integral_windup_limit
    )
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
