//! Implementations for the PathPlan state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{
    Params, PathPlanError, WaypointPath, WaypointType,
    curvature_term, predict, predict_speed};
use crate::lane_det::BoundaryPair;
use util::{
    params,
    module::State,
    archive::{Archived, Archiver, ArchiveError},
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Path planning module state
#[derive(Default)]
pub struct PathPlan {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// Output of path planning.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputData {
    /// The path to follow, in frame coordinates.
    pub path: WaypointPath,

    /// The speed at which the path should be driven.
    pub target_speed: f64,
}

/// Status report for PathPlan processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    pub num_waypoints: usize,

    /// True if the path was smoothed rather than being the centreline.
    pub smoothed: bool,

    /// Curvature term over the waypoints used for speed prediction.
    pub curvature_term: f64,

    pub target_speed: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathPlan {
    /// Create a new instance from a set of parameters without archiving.
    pub fn new(params: Params) -> Result<Self, PathPlanError> {
        params.validate()?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl State for PathPlan {
    type InitData = &'static str;
    type InitError = PathPlanError;

    type InputData = BoundaryPair;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = PathPlanError;

    /// Initialise the PathPlan module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)
            .map_err(PathPlanError::ParamLoadError)?;
        self.params.validate()?;

        self.arch_report = Archiver::from_path(
            session, "path_plan/status_report.csv"
        ).map_err(PathPlanError::ArchiveError)?;

        Ok(())
    }

    /// Plan the path and target speed for the current boundaries.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        let path = predict(
            input_data.left.as_ref(),
            input_data.right.as_ref(),
            self.params.num_waypoints,
            self.params.way_type,
            self.params.smoothing_beta,
            &self.params.optimiser
        )?;

        let target_speed = predict_speed(
            &path,
            self.params.num_waypoints_used,
            self.params.max_speed,
            self.params.min_speed,
            self.params.k_v
        );

        let num_used = self.params.num_waypoints_used.min(path.len());
        let curvature = curvature_term(&path.points[..num_used]);

        self.report.num_waypoints = path.len();
        self.report.smoothed = self.params.way_type == WaypointType::Smooth;
        self.report.curvature_term = curvature;
        self.report.target_speed = target_speed;

        trace!(
            "PathPlan output: {} waypoints, target speed {:.3}",
            path.len(), target_speed
        );

        Ok((OutputData { path, target_speed }, self.report))
    }
}

impl Archived for PathPlan {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::curve_fit::fit_smoothing_spline;
    use nalgebra::Vector2;

    fn line_curve(col: f64) -> crate::curve_fit::BoundaryCurve {
        let pts: Vec<Vector2<f64>> = (0..20).map(|r| Vector2::new(col, r as f64)).collect();
        fit_smoothing_spline(&pts, 3, 1.0).unwrap()
    }

    #[test]
    fn test_proc_straight_lanes() {
        let mut pp = PathPlan::new(Params::default()).unwrap();
        let pair = BoundaryPair {
            left: Some(line_curve(20.0)),
            right: Some(line_curve(76.0)),
        };

        let (out, report) = pp.proc(&pair).unwrap();

        assert_eq!(out.path.len(), 6);
        assert!((out.target_speed - 30.0).abs() < 1e-6);
        assert_eq!(report.target_speed, out.target_speed);
        assert!(report.smoothed);
    }

    #[test]
    fn test_proc_speed_matches_predict_speed() {
        let mut params = Params::default();
        params.way_type = WaypointType::Center;
        let mut pp = PathPlan::new(params.clone()).unwrap();

        // Lanes leaning to the right give a bent centreline
        let bent = |col: f64| {
            let pts: Vec<Vector2<f64>> = (0..20)
                .map(|r| Vector2::new(col + 0.05 * (r * r) as f64, r as f64))
                .collect();
            fit_smoothing_spline(&pts, 3, 1.0).unwrap()
        };
        let pair = BoundaryPair {
            left: Some(bent(20.0)),
            right: Some(bent(60.0)),
        };

        let (out, report) = pp.proc(&pair).unwrap();

        let expected = predict_speed(
            &out.path,
            params.num_waypoints_used,
            params.max_speed,
            params.min_speed,
            params.k_v
        );
        assert_eq!(out.target_speed, expected);
        assert!(out.target_speed < params.max_speed);
        assert!(report.curvature_term > 0.0);
        assert!(!report.smoothed);
    }

    #[test]
    fn test_proc_without_curves() {
        let mut pp = PathPlan::new(Params::default()).unwrap();

        assert!(matches!(
            pp.proc(&BoundaryPair::default()),
            Err(PathPlanError::NoCurveEstablished { .. })
        ));
    }
}
