//! Implementations for the LaneDet state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{
    Params, LaneDetError, MAX_UNFIT_CHAIN_LEN,
    BoundaryChain, LanePoint,
    build_chains, cut_gray, edge_detection, find_maxima_rowwise};
use crate::{
    curve_fit::{fit_smoothing_spline, BoundaryCurve, CurveFitError, DEFAULT_DEGREE},
    frame::Frame};
use util::{
    params,
    module::State,
    archive::{Archived, Archiver, ArchiveError},
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lane detection module state
#[derive(Default)]
pub struct LaneDet {

    pub(crate) params: Params,

    /// The most recent boundaries, carried between cycles.
    pub(crate) boundaries: BoundaryPair,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// The pair of boundary curves, either of which may not yet be established.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryPair {
    /// First boundary, usually the left one
    pub left: Option<BoundaryCurve>,

    /// Second boundary, usually the right one
    pub right: Option<BoundaryCurve>,
}

/// Status report for LaneDet processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// True if starting points for the boundaries were found on this cycle.
    pub lanes_found: bool,

    /// Total number of candidate boundary points in the band.
    pub num_candidates: usize,

    pub left_chain_len: usize,
    pub right_chain_len: usize,

    /// True if the left curve was replaced by a fresh fit on this cycle.
    pub left_fitted: bool,

    /// True if the right curve was replaced by a fresh fit on this cycle.
    pub right_fitted: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LaneDet {
    /// Create a new instance from a set of parameters without archiving.
    pub fn new(params: Params) -> Result<Self, LaneDetError> {
        params.validate()?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// The most recently established boundaries.
    pub fn boundaries(&self) -> &BoundaryPair {
        &self.boundaries
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl BoundaryPair {
    /// Both curves, if both have been established.
    pub fn both(&self) -> Option<(&BoundaryCurve, &BoundaryCurve)> {
        match (&self.left, &self.right) {
            (Some(l), Some(r)) => Some((l, r)),
            _ => None
        }
    }
}

impl State for LaneDet {
    type InitData = &'static str;
    type InitError = LaneDetError;

    type InputData = Frame;
    type OutputData = BoundaryPair;
    type StatusReport = StatusReport;
    type ProcError = LaneDetError;

    /// Initialise the LaneDet module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)
            .map_err(LaneDetError::ParamLoadError)?;
        self.params.validate()?;

        self.arch_report = Archiver::from_path(
            session, "lane_det/status_report.csv"
        ).map_err(LaneDetError::ArchiveError)?;

        // No boundaries can be known before the first frame
        self.boundaries = BoundaryPair::default();

        Ok(())
    }

    /// Perform cyclic processing of lane detection on a new frame.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let previous = std::mem::take(&mut self.boundaries);

        let (boundaries, report) = extract(input_data, &self.params, previous);

        trace!("LaneDet report: {:?}", report);

        self.boundaries = boundaries;
        self.report = report;

        Ok((self.boundaries.clone(), self.report))
    }
}

impl Archived for LaneDet {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Extract the lane boundaries from a frame.
///
/// Both curves in `previous` are replaced together, only when both chains are
/// longer than `MAX_UNFIT_CHAIN_LEN` and both fits succeed. Otherwise both
/// previous curves are returned unchanged.
pub fn extract(
    frame: &Frame,
    params: &Params,
    previous: BoundaryPair
) -> (BoundaryPair, StatusReport) {
    let mut report = StatusReport::default();

    let gray = cut_gray(frame, params.cut_size);
    let gradient_sum = edge_detection(&gray, params.gradient_threshold);
    let maxima = find_maxima_rowwise(&gradient_sum, params.min_peak_distance);

    report.num_candidates = maxima.iter().map(Vec::len).sum();

    let anchor = LanePoint::new(params.car_position[0], params.car_position[1]);
    let (chain1, chain2, found) = build_chains(
        &maxima, anchor, gray.ncols(), params.max_chain_gap
    );

    report.lanes_found = found;
    report.left_chain_len = chain1.len();
    report.right_chain_len = chain2.len();

    if !found {
        debug!(
            "No lane seeds in {} candidates, keeping previous boundaries",
            report.num_candidates
        );
        return (previous, report)
    }

    if chain1.len() <= MAX_UNFIT_CHAIN_LEN || chain2.len() <= MAX_UNFIT_CHAIN_LEN {
        debug!(
            "Chains of {} and {} points are too short, keeping previous boundaries",
            chain1.len(), chain2.len()
        );
        return (previous, report)
    }

    match (fit_chain(&chain1, params), fit_chain(&chain2, params)) {
        (Ok(left), Ok(right)) => {
            report.left_fitted = true;
            report.right_fitted = true;
            (BoundaryPair { left: Some(left), right: Some(right) }, report)
        },
        (Err(e), _) | (_, Err(e)) => {
            debug!("Could not fit the boundaries ({}), keeping previous boundaries", e);
            (previous, report)
        }
    }
}

/// Fit a smoothing curve through the points of a chain.
fn fit_chain(chain: &BoundaryChain, params: &Params)
    -> Result<BoundaryCurve, CurveFitError>
{
    let points: Vec<Vector2<f64>> = chain.iter().map(LanePoint::to_vector).collect();

    fit_smoothing_spline(&points, DEFAULT_DEGREE, params.spline_smoothness)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const GREY: [u8; 3] = [100, 100, 100];
    const WHITE: [u8; 3] = [255, 255, 255];

    /// A frame with vertical boundary lines at the given columns.
    fn lane_frame(cols: &[usize]) -> Frame {
        let mut frame = Frame::filled(GREY);
        for r in 0..frame.height() {
            for c in cols {
                frame.set_pixel(r, *c, WHITE);
            }
        }
        frame
    }

    #[test]
    fn test_extract_straight_lanes() {
        let params = Params::default();
        let (pair, report) = extract(
            &lane_frame(&[20, 76]), &params, BoundaryPair::default()
        );

        assert!(report.lanes_found);
        assert!(report.left_fitted && report.right_fitted);
        assert!(report.left_chain_len > MAX_UNFIT_CHAIN_LEN);
        assert!(report.right_chain_len > MAX_UNFIT_CHAIN_LEN);

        let (left, right) = pair.both().unwrap();

        // A thin line gives an equal edge either side of it and the rightmost
        // survives peak suppression, so the curves lie one column right.
        for p in left.sample(10) {
            assert!((p[0] - 20.0).abs() <= 1.5, "left point {:?}", p);
        }
        for p in right.sample(10) {
            assert!((p[0] - 76.0).abs() <= 1.5, "right point {:?}", p);
        }
    }

    #[test]
    fn test_extract_keeps_previous_on_blank_frame() {
        let params = Params::default();
        let (first, _) = extract(
            &lane_frame(&[20, 76]), &params, BoundaryPair::default()
        );
        assert!(first.both().is_some());

        let (second, report) = extract(
            &Frame::filled(GREY), &params, first.clone()
        );

        assert!(!report.lanes_found);
        assert_eq!(report.num_candidates, 0);
        assert!(!report.left_fitted && !report.right_fitted);
        assert_eq!(second, first);
    }

    #[test]
    fn test_extract_one_short_chain_keeps_both_curves() {
        let params = Params::default();
        let (first, _) = extract(
            &lane_frame(&[20, 76]), &params, BoundaryPair::default()
        );
        assert!(first.both().is_some());

        // A single line right of the anchor, the opposite chain stays at the
        // frame edge
        let (second, report) = extract(&lane_frame(&[70]), &params, first.clone());

        assert!(report.lanes_found);
        assert!(report.left_chain_len > MAX_UNFIT_CHAIN_LEN);
        assert!(report.right_chain_len <= MAX_UNFIT_CHAIN_LEN);
        assert!(!report.left_fitted && !report.right_fitted);
        assert_eq!(second, first);

        // Nothing to keep on a first frame
        let (pair, _) = extract(&lane_frame(&[70]), &params, BoundaryPair::default());
        assert!(pair.left.is_none() && pair.right.is_none());
    }

    #[test]
    fn test_extract_blank_first_frame() {
        let (pair, report) = extract(
            &Frame::filled(GREY), &Params::default(), BoundaryPair::default()
        );

        assert!(!report.lanes_found);
        assert!(pair.left.is_none() && pair.right.is_none());
        assert!(pair.both().is_none());
    }

    #[test]
    fn test_proc_updates_boundaries() {
        let mut ld = LaneDet::new(Params::default()).unwrap();
        assert!(ld.boundaries().both().is_none());

        let (out, report) = ld.proc(&lane_frame(&[20, 76])).unwrap();
        assert!(report.lanes_found);
        assert_eq!(&out, ld.boundaries());

        // Archiving an uninitialised module is an error, not a panic
        assert!(ld.write().is_err());
    }

    #[test]
    fn test_new_rejects_bad_params() {
        let mut p = Params::default();
        p.cut_size = 1;
        assert!(LaneDet::new(p).is_err());
    }
}
