//! End-to-end tests of the driving pipeline on synthetic frames.

use drive_lib::{
    autopilot::{Autopilot, AutopilotError, Params},
    frame::{Frame, FRAME_HEIGHT, FRAME_WIDTH},
    path_plan::PathPlanError,
};

const GRASS: [u8; 3] = [0, 0, 0];
const ROAD: [u8; 3] = [100, 100, 100];

/// A top-down frame of a straight road covering the columns
/// `first_col..=last_col`, with grass on both sides.
///
/// Each grass to road step gives a two column plateau in the gradient, which
/// peak detection reports at its left column, so the boundaries are found at
/// `first_col - 1` and `last_col`.
fn road_frame(first_col: usize, last_col: usize) -> Frame {
    let mut frame = Frame::filled(GRASS);
    for r in 0..FRAME_HEIGHT {
        for c in first_col..=last_col.min(FRAME_WIDTH - 1) {
            frame.set_pixel(r, c, ROAD);
        }
    }
    frame
}

#[test]
fn straight_centred_road_drives_straight() {
    let mut ap = Autopilot::new(Params::default()).unwrap();

    // Boundaries at 19 and 77, centred on the anchor at 48
    let (cmd, report) = ap.tick(&road_frame(20, 77), 10.0).unwrap();

    assert!(report.lane_det.lanes_found);
    assert!(report.lane_det.left_fitted && report.lane_det.right_fitted);

    assert!(cmd.steer.abs() < 1e-6, "steer {}", cmd.steer);
    assert!(report.lat_ctrl.cross_track_error.abs() < 1e-6);
    assert!(report.lat_ctrl.heading_error_rad.abs() < 1e-6);

    assert!((report.target_speed - 30.0).abs() < 1e-6);
    assert!(cmd.gas > 0.0);
    assert_eq!(cmd.brake, 0.0);
}

#[test]
fn two_peak_seeds_keep_found_order() {
    let mut ap = Autopilot::new(Params::default()).unwrap();

    // Boundaries at 10 and 80, with the anchor at 48
    ap.tick(&road_frame(11, 80), 10.0).unwrap();

    let (left, right) = ap.boundaries().both().unwrap();
    let l0 = left.eval(0.0);
    let r0 = right.eval(0.0);

    assert!((l0[0] - 10.0).abs() < 1e-6 && l0[1].abs() < 1e-6);
    assert!((r0[0] - 80.0).abs() < 1e-6 && r0[1].abs() < 1e-6);
}

#[test]
fn first_blank_frame_has_no_curve() {
    let mut ap = Autopilot::new(Params::default()).unwrap();

    let res = ap.tick(&Frame::filled(ROAD), 5.0);

    assert!(matches!(
        res,
        Err(AutopilotError::PathPlanError(PathPlanError::NoCurveEstablished {
            left_missing: true,
            right_missing: true
        }))
    ));
}

#[test]
fn lost_lanes_fall_back_to_previous_curves() {
    let mut ap = Autopilot::new(Params::default()).unwrap();

    let (first_cmd, _) = ap.tick(&road_frame(20, 77), 10.0).unwrap();
    let boundaries = ap.boundaries().clone();

    // Nothing detectable in the second frame
    let (second_cmd, report) = ap.tick(&Frame::filled(ROAD), 10.0).unwrap();

    assert!(!report.lane_det.lanes_found);
    assert!(!report.lane_det.left_fitted && !report.lane_det.right_fitted);
    assert_eq!(ap.boundaries(), &boundaries);
    assert!((second_cmd.steer - first_cmd.steer).abs() < 1e-6);
}

#[test]
fn single_boundary_fits_no_curve() {
    let mut ap = Autopilot::new(Params::default()).unwrap();

    // Road runs off the left edge of the frame, so only the right boundary
    // at column 60 is visible.
    let res = ap.tick(&road_frame(0, 60), 10.0);

    // The synthetic left edge chain finds nothing to follow, so neither side
    // is fitted.
    assert!(matches!(
        res,
        Err(AutopilotError::PathPlanError(PathPlanError::NoCurveEstablished {
            left_missing: true,
            right_missing: true
        }))
    ));
    assert!(ap.boundaries().left.is_none());
    assert!(ap.boundaries().right.is_none());

    // Same on the other side
    let res = ap.tick(&road_frame(20, FRAME_WIDTH - 1), 10.0);
    assert!(matches!(
        res,
        Err(AutopilotError::PathPlanError(PathPlanError::NoCurveEstablished { .. }))
    ));
    assert!(ap.boundaries().both().is_none());
}

#[test]
fn single_boundary_keeps_previous_curves() {
    let mut ap = Autopilot::new(Params::default()).unwrap();

    ap.tick(&road_frame(20, 77), 10.0).unwrap();
    let boundaries = ap.boundaries().clone();

    let (_, report) = ap.tick(&road_frame(0, 60), 10.0).unwrap();

    assert!(report.lane_det.lanes_found);
    assert!(report.lane_det.left_chain_len > 4);
    assert_eq!(report.lane_det.right_chain_len, 1);
    assert!(!report.lane_det.left_fitted && !report.lane_det.right_fitted);
    assert_eq!(ap.boundaries(), &boundaries);
}

#[test]
fn curved_road_slows_down() {
    let mut ap = Autopilot::new(Params::default()).unwrap();

    // Road bending to the right away from the vehicle. Frame rows count down
    // towards the vehicle, which sits just below row 67.
    let mut frame = Frame::filled(GRASS);
    for r in 0..FRAME_HEIGHT {
        let dist = 67usize.saturating_sub(r) as f64;
        let shift = (0.012 * dist * dist) as usize;
        for c in (22 + shift)..=(74 + shift).min(FRAME_WIDTH - 1) {
            frame.set_pixel(r, c, ROAD);
        }
    }

    let (cmd, report) = ap.tick(&frame, 30.0).unwrap();

    assert!(report.target_speed < 30.0);
    assert!(report.target_speed >= 15.0);
    assert!(cmd.gas == 0.0 || cmd.brake == 0.0);
    assert!(cmd.steer.abs() <= 1.0);
}
