//! Offline replay executable.
//!
//! Replays a directory of recorded frames through the autopilot, standing in
//! for the simulator.
//!
//! # Usage
//!
//! ```text
//! drive_exec <frames_dir> [speeds.csv]
//! ```
//!
//! - `frames_dir`: directory of 96x96 RGB PNG frames, replayed in lexical
//!   order of their file names.
//! - `speeds.csv`: optional CSV file with a `speed` column giving the
//!   vehicle's speed on each frame. Without it, or once it runs out, the
//!   speed is taken as zero.
//!
//! The actuator commands are logged and every stage's status reports are
//! archived in the session directory under `$SDC_SW_ROOT/sessions`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::{WrapErr, eyre}};
use log::{debug, info, warn};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

// Internal
use drive_lib::{
    autopilot::{Autopilot, AutopilotError, ActuatorCmd, ParamFiles},
    frame::Frame,
    path_plan::PathPlanError};
use util::{
    module::State,
    archive::Archived,
    logger::{logger_init, LevelFilter},
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single row of the speeds file.
#[derive(Debug, Deserialize)]
struct SpeedRecord {
    speed: f64
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- ARGUMENTS ----

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 3 {
        return Err(eyre!(
            "Usage: drive_exec <frames_dir> [speeds.csv], found {} arguments",
            args.len() - 1
        ));
    }

    // ---- EARLY INITIALISATION ----

    let session = Session::new(
        "drive_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // The smoothing optimiser traces every iteration, keep it quieter
    logger_init(
        LevelFilter::Trace,
        &[("drive_lib::path_plan::optim", LevelFilter::Debug)],
        &session
    ).wrap_err("Failed to initialise logging")?;

    info!("Drive Replay Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD INPUTS ----

    let frame_paths = list_frames(Path::new(&args[1]))
        .wrap_err("Failed to list the frames")?;
    info!("Found {} frames in {:?}", frame_paths.len(), args[1]);

    let speeds = match args.get(2) {
        Some(p) => {
            let s = load_speeds(Path::new(p))
                .wrap_err("Failed to load the speeds file")?;
            info!("Loaded {} speeds from {:?}", s.len(), p);
            s
        },
        None => Vec::new()
    };

    if !speeds.is_empty() && speeds.len() < frame_paths.len() {
        warn!(
            "Only {} speeds for {} frames, the remaining frames use zero speed",
            speeds.len(), frame_paths.len()
        );
    }

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut autopilot = Autopilot::default();
    autopilot.init(ParamFiles::default(), &session)
        .wrap_err("Failed to initialise the Autopilot")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    for (i, path) in frame_paths.iter().enumerate() {
        let frame = Frame::load(path)
            .wrap_err_with(|| format!("Failed to load frame {:?}", path))?;
        let speed = speeds.get(i).copied().unwrap_or(0.0);

        let cmd = match autopilot.tick(&frame, speed) {
            Ok((cmd, report)) => {
                debug!("Frame {} report: {:#?}", i, report);
                cmd
            },
            // Coast until both boundaries have been seen
            Err(AutopilotError::PathPlanError(e @ PathPlanError::NoCurveEstablished { .. })) => {
                warn!("Frame {}: {}, coasting", i, e);
                ActuatorCmd::default()
            },
            Err(e) => return Err(e).wrap_err_with(|| format!("Autopilot failed on frame {}", i))
        };

        info!(
            "Frame {:5}: speed {:7.3}, steer {:+.4}, gas {:.4}, brake {:.4}",
            i, speed, cmd.steer, cmd.gas, cmd.brake
        );

        autopilot.write().wrap_err("Failed to write the archives")?;
    }

    info!("Replay complete");

    Ok(())
}

/// List the PNG files in a directory, sorted by file name.
fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, Report> {
    let mut paths = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        let is_png = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("png"))
            .unwrap_or(false);

        if path.is_file() && is_png {
            paths.push(path);
        }
    }

    paths.sort();

    if paths.is_empty() {
        return Err(eyre!("No PNG frames found in {:?}", dir));
    }

    Ok(paths)
}

/// Load the per-frame speeds from a CSV file with a `speed` column.
fn load_speeds(path: &Path) -> Result<Vec<f64>, Report> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut speeds = Vec::new();
    for record in reader.deserialize() {
        let record: SpeedRecord = record?;
        speeds.push(record.speed);
    }

    Ok(speeds)
}
