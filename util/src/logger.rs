//! Logging for the driving executables
//!
//! Records go both to stdout and to the session log file, stamped with the
//! seconds elapsed since the session epoch. Debug and trace records also carry
//! their target so per-stage output (`lane_det`, `path_plan`, ...) can be told
//! apart when replaying a run.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info};
use fern;
use colored::{ColoredString, Colorize};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Cannot override the level of an unnamed module")]
    EmptyModuleName,

    #[error("Error opening the session log file: {0}")]
    LogFileInitError(#[from] std::io::Error),

    #[error("A logger has already been set for this process: {0}")]
    FernInitError(#[from] log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this session.
///
/// `module_levels` holds per-module overrides of `min_level`, keyed by the
/// module path (e.g. `drive_lib::path_plan::optim`, whose optimiser traces
/// every iteration).
///
/// # Notes
///
/// - `min_level` must be at least `LevelFilter::Info`, so that the startup
///   summary is always recorded.
/// - Only one logger may be set per process, a second call returns
///   `FernInitError`.
pub fn logger_init(
    min_level: LevelFilter,
    module_levels: &[(&'static str, LevelFilter)],
    session: &session::Session
) -> Result<(), LoggerInitError> {

    check_levels(min_level, module_levels)?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            let elapsed = session::get_elapsed_seconds();
            let tag = level_tag(record.level());

            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{:10.6} {}] {}: {}", elapsed, tag, record.target(), message
                ))
            }
            else {
                out.finish(format_args!("[{:10.6} {}] {}", elapsed, tag, message))
            }
        })
        .level(min_level);

    for (module, level) in module_levels {
        dispatch = dispatch.level_for(*module, *level);
    }

    dispatch
        .chain(std::io::stdout())
        .chain(fern::log_file(&session.log_file_path)?)
        .apply()?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    for (module, level) in module_levels {
        info!("    {} level: {:?}", module, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_levels(
    min_level: LevelFilter,
    module_levels: &[(&'static str, LevelFilter)]
) -> Result<(), LoggerInitError> {
    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    if module_levels.iter().any(|(m, _)| m.is_empty()) {
        return Err(LoggerInitError::EmptyModuleName)
    }

    Ok(())
}

/// Short coloured tag for a log level
fn level_tag(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
