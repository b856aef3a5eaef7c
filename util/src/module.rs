//! Stage interface
//!
//! Every stage of the driving pipeline (lane detection, path planning, the
//! lateral and longitudinal controllers) is a `State`. A stage is built once
//! from its parameter file, then `proc` is called once per camera frame with
//! the previous stage's output. Stages which archive their status reports
//! also implement `archive::Archived`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The persistent state of a pipeline stage, carried between frames.
pub trait State {
    /// Data required during initialisation, usually the parameter file name
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// Data required for cyclic processing.
    type InputData;
    /// Data produced by cyclic processing.
    type OutputData;
    /// A report on the status of the cyclic processing.
    type StatusReport;
    /// An error which can occur during cyclic processing.
    type ProcError;

    /// Load the stage's parameters and open its archives.
    ///
    /// Any state from a previous run (e.g. remembered boundary curves) is
    /// reset.
    ///
    /// # Inputs
    /// - `init_data`: The input data required by the module.
    /// - `session`: The session in which the stage's archives are placed.
    ///
    /// # Outputs
    /// - On success `Ok(())`.
    /// - On error an `InitError` instance.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Process one frame's worth of input.
    ///
    /// A stage may fall back on the state kept from earlier frames when its
    /// input is degenerate, the status report says whether it did.
    ///
    /// # Inputs
    /// - `input_data`: The data required for processing by the module.
    ///
    /// # Outputs
    /// - On success a tuple of the output data and status report.
    /// - On error a `ProcError` instance.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
