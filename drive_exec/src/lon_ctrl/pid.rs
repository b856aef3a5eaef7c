//! # PID controller
//!
//! A discrete PID controller with a unit time step and a clamped integral.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::clamp_sym;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Limit of the integral accumulation
    windup_limit: f64,

    /// Previous error
    prev_error: f64,

    /// The integral accumulation
    integral: f64
}

/// The terms of a single controller update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidOutput {
    /// Sum of the three terms
    pub control: f64,

    /// Integral accumulation after the update
    pub integral: f64,

    /// True if the integral was clamped on this update
    pub integral_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains and integral limit.
    pub fn new(k_p: f64, k_i: f64, k_d: f64, windup_limit: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            windup_limit,
            integral: 0f64,
            prev_error: 0f64
        }
    }

    /// Get the value of the controller for the given error.
    ///
    /// The first derivative is taken against a previous error of zero.
    pub fn get(&mut self, error: f64) -> PidOutput {
        // Accumulate then limit the integral, regardless of whether the error
        // is driving the integral towards or away from zero.
        let (integral, integral_limited) = clamp_sym(
            self.integral + error, self.windup_limit
        );
        self.integral = integral;

        let deriv = error - self.prev_error;
        self.prev_error = error;

        PidOutput {
            control: self.k_p * error + self.k_i * self.integral + self.k_d * deriv,
            integral: self.integral,
            integral_limited
        }
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
