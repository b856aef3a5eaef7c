//! Unconstrained gradient-based minimisation.
//!
//! A limited memory BFGS minimiser with a backtracking line search. It is
//! intended for small, smooth problems such as path smoothing, where the
//! number of variables is a few tens at most.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Sufficient decrease constant of the Armijo condition.
const ARMIJO_C1: f64 = 1e-4;

/// The line search gives up once the step falls below this.
const MIN_STEP: f64 = 1e-12;

/// Minimisation stops when the relative decrease of the objective over one
/// iteration falls below this.
const REL_DECREASE_TOL: f64 = 2.220446049250313e-9;

/// Curvature pairs with `s.y` at or below this are not stored.
const MIN_CURVATURE: f64 = 1e-12;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A smooth scalar objective over a real vector.
pub trait Objective {
    /// Value of the objective at `x`.
    fn value(&self, x: &DVector<f64>) -> f64;

    /// Gradient of the objective at `x`.
    fn gradient(&self, x: &DVector<f64>) -> DVector<f64>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the minimiser.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OptimiserParams {
    /// Maximum number of iterations.
    pub max_iters: usize,

    /// Converged once the largest gradient component is at or below this.
    pub grad_tolerance: f64,

    /// Number of curvature pairs remembered.
    pub history: usize,
}

/// The result of a minimisation.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// The best point found.
    pub x: DVector<f64>,

    /// Objective value at `x`.
    pub value: f64,

    /// Number of iterations performed.
    pub num_iters: usize,

    /// True if the gradient or objective decrease tolerance was met.
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for OptimiserParams {
    fn default() -> Self {
        Self {
            max_iters: 200,
            grad_tolerance: 1e-5,
            history: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Minimise the objective starting from `x0`.
///
/// The best point found is always returned, `converged` reports whether a
/// tolerance was met before the iteration limit or a failed line search.
pub fn minimise<O: Objective>(
    objective: &O,
    x0: DVector<f64>,
    params: &OptimiserParams
) -> Minimum {
    let history = params.history.max(1);

    let mut x = x0;
    let mut f = objective.value(&x);
    let mut g = objective.gradient(&x);

    let mut s_hist: VecDeque<DVector<f64>> = VecDeque::with_capacity(history);
    let mut y_hist: VecDeque<DVector<f64>> = VecDeque::with_capacity(history);

    let mut num_iters = 0;
    let mut converged = false;

    while num_iters < params.max_iters {
        if g.amax() <= params.grad_tolerance {
            converged = true;
            break;
        }

        let mut dir = search_direction(&g, &s_hist, &y_hist);
        let mut slope = g.dot(&dir);

        // Fall back to steepest descent if the direction is not downhill
        if !(slope < 0.0) {
            s_hist.clear();
            y_hist.clear();
            dir = -&g;
            slope = -g.norm_squared();
        }

        // The first step has no curvature information to scale it
        let mut step = if s_hist.is_empty() {
            (1.0 / g.amax()).min(1.0)
        }
        else {
            1.0
        };

        let (x_new, f_new) = loop {
            let x_try = &x + &dir * step;
            let f_try = objective.value(&x_try);

            if f_try.is_finite() && f_try <= f + ARMIJO_C1 * step * slope {
                break (Some(x_try), f_try)
            }

            step *= 0.5;
            if step < MIN_STEP {
                break (None, f)
            }
        };

        num_iters += 1;

        let x_new = match x_new {
            Some(x) => x,
            None => {
                trace!("Line search failed after {} iterations", num_iters);
                break;
            }
        };

        let g_new = objective.gradient(&x_new);

        let s = &x_new - &x;
        let y = &g_new - &g;
        if s.dot(&y) > MIN_CURVATURE {
            if s_hist.len() == history {
                s_hist.pop_front();
                y_hist.pop_front();
            }
            s_hist.push_back(s);
            y_hist.push_back(y);
        }

        let decrease = f - f_new;
        x = x_new;
        g = g_new;
        f = f_new;

        if decrease <= REL_DECREASE_TOL * f.abs().max(1.0) {
            converged = true;
            break;
        }
    }

    trace!(
        "Minimisation finished after {} iterations, value {:.6}, converged: {}",
        num_iters, f, converged
    );

    Minimum {
        x,
        value: f,
        num_iters,
        converged
    }
}

/// Compute the quasi-Newton search direction using the two loop recursion.
fn search_direction(
    g: &DVector<f64>,
    s_hist: &VecDeque<DVector<f64>>,
    y_hist: &VecDeque<DVector<f64>>
) -> DVector<f64> {
    let mut q = g.clone();
    let mut alphas = Vec::with_capacity(s_hist.len());

    for (s, y) in s_hist.iter().zip(y_hist.iter()).rev() {
        let rho = 1.0 / y.dot(s);
        let alpha = rho * s.dot(&q);
        q -= y * alpha;
        alphas.push(alpha);
    }

    // Scale by the most recent curvature estimate
    if let (Some(s), Some(y)) = (s_hist.back(), y_hist.back()) {
        q *= s.dot(y) / y.dot(y);
    }

    for ((s, y), alpha) in s_hist.iter().zip(y_hist.iter()).zip(alphas.iter().rev()) {
        let rho = 1.0 / y.dot(s);
        let beta = rho * y.dot(&q);
        q += s * (alpha - beta);
    }

    -q
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Rosenbrock function
    struct Rosenbrock;

    impl Objective for Rosenbrock {
        fn value(&self, x: &DVector<f64>) -> f64 {
            (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2)
        }

        fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
            DVector::from_vec(vec![
                -2.0 * (1.0 - x[0]) - 400.0 * x[0] * (x[1] - x[0] * x[0]),
                200.0 * (x[1] - x[0] * x[0])
            ])
        }
    }

    /// Shifted quadratic bowl
    struct Bowl;

    impl Objective for Bowl {
        fn value(&self, x: &DVector<f64>) -> f64 {
            x.iter().enumerate().map(|(i, v)| (v - i as f64).powi(2)).sum()
        }

        fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
            DVector::from_iterator(
                x.len(),
                x.iter().enumerate().map(|(i, v)| 2.0 * (v - i as f64))
            )
        }
    }

    #[test]
    fn test_minimise_bowl() {
        let min = minimise(&Bowl, DVector::zeros(6), &OptimiserParams::default());

        assert!(min.converged);
        for i in 0..6 {
            assert!((min.x[i] - i as f64).abs() < 1e-4);
        }
    }

    #[test]
    fn test_minimise_rosenbrock() {
        let params = OptimiserParams {
            max_iters: 1000,
            ..Default::default()
        };
        let min = minimise(&Rosenbrock, DVector::from_vec(vec![-1.2, 1.0]), &params);

        assert!(min.value < 1e-6, "value {}", min.value);
        assert!((min.x[0] - 1.0).abs() < 1e-2);
        assert!((min.x[1] - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_minimise_starting_at_minimum() {
        let x0 = DVector::from_vec(vec![0.0, 1.0, 2.0]);
        let min = minimise(&Bowl, x0.clone(), &OptimiserParams::default());

        assert!(min.converged);
        assert_eq!(min.num_iters, 0);
        assert_eq!(min.x, x0);
    }

    #[test]
    fn test_iteration_limit() {
        let params = OptimiserParams {
            max_iters: 1,
            ..Default::default()
        };
        let min = minimise(&Rosenbrock, DVector::from_vec(vec![-1.2, 1.0]), &params);

        assert_eq!(min.num_iters, 1);
        assert!(min.value < Rosenbrock.value(&DVector::from_vec(vec![-1.2, 1.0])));
    }
}
