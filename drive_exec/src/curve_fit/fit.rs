//! Smoothing B-spline fitting.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::{DMatrix, Vector2};

// Internal
use super::{
    bspline::{basis_funs, find_span},
    BoundaryCurve, CurveFitError
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Singular values below this are treated as zero when solving the least
/// squares system.
const SVD_EPS: f64 = 1e-10;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Fit a smoothing parametric B-spline through an ordered sequence of points.
///
/// The points are parameterised by normalised cumulative chord length. The
/// number of control points starts at `degree + 1` (a single Bezier segment)
/// and the number of knot spans is doubled until the residual sum of squares
/// is no greater than `smoothing`, or until the curve interpolates the points.
///
/// # Errors
/// - `TooFewPoints` if there are not more points than the degree.
/// - `InvalidDegree` if `degree` is zero.
/// - `InvalidSmoothing` if `smoothing` is negative or not finite.
/// - `SingularSystem` if the least squares solve fails.
pub fn fit_smoothing_spline(
    points: &[Vector2<f64>],
    degree: usize,
    smoothing: f64
) -> Result<BoundaryCurve, CurveFitError> {

    if degree == 0 {
        return Err(CurveFitError::InvalidDegree)
    }
    if points.len() <= degree {
        return Err(CurveFitError::TooFewPoints {
            degree,
            num_points: points.len()
        })
    }
    if !smoothing.is_finite() || smoothing < 0.0 {
        return Err(CurveFitError::InvalidSmoothing(smoothing))
    }

    let num_points = points.len();
    let params = chord_length_params(points);

    let mut num_coeffs = degree + 1;

    loop {
        let knots = averaged_knots(&params, degree, num_coeffs);
        let (coeffs, residual) = least_squares(
            points, &params, &knots, degree, num_coeffs
        )?;

        trace!(
            "Spline fit with {} coefficients, residual {:.4} (smoothing {:.4})",
            num_coeffs, residual, smoothing
        );

        if residual <= smoothing || num_coeffs >= num_points {
            return Ok(BoundaryCurve::from_parts(
                degree, knots, coeffs, smoothing, residual
            ))
        }

        // Double the number of knot spans
        let num_spans = num_coeffs - degree;
        num_coeffs = (degree + 2 * num_spans).min(num_points);
    }
}

/// Compute the normalised cumulative chord length parameter of each point.
///
/// If all the points coincide the parameters are spaced uniformly instead.
pub fn chord_length_params(points: &[Vector2<f64>]) -> Vec<f64> {
    let num_points = points.len();
    if num_points == 0 {
        return Vec::new()
    }
    if num_points == 1 {
        return vec![0.0]
    }

    let mut params = Vec::with_capacity(num_points);
    params.push(0f64);
    for w in points.windows(2) {
        let last = params[params.len() - 1];
        params.push(last + (w[1] - w[0]).norm());
    }

    let total = params[num_points - 1];

    if total <= f64::EPSILON {
        return (0..num_points)
            .map(|i| i as f64 / (num_points - 1) as f64)
            .collect()
    }

    for p in params.iter_mut() {
        *p /= total;
    }
    params[num_points - 1] = 1.0;

    params
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Build a clamped knot vector whose interior knots are averages of the data
/// parameters, so that every knot span contains at least one parameter.
fn averaged_knots(params: &[f64], degree: usize, num_coeffs: usize) -> Vec<f64> {
    let num_points = params.len();
    let num_spans = num_coeffs - degree;
    let d = num_points as f64 / num_spans as f64;

    let mut knots = Vec::with_capacity(num_coeffs + degree + 1);
    knots.extend(std::iter::repeat(0f64).take(degree + 1));

    for j in 1..num_spans {
        let jd = j as f64 * d;
        let i = (jd.floor() as usize).max(1).min(num_points - 1);
        let alpha = jd - i as f64;
        knots.push((1.0 - alpha) * params[i - 1] + alpha * params[i]);
    }

    knots.extend(std::iter::repeat(1f64).take(degree + 1));

    knots
}

/// Solve for the control points minimising the squared distance to the
/// points, returning the control points and the residual sum of squares.
fn least_squares(
    points: &[Vector2<f64>],
    params: &[f64],
    knots: &[f64],
    degree: usize,
    num_coeffs: usize
) -> Result<(Vec<Vector2<f64>>, f64), CurveFitError> {
    let num_points = points.len();

    // Design matrix of basis function values and the point matrix
    let mut a = DMatrix::<f64>::zeros(num_points, num_coeffs);
    let mut b = DMatrix::<f64>::zeros(num_points, 2);

    for (i, (u, p)) in params.iter().zip(points.iter()).enumerate() {
        let span = find_span(knots, degree, num_coeffs, *u);
        for (j, v) in basis_funs(knots, degree, span, *u).iter().enumerate() {
            a[(i, span - degree + j)] = *v;
        }
        b[(i, 0)] = p[0];
        b[(i, 1)] = p[1];
    }

    let svd = a.clone().svd(true, true);
    let c = svd.solve(&b, SVD_EPS)
        .map_err(CurveFitError::SingularSystem)?;

    let residual = (&a * &c - &b).norm_squared();

    let coeffs = (0..num_coeffs)
        .map(|j| Vector2::new(c[(j, 0)], c[(j, 1)]))
        .collect();

    Ok((coeffs, residual))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn straight_chain() -> Vec<Vector2<f64>> {
        (0..10).map(|r| Vector2::new(20.0, r as f64)).collect()
    }

    #[test]
    fn test_chord_length_params() {
        let params = chord_length_params(&[
            Vector2::new(0.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(0.0, 3.0),
            Vector2::new(0.0, 4.0),
        ]);
        assert_eq!(params, vec![0.0, 0.25, 0.75, 1.0]);

        // Coincident points fall back to uniform parameters
        let params = chord_length_params(&[Vector2::new(1.0, 1.0); 5]);
        assert_eq!(params, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_averaged_knots_are_clamped_and_increasing() {
        let params: Vec<f64> = (0..12).map(|i| i as f64 / 11.0).collect();
        let knots = averaged_knots(&params, 3, 8);

        assert_eq!(knots.len(), 8 + 3 + 1);
        assert!(knots[..4].iter().all(|k| *k == 0.0));
        assert!(knots[8..].iter().all(|k| *k == 1.0));
        assert!(knots.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_fit_straight_line() {
        let chain = straight_chain();
        let curve = fit_smoothing_spline(&chain, 3, 10.0).unwrap();

        // A single cubic segment reproduces a line exactly
        assert_eq!(curve.coeffs().len(), 4);
        assert!(curve.residual() < 1e-9);

        assert!((curve.eval(0.0) - Vector2::new(20.0, 0.0)).norm() < 1e-6);
        assert!((curve.eval(0.5) - Vector2::new(20.0, 4.5)).norm() < 1e-6);
        assert!((curve.eval(1.0) - Vector2::new(20.0, 9.0)).norm() < 1e-6);
    }

    #[test]
    fn test_fit_interpolates_with_zero_smoothing() {
        let chain: Vec<Vector2<f64>> = (0..7)
            .map(|r| {
                let y = r as f64;
                Vector2::new(10.0 + 0.3 * y * y - 0.05 * y * y * y, y)
            })
            .collect();
        let params = chord_length_params(&chain);

        let curve = fit_smoothing_spline(&chain, 3, 0.0).unwrap();

        for (u, p) in params.iter().zip(chain.iter()) {
            assert!((curve.eval(*u) - p).norm() < 1e-6);
        }
    }

    #[test]
    fn test_fit_respects_smoothing_bound() {
        // Zig-zag noise on a line
        let chain: Vec<Vector2<f64>> = (0..30)
            .map(|r| {
                let offset = if r % 2 == 0 { 1.0 } else { -1.0 };
                Vector2::new(40.0 + offset, r as f64)
            })
            .collect();

        let curve = fit_smoothing_spline(&chain, 3, 40.0).unwrap();
        assert!(curve.residual() <= 40.0);
        assert_eq!(curve.smoothing(), 40.0);

        // A tighter bound needs more control points
        let tight = fit_smoothing_spline(&chain, 3, 5.0).unwrap();
        assert!(tight.coeffs().len() > curve.coeffs().len());
    }

    #[test]
    fn test_fit_errors() {
        let chain = straight_chain();

        assert_eq!(
            fit_smoothing_spline(&chain[..3], 3, 10.0),
            Err(CurveFitError::TooFewPoints { degree: 3, num_points: 3 })
        );
        assert_eq!(
            fit_smoothing_spline(&chain, 0, 10.0),
            Err(CurveFitError::InvalidDegree)
        );
        assert!(matches!(
            fit_smoothing_spline(&chain, 3, -1.0),
            Err(CurveFitError::InvalidSmoothing(_))
        ));
    }
}
