//! Clamped B-spline curve representation and evaluation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A smooth parametric curve fitted to a lane boundary.
///
/// The curve is immutable once fitted. It can be evaluated at any parameter
/// in `[0, 1]`, parameters outside of this range are clamped onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCurve {
    /// Degree of the curve
    degree: usize,

    /// Clamped knot vector, of length `coeffs.len() + degree + 1`
    knots: Vec<f64>,

    /// Control point coefficients
    coeffs: Vec<Vector2<f64>>,

    /// The smoothing factor the curve was fitted with
    smoothing: f64,

    /// Sum of squared distances between the fitted points and the curve
    residual: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BoundaryCurve {
    pub(crate) fn from_parts(
        degree: usize,
        knots: Vec<f64>,
        coeffs: Vec<Vector2<f64>>,
        smoothing: f64,
        residual: f64
    ) -> Self {
        debug_assert_eq!(knots.len(), coeffs.len() + degree + 1);

        Self {
            degree,
            knots,
            coeffs,
            smoothing,
            residual
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn coeffs(&self) -> &[Vector2<f64>] {
        &self.coeffs
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Evaluate the curve at the given parameter.
    pub fn eval(&self, u: f64) -> Vector2<f64> {
        let p = self.degree;
        let n = self.coeffs.len();
        let u = u.max(self.knots[p]).min(self.knots[n]);

        let span = find_span(&self.knots, p, n, u);
        let basis = basis_funs(&self.knots, p, span, u);

        basis
            .iter()
            .enumerate()
            .fold(Vector2::zeros(), |acc, (j, b)| {
                acc + self.coeffs[span - p + j] * *b
            })
    }

    /// Evaluate the curve at `num_points` uniformly spaced parameters
    /// between 0 and 1 inclusive.
    pub fn sample(&self, num_points: usize) -> Vec<Vector2<f64>> {
        match num_points {
            0 => Vec::new(),
            1 => vec![self.eval(0.0)],
            _ => (0..num_points)
                .map(|i| self.eval(i as f64 / (num_points - 1) as f64))
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the knot span index containing `u`, i.e. the `i` for which
/// `knots[i] <= u < knots[i + 1]`, with `u` at the end of the range assigned
/// to the last non-empty span.
pub(crate) fn find_span(knots: &[f64], degree: usize, num_coeffs: usize, u: f64) -> usize {
    let n = num_coeffs - 1;

    if u >= knots[n + 1] {
        return n;
    }
    if u <= knots[degree] {
        return degree;
    }

    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;

    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        }
        else {
            low = mid;
        }
        mid = (low + high) / 2;
    }

    mid
}

/// Compute the `degree + 1` non-zero basis functions at `u` in the given span.
///
/// Element `j` of the result is the value of basis function `span - degree + j`.
pub(crate) fn basis_funs(knots: &[f64], degree: usize, span: usize, u: f64) -> Vec<f64> {
    let mut n = vec![0f64; degree + 1];
    let mut left = vec![0f64; degree + 1];
    let mut right = vec![0f64; degree + 1];

    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;

        let mut saved = 0f64;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom.abs() > 0.0 { n[r] / denom } else { 0.0 };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }

    n
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn bezier_curve() -> BoundaryCurve {
        // A cubic with no interior knots is a Bezier curve
        BoundaryCurve::from_parts(
            3,
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
            vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 2.0),
                Vector2::new(3.0, 2.0),
                Vector2::new(4.0, 0.0),
            ],
            0.0,
            0.0
        )
    }

    #[test]
    fn test_basis_partition_of_unity() {
        let knots = [0.0, 0.0, 0.0, 0.0, 0.3, 0.7, 1.0, 1.0, 1.0, 1.0];
        for i in 0..=20 {
            let u = i as f64 / 20.0;
            let span = find_span(&knots, 3, 6, u);
            assert!(span >= 3 && span <= 5);
            let sum: f64 = basis_funs(&knots, 3, span, u).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_eval_endpoints_and_clamp() {
        let c = bezier_curve();

        assert!((c.eval(0.0) - Vector2::new(0.0, 0.0)).norm() < 1e-12);
        assert!((c.eval(1.0) - Vector2::new(4.0, 0.0)).norm() < 1e-12);
        assert!((c.eval(0.5) - Vector2::new(2.0, 1.5)).norm() < 1e-12);

        // Out of range parameters are clamped
        assert_eq!(c.eval(-1.0), c.eval(0.0));
        assert_eq!(c.eval(2.0), c.eval(1.0));
    }

    #[test]
    fn test_sample() {
        let c = bezier_curve();

        assert!(c.sample(0).is_empty());
        assert_eq!(c.sample(1), vec![c.eval(0.0)]);

        let s = c.sample(5);
        assert_eq!(s.len(), 5);
        assert_eq!(s[0], c.eval(0.0));
        assert_eq!(s[2], c.eval(0.5));
        assert_eq!(s[4], c.eval(1.0));
    }
}
