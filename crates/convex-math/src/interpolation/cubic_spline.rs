//! Natural cubic spline interpolation.

use crate::error::MathResult;
use crate::interpolation::{check_range, find_segment, validate_nodes, Interpolator};
use crate::linear_algebra::solve_tridiagonal;

/// Natural cubic spline interpolation.
///
/// Constructs a smooth curve through data points using piecewise cubic
/// polynomials with continuous first and second derivatives.
///
/// "Natural" means the second derivative is zero at the endpoints.
///
/// The knot second derivatives are a linear function of the node values,
/// so their sensitivities are solved once at construction.
///
/// # Example
///
/// ```rust
/// use convex_math::interpolation::{CubicSpline, Interpolator};
///
/// let xs = vec![0.0, 1.0, 2.0, 3.0];
/// let ys = vec![0.0, 1.0, 4.0, 9.0];
///
/// let spline = CubicSpline::new(xs, ys).unwrap();
/// let y = spline.interpolate(1.5).unwrap();
/// assert!(y > 1.0 && y < 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot
    y2s: Vec<f64>,
    /// `y2_sens[j][k]` = ∂y2s[j]/∂ys[k]
    y2_sens: Vec<Vec<f64>>,
}

impl CubicSpline {
    /// Creates a natural cubic spline interpolator.
    ///
    /// # Arguments
    ///
    /// * `xs` - X coordinates (must be sorted in ascending order)
    /// * `ys` - Y coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 3 points or if lengths differ.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 3)?;

        let y2s = compute_second_derivatives(&xs, &ys)?;

        let n = xs.len();
        let mut y2_sens = vec![vec![0.0; n]; n];
        let mut unit = vec![0.0; n];
        for k in 0..n {
            unit[k] = 1.0;
            let column = compute_second_derivatives(&xs, &unit)?;
            for (j, value) in column.into_iter().enumerate() {
                y2_sens[j][k] = value;
            }
            unit[k] = 0.0;
        }

        Ok(Self {
            xs,
            ys,
            y2s,
            y2_sens,
        })
    }

    fn segment(&self, x: f64) -> (usize, f64, f64, f64) {
        let i = find_segment(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;
        (i, h, a, b)
    }
}

impl Interpolator for CubicSpline {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, h, a, b) = self.segment(x);

        // Cubic spline formula
        let y = a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.y2s[i] + (b * b * b - b) * self.y2s[i + 1]) * (h * h) / 6.0;

        Ok(y)
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, h, a, b) = self.segment(x);

        Ok((self.ys[i + 1] - self.ys[i]) / h - (3.0 * a * a - 1.0) / 6.0 * h * self.y2s[i]
            + (3.0 * b * b - 1.0) / 6.0 * h * self.y2s[i + 1])
    }

    fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x)?;
        let (i, h, a, b) = self.segment(x);
        let ca = (a * a * a - a) * h * h / 6.0;
        let cb = (b * b * b - b) * h * h / 6.0;

        let mut sens: Vec<f64> = (0..self.xs.len())
            .map(|k| ca * self.y2_sens[i][k] + cb * self.y2_sens[i + 1][k])
            .collect();
        sens[i] += a;
        sens[i + 1] += b;
        Ok(sens)
    }

    fn derivative_node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x)?;
        let (i, h, a, b) = self.segment(x);
        let ca = -(3.0 * a * a - 1.0) / 6.0 * h;
        let cb = (3.0 * b * b - 1.0) / 6.0 * h;

        let mut sens: Vec<f64> = (0..self.xs.len())
            .map(|k| ca * self.y2_sens[i][k] + cb * self.y2_sens[i + 1][k])
            .collect();
        sens[i] -= 1.0 / h;
        sens[i + 1] += 1.0 / h;
        Ok(sens)
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }

    fn len(&self) -> usize {
        self.xs.len()
    }
}

/// Computes the second derivatives for natural cubic spline.
///
/// Interior knots satisfy
/// `h[i-1] M[i-1] + 2 (h[i-1] + h[i]) M[i] + h[i] M[i+1] = 6 (s[i] - s[i-1])`
/// with `M[0] = M[n-1] = 0`.
fn compute_second_derivatives(xs: &[f64], ys: &[f64]) -> MathResult<Vec<f64>> {
    let n = xs.len();
    let m = n - 2;
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let slopes: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

    let lower: Vec<f64> = (1..m).map(|r| h[r]).collect();
    let diag: Vec<f64> = (0..m).map(|r| 2.0 * (h[r] + h[r + 1])).collect();
    let upper: Vec<f64> = (0..m.saturating_sub(1)).map(|r| h[r + 1]).collect();
    let rhs: Vec<f64> = (0..m).map(|r| 6.0 * (slopes[r + 1] - slopes[r])).collect();

    let interior = solve_tridiagonal(&lower, &diag, &upper, &rhs)?;

    let mut y2s = vec![0.0; n];
    y2s[1..n - 1].copy_from_slice(&interior);
    Ok(y2s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cubic_spline_through_points() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![0.0, 1.0, 4.0, 9.0];

        let spline = CubicSpline::new(xs.clone(), ys.clone()).unwrap();

        // Should pass through all data points
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_relative_eq!(spline.interpolate(*x).unwrap(), *y, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_natural_boundary() {
        let spline =
            CubicSpline::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 4.0, 9.0]).unwrap();
        assert_eq!(spline.y2s[0], 0.0);
        assert_eq!(spline.y2s[3], 0.0);
    }

    #[test]
    fn test_reproduces_straight_line() {
        let xs = vec![0.0, 0.5, 2.0, 3.0, 7.0];
        let ys: Vec<f64> = xs.iter().map(|x| 1.0 + 2.0 * x).collect();
        let spline = CubicSpline::new(xs, ys).unwrap();
        assert_relative_eq!(spline.interpolate(4.2).unwrap(), 9.4, epsilon = 1e-10);
        assert_relative_eq!(spline.derivative(1.1).unwrap(), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_cubic_spline_smoothness() {
        let xs = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = vec![0.0, 1.0, 0.0, 1.0, 0.0];

        let spline = CubicSpline::new(xs, ys).unwrap();

        // Continuous first derivative at an interior knot
        let left = spline.derivative(2.0 - 1e-9).unwrap();
        let right = spline.derivative(2.0 + 1e-9).unwrap();
        assert_relative_eq!(left, right, epsilon = 1e-6);
    }

    #[test]
    fn test_node_sensitivities_sum_to_one() {
        // Shifting every node by the same amount shifts the spline by that amount.
        let spline =
            CubicSpline::new(vec![0.0, 1.0, 2.5, 4.0], vec![0.01, 0.02, 0.015, 0.03]).unwrap();
        let total: f64 = spline.node_sensitivity(1.7).unwrap().iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        let total_d: f64 = spline.derivative_node_sensitivity(1.7).unwrap().iter().sum();
        assert_relative_eq!(total_d, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cubic_spline_extrapolation_error() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![0.0, 1.0, 4.0, 9.0];

        let spline = CubicSpline::new(xs, ys).unwrap();

        assert!(spline.interpolate(-0.5).is_err());
        assert!(spline.interpolate(3.5).is_err());
    }

    #[test]
    fn test_insufficient_points() {
        let xs = vec![0.0, 1.0];
        let ys = vec![0.0, 1.0];

        // Cubic spline needs at least 3 points
        assert!(CubicSpline::new(xs, ys).is_err());
    }
}
