//! Linear interpolation.

use crate::error::MathResult;
use crate::interpolation::{check_range, find_segment, validate_nodes, Interpolator};

/// Linear interpolation between data points.
///
/// The simplest form of interpolation, connecting consecutive points
/// with straight lines. Each interpolated value depends on the two
/// surrounding nodes only.
///
/// # Example
///
/// ```rust
/// use convex_math::interpolation::{LinearInterpolator, Interpolator};
///
/// let xs = vec![0.0, 1.0, 2.0, 3.0];
/// let ys = vec![0.0, 1.0, 4.0, 9.0];
///
/// let interp = LinearInterpolator::new(xs, ys).unwrap();
/// let y = interp.interpolate(1.5).unwrap();
/// assert!((y - 2.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolator {
    /// Creates a new linear interpolator.
    ///
    /// # Arguments
    ///
    /// * `xs` - X coordinates (must be sorted in ascending order)
    /// * `ys` - Y coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points or if lengths differ.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;
        Ok(Self { xs, ys })
    }

    fn weights(&self, x: f64) -> (usize, f64) {
        let i = find_segment(&self.xs, x);
        let t = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        (i, t)
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, t) = self.weights(x);
        Ok(self.ys[i] + t * (self.ys[i + 1] - self.ys[i]))
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let i = find_segment(&self.xs, x);
        Ok((self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i]))
    }

    fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x)?;
        let (i, t) = self.weights(x);
        let mut sens = vec![0.0; self.xs.len()];
        sens[i] = 1.0 - t;
        sens[i + 1] = t;
        Ok(sens)
    }

    fn derivative_node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x)?;
        let i = find_segment(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let mut sens = vec![0.0; self.xs.len()];
        sens[i] = -1.0 / h;
        sens[i + 1] = 1.0 / h;
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_interpolation() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![0.0, 1.0, 4.0, 9.0];

        let interp = LinearInterpolator::new(xs, ys).unwrap();

        // At data points
        assert_relative_eq!(interp.interpolate(0.0).unwrap(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(interp.interpolate(2.0).unwrap(), 4.0, epsilon = 1e-10);
        assert_relative_eq!(interp.interpolate(3.0).unwrap(), 9.0, epsilon = 1e-10);

        // Between points
        assert_relative_eq!(interp.interpolate(0.5).unwrap(), 0.5, epsilon = 1e-10);
        assert_relative_eq!(interp.interpolate(2.5).unwrap(), 6.5, epsilon = 1e-10);
    }

    #[test]
    fn test_linear_derivative() {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 2.0, 6.0];

        let interp = LinearInterpolator::new(xs, ys).unwrap();

        assert_relative_eq!(interp.derivative(0.5).unwrap(), 2.0, epsilon = 1e-10);
        assert_relative_eq!(interp.derivative(1.5).unwrap(), 4.0, epsilon = 1e-10);
    }

    #[test]
    fn test_node_sensitivity_is_local() {
        let interp = LinearInterpolator::new(vec![0.0, 1.0, 2.0, 4.0], vec![1.0, 2.0, 3.0, 4.0])
            .unwrap();
        let sens = interp.node_sensitivity(1.25).unwrap();
        assert_eq!(sens, vec![0.0, 0.75, 0.25, 0.0]);

        let dsens = interp.derivative_node_sensitivity(3.0).unwrap();
        assert_relative_eq!(dsens[2], -0.5);
        assert_relative_eq!(dsens[3], 0.5);
    }

    #[test]
    fn test_extrapolation_disallowed() {
        let interp = LinearInterpolator::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        assert!(interp.interpolate(-0.5).is_err());
        assert!(interp.interpolate(1.5).is_err());
    }

    #[test]
    fn test_insufficient_points() {
        assert!(LinearInterpolator::new(vec![0.0], vec![0.0]).is_err());
    }

    #[test]
    fn test_unsorted_xs() {
        assert!(LinearInterpolator::new(vec![0.0, 2.0, 1.0], vec![0.0, 1.0, 2.0]).is_err());
    }
}
