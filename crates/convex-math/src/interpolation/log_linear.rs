//! Log-linear interpolation.
//!
//! Interpolates the logarithm of values, which is useful for discount factors
//! as it ensures positive values and can produce more stable forward rates.

use crate::error::{MathError, MathResult};
use crate::interpolation::{check_range, find_segment, validate_nodes, Interpolator};

/// Log-linear interpolation between data points.
///
/// Interpolates the natural logarithm of y values, then exponentiates the result.
/// This is commonly used for discount factor interpolation as it:
/// - Guarantees positive interpolated values
/// - Produces piecewise constant forward rates
///
/// The interpolation formula is:
/// ```text
/// y(x) = exp(linear_interpolate(x, ln(y)))
/// ```
///
/// # Example
///
/// ```rust
/// use convex_math::interpolation::{LogLinearInterpolator, Interpolator};
///
/// // Discount factors at different maturities
/// let times = vec![0.0, 1.0, 2.0, 3.0];
/// let discount_factors = vec![1.0, 0.97, 0.94, 0.91];
///
/// let interp = LogLinearInterpolator::new(times, discount_factors).unwrap();
/// let df = interp.interpolate(1.5).unwrap();
/// assert!(df > 0.0);  // Always positive
/// ```
#[derive(Debug, Clone)]
pub struct LogLinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Precomputed log(y) values
    log_ys: Vec<f64>,
}

impl LogLinearInterpolator {
    /// Creates a new log-linear interpolator.
    ///
    /// # Arguments
    ///
    /// * `xs` - X coordinates (must be sorted in ascending order)
    /// * `ys` - Y coordinates (must all be positive)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - There are fewer than 2 points
    /// - Lengths differ
    /// - Any y value is non-positive
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;

        let mut log_ys = Vec::with_capacity(ys.len());
        for (i, &y) in ys.iter().enumerate() {
            if y <= 0.0 {
                return Err(MathError::invalid_input(format!(
                    "y[{i}] = {y} is not positive; log-linear requires positive values"
                )));
            }
            log_ys.push(y.ln());
        }

        Ok(Self { xs, ys, log_ys })
    }

    /// Returns the original y values.
    #[must_use]
    pub fn y_values(&self) -> &[f64] {
        &self.ys
    }

    fn segment(&self, x: f64) -> (usize, f64, f64) {
        let i = find_segment(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let t = (x - self.xs[i]) / h;
        (i, t, h)
    }
}

impl Interpolator for LogLinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, t, _) = self.segment(x);
        let log_y = self.log_ys[i] + t * (self.log_ys[i + 1] - self.log_ys[i]);
        Ok(log_y.exp())
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        // d/dx exp(L(x)) = exp(L(x)) * L'(x)
        let y = self.interpolate(x)?;
        let (i, _, h) = self.segment(x);
        Ok(y * (self.log_ys[i + 1] - self.log_ys[i]) / h)
    }

    fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        let y = self.interpolate(x)?;
        let (i, t, _) = self.segment(x);
        let mut sens = vec![0.0; self.xs.len()];
        sens[i] = y * (1.0 - t) / self.ys[i];
        sens[i + 1] = y * t / self.ys[i + 1];
        Ok(sens)
    }

    fn derivative_node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        let y = self.interpolate(x)?;
        let (i, t, h) = self.segment(x);
        let slope = (self.log_ys[i + 1] - self.log_ys[i]) / h;
        let mut sens = vec![0.0; self.xs.len()];
        sens[i] = y * (1.0 - t) / self.ys[i] * slope - y / (h * self.ys[i]);
        sens[i + 1] = y * t / self.ys[i + 1] * slope + y / (h * self.ys[i + 1]);
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
