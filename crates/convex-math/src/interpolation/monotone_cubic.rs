//! Monotonicity-preserving cubic Hermite interpolation.

use crate::error::MathResult;
use crate::interpolation::{check_range, find_segment, validate_nodes, Interpolator};

/// Relative bump used to differentiate the knot slopes.
const SLOPE_BUMP: f64 = 1e-7;

/// Piecewise cubic Hermite interpolation with Fritsch-Carlson slopes.
///
/// Interior slopes are the weighted harmonic mean of the adjacent secants,
/// or zero where the data changes direction, so monotone data gives a
/// monotone interpolant with no overshoot. End slopes use the one-sided
/// three-point formula, clamped to keep the shape.
///
/// ```rust
/// use convex_math::interpolation::{Interpolator, MonotoneCubic};
///
/// let interp = MonotoneCubic::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 1.0]).unwrap();
/// // No overshoot above the plateau
/// assert!(interp.interpolate(1.5).unwrap() <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct MonotoneCubic {
    xs: Vec<f64>,
    ys: Vec<f64>,
    slopes: Vec<f64>,
    /// `slope_sens[j][k]` = ∂slopes[j]/∂ys[k]
    slope_sens: Vec<Vec<f64>>,
}

impl MonotoneCubic {
    /// Creates the interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points, lengths differ,
    /// or xs are not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;
        let slopes = knot_slopes(&xs, &ys);

        let n = xs.len();
        let mut slope_sens = vec![vec![0.0; n]; n];
        let mut bumped = ys.clone();
        for k in 0..n {
            let bump = SLOPE_BUMP * ys[k].abs().max(1.0);
            bumped[k] = ys[k] + bump;
            let up = knot_slopes(&xs, &bumped);
            bumped[k] = ys[k] - bump;
            let down = knot_slopes(&xs, &bumped);
            bumped[k] = ys[k];
            for j in 0..n {
                slope_sens[j][k] = (up[j] - down[j]) / (2.0 * bump);
            }
        }

        Ok(Self {
            xs,
            ys,
            slopes,
            slope_sens,
        })
    }

    /// Knot slopes.
    #[must_use]
    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    fn segment(&self, x: f64) -> (usize, f64, f64) {
        let i = find_segment(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        (i, h, (x - self.xs[i]) / h)
    }
}

/// Hermite basis values `(h00, h10, h01, h11)` at `t`.
fn basis(t: f64) -> (f64, f64, f64, f64) {
    let t2 = t * t;
    let t3 = t2 * t;
    (
        2.0 * t3 - 3.0 * t2 + 1.0,
        t3 - 2.0 * t2 + t,
        -2.0 * t3 + 3.0 * t2,
        t3 - t2,
    )
}

/// Derivatives of the Hermite basis with respect to `t`.
fn basis_derivative(t: f64) -> (f64, f64, f64, f64) {
    let t2 = t * t;
    (
        6.0 * t2 - 6.0 * t,
        3.0 * t2 - 4.0 * t + 1.0,
        -6.0 * t2 + 6.0 * t,
        3.0 * t2 - 2.0 * t,
    )
}

fn knot_slopes(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let d: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

    if n == 2 {
        return vec![d[0], d[0]];
    }

    let mut m = vec![0.0; n];
    for k in 1..n - 1 {
        if d[k - 1] * d[k] > 0.0 {
            let w1 = 2.0 * h[k] + h[k - 1];
            let w2 = h[k] + 2.0 * h[k - 1];
            m[k] = (w1 + w2) / (w1 / d[k - 1] + w2 / d[k]);
        }
    }
    m[0] = end_slope(h[0], h[1], d[0], d[1]);
    m[n - 1] = end_slope(h[n - 2], h[n - 3], d[n - 2], d[n - 3]);
    m
}

fn end_slope(h0: f64, h1: f64, d0: f64, d1: f64) -> f64 {
    let m = ((2.0 * h0 + h1) * d0 - h0 * d1) / (h0 + h1);
    if m * d0 <= 0.0 {
        0.0
    } else if d0 * d1 < 0.0 && m.abs() > 3.0 * d0.abs() {
        3.0 * d0
    } else {
        m
    }
}

impl Interpolator for MonotoneCubic {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, h, t) = self.segment(x);
        let (h00, h10, h01, h11) = basis(t);
        Ok(h00 * self.ys[i]
            + h10 * h * self.slopes[i]
            + h01 * self.ys[i + 1]
            + h11 * h * self.slopes[i + 1])
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, h, t) = self.segment(x);
        let (d00, d10, d01, d11) = basis_derivative(t);
        Ok((d00 * self.ys[i] + d01 * self.ys[i + 1]) / h
            + d10 * self.slopes[i]
            + d11 * self.slopes[i + 1])
    }

    fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x)?;
        let (i, h, t) = self.segment(x);
        let (h00, h10, h01, h11) = basis(t);
        let mut sens: Vec<f64> = (0..self.xs.len())
            .map(|k| h10 * h * self.slope_sens[i][k] + h11 * h * self.slope_sens[i + 1][k])
            .collect();
        sens[i] += h00;
        sens[i + 1] += h01;
        Ok(sens)
    }

    fn derivative_node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x)?;
        let (i, h, t) = self.segment(x);
        let (d00, d10, d01, d11) = basis_derivative(t);
        let mut sens: Vec<f64> = (0..self.xs.len())
            .map(|k| d10 * self.slope_sens[i][k] + d11 * self.slope_sens[i + 1][k])
            .collect();
        sens[i] += d00 / h;
        sens[i + 1] += d01 / h;
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
