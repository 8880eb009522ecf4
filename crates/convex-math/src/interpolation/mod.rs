//! Interpolation methods for curve construction.
//!
//! Every interpolator exposes, besides its value and first derivative, the
//! sensitivity of the interpolated value to each node value. Calibration
//! uses these to build the Jacobian of the instrument residuals with respect
//! to the curve parameters.
//!
//! # Available Methods
//!
//! - [`LinearInterpolator`]: Piecewise linear
//! - [`LogLinearInterpolator`]: Linear on the logarithm of values (positive data)
//! - [`CubicSpline`]: Natural cubic spline
//! - [`MonotoneCubic`]: Shape-preserving Hermite cubic (Fritsch-Carlson slopes)
//!
//! Out-of-range behaviour is handled by [`CombinedInterpolator`], which pairs
//! an interpolator with left and right extrapolators.
//!
//! | Method | Smoothness | Monotone | Node sensitivity |
//! |--------|------------|----------|------------------|
//! | Linear | C0 | Yes | Analytic, local |
//! | Log-Linear | C0 | Yes | Analytic, local |
//! | Cubic Spline | C2 | No | Analytic, global |
//! | Monotone Cubic | C1 | Yes | Finite difference, local |

mod combined;
mod cubic_spline;
mod linear;
mod log_linear;
mod monotone_cubic;
mod parametric;

pub use combined::{CombinedInterpolator, InterpolatorSpec};
pub use cubic_spline::CubicSpline;
pub use linear::LinearInterpolator;
pub use log_linear::LogLinearInterpolator;
pub use monotone_cubic::MonotoneCubic;
pub use parametric::{NelsonSiegel, Svensson};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MathError, MathResult};

/// Trait for interpolation methods.
///
/// Implementations are only required to be valid inside `[min_x, max_x]`;
/// callers outside that range should go through [`CombinedInterpolator`].
pub trait Interpolator: Send + Sync + fmt::Debug {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// Returns the first derivative at x.
    fn derivative(&self, x: f64) -> MathResult<f64>;

    /// Returns `∂y(x)/∂y_i` for every node `i`.
    fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>>;

    /// Returns `∂y'(x)/∂y_i` for every node `i`.
    ///
    /// The default takes a one-sided or central difference of
    /// [`node_sensitivity`](Interpolator::node_sensitivity), staying inside
    /// the data range.
    fn derivative_node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        let h = 1e-6 * (self.max_x() - self.min_x()).max(1.0);
        let lo = (x - h).max(self.min_x());
        let hi = (x + h).min(self.max_x());
        let below = self.node_sensitivity(lo)?;
        let above = self.node_sensitivity(hi)?;
        Ok(below
            .iter()
            .zip(&above)
            .map(|(b, a)| (a - b) / (hi - lo))
            .collect())
    }

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64;

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64;

    /// Number of nodes.
    fn len(&self) -> usize;

    /// Checks if x is within the interpolation range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

/// Interpolation method selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InterpolationMethod {
    /// Piecewise linear.
    #[default]
    Linear,
    /// Linear on log values.
    LogLinear,
    /// Natural cubic spline.
    NaturalCubicSpline,
    /// Monotonicity-preserving cubic.
    MonotoneCubic,
}

impl InterpolationMethod {
    /// Minimum number of nodes the method accepts.
    #[must_use]
    pub fn min_points(&self) -> usize {
        match self {
            Self::NaturalCubicSpline => 3,
            Self::Linear | Self::LogLinear | Self::MonotoneCubic => 2,
        }
    }

    /// Builds an interpolator of this kind through the given nodes.
    pub fn build(&self, xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Box<dyn Interpolator>> {
        Ok(match self {
            Self::Linear => Box::new(LinearInterpolator::new(xs, ys)?),
            Self::LogLinear => Box::new(LogLinearInterpolator::new(xs, ys)?),
            Self::NaturalCubicSpline => Box::new(CubicSpline::new(xs, ys)?),
            Self::MonotoneCubic => Box::new(MonotoneCubic::new(xs, ys)?),
        })
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linear => "Linear",
            Self::LogLinear => "LogLinear",
            Self::NaturalCubicSpline => "NaturalCubicSpline",
            Self::MonotoneCubic => "MonotoneCubic",
        };
        f.write_str(name)
    }
}

/// Validates node arrays shared by all interpolators.
pub(crate) fn validate_nodes(xs: &[f64], ys: &[f64], min_points: usize) -> MathResult<()> {
    if xs.len() < min_points {
        return Err(MathError::insufficient_data(min_points, xs.len()));
    }
    if xs.len() != ys.len() {
        return Err(MathError::invalid_input(format!(
            "xs and ys must have same length: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("node values must be finite"));
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MathError::invalid_input(
            "x values must be strictly increasing",
        ));
    }
    Ok(())
}

/// Finds the index i such that xs[i] <= x < xs[i+1], clamped to valid segments.
pub(crate) fn find_segment(xs: &[f64], x: f64) -> usize {
    let last = xs.len() - 2;
    match xs.binary_search_by(|probe| probe.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal)) {
        Ok(i) => i.min(last),
        Err(i) => i.saturating_sub(1).min(last),
    }
}

pub(crate) fn check_range(xs: &[f64], x: f64) -> MathResult<()> {
    let (min, max) = (xs[0], xs[xs.len() - 1]);
    if x < min || x > max {
        return Err(MathError::ExtrapolationNotAllowed { x, min, max });
    }
    Ok(())
}
