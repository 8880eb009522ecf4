//! Interpolator paired with left and right extrapolation.

use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};
use crate::extrapolation::{ExtrapolationMethod, Extrapolator};
use crate::interpolation::{InterpolationMethod, Interpolator};

/// Description of an interpolator and its extrapolators.
///
/// This is the serializable, cloneable form that configuration holds;
/// [`build`](InterpolatorSpec::build) turns it into a live
/// [`CombinedInterpolator`] once node values are known.
///
/// ```rust
/// use convex_math::extrapolation::ExtrapolationMethod;
/// use convex_math::interpolation::{InterpolationMethod, InterpolatorSpec};
///
/// let spec = InterpolatorSpec::new(InterpolationMethod::MonotoneCubic)
///     .with_extrapolation(ExtrapolationMethod::Linear, ExtrapolationMethod::Linear);
/// let interp = spec.build(vec![0.5, 1.0], vec![0.015, 0.018]).unwrap();
/// assert!((interp.value(2.0).unwrap() - 0.024).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InterpolatorSpec {
    /// Interpolation inside the node range.
    pub method: InterpolationMethod,
    /// Extrapolation below the first node.
    pub left: ExtrapolationMethod,
    /// Extrapolation above the last node.
    pub right: ExtrapolationMethod,
}

impl InterpolatorSpec {
    /// Spec with flat extrapolation on both sides.
    #[must_use]
    pub fn new(method: InterpolationMethod) -> Self {
        Self {
            method,
            left: ExtrapolationMethod::Flat,
            right: ExtrapolationMethod::Flat,
        }
    }

    /// Sets the left and right extrapolation methods.
    #[must_use]
    pub fn with_extrapolation(mut self, left: ExtrapolationMethod, right: ExtrapolationMethod) -> Self {
        self.left = left;
        self.right = right;
        self
    }

    /// Builds the interpolator through the given nodes.
    pub fn build(&self, xs: Vec<f64>, ys: Vec<f64>) -> MathResult<CombinedInterpolator> {
        Ok(CombinedInterpolator {
            inner: self.method.build(xs, ys)?,
            left: self.left.extrapolator(),
            right: self.right.extrapolator(),
        })
    }
}

/// An interpolator that extrapolates outside its node range.
#[derive(Debug)]
pub struct CombinedInterpolator {
    inner: Box<dyn Interpolator>,
    left: Option<Box<dyn Extrapolator>>,
    right: Option<Box<dyn Extrapolator>>,
}

impl CombinedInterpolator {
    fn edge(&self, x: f64) -> MathResult<Option<(f64, &dyn Extrapolator)>> {
        let (min, max) = (self.inner.min_x(), self.inner.max_x());
        let (edge, extrapolator) = if x < min {
            (min, self.left.as_deref())
        } else if x > max {
            (max, self.right.as_deref())
        } else {
            return Ok(None);
        };
        extrapolator
            .map(|e| Some((edge, e)))
            .ok_or(MathError::ExtrapolationNotAllowed { x, min, max })
    }

    /// Value at x.
    pub fn value(&self, x: f64) -> MathResult<f64> {
        match self.edge(x)? {
            None => self.inner.interpolate(x),
            Some((edge, extrapolator)) => Ok(extrapolator.extrapolate(
                x,
                edge,
                self.inner.interpolate(edge)?,
                self.inner.derivative(edge)?,
            )),
        }
    }

    /// First derivative at x.
    pub fn first_derivative(&self, x: f64) -> MathResult<f64> {
        match self.edge(x)? {
            None => self.inner.derivative(x),
            Some((edge, extrapolator)) => {
                let value = self.inner.interpolate(edge)?;
                let slope = self.inner.derivative(edge)?;
                let h = 1e-6;
                Ok((extrapolator.extrapolate(x + h, edge, value, slope)
                    - extrapolator.extrapolate(x - h, edge, value, slope))
                    / (2.0 * h))
            }
        }
    }

    /// `∂value(x)/∂y_i` for each node.
    pub fn node_sensitivity(&self, x: f64) -> MathResult<Vec<f64>> {
        match self.edge(x)? {
            None => self.inner.node_sensitivity(x),
            Some((edge, extrapolator)) => Ok(extrapolator.node_sensitivity(
                x,
                edge,
                &self.inner.node_sensitivity(edge)?,
                &self.inner.derivative_node_sensitivity(edge)?,
            )),
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if there are no nodes; never the case for a built interpolator.
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }
}
