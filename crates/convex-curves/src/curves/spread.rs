//! Curves defined as a spread over another curve.

use std::sync::Arc;

use super::Curve;
use crate::error::CurveResult;

/// Zero rate `base(t) ± increment(t)`.
///
/// Only the increment's parameters belong to this curve; the base is
/// calibrated (or supplied) on its own.
#[derive(Debug, Clone)]
pub struct SpreadCurve {
    name: String,
    base: Arc<dyn Curve>,
    increment: Arc<dyn Curve>,
    sign: f64,
}

impl SpreadCurve {
    /// Base plus increment.
    pub fn over(name: impl Into<String>, base: Arc<dyn Curve>, increment: Arc<dyn Curve>) -> Self {
        Self {
            name: name.into(),
            base,
            increment,
            sign: 1.0,
        }
    }

    /// Base minus increment.
    pub fn under(name: impl Into<String>, base: Arc<dyn Curve>, increment: Arc<dyn Curve>) -> Self {
        Self {
            sign: -1.0,
            ..Self::over(name, base, increment)
        }
    }

    /// The base curve.
    #[must_use]
    pub fn base(&self) -> &Arc<dyn Curve> {
        &self.base
    }

    /// The increment curve.
    #[must_use]
    pub fn increment(&self) -> &Arc<dyn Curve> {
        &self.increment
    }
}

impl Curve for SpreadCurve {
    fn name(&self) -> &str {
        &self.name
    }

    fn zero_rate(&self, t: f64) -> CurveResult<f64> {
        Ok(self.base.zero_rate(t)? + self.sign * self.increment.zero_rate(t)?)
    }

    fn parameters(&self) -> &[f64] {
        self.increment.parameters()
    }

    fn parameter_sensitivity(&self, t: f64) -> CurveResult<Vec<f64>> {
        let mut sensitivity = self.increment.parameter_sensitivity(t)?;
        for s in &mut sensitivity {
            *s *= self.sign;
        }
        Ok(sensitivity)
    }

    fn node_times(&self) -> &[f64] {
        self.increment.node_times()
    }

    fn spread_base(&self) -> Option<&str> {
        Some(self.base.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{CurveValueKind, InterpolatedCurve};
    use approx::assert_relative_eq;
    use convex_math::interpolation::{InterpolationMethod, InterpolatorSpec};

    fn flat(name: &str, rate: f64) -> Arc<dyn Curve> {
        Arc::new(
            InterpolatedCurve::new(
                name,
                CurveValueKind::ContinuousYield,
                vec![1.0, 10.0],
                vec![rate, rate],
                InterpolatorSpec::new(InterpolationMethod::Linear),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_spread_adds_to_base() {
        let curve = SpreadCurve::over("LIBOR", flat("OIS", 0.02), flat("inc", 0.003));
        assert_relative_eq!(curve.zero_rate(5.0).unwrap(), 0.023, epsilon = 1e-14);
        assert_eq!(curve.spread_base(), Some("OIS"));
        assert_eq!(curve.parameters(), &[0.003, 0.003]);
    }

    #[test]
    fn test_subtracting_spread() {
        let curve = SpreadCurve::under("REPO", flat("OIS", 0.02), flat("inc", 0.003));
        assert_relative_eq!(curve.zero_rate(5.0).unwrap(), 0.017, epsilon = 1e-14);
        let sens = curve.parameter_sensitivity(5.0).unwrap();
        assert_relative_eq!(sens.iter().sum::<f64>(), -1.0, epsilon = 1e-14);
    }
}
