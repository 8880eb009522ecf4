//! Curves interpolated between calibrated node values.

use convex_math::interpolation::{CombinedInterpolator, InterpolatorSpec};
use serde::{Deserialize, Serialize};

use super::Curve;
use crate::error::{CurveError, CurveResult};

/// Times below this are evaluated here when a rate is backed out of a
/// discount factor.
const SMALL_TIME: f64 = 1e-6;

/// What the interpolated node values represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurveValueKind {
    /// Continuously compounded zero rates.
    #[default]
    ContinuousYield,
    /// Discount factors.
    DiscountFactor,
    /// Zero rates compounded `periods_per_year` times a year.
    PeriodicYield {
        /// Compounding frequency.
        periods_per_year: u32,
    },
}

impl CurveValueKind {
    /// Converts a continuously compounded zero rate at `t` to a node value.
    #[must_use]
    pub fn from_zero_rate(&self, rate: f64, t: f64) -> f64 {
        match *self {
            Self::ContinuousYield => rate,
            Self::DiscountFactor => (-rate * t).exp(),
            Self::PeriodicYield { periods_per_year } => {
                let n = f64::from(periods_per_year);
                n * ((rate / n).exp() - 1.0)
            }
        }
    }
}

/// A curve defined by node values at node times and an interpolator.
///
/// # Example
///
/// ```rust
/// use convex_curves::curves::{Curve, CurveValueKind, InterpolatedCurve};
/// use convex_math::interpolation::{InterpolationMethod, InterpolatorSpec};
///
/// let curve = InterpolatedCurve::new(
///     "USD-DSC",
///     CurveValueKind::ContinuousYield,
///     vec![1.0, 2.0],
///     vec![0.02, 0.03],
///     InterpolatorSpec::new(InterpolationMethod::Linear),
/// )
/// .unwrap();
/// assert!((curve.zero_rate(1.5).unwrap() - 0.025).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct InterpolatedCurve {
    name: String,
    kind: CurveValueKind,
    times: Vec<f64>,
    values: Vec<f64>,
    spec: InterpolatorSpec,
    interpolator: CombinedInterpolator,
}

impl InterpolatedCurve {
    /// Creates a curve from node times and node values.
    pub fn new(
        name: impl Into<String>,
        kind: CurveValueKind,
        times: Vec<f64>,
        values: Vec<f64>,
        spec: InterpolatorSpec,
    ) -> CurveResult<Self> {
        if let CurveValueKind::PeriodicYield { periods_per_year: 0 } = kind {
            return Err(CurveError::configuration(
                "periodic yield needs at least one period per year",
            ));
        }
        if kind == CurveValueKind::DiscountFactor && values.iter().any(|v| *v <= 0.0) {
            return Err(CurveError::calibration_failed(
                0,
                f64::NAN,
                "discount factor nodes must be positive",
            ));
        }
        let interpolator = spec.build(times.clone(), values.clone())?;
        Ok(Self {
            name: name.into(),
            kind,
            times,
            values,
            spec,
            interpolator,
        })
    }

    /// Creates a zero-rate curve, converting the rates to `kind` node values.
    pub fn from_zero_rates(
        name: impl Into<String>,
        kind: CurveValueKind,
        times: Vec<f64>,
        rates: &[f64],
        spec: InterpolatorSpec,
    ) -> CurveResult<Self> {
        let values = times
            .iter()
            .zip(rates)
            .map(|(t, r)| kind.from_zero_rate(*r, *t))
            .collect();
        Self::new(name, kind, times, values, spec)
    }

    /// What the node values represent.
    #[must_use]
    pub fn kind(&self) -> CurveValueKind {
        self.kind
    }

    /// The interpolation settings.
    #[must_use]
    pub fn spec(&self) -> &InterpolatorSpec {
        &self.spec
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        Ok(self.interpolator.value(t)?)
    }
}

impl Curve for InterpolatedCurve {
    fn name(&self) -> &str {
        &self.name
    }

    fn zero_rate(&self, t: f64) -> CurveResult<f64> {
        match self.kind {
            CurveValueKind::ContinuousYield => self.value(t),
            CurveValueKind::DiscountFactor => {
                let t = t.max(SMALL_TIME);
                let df = self.value(t)?;
                if df <= 0.0 {
                    return Err(CurveError::calibration_failed(
                        0,
                        df,
                        format!("non-positive discount factor on {} at t={t}", self.name),
                    ));
                }
                Ok(-df.ln() / t)
            }
            CurveValueKind::PeriodicYield { periods_per_year } => {
                let n = f64::from(periods_per_year);
                Ok(n * (1.0 + self.value(t)? / n).ln())
            }
        }
    }

    fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        if t <= 0.0 {
            return Ok(1.0);
        }
        match self.kind {
            CurveValueKind::DiscountFactor => self.value(t),
            _ => Ok((-self.zero_rate(t)? * t).exp()),
        }
    }

    fn parameters(&self) -> &[f64] {
        &self.values
    }

    fn parameter_sensitivity(&self, t: f64) -> CurveResult<Vec<f64>> {
        let (t, scale) = match self.kind {
            CurveValueKind::ContinuousYield => (t, 1.0),
            CurveValueKind::DiscountFactor => {
                let t = t.max(SMALL_TIME);
                (t, -1.0 / (t * self.value(t)?))
            }
            CurveValueKind::PeriodicYield { periods_per_year } => {
                let n = f64::from(periods_per_year);
                (t, 1.0 / (1.0 + self.value(t)? / n))
            }
        };
        let mut sensitivity = self.interpolator.node_sensitivity(t)?;
        for s in &mut sensitivity {
            *s *= scale;
        }
        Ok(sensitivity)
    }

    fn node_times(&self) -> &[f64] {
        &self.times
    }
}
