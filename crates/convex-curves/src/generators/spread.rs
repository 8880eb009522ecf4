//! Generator for curves quoted as a spread over another curve.

use std::sync::Arc;

use super::CurveGenerator;
use crate::curves::{Curve, SpreadCurve};
use crate::error::{CurveError, CurveResult};
use crate::instruments::InstrumentDerivative;
use crate::provider::ParameterProvider;

/// Base curve (looked up by name) plus or minus a generated increment.
///
/// The base must be in the provider when the curve is generated: known
/// data, an earlier block, or an earlier curve of the same unit.
#[derive(Debug)]
pub struct SpreadGenerator {
    base: String,
    increment: Box<dyn CurveGenerator>,
    subtract: bool,
}

impl SpreadGenerator {
    /// `base + increment`.
    pub fn new(base: impl Into<String>, increment: Box<dyn CurveGenerator>) -> Self {
        Self {
            base: base.into(),
            increment,
            subtract: false,
        }
    }

    /// `base - increment`.
    pub fn subtracting(base: impl Into<String>, increment: Box<dyn CurveGenerator>) -> Self {
        Self {
            subtract: true,
            ..Self::new(base, increment)
        }
    }

    /// Name of the base curve.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }
}

impl CurveGenerator for SpreadGenerator {
    fn number_of_parameters(&self) -> usize {
        self.increment.number_of_parameters()
    }

    fn finalize(&self, instruments: &[InstrumentDerivative]) -> CurveResult<Box<dyn CurveGenerator>> {
        Ok(Box::new(Self {
            base: self.base.clone(),
            increment: self.increment.finalize(instruments)?,
            subtract: self.subtract,
        }))
    }

    fn generate(
        &self,
        name: &str,
        parameters: &[f64],
        provider: &ParameterProvider,
    ) -> CurveResult<Arc<dyn Curve>> {
        let base = provider.curve(&self.base).map_err(|_| {
            CurveError::calibration_failed(
                0,
                f64::NAN,
                format!("base curve {} of spread curve {name} is not available", self.base),
            )
        })?;
        let increment =
            self.increment
                .generate(&format!("{name} increment"), parameters, provider)?;
        Ok(Arc::new(if self.subtract {
            SpreadCurve::under(name, Arc::clone(base), increment)
        } else {
            SpreadCurve::over(name, Arc::clone(base), increment)
        }))
    }

    fn initial_guess(&self, rates: &[f64]) -> Vec<f64> {
        self.increment.initial_guess(&vec![0.0; rates.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{CurveValueKind, InterpolatedCurve};
    use crate::error::ErrorKind;
    use crate::generators::InterpolatedGenerator;
    use crate::provider::CurveRoles;
    use approx::assert_relative_eq;
    use convex_core::types::Currency;
    use convex_math::interpolation::{InterpolationMethod, InterpolatorSpec};

    fn increment() -> Box<dyn CurveGenerator> {
        Box::new(
            InterpolatedGenerator::with_node_times(
                CurveValueKind::ContinuousYield,
                InterpolatorSpec::new(InterpolationMethod::Linear),
                vec![1.0, 2.0],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_spread_over_base() {
        let base = InterpolatedCurve::new(
            "OIS",
            CurveValueKind::ContinuousYield,
            vec![1.0, 2.0],
            vec![0.02, 0.03],
            InterpolatorSpec::new(InterpolationMethod::Linear),
        )
        .unwrap();
        let provider = ParameterProvider::new()
            .with_curve(Arc::new(base), &CurveRoles::discounting(Currency::USD))
            .unwrap();
        let generator = SpreadGenerator::new("OIS", increment());
        assert_eq!(generator.initial_guess(&[0.025, 0.035]), vec![0.0, 0.0]);

        let curve = generator
            .generate("LIBOR", &[0.001, 0.002], &provider)
            .unwrap();
        assert_relative_eq!(curve.zero_rate(2.0).unwrap(), 0.032, epsilon = 1e-14);
        assert_eq!(curve.spread_base(), Some("OIS"));
    }

    #[test]
    fn test_missing_base_is_calibration_error() {
        let err = SpreadGenerator::subtracting("OIS", increment())
            .generate("REPO", &[0.001, 0.002], &ParameterProvider::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Calibration);
    }
}
