//! Generator for interpolated curves.

use std::sync::Arc;

use convex_math::interpolation::InterpolatorSpec;

use super::CurveGenerator;
use crate::curves::{Curve, CurveValueKind, InterpolatedCurve};
use crate::error::{CurveError, CurveResult};
use crate::instruments::{InstrumentDerivative, NodeTimeCalculator};
use crate::provider::ParameterProvider;

/// Interpolated curve with node times either given up front or taken from
/// the instruments.
#[derive(Debug, Clone)]
pub struct InterpolatedGenerator {
    kind: CurveValueKind,
    spec: InterpolatorSpec,
    node_time: NodeTimeCalculator,
    times: Option<Vec<f64>>,
    fixed_times: bool,
}

impl InterpolatedGenerator {
    /// Node times from the instruments via `node_time`.
    #[must_use]
    pub fn new(kind: CurveValueKind, spec: InterpolatorSpec, node_time: NodeTimeCalculator) -> Self {
        Self {
            kind,
            spec,
            node_time,
            times: None,
            fixed_times: false,
        }
    }

    /// Fixed node times.
    pub fn with_node_times(
        kind: CurveValueKind,
        spec: InterpolatorSpec,
        times: Vec<f64>,
    ) -> CurveResult<Self> {
        check_increasing(&times)?;
        Ok(Self {
            kind,
            spec,
            node_time: NodeTimeCalculator::default(),
            times: Some(times),
            fixed_times: true,
        })
    }

    /// Node times, once known.
    #[must_use]
    pub fn node_times(&self) -> Option<&[f64]> {
        self.times.as_deref()
    }
}

fn check_increasing(times: &[f64]) -> CurveResult<()> {
    if let Some(w) = times.windows(2).find(|w| w[1] <= w[0]) {
        return Err(CurveError::configuration(format!(
            "node times must be strictly increasing, got {} then {}",
            w[0], w[1]
        )));
    }
    Ok(())
}

impl CurveGenerator for InterpolatedGenerator {
    fn number_of_parameters(&self) -> usize {
        self.times.as_ref().map_or(0, Vec::len)
    }

    fn finalize(&self, instruments: &[InstrumentDerivative]) -> CurveResult<Box<dyn CurveGenerator>> {
        if self.fixed_times {
            return Ok(Box::new(self.clone()));
        }
        let times: Vec<f64> = instruments
            .iter()
            .map(|i| self.node_time.node_time(i))
            .collect();
        check_increasing(&times)?;
        Ok(Box::new(Self {
            times: Some(times),
            ..self.clone()
        }))
    }

    fn generate(
        &self,
        name: &str,
        parameters: &[f64],
        _provider: &ParameterProvider,
    ) -> CurveResult<Arc<dyn Curve>> {
        let times = self.times.clone().ok_or_else(|| {
            CurveError::configuration(format!("node times of {name} are not set"))
        })?;
        Ok(Arc::new(InterpolatedCurve::new(
            name,
            self.kind,
            times,
            parameters.to_vec(),
            self.spec,
        )?))
    }

    fn initial_guess(&self, rates: &[f64]) -> Vec<f64> {
        match &self.times {
            Some(times) => rates
                .iter()
                .zip(times)
                .map(|(r, t)| self.kind.from_zero_rate(*r, *t))
                .collect(),
            None => rates.to_vec(),
        }
    }
}
