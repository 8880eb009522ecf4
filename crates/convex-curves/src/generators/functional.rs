//! Generator for parametric curves.

use std::sync::Arc;

use super::CurveGenerator;
use crate::curves::{Curve, FunctionalCurve};
use crate::error::CurveResult;
use crate::functional_form::FunctionalForm;
use crate::instruments::InstrumentDerivative;
use crate::provider::ParameterProvider;

/// Curves of one [`FunctionalForm`].
#[derive(Debug, Clone)]
pub struct FunctionalGenerator {
    form: Arc<dyn FunctionalForm>,
}

impl FunctionalGenerator {
    /// Generator for `form`.
    #[must_use]
    pub fn new(form: Arc<dyn FunctionalForm>) -> Self {
        Self { form }
    }
}

impl CurveGenerator for FunctionalGenerator {
    fn number_of_parameters(&self) -> usize {
        self.form.number_of_parameters()
    }

    fn finalize(&self, _instruments: &[InstrumentDerivative]) -> CurveResult<Box<dyn CurveGenerator>> {
        Ok(Box::new(self.clone()))
    }

    fn generate(
        &self,
        name: &str,
        parameters: &[f64],
        _provider: &ParameterProvider,
    ) -> CurveResult<Arc<dyn Curve>> {
        Ok(Arc::new(FunctionalCurve::new(
            name,
            Arc::clone(&self.form),
            parameters.to_vec(),
        )?))
    }

    fn initial_guess(&self, rates: &[f64]) -> Vec<f64> {
        self.form.initial_guess(rates)
    }
}
