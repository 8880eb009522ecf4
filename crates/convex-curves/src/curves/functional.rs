//! Curves given by a parametric family.

use std::sync::Arc;

use super::Curve;
use crate::error::{CurveError, CurveResult};
use crate::functional_form::FunctionalForm;

/// A curve whose zero rates come from a [`FunctionalForm`] and a parameter
/// vector.
#[derive(Debug, Clone)]
pub struct FunctionalCurve {
    name: String,
    form: Arc<dyn FunctionalForm>,
    parameters: Vec<f64>,
}

impl FunctionalCurve {
    /// Creates the curve, checking the parameter count against the family.
    pub fn new(
        name: impl Into<String>,
        form: Arc<dyn FunctionalForm>,
        parameters: Vec<f64>,
    ) -> CurveResult<Self> {
        if parameters.len() != form.number_of_parameters() {
            return Err(CurveError::configuration(format!(
                "{} takes {} parameters, got {}",
                form.name(),
                form.number_of_parameters(),
                parameters.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            form,
            parameters,
        })
    }

    /// The family.
    #[must_use]
    pub fn form(&self) -> &Arc<dyn FunctionalForm> {
        &self.form
    }
}

impl Curve for FunctionalCurve {
    fn name(&self) -> &str {
        &self.name
    }

    fn zero_rate(&self, t: f64) -> CurveResult<f64> {
        self.form.zero_rate(&self.parameters, t)
    }

    fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    fn parameter_sensitivity(&self, t: f64) -> CurveResult<Vec<f64>> {
        self.form.parameter_sensitivity(&self.parameters, t)
    }
}
