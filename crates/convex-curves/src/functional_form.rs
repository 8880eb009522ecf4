//! Parametric curve families and their registry.
//!
//! A [`FunctionalForm`] maps a parameter vector to a zero-rate function.
//! Families are registered under a case-insensitive name so that a curve
//! type can ask for one by name:
//!
//! ```rust
//! use convex_curves::functional_form::{functional_form, registered_functional_forms};
//!
//! assert!(functional_form("Nelson-Siegel").is_some());
//! assert!(registered_functional_forms().contains(&"nelson-siegel-svensson".to_string()));
//! ```
//!
//! Additional families can be added at runtime with
//! [`register_functional_form`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use convex_math::interpolation::{NelsonSiegel, Svensson};
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::CurveResult;

/// A parametric zero-rate family.
pub trait FunctionalForm: Send + Sync + fmt::Debug {
    /// Registry name.
    fn name(&self) -> &str;

    /// Number of parameters of the family.
    fn number_of_parameters(&self) -> usize;

    /// Continuously compounded zero rate at `t`.
    fn zero_rate(&self, parameters: &[f64], t: f64) -> CurveResult<f64>;

    /// `∂zero_rate(t)/∂p_i`.
    fn parameter_sensitivity(&self, parameters: &[f64], t: f64) -> CurveResult<Vec<f64>>;

    /// Starting parameters given market rates ordered by node time.
    fn initial_guess(&self, rates: &[f64]) -> Vec<f64>;
}

/// Nelson-Siegel with parameters `[β₀, β₁, β₂, τ]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NelsonSiegelForm;

impl FunctionalForm for NelsonSiegelForm {
    fn name(&self) -> &str {
        "nelson-siegel"
    }

    fn number_of_parameters(&self) -> usize {
        NelsonSiegel::PARAMETERS
    }

    fn zero_rate(&self, parameters: &[f64], t: f64) -> CurveResult<f64> {
        Ok(NelsonSiegel::from_parameters(parameters)?.zero_rate(t))
    }

    fn parameter_sensitivity(&self, parameters: &[f64], t: f64) -> CurveResult<Vec<f64>> {
        Ok(NelsonSiegel::from_parameters(parameters)?.parameter_gradient(t))
    }

    fn initial_guess(&self, rates: &[f64]) -> Vec<f64> {
        let (short, long) = end_rates(rates);
        vec![long, short - long, 0.0, 2.0]
    }
}

/// Svensson with parameters `[β₀, β₁, β₂, β₃, τ₁, τ₂]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvenssonForm;

impl FunctionalForm for SvenssonForm {
    fn name(&self) -> &str {
        "nelson-siegel-svensson"
    }

    fn number_of_parameters(&self) -> usize {
        Svensson::PARAMETERS
    }

    fn zero_rate(&self, parameters: &[f64], t: f64) -> CurveResult<f64> {
        Ok(Svensson::from_parameters(parameters)?.zero_rate(t))
    }

    fn parameter_sensitivity(&self, parameters: &[f64], t: f64) -> CurveResult<Vec<f64>> {
        Ok(Svensson::from_parameters(parameters)?.parameter_gradient(t))
    }

    fn initial_guess(&self, rates: &[f64]) -> Vec<f64> {
        let (short, long) = end_rates(rates);
        vec![long, short - long, 0.0, 0.0, 2.0, 5.0]
    }
}

fn end_rates(rates: &[f64]) -> (f64, f64) {
    match (rates.first(), rates.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => (0.0, 0.0),
    }
}

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<dyn FunctionalForm>>>> = Lazy::new(|| {
    let mut forms: HashMap<String, Arc<dyn FunctionalForm>> = HashMap::new();
    for form in [
        Arc::new(NelsonSiegelForm) as Arc<dyn FunctionalForm>,
        Arc::new(SvenssonForm),
    ] {
        forms.insert(form.name().to_lowercase(), form);
    }
    RwLock::new(forms)
});

/// Registers (or replaces) a family under its lower-cased name.
pub fn register_functional_form(form: Arc<dyn FunctionalForm>) {
    let key = form.name().to_lowercase();
    tracing::debug!(family = %key, "registered functional form");
    REGISTRY.write().insert(key, form);
}

/// Looks up a family by name, ignoring case.
#[must_use]
pub fn functional_form(name: &str) -> Option<Arc<dyn FunctionalForm>> {
    REGISTRY.read().get(&name.to_lowercase()).cloned()
}

/// Names of all registered families, sorted.
#[must_use]
pub fn registered_functional_forms() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY.read().keys().cloned().collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Debug)]
    struct Flat;

    impl FunctionalForm for Flat {
        fn name(&self) -> &str {
            "Flat-Test"
        }

        fn number_of_parameters(&self) -> usize {
            1
        }

        fn zero_rate(&self, parameters: &[f64], _t: f64) -> CurveResult<f64> {
            Ok(parameters[0])
        }

        fn parameter_sensitivity(&self, _parameters: &[f64], _t: f64) -> CurveResult<Vec<f64>> {
            Ok(vec![1.0])
        }

        fn initial_guess(&self, rates: &[f64]) -> Vec<f64> {
            rates.to_vec()
        }
    }

    #[test]
    fn test_builtin_families() {
        let ns = functional_form("NELSON-SIEGEL").unwrap();
        assert_eq!(ns.number_of_parameters(), 4);
        let nss = functional_form("nelson-siegel-svensson").unwrap();
        assert_eq!(nss.number_of_parameters(), 6);
        assert!(functional_form("cubic-b-spline").is_none());
    }

    #[test]
    fn test_register_custom_family() {
        register_functional_form(Arc::new(Flat));
        let form = functional_form("flat-test").unwrap();
        assert_relative_eq!(form.zero_rate(&[0.03], 10.0).unwrap(), 0.03);
        assert!(registered_functional_forms().contains(&"flat-test".to_string()));
    }

    #[test]
    fn test_nelson_siegel_guess_reproduces_short_rate() {
        let form = NelsonSiegelForm;
        let guess = form.initial_guess(&[0.01, 0.02, 0.03, 0.04]);
        assert_relative_eq!(form.zero_rate(&guess, 0.0).unwrap(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_wrong_parameter_count() {
        assert!(NelsonSiegelForm.zero_rate(&[0.01, 0.02], 1.0).is_err());
    }
}
