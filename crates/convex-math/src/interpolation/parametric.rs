//! Parametric yield curve models.
//!
//! This module provides parametric models for yield curve fitting:
//! - Nelson-Siegel: 4-parameter model
//! - Svensson: 6-parameter extension
//!
//! These models are used for curve fitting rather than point-by-point
//! interpolation, so they expose gradients with respect to their own
//! parameters instead of node sensitivities.

use crate::error::{MathError, MathResult};

/// Loading factors `(L1, L2)` and their x-derivatives at `x = t/τ`.
///
/// `L1 = (1 - e^(-x)) / x`, `L2 = L1 - e^(-x)`.
fn loadings(x: f64) -> (f64, f64, f64, f64) {
    if x.abs() < 1e-8 {
        // Taylor expansion for numerical stability
        let l1 = 1.0 - x / 2.0 + x * x / 6.0;
        let l2 = x / 2.0 - x * x / 3.0;
        return (l1, l2, -0.5 + x / 3.0, 0.5 - 2.0 * x / 3.0);
    }
    let exp_x = (-x).exp();
    let l1 = (1.0 - exp_x) / x;
    let dl1 = (exp_x - l1) / x;
    (l1, l1 - exp_x, dl1, dl1 + exp_x)
}

fn positive_tau(name: &str, tau: f64) -> MathResult<()> {
    if tau <= 0.0 || !tau.is_finite() {
        return Err(MathError::invalid_input(format!(
            "{name} must be positive, got {tau}"
        )));
    }
    Ok(())
}

/// Nelson-Siegel yield curve model.
///
/// The model parameterizes the zero rate curve as:
/// ```text
/// z(t) = β₀ + β₁ * ((1 - e^(-t/τ)) / (t/τ))
///           + β₂ * ((1 - e^(-t/τ)) / (t/τ) - e^(-t/τ))
/// ```
///
/// Where:
/// - β₀: Long-term level (asymptotic zero rate)
/// - β₁: Short-term component (slope)
/// - β₂: Medium-term component (curvature/hump)
/// - τ: Decay factor (controls where the hump occurs)
///
/// # Example
///
/// ```rust
/// use convex_math::interpolation::NelsonSiegel;
///
/// // Create a typical upward-sloping curve
/// let ns = NelsonSiegel::new(
///     0.045,  // β₀: 4.5% long rate
///     -0.02,  // β₁: negative for upward slope
///     0.01,   // β₂: slight hump
///     2.0,    // τ: 2 years
/// ).unwrap();
///
/// let short_rate = ns.zero_rate(0.25);
/// let long_rate = ns.zero_rate(30.0);
/// assert!(short_rate < long_rate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelsonSiegel {
    beta0: f64,
    beta1: f64,
    beta2: f64,
    tau: f64,
}

impl NelsonSiegel {
    /// Number of model parameters.
    pub const PARAMETERS: usize = 4;

    /// Creates a new Nelson-Siegel curve.
    ///
    /// # Errors
    ///
    /// Returns an error if tau is not positive.
    pub fn new(beta0: f64, beta1: f64, beta2: f64, tau: f64) -> MathResult<Self> {
        positive_tau("tau", tau)?;
        Ok(Self {
            beta0,
            beta1,
            beta2,
            tau,
        })
    }

    /// Creates the model from `[β₀, β₁, β₂, τ]`.
    pub fn from_parameters(params: &[f64]) -> MathResult<Self> {
        match params {
            [b0, b1, b2, tau] => Self::new(*b0, *b1, *b2, *tau),
            _ => Err(MathError::dimension_mismatch(Self::PARAMETERS, params.len())),
        }
    }

    /// Continuously compounded zero rate at time t.
    pub fn zero_rate(&self, t: f64) -> f64 {
        if t <= 0.0 {
            // As t → 0, z(t) → β₀ + β₁
            return self.beta0 + self.beta1;
        }
        let (l1, l2, _, _) = loadings(t / self.tau);
        self.beta0 + self.beta1 * l1 + self.beta2 * l2
    }

    /// Derivative of the zero rate with respect to t.
    pub fn derivative(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        let (_, _, dl1, dl2) = loadings(t / self.tau);
        (self.beta1 * dl1 + self.beta2 * dl2) / self.tau
    }

    /// Returns the instantaneous forward rate at time t.
    ///
    /// ```text
    /// f(t) = β₀ + β₁ * e^(-t/τ) + β₂ * (t/τ) * e^(-t/τ)
    /// ```
    pub fn forward_rate(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return self.beta0 + self.beta1;
        }
        let x = t / self.tau;
        let exp_x = (-x).exp();
        self.beta0 + self.beta1 * exp_x + self.beta2 * x * exp_x
    }

    /// `∂z(t)/∂[β₀, β₁, β₂, τ]`.
    pub fn parameter_gradient(&self, t: f64) -> Vec<f64> {
        if t <= 0.0 {
            return vec![1.0, 1.0, 0.0, 0.0];
        }
        let x = t / self.tau;
        let (l1, l2, dl1, dl2) = loadings(x);
        let dx_dtau = -x / self.tau;
        vec![
            1.0,
            l1,
            l2,
            (self.beta1 * dl1 + self.beta2 * dl2) * dx_dtau,
        ]
    }

    /// Returns the model parameters as `[β₀, β₁, β₂, τ]`.
    pub fn parameters(&self) -> [f64; 4] {
        [self.beta0, self.beta1, self.beta2, self.tau]
    }
}

/// Svensson yield curve model.
///
/// An extension of Nelson-Siegel with an additional hump term:
/// ```text
/// z(t) = β₀ + β₁ * ((1 - e^(-t/τ₁)) / (t/τ₁))
///           + β₂ * ((1 - e^(-t/τ₁)) / (t/τ₁) - e^(-t/τ₁))
///           + β₃ * ((1 - e^(-t/τ₂)) / (t/τ₂) - e^(-t/τ₂))
/// ```
///
/// # Example
///
/// ```rust
/// use convex_math::interpolation::Svensson;
///
/// let sv = Svensson::new(0.045, -0.02, 0.01, -0.005, 2.0, 8.0).unwrap();
/// let rate = sv.zero_rate(5.0);
/// assert!(rate > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Svensson {
    beta0: f64,
    beta1: f64,
    beta2: f64,
    beta3: f64,
    tau1: f64,
    tau2: f64,
}

impl Svensson {
    /// Number of model parameters.
    pub const PARAMETERS: usize = 6;

    /// Creates a new Svensson curve.
    ///
    /// # Errors
    ///
    /// Returns an error if either tau is not positive.
    pub fn new(
        beta0: f64,
        beta1: f64,
        beta2: f64,
        beta3: f64,
        tau1: f64,
        tau2: f64,
    ) -> MathResult<Self> {
        positive_tau("tau1", tau1)?;
        positive_tau("tau2", tau2)?;
        Ok(Self {
            beta0,
            beta1,
            beta2,
            beta3,
            tau1,
            tau2,
        })
    }

    /// Creates the model from `[β₀, β₁, β₂, β₃, τ₁, τ₂]`.
    pub fn from_parameters(params: &[f64]) -> MathResult<Self> {
        match params {
            [b0, b1, b2, b3, tau1, tau2] => Self::new(*b0, *b1, *b2, *b3, *tau1, *tau2),
            _ => Err(MathError::dimension_mismatch(Self::PARAMETERS, params.len())),
        }
    }

    /// Continuously compounded zero rate at time t.
    pub fn zero_rate(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return self.beta0 + self.beta1;
        }
        let (l1, l2, _, _) = loadings(t / self.tau1);
        let (_, m2, _, _) = loadings(t / self.tau2);
        self.beta0 + self.beta1 * l1 + self.beta2 * l2 + self.beta3 * m2
    }

    /// Derivative of the zero rate with respect to t.
    pub fn derivative(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        let (_, _, dl1, dl2) = loadings(t / self.tau1);
        let (_, _, _, dm2) = loadings(t / self.tau2);
        (self.beta1 * dl1 + self.beta2 * dl2) / self.tau1 + self.beta3 * dm2 / self.tau2
    }

    /// Returns the instantaneous forward rate at time t.
    pub fn forward_rate(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return self.beta0 + self.beta1;
        }
        let x1 = t / self.tau1;
        let x2 = t / self.tau2;
        let exp_x1 = (-x1).exp();
        let exp_x2 = (-x2).exp();
        self.beta0 + self.beta1 * exp_x1 + self.beta2 * x1 * exp_x1 + self.beta3 * x2 * exp_x2
    }

    /// `∂z(t)/∂[β₀, β₁, β₂, β₃, τ₁, τ₂]`.
    pub fn parameter_gradient(&self, t: f64) -> Vec<f64> {
        if t <= 0.0 {
            return vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        }
        let x1 = t / self.tau1;
        let x2 = t / self.tau2;
        let (l1, l2, dl1, dl2) = loadings(x1);
        let (_, m2, _, dm2) = loadings(x2);
        vec![
            1.0,
            l1,
            l2,
            m2,
            (self.beta1 * dl1 + self.beta2 * dl2) * (-x1 / self.tau1),
            self.beta3 * dm2 * (-x2 / self.tau2),
        ]
    }

    /// Returns the model parameters as `[β₀, β₁, β₂, β₃, τ₁, τ₂]`.
    pub fn parameters(&self) -> [f64; 6] {
        [
            self.beta0, self.beta1, self.beta2, self.beta3, self.tau1, self.tau2,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ============ Nelson-Siegel Tests ============

    #[test]
    fn test_nelson_siegel_asymptotic() {
        let ns = NelsonSiegel::new(0.045, -0.02, 0.01, 2.0).unwrap();

        // As t → ∞, z(t) → β₀
        assert_relative_eq!(ns.zero_rate(100.0), 0.045, epsilon = 0.001);
    }

    #[test]
    fn test_nelson_siegel_short_rate() {
        let ns = NelsonSiegel::new(0.045, -0.02, 0.01, 2.0).unwrap();

        // At t → 0, z(t) → β₀ + β₁
        assert_relative_eq!(ns.zero_rate(0.001), 0.045 - 0.02, epsilon = 0.01);
    }

    #[test]
    fn test_nelson_siegel_hump() {
        // β₂ > 0 creates a hump
        let ns = NelsonSiegel::new(0.03, 0.0, 0.02, 2.0).unwrap();

        let r_short = ns.zero_rate(0.5);
        let r_mid = ns.zero_rate(2.0);
        let r_long = ns.zero_rate(20.0);

        assert!(r_mid > r_short);
        assert!(r_mid > r_long);
    }

    #[test]
    fn test_nelson_siegel_forward_rate() {
        let ns = NelsonSiegel::new(0.045, -0.02, 0.01, 2.0).unwrap();

        assert_relative_eq!(ns.forward_rate(100.0), 0.045, epsilon = 0.001);
        assert_relative_eq!(ns.forward_rate(0.0), 0.025, epsilon = 0.001);
    }

    #[test]
    fn test_nelson_siegel_derivative() {
        let ns = NelsonSiegel::new(0.045, -0.02, 0.01, 2.0).unwrap();

        let t = 3.0;
        let h = 1e-6;
        let numerical = (ns.zero_rate(t + h) - ns.zero_rate(t - h)) / (2.0 * h);

        assert_relative_eq!(ns.derivative(t), numerical, epsilon = 1e-6);
    }

    #[test]
    fn test_nelson_siegel_parameter_gradient() {
        let params = [0.045, -0.02, 0.01, 2.0];
        let ns = NelsonSiegel::from_parameters(&params).unwrap();
        let grad = ns.parameter_gradient(4.0);
        let h = 1e-7;
        for k in 0..4 {
            let mut up = params;
            up[k] += h;
            let mut down = params;
            down[k] -= h;
            let fd = (NelsonSiegel::from_parameters(&up).unwrap().zero_rate(4.0)
                - NelsonSiegel::from_parameters(&down).unwrap().zero_rate(4.0))
                / (2.0 * h);
            assert_relative_eq!(grad[k], fd, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_nelson_siegel_invalid_tau() {
        assert!(NelsonSiegel::new(0.045, -0.02, 0.01, 0.0).is_err());
        assert!(NelsonSiegel::new(0.045, -0.02, 0.01, -1.0).is_err());
        assert!(NelsonSiegel::from_parameters(&[0.01, 0.02]).is_err());
    }

    // ============ Svensson Tests ============

    #[test]
    fn test_svensson_reduces_to_nelson_siegel() {
        // With β₃ = 0, Svensson should equal Nelson-Siegel
        let ns = NelsonSiegel::new(0.045, -0.02, 0.01, 2.0).unwrap();
        let sv = Svensson::new(0.045, -0.02, 0.01, 0.0, 2.0, 5.0).unwrap();

        for t in [0.5, 1.0, 2.0, 5.0, 10.0] {
            assert_relative_eq!(ns.zero_rate(t), sv.zero_rate(t), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_svensson_two_humps() {
        let sv = Svensson::new(0.03, 0.0, 0.02, -0.015, 2.0, 8.0).unwrap();

        assert!(sv.zero_rate(2.0) > sv.zero_rate(1.0));
        assert!(sv.zero_rate(5.0) < sv.zero_rate(2.0));
    }

    #[test]
    fn test_svensson_derivative() {
        let sv = Svensson::new(0.045, -0.02, 0.01, -0.005, 2.0, 8.0).unwrap();

        let t = 5.0;
        let h = 1e-6;
        let numerical = (sv.zero_rate(t + h) - sv.zero_rate(t - h)) / (2.0 * h);

        assert_relative_eq!(sv.derivative(t), numerical, epsilon = 1e-6);
    }

    #[test]
    fn test_svensson_parameter_gradient() {
        let params = [0.045, -0.02, 0.01, -0.005, 2.0, 8.0];
        let sv = Svensson::from_parameters(&params).unwrap();
        let grad = sv.parameter_gradient(6.0);
        let h = 1e-7;
        for k in 0..6 {
            let mut up = params;
            up[k] += h;
            let mut down = params;
            down[k] -= h;
            let fd = (Svensson::from_parameters(&up).unwrap().zero_rate(6.0)
                - Svensson::from_parameters(&down).unwrap().zero_rate(6.0))
                / (2.0 * h);
            assert_relative_eq!(grad[k], fd, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_svensson_invalid_tau() {
        assert!(Svensson::new(0.045, -0.02, 0.01, -0.005, 0.0, 8.0).is_err());
        assert!(Svensson::new(0.045, -0.02, 0.01, -0.005, 2.0, -1.0).is_err());
    }
}
