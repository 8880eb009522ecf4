//! Extrapolation methods for yield curves.
//!
//! This module provides extrapolation algorithms for extending curves beyond
//! their first or last observed data point:
//!
//! - [`FlatExtrapolator`]: Constant extension from the edge point
//! - [`LinearExtrapolator`]: Linear slope continuation
//!
//! # Choosing an Extrapolation Method
//!
//! | Method | Use Case | Properties |
//! |--------|----------|------------|
//! | Flat | Simple, conservative | Constant value |
//! | Linear | Trend continuation | May go negative |
//!
//! # Example
//!
//! ```rust
//! use convex_math::extrapolation::{Extrapolator, LinearExtrapolator};
//!
//! let rate_15y = LinearExtrapolator.extrapolate(15.0, 10.0, 0.05, 0.001);
//! assert!((rate_15y - 0.055).abs() < 1e-12);
//! ```

mod flat;
mod linear;

pub use flat::FlatExtrapolator;
pub use linear::LinearExtrapolator;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trait for extrapolation methods.
///
/// Extrapolators extend curves beyond an edge node. The same extrapolator
/// serves either edge: `last_t` is the edge abscissa, whichever side it is on.
pub trait Extrapolator: Send + Sync + fmt::Debug {
    /// Extrapolates to time `t` given the edge point.
    ///
    /// # Arguments
    ///
    /// * `t` - Target time for extrapolation
    /// * `last_t` - Time of the edge point
    /// * `last_value` - Value at the edge point
    /// * `last_derivative` - Derivative at the edge point (slope)
    fn extrapolate(&self, t: f64, last_t: f64, last_value: f64, last_derivative: f64) -> f64;

    /// Sensitivity of the extrapolated value to the node values, given the
    /// node sensitivities of the edge value and of the edge derivative.
    fn node_sensitivity(
        &self,
        t: f64,
        last_t: f64,
        last_sensitivity: &[f64],
        last_derivative_sensitivity: &[f64],
    ) -> Vec<f64>;

    /// Returns the name of the extrapolation method.
    fn name(&self) -> &'static str;
}

/// Configuration for extrapolation beyond curve boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExtrapolationMethod {
    /// No extrapolation - return error outside range
    None,
    /// Constant value from boundary
    #[default]
    Flat,
    /// Linear continuation with boundary slope
    Linear,
}

impl ExtrapolationMethod {
    /// The extrapolator for this method, or `None` when disallowed.
    #[must_use]
    pub fn extrapolator(&self) -> Option<Box<dyn Extrapolator>> {
        match self {
            Self::None => None,
            Self::Flat => Some(Box::new(FlatExtrapolator)),
            Self::Linear => Some(Box::new(LinearExtrapolator)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_extrapolator() {
        let extrap = FlatExtrapolator;

        let last_t = 10.0;
        let last_value = 0.05;
        let last_deriv = 0.001;

        // Flat should ignore derivative and return last value
        let value = extrap.extrapolate(15.0, last_t, last_value, last_deriv);
        assert_relative_eq!(value, last_value, epsilon = 1e-10);

        let value = extrap.extrapolate(100.0, last_t, last_value, last_deriv);
        assert_relative_eq!(value, last_value, epsilon = 1e-10);
    }

    #[test]
    fn test_linear_extrapolator_left_edge() {
        let extrap = LinearExtrapolator;

        // Left of the first node at t = 0.5, going back to 0.25
        let value = extrap.extrapolate(0.25, 0.5, 0.02, 0.004);
        assert_relative_eq!(value, 0.019, epsilon = 1e-12);
    }

    #[test]
    fn test_method_selects_extrapolator() {
        assert!(ExtrapolationMethod::None.extrapolator().is_none());
        assert_eq!(
            ExtrapolationMethod::Flat.extrapolator().map(|e| e.name()),
            Some("Flat")
        );
        assert_eq!(
            ExtrapolationMethod::Linear.extrapolator().map(|e| e.name()),
            Some("Linear")
        );
    }
}
