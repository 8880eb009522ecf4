//! Calibrated curve objects.
//!
//! The [`Curve`] trait is what generators produce and what instrument
//! calculators read. Besides the usual discount factors and rates, a curve
//! reports how its zero rate at a time moves with each of its own
//! parameters, which is what the calibration Jacobian is built from.
//!
//! - [`InterpolatedCurve`]: node values interpolated on yield, periodic yield
//!   or discount factors
//! - [`FunctionalCurve`]: a parametric family such as Nelson-Siegel
//! - [`SpreadCurve`]: a base curve plus (or minus) an increment curve

mod functional;
mod interpolated;
mod spread;

pub use functional::FunctionalCurve;
pub use interpolated::{CurveValueKind, InterpolatedCurve};
pub use spread::SpreadCurve;

use std::fmt;

use convex_math::MathError;

use crate::error::{CurveError, CurveResult};

/// A calibrated (or known) curve.
///
/// Times are year fractions from the valuation date. Rates are continuously
/// compounded.
pub trait Curve: Send + Sync + fmt::Debug {
    /// Curve name.
    fn name(&self) -> &str;

    /// Continuously compounded zero rate to time `t`.
    fn zero_rate(&self, t: f64) -> CurveResult<f64>;

    /// Discount factor to time `t`; 1.0 for t ≤ 0.
    fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        if t <= 0.0 {
            return Ok(1.0);
        }
        Ok((-self.zero_rate(t)? * t).exp())
    }

    /// Continuously compounded forward rate between `t1` and `t2`.
    fn forward_rate(&self, t1: f64, t2: f64) -> CurveResult<f64> {
        if t2 <= t1 {
            return Err(CurveError::Math(MathError::invalid_input(format!(
                "forward period must have positive length, got [{t1}, {t2}]"
            ))));
        }
        let df1 = self.discount_factor(t1)?;
        let df2 = self.discount_factor(t2)?;
        Ok((df1 / df2).ln() / (t2 - t1))
    }

    /// The curve's own parameters, in the order the calibration solves them.
    fn parameters(&self) -> &[f64];

    /// Number of own parameters.
    fn number_of_parameters(&self) -> usize {
        self.parameters().len()
    }

    /// `∂zero_rate(t)/∂p_i` for each own parameter.
    fn parameter_sensitivity(&self, t: f64) -> CurveResult<Vec<f64>>;

    /// Node times, when the curve has any.
    fn node_times(&self) -> &[f64] {
        &[]
    }

    /// Name of the curve this one is a spread over.
    ///
    /// The zero rate of a spread curve moves one-for-one with its base, so
    /// sensitivities to it are also sensitivities to the base.
    fn spread_base(&self) -> Option<&str> {
        None
    }
}
