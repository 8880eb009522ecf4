//! Par-spread calculators used as calibration residuals.
//!
//! A par spread is the amount by which an instrument's model quote differs
//! from its market quote; calibration drives every par spread to zero. The
//! sensitivity calculator reports how each par spread moves with the zero
//! rates of the curves it touches, keyed by curve name and time, as a
//! [`MulticurveSensitivity`].

mod hull_white;
mod market_quote;

pub use hull_white::HullWhiteParameters;
pub use market_quote::{FuturesConvexity, MarketQuoteCalculator};

use std::collections::BTreeMap;
use std::fmt;

use crate::error::CurveResult;
use crate::instruments::InstrumentDerivative;
use crate::provider::ParameterProvider;

/// Computes the par spread of an instrument against a set of curves.
pub trait ParSpreadCalculator: Send + Sync + fmt::Debug {
    /// Model quote minus market quote.
    fn par_spread(
        &self,
        instrument: &InstrumentDerivative,
        provider: &ParameterProvider,
    ) -> CurveResult<f64>;
}

/// Computes the sensitivity of a par spread to curve zero rates.
pub trait ParSpreadSensitivityCalculator: Send + Sync + fmt::Debug {
    /// `∂par_spread/∂zero(t)` for every curve and time the instrument reads.
    fn par_spread_sensitivity(
        &self,
        instrument: &InstrumentDerivative,
        provider: &ParameterProvider,
    ) -> CurveResult<MulticurveSensitivity>;
}

/// Point sensitivities to curve zero rates, grouped by curve name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MulticurveSensitivity {
    points: BTreeMap<String, Vec<(f64, f64)>>,
}

impl MulticurveSensitivity {
    /// No sensitivity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` at time `t` on `curve`.
    pub fn add(&mut self, curve: &str, t: f64, value: f64) {
        self.points
            .entry(curve.to_string())
            .or_default()
            .push((t, value));
    }

    /// Adds every point of `other`.
    pub fn plus(&mut self, other: &MulticurveSensitivity) {
        for (curve, points) in &other.points {
            self.points
                .entry(curve.clone())
                .or_default()
                .extend_from_slice(points);
        }
    }

    /// Multiplies every point by `factor`.
    #[must_use]
    pub fn scaled(mut self, factor: f64) -> Self {
        for points in self.points.values_mut() {
            for (_, value) in points.iter_mut() {
                *value *= factor;
            }
        }
        self
    }

    /// Points on `curve`.
    #[must_use]
    pub fn points(&self, curve: &str) -> &[(f64, f64)] {
        self.points.get(curve).map_or(&[], Vec::as_slice)
    }

    /// Iterates over curves and their points.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[(f64, f64)])> {
        self.points
            .iter()
            .map(|(curve, points)| (curve.as_str(), points.as_slice()))
    }

    /// True if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.values().all(Vec::is_empty)
    }
}
