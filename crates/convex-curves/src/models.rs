//! Model variants.
//!
//! A model decides which calculator prices the calibration instruments, how
//! index curves place their nodes, and what extra data the provider carries.
//! The setup and builder are generic over the model, so model-only options
//! (the convexity volatility, Hull-White parameters, issuer curves) exist
//! only on the setups that use them.

use std::fmt;

use convex_core::types::Currency;

use crate::calculators::{FuturesConvexity, HullWhiteParameters, MarketQuoteCalculator};
use crate::error::{CurveError, CurveResult};
use crate::instruments::NodeTimeCalculator;
use crate::provider::{CurveRoles, IborCurveKind, ParameterProvider};

/// Behaviour that differs between model variants.
pub trait CurveModel: Clone + fmt::Debug + Send + Sync + 'static {
    /// Short name used in logs.
    const NAME: &'static str;

    /// True if a curve may forecast at most one term index.
    const SINGLE_IBOR_INDEX: bool = false;

    /// Node-time convention for curves that do not choose one.
    fn default_node_time(_roles: &CurveRoles) -> NodeTimeCalculator {
        NodeTimeCalculator::Maturity
    }

    /// Checks that the model has everything it needs.
    fn validate(&self) -> CurveResult<()> {
        Ok(())
    }

    /// Adds model data to the provider calibration starts from.
    fn configure_provider(&self, _provider: &mut ParameterProvider) {}

    /// Calculator for par spreads and their sensitivities.
    fn calculator(&self) -> MarketQuoteCalculator {
        MarketQuoteCalculator::default()
    }
}

/// Discounting multicurve: every instrument priced off discount factors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Discounting;

impl CurveModel for Discounting {
    const NAME: &'static str = "discounting";
}

/// Forward-rate curves with a Ho-Lee futures convexity adjustment.
///
/// Index curves hold the forward rate for each fixing start directly, so
/// their nodes sit at the last fixing start unless chosen otherwise, and a
/// curve forecasts a single term index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardConvexity {
    volatility: f64,
}

impl ForwardConvexity {
    /// Volatility used when none is set.
    pub const DEFAULT_VOLATILITY: f64 = 0.01;

    /// Model with the given short-rate volatility.
    pub fn new(volatility: f64) -> CurveResult<Self> {
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(CurveError::configuration(format!(
                "convexity volatility must be finite and non-negative, got {volatility}"
            )));
        }
        Ok(Self { volatility })
    }

    /// Short-rate volatility.
    #[must_use]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }
}

impl Default for ForwardConvexity {
    fn default() -> Self {
        Self {
            volatility: Self::DEFAULT_VOLATILITY,
        }
    }
}

impl CurveModel for ForwardConvexity {
    const NAME: &'static str = "forward-convexity";
    const SINGLE_IBOR_INDEX: bool = true;

    fn default_node_time(roles: &CurveRoles) -> NodeTimeCalculator {
        if roles.ibor_indices.is_empty() {
            NodeTimeCalculator::Maturity
        } else {
            NodeTimeCalculator::LastFixingStart
        }
    }

    fn configure_provider(&self, provider: &mut ParameterProvider) {
        provider.set_ibor_curve_kind(IborCurveKind::DirectForward);
    }

    fn calculator(&self) -> MarketQuoteCalculator {
        MarketQuoteCalculator::new(FuturesConvexity::HoLee {
            volatility: self.volatility,
        })
    }
}

/// One-factor Hull-White: futures priced with the model's convexity factor.
///
/// Both the parameters and the currency they apply to are required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HullWhite {
    parameters: Option<HullWhiteParameters>,
    currency: Option<Currency>,
}

impl HullWhite {
    /// Model parameters, once set.
    #[must_use]
    pub fn parameters(&self) -> Option<&HullWhiteParameters> {
        self.parameters.as_ref()
    }

    /// Currency of the model, once set.
    #[must_use]
    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }

    pub(crate) fn set_parameters(&mut self, parameters: HullWhiteParameters) {
        self.parameters = Some(parameters);
    }

    pub(crate) fn set_currency(&mut self, currency: Currency) {
        self.currency = Some(currency);
    }
}

impl CurveModel for HullWhite {
    const NAME: &'static str = "hull-white";

    fn validate(&self) -> CurveResult<()> {
        if self.parameters.is_none() {
            return Err(CurveError::configuration(
                "Hull-White parameters have not been set",
            ));
        }
        if self.currency.is_none() {
            return Err(CurveError::configuration(
                "Hull-White currency has not been set",
            ));
        }
        Ok(())
    }

    fn configure_provider(&self, provider: &mut ParameterProvider) {
        if let (Some(parameters), Some(currency)) = (&self.parameters, self.currency) {
            provider.set_hull_white(parameters.clone(), currency);
        }
    }

    fn calculator(&self) -> MarketQuoteCalculator {
        MarketQuoteCalculator::new(FuturesConvexity::HullWhite)
    }
}

/// Discounting multicurve with issuer curves for bonds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Issuer;

impl CurveModel for Issuer {
    const NAME: &'static str = "issuer";
}
