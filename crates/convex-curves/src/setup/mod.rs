//! Curve setup: the mutable configuration a builder is compiled from.
//!
//! A [`CurveSetup`] collects, for one model:
//!
//! - the curves to calibrate, grouped into blocks of jointly-solved units
//! - a [`CurveTypeConfig`] per curve (roles and shape)
//! - the market nodes of each curve
//! - known curves, a known bundle, FX rates and fixing series
//! - root-finding settings
//!
//! [`get_builder`](CurveSetup::get_builder) checks the whole configuration
//! and compiles an immutable [`CurveBuilder`].
//!
//! # Example
//!
//! ```rust
//! use convex_core::prelude::*;
//! use convex_curves::prelude::*;
//! use convex_math::interpolation::{InterpolationMethod, InterpolatorSpec};
//!
//! let valuation = Date::from_ymd(2025, 1, 15).unwrap();
//! let mut setup = DiscountingSetup::new();
//! setup.building(["USD"]).unwrap();
//! setup
//!     .using("USD")
//!     .unwrap()
//!     .for_discounting(Currency::USD)
//!     .unwrap()
//!     .with_interpolator(InterpolatorSpec::new(InterpolationMethod::Linear))
//!     .unwrap();
//! for (days, rate) in [(90, 0.020), (365, 0.022)] {
//!     let deposit = DepositDefinition::new(
//!         Currency::USD,
//!         valuation,
//!         valuation.add_days(days),
//!         rate,
//!         DayCountConvention::Act360,
//!     )
//!     .unwrap();
//!     setup.with_node("USD", deposit, format!("{days}D")).unwrap();
//! }
//!
//! let builder = setup.get_builder().unwrap();
//! let curves = builder.build_curves(valuation, &FixingSet::new()).unwrap();
//! assert!(curves.provider().discounting_curve(Currency::USD).is_ok());
//! ```

mod type_config;

pub use type_config::CurveTypeConfig;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use convex_core::types::{Currency, FixingSet};
use convex_math::solvers::RootFinderMethod;
use serde::{Deserialize, Serialize};

use crate::builder::CurveBuilder;
use crate::bundle::BuildingBlockBundle;
use crate::calculators::HullWhiteParameters;
use crate::config::CalibrationConfig;
use crate::curves::Curve;
use crate::error::{CurveError, CurveResult};
use crate::fx::FxMatrix;
use crate::instruments::InstrumentDefinition;
use crate::issuer::Matcher;
use crate::models::{CurveModel, Discounting, ForwardConvexity, HullWhite, Issuer};
use crate::provider::{CurveRoles, ParameterProvider};
use crate::repository::{CalibrationRepository, MulticurveBuildingRepository};

/// One market node of a curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveNode {
    /// The instrument.
    pub definition: InstrumentDefinition,
    /// Tenor or other label identifying the node.
    pub label: String,
}

/// A curve supplied ready-made.
#[derive(Debug, Clone)]
pub(crate) struct KnownCurve {
    pub(crate) curve: Arc<dyn Curve>,
    pub(crate) roles: CurveRoles,
}

/// Blocks of units of curve names.
pub(crate) type Blocks = Vec<Vec<Vec<String>>>;

/// Configuration of a set of curves to calibrate with model `M`.
///
/// Cloning (or [`copy`](Self::copy)) gives a fully independent setup:
/// curves and matchers are shared immutable values, everything else is
/// owned.
#[derive(Debug, Clone)]
pub struct CurveSetup<M: CurveModel = Discounting> {
    model: M,
    blocks: Blocks,
    types: BTreeMap<String, CurveTypeConfig<M>>,
    nodes: BTreeMap<String, Vec<CurveNode>>,
    known_curves: BTreeMap<String, KnownCurve>,
    known_data: ParameterProvider,
    known_bundle: BuildingBlockBundle,
    fixings: FixingSet,
    fx: FxMatrix,
    config: CalibrationConfig,
}

/// Setup for the discounting model.
pub type DiscountingSetup = CurveSetup<Discounting>;
/// Setup for forward curves with futures convexity.
pub type ForwardConvexitySetup = CurveSetup<ForwardConvexity>;
/// Setup for the Hull-White model.
pub type HullWhiteSetup = CurveSetup<HullWhite>;
/// Setup with issuer curves.
pub type IssuerSetup = CurveSetup<Issuer>;

impl<M: CurveModel + Default> Default for CurveSetup<M> {
    fn default() -> Self {
        Self::with_model(M::default())
    }
}

impl<M: CurveModel + Default> CurveSetup<M> {
    /// An empty setup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: CurveModel> CurveSetup<M> {
    /// An empty setup for `model`.
    #[must_use]
    pub fn with_model(model: M) -> Self {
        Self {
            model,
            blocks: Vec::new(),
            types: BTreeMap::new(),
            nodes: BTreeMap::new(),
            known_curves: BTreeMap::new(),
            known_data: ParameterProvider::new(),
            known_bundle: BuildingBlockBundle::new(),
            fixings: FixingSet::new(),
            fx: FxMatrix::new(),
            config: CalibrationConfig::default(),
        }
    }

    /// The model.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    fn block_names(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().flatten().flatten().map(String::as_str)
    }

    fn check_new_names(&self, names: &[String]) -> CurveResult<()> {
        if names.is_empty() {
            return Err(CurveError::configuration("no curve names given"));
        }
        let mut seen: BTreeSet<&str> = self.block_names().collect();
        for name in names {
            if !seen.insert(name) {
                return Err(CurveError::configuration(format!(
                    "duplicate curve name {name}"
                )));
            }
            if self.known_curves.contains_key(name) {
                return Err(CurveError::configuration(format!(
                    "curve {name} is already supplied as a known curve"
                )));
            }
        }
        Ok(())
    }

    fn collect<I, S>(names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(Into::into).collect()
    }

    /// Sets the first block: one unit of curves solved jointly.
    ///
    /// Fails if a block already exists.
    pub fn building<I, S>(&mut self, names: I) -> CurveResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.blocks.is_empty() {
            return Err(CurveError::configuration(
                "the first block of curves has already been set",
            ));
        }
        let names = Self::collect(names);
        self.check_new_names(&names)?;
        self.blocks.push(vec![names]);
        Ok(self)
    }

    /// Same as [`building`](Self::building); reads better when more blocks
    /// follow.
    pub fn building_first<I, S>(&mut self, names: I) -> CurveResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.building(names)
    }

    /// Appends a block solved after all earlier ones.
    pub fn then_building<I, S>(&mut self, names: I) -> CurveResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.blocks.is_empty() {
            return Err(CurveError::configuration(
                "the first block of curves has not been set",
            ));
        }
        let names = Self::collect(names);
        self.check_new_names(&names)?;
        self.blocks.push(vec![names]);
        Ok(self)
    }

    /// Adds a unit to the last block, solved after the units before it.
    pub fn with_unit<I, S>(&mut self, names: I) -> CurveResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = Self::collect(names);
        self.check_new_names(&names)?;
        match self.blocks.last_mut() {
            Some(block) => block.push(names),
            None => {
                return Err(CurveError::configuration(
                    "the first block of curves has not been set",
                ))
            }
        }
        Ok(self)
    }

    /// Creates the type configuration of `name`.
    ///
    /// Fails if it was already created.
    pub fn using(&mut self, name: &str) -> CurveResult<&mut CurveTypeConfig<M>> {
        if self.types.contains_key(name) {
            return Err(CurveError::configuration(format!(
                "curve {name} is already configured"
            )));
        }
        Ok(self
            .types
            .entry(name.to_string())
            .or_insert_with(|| CurveTypeConfig::new(name)))
    }

    /// Supplies a ready-made curve under its own name.
    pub fn using_curve(&mut self, curve: Arc<dyn Curve>, roles: CurveRoles) -> CurveResult<&mut Self> {
        let name = curve.name().to_string();
        if self.block_names().any(|n| n == name) || self.types.contains_key(&name) {
            return Err(CurveError::configuration(format!(
                "curve {name} is configured for calibration and cannot also be supplied"
            )));
        }
        if self.known_curves.contains_key(&name) {
            return Err(CurveError::configuration(format!(
                "curve {name} is already supplied"
            )));
        }
        self.known_curves.insert(name, KnownCurve { curve, roles });
        Ok(self)
    }

    /// Appends a node to `curve`; nodes keep insertion order.
    pub fn with_node(
        &mut self,
        curve: &str,
        definition: impl Into<InstrumentDefinition>,
        label: impl Into<String>,
    ) -> CurveResult<&mut Self> {
        if self.known_curves.contains_key(curve) {
            return Err(CurveError::configuration(format!(
                "curve {curve} is supplied and takes no nodes"
            )));
        }
        self.nodes.entry(curve.to_string()).or_default().push(CurveNode {
            definition: definition.into(),
            label: label.into(),
        });
        Ok(self)
    }

    /// Removes every node of `curve`.
    pub fn remove_nodes(&mut self, curve: &str) -> &mut Self {
        self.nodes.remove(curve);
        self
    }

    /// Removes `curve` from the blocks, its type and its nodes.
    ///
    /// Units and blocks left empty are dropped.
    pub fn remove_curve(&mut self, curve: &str) -> &mut Self {
        for block in &mut self.blocks {
            for unit in block.iter_mut() {
                unit.retain(|n| n != curve);
            }
            block.retain(|unit| !unit.is_empty());
        }
        self.blocks.retain(|block| !block.is_empty());
        self.types.remove(curve);
        self.nodes.remove(curve);
        self.known_curves.remove(curve);
        self
    }

    /// Merges curves that calibration starts from.
    pub fn with_known_data(&mut self, known: &ParameterProvider) -> &mut Self {
        self.known_data.merge(known);
        self
    }

    /// Merges bundle entries of the known curves.
    pub fn with_known_bundle(&mut self, bundle: &BuildingBlockBundle) -> &mut Self {
        self.known_bundle.merge(bundle);
        self
    }

    /// Merges fixing series used to convert nodes.
    pub fn with_fixing_series(&mut self, fixings: &FixingSet) -> &mut Self {
        self.fixings.merge(fixings);
        self
    }

    /// Merges FX rates into the provider.
    pub fn add_fx_matrix(&mut self, fx: &FxMatrix) -> &mut Self {
        self.fx.merge(fx);
        self
    }

    /// Absolute residual tolerance.
    pub fn root_finding_absolute_tolerance(&mut self, tolerance: f64) -> &mut Self {
        self.config.absolute_tolerance = tolerance;
        self
    }

    /// Relative residual tolerance.
    pub fn root_finding_relative_tolerance(&mut self, tolerance: f64) -> &mut Self {
        self.config.relative_tolerance = tolerance;
        self
    }

    /// Iteration cap per unit.
    pub fn root_finding_maximum_steps(&mut self, steps: usize) -> &mut Self {
        self.config.maximum_steps = steps;
        self
    }

    /// Root-finding algorithm.
    pub fn root_finding_method(&mut self, method: RootFinderMethod) -> &mut Self {
        self.config.method = method;
        self
    }

    /// Replaces all root-finding settings.
    pub fn with_calibration_config(&mut self, config: CalibrationConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Root-finding settings.
    #[must_use]
    pub fn calibration_config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Nodes by curve.
    #[must_use]
    pub fn nodes(&self) -> &BTreeMap<String, Vec<CurveNode>> {
        &self.nodes
    }

    /// An independent copy of this setup.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Compiles a builder using the default calibration repository.
    pub fn get_builder(&self) -> CurveResult<CurveBuilder<M>> {
        self.get_builder_with_repository(Arc::new(MulticurveBuildingRepository))
    }

    /// Compiles a builder that calibrates through `repository`.
    pub fn get_builder_with_repository(
        &self,
        repository: Arc<dyn CalibrationRepository>,
    ) -> CurveResult<CurveBuilder<M>> {
        self.validate()?;

        let mut known = self.known_data.clone();
        for (name, known_curve) in &self.known_curves {
            if known.contains(name) {
                return Err(CurveError::configuration(format!(
                    "curve {name} is supplied twice"
                )));
            }
            known.add_curve(Arc::clone(&known_curve.curve), &known_curve.roles)?;
        }
        known.add_fx_matrix(&self.fx);
        self.model.configure_provider(&mut known);

        Ok(CurveBuilder::new(
            self.model.clone(),
            self.blocks.clone(),
            self.types.clone(),
            self.nodes.clone(),
            known,
            self.known_bundle.clone(),
            self.fixings.clone(),
            self.config,
            repository,
        ))
    }

    fn validate(&self) -> CurveResult<()> {
        if self.blocks.is_empty() {
            return Err(CurveError::configuration("no curves have been configured"));
        }
        self.config.validate()?;
        self.model.validate()?;

        let names: BTreeSet<&str> = self.block_names().collect();
        for name in &names {
            let config = self.types.get(*name).ok_or_else(|| {
                CurveError::configuration(format!("curve {name} has no type configuration"))
            })?;
            if self.nodes.get(*name).map_or(true, Vec::is_empty) {
                return Err(CurveError::configuration(format!(
                    "curve {name} has no nodes"
                )));
            }
            if self.known_curves.contains_key(*name) || self.known_data.contains(name) {
                return Err(CurveError::configuration(format!(
                    "curve {name} is both supplied and calibrated"
                )));
            }
            config.validate()?;
            config.validate_node_count(self.nodes.get(*name).map_or(0, Vec::len))?;
        }
        let mut issuers: Vec<(&str, &Arc<dyn Matcher>)> = Vec::new();
        for name in &names {
            for matcher in &self.types[*name].roles().issuers {
                if let Some((other, _)) = issuers
                    .iter()
                    .find(|(_, m)| m.same_registration(matcher.as_ref()))
                {
                    return Err(CurveError::configuration(format!(
                        "curves {other} and {name} are both issuer curves for {} under the same filter",
                        matcher.key()
                    )));
                }
                issuers.push((*name, matcher));
            }
        }
        if let Some(name) = self.types.keys().find(|n| !names.contains(n.as_str())) {
            return Err(CurveError::configuration(format!(
                "curve {name} is configured but not in any block"
            )));
        }
        if let Some(name) = self.nodes.keys().find(|n| !names.contains(n.as_str())) {
            return Err(CurveError::configuration(format!(
                "nodes were added for {name} but it is not in any block"
            )));
        }

        // A spread base must be available when its spread curve is built:
        // supplied, or calibrated in an earlier unit or earlier in the unit.
        let mut available: BTreeSet<&str> = self
            .known_curves
            .keys()
            .map(String::as_str)
            .chain(self.known_data.curve_names())
            .collect();
        for unit in self.blocks.iter().flatten() {
            for name in unit {
                if let Some(base) = self.types.get(name).and_then(CurveTypeConfig::<M>::spread_base) {
                    if !available.contains(base) {
                        return Err(CurveError::configuration(format!(
                            "base curve {base} of {name} is not built before it"
                        )));
                    }
                }
                available.insert(name);
            }
        }
        Ok(())
    }
}

impl CurveSetup<ForwardConvexity> {
    /// Short-rate volatility for the futures convexity adjustment.
    pub fn with_convexity_volatility(&mut self, volatility: f64) -> CurveResult<&mut Self> {
        self.model = ForwardConvexity::new(volatility)?;
        Ok(self)
    }
}

impl CurveSetup<HullWhite> {
    /// Hull-White mean reversion and volatilities.
    pub fn add_hull_white_parameters(&mut self, parameters: HullWhiteParameters) -> &mut Self {
        self.model.set_parameters(parameters);
        self
    }

    /// Currency the Hull-White parameters apply to.
    pub fn for_hull_white_currency(&mut self, currency: Currency) -> &mut Self {
        self.model.set_currency(currency);
        self
    }
}
