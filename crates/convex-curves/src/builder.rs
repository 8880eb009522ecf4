//! Compiled curve builder.
//!
//! A [`CurveBuilder`] is an immutable snapshot of a setup. Each call to
//! [`build_curves`](CurveBuilder::build_curves) converts the nodes at the
//! valuation date, calibrates the blocks in order and returns the curves
//! with their building-block bundle. Results are cached per valuation
//! date; concurrent callers for one date share a single calibration, and a
//! failed calibration leaves nothing cached.

use std::collections::BTreeMap;
use std::sync::Arc;

use convex_core::types::{Date, FixingSet};
use dashmap::DashMap;
use once_cell::sync::OnceCell;

use crate::bundle::BuildingBlockBundle;
use crate::calculators::{FuturesConvexity, MarketQuoteCalculator};
use crate::config::CalibrationConfig;
use crate::error::{CurveError, CurveResult};
use crate::instruments::{InstrumentDefinition, InstrumentDerivative};
use crate::models::{CurveModel, ForwardConvexity, HullWhite};
use crate::provider::ParameterProvider;
use crate::repository::{CalibrationBlock, CalibrationRepository, CalibrationUnit, UnitCurve};
use crate::setup::{Blocks, CurveNode, CurveTypeConfig};

/// Calibrated curves and their bundle.
#[derive(Debug, Clone)]
pub struct CalibratedCurves {
    provider: ParameterProvider,
    bundle: BuildingBlockBundle,
}

impl CalibratedCurves {
    /// The curves, known data included.
    #[must_use]
    pub fn provider(&self) -> &ParameterProvider {
        &self.provider
    }

    /// Building-block bundle of the calibrated and known curves.
    #[must_use]
    pub fn bundle(&self) -> &BuildingBlockBundle {
        &self.bundle
    }

    /// Splits into provider and bundle.
    #[must_use]
    pub fn into_parts(self) -> (ParameterProvider, BuildingBlockBundle) {
        (self.provider, self.bundle)
    }
}

type CacheCell = Arc<OnceCell<Arc<CalibratedCurves>>>;

/// Calibrates a fixed configuration at any valuation date.
#[derive(Debug)]
pub struct CurveBuilder<M: CurveModel> {
    model: M,
    blocks: Blocks,
    types: BTreeMap<String, CurveTypeConfig<M>>,
    nodes: BTreeMap<String, Vec<CurveNode>>,
    known: ParameterProvider,
    known_bundle: BuildingBlockBundle,
    fixings: FixingSet,
    config: CalibrationConfig,
    repository: Arc<dyn CalibrationRepository>,
    cache: DashMap<Date, CacheCell>,
}

impl<M: CurveModel> CurveBuilder<M> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        model: M,
        blocks: Blocks,
        types: BTreeMap<String, CurveTypeConfig<M>>,
        nodes: BTreeMap<String, Vec<CurveNode>>,
        known: ParameterProvider,
        known_bundle: BuildingBlockBundle,
        fixings: FixingSet,
        config: CalibrationConfig,
        repository: Arc<dyn CalibrationRepository>,
    ) -> Self {
        Self {
            model,
            blocks,
            types,
            nodes,
            known,
            known_bundle,
            fixings,
            config,
            repository,
            cache: DashMap::new(),
        }
    }

    /// Calibrates all curves at `valuation`, or returns the cached result.
    ///
    /// `fixings` are merged over the setup's fixing series. The cache is
    /// keyed by valuation date only: a second call for the same date returns
    /// the first result whatever its fixings.
    pub fn build_curves(
        &self,
        valuation: Date,
        fixings: &FixingSet,
    ) -> CurveResult<Arc<CalibratedCurves>> {
        let cell = Arc::clone(self.cache.entry(valuation).or_default().value());
        let mut calibrated = false;
        let result = cell.get_or_try_init(|| {
            calibrated = true;
            self.calibrate(valuation, fixings, &self.model.calculator())
                .map(Arc::new)
        });
        match result {
            Ok(curves) => {
                if !calibrated {
                    tracing::debug!(valuation = %valuation, "curves served from cache");
                }
                Ok(Arc::clone(curves))
            }
            Err(e) => {
                tracing::warn!(valuation = %valuation, error = %e, "curve calibration failed");
                self.cache
                    .remove_if(&valuation, |_, cached| cached.get().is_none());
                Err(e)
            }
        }
    }

    /// The cached result for `valuation`, if any.
    #[must_use]
    pub fn cached(&self, valuation: Date) -> Option<Arc<CalibratedCurves>> {
        self.cache
            .get(&valuation)
            .and_then(|cell| cell.get().cloned())
    }

    /// Drops every cached result.
    pub fn invalidate_cache(&self) {
        self.cache.clear();
    }

    /// Node definitions of each curve, in insertion order.
    ///
    /// Every node takes part in the calibration at any valuation date (a
    /// node that cannot be converted fails the build), so the result does
    /// not depend on the date. Leaves the cache untouched.
    #[must_use]
    pub fn definitions_for_curves(&self, _valuation: Date) -> BTreeMap<String, Vec<InstrumentDefinition>> {
        self.nodes
            .iter()
            .map(|(name, nodes)| {
                let definitions = nodes.iter().map(|n| n.definition.clone()).collect();
                (name.clone(), definitions)
            })
            .collect()
    }

    /// Nodes by curve.
    #[must_use]
    pub fn nodes(&self) -> &BTreeMap<String, Vec<CurveNode>> {
        &self.nodes
    }

    /// Root-finding settings.
    #[must_use]
    pub fn calibration_config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// The model.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    fn calibrate(
        &self,
        valuation: Date,
        fixings: &FixingSet,
        calculator: &MarketQuoteCalculator,
    ) -> CurveResult<CalibratedCurves> {
        tracing::info!(
            valuation = %valuation,
            model = M::NAME,
            blocks = self.blocks.len(),
            "calibrating curves"
        );
        let mut all_fixings = self.fixings.clone();
        all_fixings.merge(fixings);

        let mut provider = self.known.clone();
        let mut bundle = self.known_bundle.clone();
        for (index, names) in self.blocks.iter().enumerate() {
            tracing::debug!(block = index, curves = ?names, "calibrating block");
            let block = self.calibration_block(names, valuation, &all_fixings)?;
            let (next_provider, next_bundle) = self.repository.calibrate_block(
                &block,
                &provider,
                &bundle,
                calculator,
                calculator,
                &self.config,
            )?;
            provider = next_provider;
            bundle = next_bundle;
        }
        Ok(CalibratedCurves { provider, bundle })
    }

    fn calibration_block(
        &self,
        units: &[Vec<String>],
        valuation: Date,
        fixings: &FixingSet,
    ) -> CurveResult<CalibrationBlock> {
        let mut block = CalibrationBlock::default();
        for names in units {
            let mut unit = CalibrationUnit::default();
            for name in names {
                unit.curves.push(self.unit_curve(name, valuation, fixings)?);
            }
            block.units.push(unit);
        }
        Ok(block)
    }

    fn unit_curve(&self, name: &str, valuation: Date, fixings: &FixingSet) -> CurveResult<UnitCurve> {
        let config = self.types.get(name).ok_or_else(|| {
            CurveError::configuration(format!("curve {name} has no type configuration"))
        })?;
        let node_time = config.node_time_calculator();

        let mut converted: Vec<(f64, InstrumentDerivative, f64)> = Vec::new();
        for node in self.nodes.get(name).map_or(&[][..], Vec::as_slice) {
            let derivative = node.definition.to_derivative(valuation, fixings)?;
            converted.push((
                node_time.node_time(&derivative),
                derivative,
                node.definition.market_rate(),
            ));
        }
        converted.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (instruments, rates): (Vec<_>, Vec<_>) =
            converted.into_iter().map(|(_, d, r)| (d, r)).unzip();

        let generator = config
            .build_curve_generator(valuation)?
            .finalize(&instruments)?;
        let initial_guess = generator.initial_guess(&rates);
        tracing::debug!(
            curve = name,
            instruments = instruments.len(),
            parameters = generator.number_of_parameters(),
            "prepared curve"
        );
        Ok(UnitCurve {
            name: name.to_string(),
            generator,
            instruments,
            initial_guess,
            roles: config.roles().clone(),
        })
    }
}

impl CurveBuilder<ForwardConvexity> {
    /// Calibrates at `valuation` with futures priced without convexity.
    ///
    /// Not cached.
    pub fn build_curves_without_convexity(
        &self,
        valuation: Date,
        fixings: &FixingSet,
    ) -> CurveResult<CalibratedCurves> {
        self.calibrate(
            valuation,
            fixings,
            &MarketQuoteCalculator::new(FuturesConvexity::None),
        )
    }
}

impl CurveBuilder<HullWhite> {
    /// Calibrates at `valuation` as a plain discounting multicurve, without
    /// the Hull-White futures adjustment.
    ///
    /// Not cached.
    pub fn build_curves_without_convexity_adjustment(
        &self,
        valuation: Date,
        fixings: &FixingSet,
    ) -> CurveResult<CalibratedCurves> {
        self.calibrate(
            valuation,
            fixings,
            &MarketQuoteCalculator::new(FuturesConvexity::None),
        )
    }
}
