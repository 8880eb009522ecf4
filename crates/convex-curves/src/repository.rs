//! Calibration of blocks of curves.
//!
//! A [`CalibrationBlock`] is a sequence of [`CalibrationUnit`]s; each unit is
//! a set of curves solved jointly so that the par spread of every one of
//! their instruments is zero. Units are solved in order, each seeing the
//! curves of the units before it.
//!
//! The residual Jacobian is assembled from the calculator's zero-rate point
//! sensitivities chained through each curve's parameter sensitivity, and
//! through the base of spread curves.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

use convex_math::linear_algebra::invert;
use convex_math::solvers::NonlinearSystem;
use convex_math::{MathError, MathResult};
use nalgebra::{DMatrix, DVector};

use crate::bundle::{BuildingBlock, BuildingBlockBundle, BundleEntry};
use crate::calculators::{MulticurveSensitivity, ParSpreadCalculator, ParSpreadSensitivityCalculator};
use crate::config::CalibrationConfig;
use crate::error::{CurveError, CurveResult};
use crate::generators::CurveGenerator;
use crate::instruments::InstrumentDerivative;
use crate::provider::{CurveRoles, ParameterProvider};

/// One curve of a unit, ready to calibrate.
#[derive(Debug)]
pub struct UnitCurve {
    /// Curve name.
    pub name: String,
    /// Finalized generator.
    pub generator: Box<dyn CurveGenerator>,
    /// Instruments, sorted by node time.
    pub instruments: Vec<InstrumentDerivative>,
    /// Starting parameters.
    pub initial_guess: Vec<f64>,
    /// Roles the curve is registered under once built.
    pub roles: CurveRoles,
}

/// Curves solved jointly.
#[derive(Debug, Default)]
pub struct CalibrationUnit {
    /// Curves in parameter order.
    pub curves: Vec<UnitCurve>,
}

impl CalibrationUnit {
    fn names(&self) -> String {
        self.curves
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn contains(&self, name: &str) -> bool {
        self.curves.iter().any(|c| c.name == name)
    }
}

/// Units solved one after the other.
#[derive(Debug, Default)]
pub struct CalibrationBlock {
    /// Units in solve order.
    pub units: Vec<CalibrationUnit>,
}

/// Solves calibration blocks.
///
/// Given the curves known so far, returns them extended with the block's
/// calibrated curves, and the bundle extended with the block's entries.
pub trait CalibrationRepository: Send + Sync + fmt::Debug {
    /// Calibrates every unit of `block` in order.
    fn calibrate_block(
        &self,
        block: &CalibrationBlock,
        known: &ParameterProvider,
        known_bundle: &BuildingBlockBundle,
        quote: &dyn ParSpreadCalculator,
        sensitivity: &dyn ParSpreadSensitivityCalculator,
        config: &CalibrationConfig,
    ) -> CurveResult<(ParameterProvider, BuildingBlockBundle)>;
}

/// Root-finding repository used by every model.
#[derive(Debug, Clone, Copy, Default)]
pub struct MulticurveBuildingRepository;

impl CalibrationRepository for MulticurveBuildingRepository {
    fn calibrate_block(
        &self,
        block: &CalibrationBlock,
        known: &ParameterProvider,
        known_bundle: &BuildingBlockBundle,
        quote: &dyn ParSpreadCalculator,
        sensitivity: &dyn ParSpreadSensitivityCalculator,
        config: &CalibrationConfig,
    ) -> CurveResult<(ParameterProvider, BuildingBlockBundle)> {
        let mut provider = known.clone();
        let mut bundle = known_bundle.clone();
        for unit in &block.units {
            calibrate_unit(unit, &mut provider, &mut bundle, quote, sensitivity, config)?;
        }
        Ok((provider, bundle))
    }
}

fn calibrate_unit(
    unit: &CalibrationUnit,
    provider: &mut ParameterProvider,
    bundle: &mut BuildingBlockBundle,
    quote: &dyn ParSpreadCalculator,
    sensitivity: &dyn ParSpreadSensitivityCalculator,
    config: &CalibrationConfig,
) -> CurveResult<()> {
    let system = UnitSystem::new(unit, provider, quote, sensitivity)?;
    let names = unit.names();
    let initial = DVector::from_iterator(
        system.size,
        unit.curves
            .iter()
            .flat_map(|c| c.initial_guess.iter().copied()),
    );

    let solver = config.method.solver();
    let solved = solver.find_root(&system, initial, &config.solver_config());
    let result = match solved {
        Ok(result) => result,
        Err(e) => {
            let error = match (e, system.failure.take()) {
                (MathError::NonFinite { .. }, Some(stashed)) => stashed,
                (MathError::ConvergenceFailed { iterations, residual }, _) => {
                    CurveError::calibration_failed(
                        iterations as usize,
                        residual,
                        format!("unit [{names}] did not converge"),
                    )
                }
                (other, _) => CurveError::Math(other),
            };
            tracing::debug!(unit = %names, error = %error, "unit calibration failed");
            return Err(error);
        }
    };
    tracing::debug!(
        unit = %names,
        parameters = system.size,
        iterations = result.iterations,
        residual = result.residual,
        solver = solver.name(),
        "calibrated unit"
    );

    let calibrated = system.provider(result.root.as_slice())?;
    system.record_bundle(&calibrated, bundle)?;
    *provider = calibrated;
    Ok(())
}

struct UnitSystem<'a> {
    unit: &'a CalibrationUnit,
    known: &'a ParameterProvider,
    instruments: Vec<&'a InstrumentDerivative>,
    quote: &'a dyn ParSpreadCalculator,
    sensitivity: &'a dyn ParSpreadSensitivityCalculator,
    size: usize,
    failure: RefCell<Option<CurveError>>,
}

impl<'a> UnitSystem<'a> {
    fn new(
        unit: &'a CalibrationUnit,
        known: &'a ParameterProvider,
        quote: &'a dyn ParSpreadCalculator,
        sensitivity: &'a dyn ParSpreadSensitivityCalculator,
    ) -> CurveResult<Self> {
        let instruments: Vec<_> = unit.curves.iter().flat_map(|c| &c.instruments).collect();
        let size: usize = unit
            .curves
            .iter()
            .map(|c| c.generator.number_of_parameters())
            .sum();
        if size != instruments.len() {
            return Err(CurveError::calibration_failed(
                0,
                f64::NAN,
                format!(
                    "inconsistent sizes: unit [{}] has {size} parameters for {} instruments",
                    unit.names(),
                    instruments.len()
                ),
            ));
        }
        if let Some(curve) = unit
            .curves
            .iter()
            .find(|c| c.initial_guess.len() != c.generator.number_of_parameters())
        {
            return Err(CurveError::calibration_failed(
                0,
                f64::NAN,
                format!(
                    "inconsistent sizes: initial guess of {} has {} values for {} parameters",
                    curve.name,
                    curve.initial_guess.len(),
                    curve.generator.number_of_parameters()
                ),
            ));
        }
        Ok(Self {
            unit,
            known,
            instruments,
            quote,
            sensitivity,
            size,
            failure: RefCell::new(None),
        })
    }

    /// Known curves plus the unit's curves at `parameters`.
    fn provider(&self, parameters: &[f64]) -> CurveResult<ParameterProvider> {
        let mut provider = self.known.clone();
        let mut offset = 0;
        for curve in &self.unit.curves {
            let count = curve.generator.number_of_parameters();
            let generated = curve.generator.generate(
                &curve.name,
                &parameters[offset..offset + count],
                &provider,
            )?;
            provider.add_curve(generated, &curve.roles)?;
            offset += count;
        }
        Ok(provider)
    }

    /// First column of each unit curve's parameters.
    fn parameter_offsets(&self) -> BTreeMap<&str, usize> {
        let mut offsets = BTreeMap::new();
        let mut offset = 0;
        for curve in &self.unit.curves {
            offsets.insert(curve.name.as_str(), offset);
            offset += curve.generator.number_of_parameters();
        }
        offsets
    }

    fn residuals_at(&self, parameters: &[f64]) -> CurveResult<DVector<f64>> {
        let provider = self.provider(parameters)?;
        let spreads = self
            .instruments
            .iter()
            .map(|i| self.quote.par_spread(i, &provider))
            .collect::<CurveResult<Vec<_>>>()?;
        Ok(DVector::from_vec(spreads))
    }

    fn jacobian_at(&self, parameters: &[f64]) -> CurveResult<DMatrix<f64>> {
        let provider = self.provider(parameters)?;
        self.own_jacobian(&provider)
    }

    fn own_jacobian(&self, provider: &ParameterProvider) -> CurveResult<DMatrix<f64>> {
        let offsets = self.parameter_offsets();
        let mut jacobian = DMatrix::zeros(self.instruments.len(), self.size);
        for (row, instrument) in self.instruments.iter().enumerate() {
            let points = self.sensitivity.par_spread_sensitivity(instrument, provider)?;
            let gradient = parameter_gradient(provider, &points, &|name: &str| self.unit.contains(name))?;
            for (name, values) in gradient {
                let start = offsets[name.as_str()];
                for (k, value) in values.iter().enumerate() {
                    jacobian[(row, start + k)] += value;
                }
            }
        }
        Ok(jacobian)
    }

    /// Stores `∂parameters/∂quotes` for every unit curve, chained through
    /// the entries of curves from earlier units and blocks.
    fn record_bundle(
        &self,
        provider: &ParameterProvider,
        bundle: &mut BuildingBlockBundle,
    ) -> CurveResult<()> {
        let n = self.instruments.len();
        let mut dependencies: Vec<String> = Vec::new();
        let mut dependency_rows: Vec<BTreeMap<String, Vec<f64>>> = Vec::with_capacity(n);
        for instrument in &self.instruments {
            let points = self.sensitivity.par_spread_sensitivity(instrument, provider)?;
            let gradient = parameter_gradient(provider, &points, &|name: &str| {
                !self.unit.contains(name) && bundle.contains(name)
            })?;
            for name in gradient.keys() {
                if !dependencies.contains(name) {
                    dependencies.push(name.clone());
                }
            }
            dependency_rows.push(gradient);
        }

        let mut block = BuildingBlock::new();
        for name in &dependencies {
            if let Some(entry) = bundle.get(name) {
                for (curve, _, count) in entry.block().curves() {
                    block.push(curve, count);
                }
            }
        }
        let mut quote_columns = Vec::with_capacity(self.unit.curves.len());
        for curve in &self.unit.curves {
            quote_columns.push(block.push(&curve.name, curve.instruments.len()));
        }

        let mut transition = DMatrix::zeros(n, block.size());
        for name in &dependencies {
            let Some(entry) = bundle.get(name) else { continue };
            let embedded = entry.embedded_in(&block);
            let mut partial = DMatrix::zeros(n, embedded.nrows());
            for (row, gradient) in dependency_rows.iter().enumerate() {
                if let Some(values) = gradient.get(name) {
                    for (k, value) in values.iter().enumerate().take(embedded.nrows()) {
                        partial[(row, k)] = *value;
                    }
                }
            }
            transition -= partial * embedded;
        }
        let mut row = 0;
        for (curve, start) in self.unit.curves.iter().zip(&quote_columns) {
            for k in 0..curve.instruments.len() {
                transition[(row, start + k)] += 1.0;
                row += 1;
            }
        }

        let inverse = invert(&self.own_jacobian(provider)?)?;
        let transition = inverse * transition;
        let mut offset = 0;
        for curve in &self.unit.curves {
            let count = curve.generator.number_of_parameters();
            bundle.add(
                curve.name.clone(),
                BundleEntry::new(block.clone(), transition.rows(offset, count).into_owned()),
            );
            offset += count;
        }
        Ok(())
    }

    fn stash(&self, error: CurveError) -> MathError {
        let message = error.to_string();
        *self.failure.borrow_mut() = Some(error);
        MathError::non_finite(message)
    }
}

impl NonlinearSystem for UnitSystem<'_> {
    fn residuals(&self, x: &DVector<f64>) -> MathResult<DVector<f64>> {
        self.residuals_at(x.as_slice()).map_err(|e| self.stash(e))
    }

    fn jacobian(&self, x: &DVector<f64>) -> MathResult<DMatrix<f64>> {
        self.jacobian_at(x.as_slice()).map_err(|e| self.stash(e))
    }
}

/// `∂spread/∂parameters` of the wanted curves, from zero-rate point
/// sensitivities.
fn parameter_gradient(
    provider: &ParameterProvider,
    points: &MulticurveSensitivity,
    wanted: &dyn Fn(&str) -> bool,
) -> CurveResult<BTreeMap<String, Vec<f64>>> {
    let mut gradient = BTreeMap::new();
    for (curve, values) in points.iter() {
        for &(t, value) in values {
            add_point(provider, curve, t, value, wanted, &mut gradient)?;
        }
    }
    Ok(gradient)
}

fn add_point(
    provider: &ParameterProvider,
    name: &str,
    t: f64,
    value: f64,
    wanted: &dyn Fn(&str) -> bool,
    gradient: &mut BTreeMap<String, Vec<f64>>,
) -> CurveResult<()> {
    let curve = provider.curve(name)?;
    if wanted(name) {
        let sensitivity = curve.parameter_sensitivity(t)?;
        let entry = gradient
            .entry(name.to_string())
            .or_insert_with(|| vec![0.0; sensitivity.len()]);
        for (total, s) in entry.iter_mut().zip(&sensitivity) {
            *total += value * s;
        }
    }
    // The zero rate of a spread curve moves one for one with its base.
    if let Some(base) = curve.spread_base() {
        add_point(provider, base, t, value, wanted, gradient)?;
    }
    Ok(())
}
