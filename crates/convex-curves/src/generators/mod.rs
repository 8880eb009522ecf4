//! Curve generators: from a parameter vector to a curve.
//!
//! A generator is built from a curve's type configuration, then *finalized*
//! against the curve's instruments (which fixes node times when they are
//! derived from the instruments). Calibration asks the finalized generator
//! for a curve at every trial parameter vector.
//!
//! - [`InterpolatedGenerator`]: one node value per node time
//! - [`FunctionalGenerator`]: the parameters of a registered family
//! - [`SpreadGenerator`]: an increment over a base curve found by name

mod functional;
mod interpolated;
mod spread;

pub use functional::FunctionalGenerator;
pub use interpolated::InterpolatedGenerator;
pub use spread::SpreadGenerator;

use std::fmt;
use std::sync::Arc;

use crate::curves::Curve;
use crate::error::CurveResult;
use crate::instruments::InstrumentDerivative;
use crate::provider::ParameterProvider;

/// Produces curves from parameter vectors.
pub trait CurveGenerator: Send + Sync + fmt::Debug {
    /// Number of parameters a curve takes; 0 before finalization when the
    /// node times come from the instruments.
    fn number_of_parameters(&self) -> usize;

    /// Fixes whatever depends on the instruments, which are sorted by node
    /// time.
    fn finalize(&self, instruments: &[InstrumentDerivative]) -> CurveResult<Box<dyn CurveGenerator>>;

    /// The curve called `name` for `parameters`.
    ///
    /// `provider` holds the curves already available, for generators that
    /// build on another curve.
    fn generate(
        &self,
        name: &str,
        parameters: &[f64],
        provider: &ParameterProvider,
    ) -> CurveResult<Arc<dyn Curve>>;

    /// Starting parameters from the instruments' quotes expressed as rates.
    fn initial_guess(&self, rates: &[f64]) -> Vec<f64>;
}
