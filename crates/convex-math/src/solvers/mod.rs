//! Multi-dimensional root finding.
//!
//! Solves square nonlinear systems `F(x) = 0` as they arise in curve
//! calibration, where `x` are curve parameters and `F` the instrument
//! residuals.
//!
//! - [`NewtonSolver`]: Full Jacobian every step, backtracking on the step length
//! - [`BroydenSolver`]: Jacobian once, then rank-one secant updates
//!
//! # Convergence
//!
//! A solve converges when the max-norm of the residuals falls to the absolute
//! tolerance, or to the relative tolerance times the initial residual norm.
//! Otherwise it fails with [`MathError::ConvergenceFailed`] after
//! `max_iterations` steps.
//!
//! # Example
//!
//! ```rust
//! use convex_math::solvers::{NewtonSolver, NonlinearSystem, SolverConfig, VectorRootFinder};
//! use convex_math::MathResult;
//! use nalgebra::{DMatrix, DVector};
//!
//! // x² + y² = 4, x = y
//! struct Circle;
//!
//! impl NonlinearSystem for Circle {
//!     fn residuals(&self, x: &DVector<f64>) -> MathResult<DVector<f64>> {
//!         Ok(DVector::from_vec(vec![x[0] * x[0] + x[1] * x[1] - 4.0, x[0] - x[1]]))
//!     }
//!
//!     fn jacobian(&self, x: &DVector<f64>) -> MathResult<DMatrix<f64>> {
//!         Ok(DMatrix::from_row_slice(2, 2, &[2.0 * x[0], 2.0 * x[1], 1.0, -1.0]))
//!     }
//! }
//!
//! let result = NewtonSolver
//!     .find_root(&Circle, DVector::from_vec(vec![1.0, 0.5]), &SolverConfig::default())
//!     .unwrap();
//! assert!((result.root[0] - 2.0_f64.sqrt()).abs() < 1e-10);
//! ```

mod broyden;
mod newton;

pub use broyden::BroydenSolver;
pub use newton::NewtonSolver;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};
use crate::linear_algebra::max_norm;

/// Default absolute tolerance on the residual max-norm.
pub const DEFAULT_ABSOLUTE_TOLERANCE: f64 = 1e-10;

/// Default relative tolerance on the residual max-norm.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Converged when `‖F(x)‖∞ <= absolute_tolerance`.
    pub absolute_tolerance: f64,
    /// Converged when `‖F(x)‖∞ <= relative_tolerance * ‖F(x₀)‖∞`.
    pub relative_tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            absolute_tolerance: DEFAULT_ABSOLUTE_TOLERANCE,
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(absolute_tolerance: f64, relative_tolerance: f64, max_iterations: u32) -> Self {
        Self {
            absolute_tolerance,
            relative_tolerance,
            max_iterations,
        }
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn converged(&self, norm: f64, initial_norm: f64) -> bool {
        norm <= self.absolute_tolerance || norm <= self.relative_tolerance * initial_norm
    }
}

/// Result of a root-finding operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: DVector<f64>,
    /// Number of iterations taken.
    pub iterations: u32,
    /// Max-norm of the residuals at the root.
    pub residual: f64,
}

/// A square system of nonlinear equations.
pub trait NonlinearSystem {
    /// Residuals `F(x)`.
    fn residuals(&self, x: &DVector<f64>) -> MathResult<DVector<f64>>;

    /// Jacobian `∂F_i/∂x_j`.
    fn jacobian(&self, x: &DVector<f64>) -> MathResult<DMatrix<f64>>;
}

/// Trait for multi-dimensional root finders.
pub trait VectorRootFinder: Send + Sync {
    /// Finds `x` with `F(x) ≈ 0` starting from `initial_guess`.
    fn find_root(
        &self,
        system: &dyn NonlinearSystem,
        initial_guess: DVector<f64>,
        config: &SolverConfig,
    ) -> MathResult<SolverResult>;

    /// Returns the name of the solver.
    fn name(&self) -> &'static str;
}

/// Root finder selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RootFinderMethod {
    /// Newton with backtracking.
    #[default]
    Newton,
    /// Broyden's quasi-Newton method.
    Broyden,
}

impl RootFinderMethod {
    /// The solver for this method.
    #[must_use]
    pub fn solver(&self) -> Box<dyn VectorRootFinder> {
        match self {
            Self::Newton => Box::new(NewtonSolver),
            Self::Broyden => Box::new(BroydenSolver),
        }
    }
}

fn checked_residuals(system: &dyn NonlinearSystem, x: &DVector<f64>) -> MathResult<DVector<f64>> {
    let f = system.residuals(x)?;
    if f.len() != x.len() {
        return Err(MathError::dimension_mismatch(x.len(), f.len()));
    }
    if f.iter().any(|v| !v.is_finite()) {
        return Err(MathError::non_finite("residuals"));
    }
    Ok(f)
}

/// Step `x + α·p` with the largest `α = 2⁻ᵏ` that reduces the residual norm.
///
/// When no trial reduces it the smallest trial is accepted.
fn backtrack(
    system: &dyn NonlinearSystem,
    x: &DVector<f64>,
    step: &DVector<f64>,
    norm: f64,
) -> MathResult<(DVector<f64>, DVector<f64>)> {
    const MAX_HALVINGS: u32 = 8;
    let mut alpha = 1.0;
    let mut last = None;
    for _ in 0..=MAX_HALVINGS {
        let trial = x + step * alpha;
        match checked_residuals(system, &trial) {
            Ok(f) if max_norm(&f) < norm => return Ok((trial, f)),
            Ok(f) => last = Some((trial, f)),
            Err(MathError::NonFinite { .. }) => {}
            Err(e) => return Err(e),
        }
        alpha *= 0.5;
    }
    last.ok_or_else(|| MathError::non_finite("residuals along the search direction"))
}
