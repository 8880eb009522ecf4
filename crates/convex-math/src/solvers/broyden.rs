//! Broyden's quasi-Newton method.

use nalgebra::DVector;

use crate::error::{MathError, MathResult};
use crate::linear_algebra::{max_norm, solve_linear_system};
use crate::solvers::{
    backtrack, checked_residuals, NonlinearSystem, SolverConfig, SolverResult, VectorRootFinder,
};

/// Broyden root finder.
///
/// Evaluates the Jacobian at the initial guess and then applies the
/// "good" Broyden rank-one update
/// `J += (ΔF - J Δx) Δxᵀ / (Δxᵀ Δx)` after each step. If the approximate
/// Jacobian becomes singular it is replaced by the exact one.
#[derive(Debug, Clone, Copy, Default)]
pub struct BroydenSolver;

impl VectorRootFinder for BroydenSolver {
    fn find_root(
        &self,
        system: &dyn NonlinearSystem,
        initial_guess: DVector<f64>,
        config: &SolverConfig,
    ) -> MathResult<SolverResult> {
        let mut x = initial_guess;
        let mut f = checked_residuals(system, &x)?;
        let initial_norm = max_norm(&f);
        let mut norm = initial_norm;
        let mut jacobian = system.jacobian(&x)?;

        for iteration in 0..config.max_iterations {
            if config.converged(norm, initial_norm) {
                return Ok(SolverResult {
                    root: x,
                    iterations: iteration,
                    residual: norm,
                });
            }

            let step = match solve_linear_system(&jacobian, &f) {
                Ok(s) => -s,
                Err(MathError::SingularMatrix) => {
                    jacobian = system.jacobian(&x)?;
                    -solve_linear_system(&jacobian, &f)?
                }
                Err(e) => return Err(e),
            };
            let (next_x, next_f) = backtrack(system, &x, &step, norm)?;

            let dx = &next_x - &x;
            let df = &next_f - &f;
            let dx_norm2 = dx.dot(&dx);
            if dx_norm2 > 0.0 {
                let correction = (df - &jacobian * &dx) / dx_norm2;
                jacobian += correction * dx.transpose();
            }

            x = next_x;
            f = next_f;
            norm = max_norm(&f);
            log::trace!("broyden iteration {}: residual {:.3e}", iteration + 1, norm);
        }

        if config.converged(norm, initial_norm) {
            return Ok(SolverResult {
                root: x,
                iterations: config.max_iterations,
                residual: norm,
            });
        }
        Err(MathError::convergence_failed(config.max_iterations, norm))
    }

    fn name(&self) -> &'static str {
        "Broyden"
    }
}
