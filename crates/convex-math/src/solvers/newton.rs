//! Newton's method for square nonlinear systems.

use nalgebra::DVector;

use crate::error::{MathError, MathResult};
use crate::linear_algebra::{max_norm, solve_linear_system};
use crate::solvers::{
    backtrack, checked_residuals, NonlinearSystem, SolverConfig, SolverResult, VectorRootFinder,
};

/// Newton root finder.
///
/// Uses the iteration:
/// `x_{n+1} = x_n - α J(x_n)⁻¹ F(x_n)`
///
/// with the Jacobian re-evaluated every step and `α` halved until the
/// residual norm decreases.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewtonSolver;

impl VectorRootFinder for NewtonSolver {
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

        for iteration in 0..config.max_iterations {
            if config.converged(norm, initial_norm) {
                return Ok(SolverResult {
                    root: x,
                    iterations: iteration,
                    residual: norm,
                });
            }

            let jacobian = system.jacobian(&x)?;
            if jacobian.nrows() != f.len() || jacobian.ncols() != x.len() {
                return Err(MathError::dimension_mismatch(x.len(), jacobian.ncols()));
            }
            let step = -solve_linear_system(&jacobian, &f)?;
            let (next_x, next_f) = backtrack(system, &x, &step, norm)?;
            x = next_x;
            f = next_f;
            norm = max_norm(&f);
            log::trace!("newton iteration {}: residual {:.3e}", iteration + 1, norm);
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
        "Newton"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::tests::{Linear, ZeroPrices};
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    #[test]
    fn test_linear_system_in_one_step() {
        let system = Linear {
            a: DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]),
            b: DVector::from_vec(vec![5.0, 5.0]),
        };
        let result = NewtonSolver
            .find_root(&system, DVector::zeros(2), &SolverConfig::default())
            .unwrap();
        assert_eq!(result.iterations, 1);
        assert_relative_eq!(result.root[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(result.root[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quadratic_convergence() {
        let result = NewtonSolver
            .find_root(&ZeroPrices, DVector::from_vec(vec![0.05, 0.05]), &SolverConfig::default())
            .unwrap();
        assert!(result.iterations <= 5);
    }

    #[test]
    fn test_singular_jacobian() {
        let system = Linear {
            a: DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]),
            b: DVector::from_vec(vec![1.0, 2.0]),
        };
        let err = NewtonSolver
            .find_root(&system, DVector::zeros(2), &SolverConfig::default())
            .unwrap_err();
        assert_eq!(err, MathError::SingularMatrix);
    }
}
