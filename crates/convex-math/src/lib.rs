//! # Convex Math
//!
//! Numerical building blocks for the Convex curve calibration engine.
//!
//! This crate provides:
//!
//! - **Solvers**: Multi-dimensional root finding (Newton, Broyden)
//! - **Linear Algebra**: LU solves, inversion, tridiagonal systems
//! - **Interpolation**: Interpolators with node sensitivities, parametric forms
//! - **Extrapolation**: Flat and linear extension beyond the nodes
//!
//! Every interpolator reports how its value moves with each node value, which
//! is what a calibration Jacobian is assembled from.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::if_not_else)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::single_match_else)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::derivable_impls)]

pub mod error;
pub mod extrapolation;
pub mod interpolation;
pub mod linear_algebra;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::extrapolation::{
        ExtrapolationMethod, Extrapolator, FlatExtrapolator, LinearExtrapolator,
    };
    pub use crate::interpolation::{
        CombinedInterpolator, CubicSpline, InterpolationMethod, Interpolator, InterpolatorSpec,
        LinearInterpolator, LogLinearInterpolator, MonotoneCubic, NelsonSiegel, Svensson,
    };
    pub use crate::solvers::{
        BroydenSolver, NewtonSolver, NonlinearSystem, RootFinderMethod, SolverConfig,
        SolverResult, VectorRootFinder,
    };
}

pub use error::{MathError, MathResult};
