//! Error types for curve setup and calibration.
//!
//! Every failure surfaces as one of three categories, reported by
//! [`CurveError::kind`]:
//!
//! - [`ErrorKind::Configuration`]: the setup is inconsistent (wrong call order,
//!   incompatible shape options, missing nodes or types)
//! - [`ErrorKind::Calibration`]: the root finder did not converge or the
//!   market data cannot be priced
//! - [`ErrorKind::UnsupportedCombination`]: a key or family that this engine
//!   does not know how to handle

use convex_core::ConvexError;
use convex_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Broad category of a [`CurveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Inconsistent or incomplete setup.
    Configuration,
    /// The numerical calibration failed.
    Calibration,
    /// An unrecognised key type or curve family.
    UnsupportedCombination,
}

/// Errors that can occur while configuring or calibrating curves.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// The setup is inconsistent.
    #[error("Configuration error: {reason}")]
    Configuration {
        /// Description of the problem.
        reason: String,
    },

    /// Calibration failed to converge.
    #[error("Calibration failed after {iterations} iterations (residual: {residual:.2e}): {message}")]
    CalibrationFailure {
        /// Number of iterations attempted.
        iterations: usize,
        /// Final residual.
        residual: f64,
        /// Description of the failure.
        message: String,
    },

    /// A key type or curve family this engine does not handle.
    #[error("Unsupported combination: {reason}")]
    UnsupportedCombination {
        /// Description of the combination.
        reason: String,
    },

    /// A curve was looked up and not found.
    #[error("Curve not found: {name}")]
    CurveNotFound {
        /// Name or role of the missing curve.
        name: String,
    },

    /// A past fixing needed to convert an instrument is missing.
    #[error("Missing fixing for {index} on {date}")]
    MissingFixing {
        /// Index name.
        index: String,
        /// Fixing date.
        date: String,
    },

    /// Invalid instrument for calibration.
    #[error("Invalid instrument: {reason}")]
    InvalidInstrument {
        /// Description of the problem.
        reason: String,
    },

    /// Numerical error from the math layer.
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from the market data layer.
    #[error("{0}")]
    Core(#[from] ConvexError),
}

impl CurveError {
    /// The category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } | Self::Core(_) => ErrorKind::Configuration,
            Self::UnsupportedCombination { .. } => ErrorKind::UnsupportedCombination,
            Self::CalibrationFailure { .. }
            | Self::CurveNotFound { .. }
            | Self::MissingFixing { .. }
            | Self::InvalidInstrument { .. }
            | Self::Math(_) => ErrorKind::Calibration,
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Creates a calibration failure error.
    #[must_use]
    pub fn calibration_failed(iterations: usize, residual: f64, message: impl Into<String>) -> Self {
        Self::CalibrationFailure {
            iterations,
            residual,
            message: message.into(),
        }
    }

    /// Creates an unsupported combination error.
    #[must_use]
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedCombination {
            reason: reason.into(),
        }
    }

    /// Creates a curve not found error.
    #[must_use]
    pub fn curve_not_found(name: impl Into<String>) -> Self {
        Self::CurveNotFound { name: name.into() }
    }

    /// Creates a missing fixing error.
    #[must_use]
    pub fn missing_fixing(index: impl Into<String>, date: impl ToString) -> Self {
        Self::MissingFixing {
            index: index.into(),
            date: date.to_string(),
        }
    }

    /// Creates an invalid instrument error.
    #[must_use]
    pub fn invalid_instrument(reason: impl Into<String>) -> Self {
        Self::InvalidInstrument {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CurveError::configuration("building() called twice");
        assert_eq!(
            err.to_string(),
            "Configuration error: building() called twice"
        );
    }

    #[test]
    fn test_calibration_failure() {
        let err = CurveError::calibration_failed(100, 1e-6, "Failed to converge");
        let msg = format!("{}", err);
        assert!(msg.contains("100 iterations"));
        assert!(msg.contains("Failed to converge"));
        assert_eq!(err.kind(), ErrorKind::Calibration);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            CurveError::unsupported("custom discounting key").kind(),
            ErrorKind::UnsupportedCombination
        );
        assert_eq!(
            CurveError::from(MathError::SingularMatrix).kind(),
            ErrorKind::Calibration
        );
        assert_eq!(
            CurveError::from(ConvexError::invalid_tenor("3X")).kind(),
            ErrorKind::Configuration
        );
    }
}
