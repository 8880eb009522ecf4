//! Root-finding settings for calibration.

use convex_math::solvers::{
    RootFinderMethod, SolverConfig, DEFAULT_ABSOLUTE_TOLERANCE, DEFAULT_MAX_ITERATIONS,
    DEFAULT_RELATIVE_TOLERANCE,
};
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};

/// Tolerances, iteration cap and method used for every calibration unit.
///
/// Serialized field names match the setup methods, so a config can be kept
/// alongside market data:
///
/// ```rust
/// use convex_curves::CalibrationConfig;
///
/// let config = CalibrationConfig::from_json(r#"{ "maximum_steps": 50 }"#).unwrap();
/// assert_eq!(config.maximum_steps, 50);
/// assert_eq!(config.absolute_tolerance, 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Converged when every residual is within this absolute bound.
    pub absolute_tolerance: f64,
    /// Converged when the residual norm falls by this factor.
    pub relative_tolerance: f64,
    /// Maximum root-finder iterations per unit.
    pub maximum_steps: usize,
    /// Root-finding algorithm.
    pub method: RootFinderMethod,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            absolute_tolerance: DEFAULT_ABSOLUTE_TOLERANCE,
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
            maximum_steps: DEFAULT_MAX_ITERATIONS as usize,
            method: RootFinderMethod::default(),
        }
    }
}

impl CalibrationConfig {
    /// Parses a config from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> CurveResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CurveError::configuration(format!("invalid calibration config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that tolerances are finite and non-negative and that at least
    /// one step is allowed.
    pub fn validate(&self) -> CurveResult<()> {
        for (name, value) in [
            ("absolute tolerance", self.absolute_tolerance),
            ("relative tolerance", self.relative_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CurveError::configuration(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.maximum_steps == 0 {
            return Err(CurveError::configuration(
                "maximum steps must be at least 1",
            ));
        }
        if u32::try_from(self.maximum_steps).is_err() {
            return Err(CurveError::configuration(format!(
                "maximum steps {} is too large",
                self.maximum_steps
            )));
        }
        Ok(())
    }

    /// The solver settings for one unit.
    pub(crate) fn solver_config(&self) -> SolverConfig {
        SolverConfig::new(
            self.absolute_tolerance,
            self.relative_tolerance,
            u32::try_from(self.maximum_steps).unwrap_or(u32::MAX),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CalibrationConfig::default();
        assert_eq!(config.absolute_tolerance, 1e-10);
        assert_eq!(config.relative_tolerance, 1e-10);
        assert_eq!(config.maximum_steps, 100);
        assert_eq!(config.method, RootFinderMethod::Newton);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config =
            CalibrationConfig::from_json(r#"{ "method": "Broyden", "absolute_tolerance": 1e-8 }"#)
                .unwrap();
        assert_eq!(config.method, RootFinderMethod::Broyden);
        assert_eq!(config.absolute_tolerance, 1e-8);
        assert_eq!(config.maximum_steps, 100);
    }

    #[test]
    fn test_validation() {
        let mut config = CalibrationConfig::default();
        config.maximum_steps = 0;
        assert!(config.validate().is_err());

        config = CalibrationConfig::default();
        config.relative_tolerance = -1.0;
        assert!(config.validate().is_err());

        assert!(CalibrationConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_solver_config() {
        let solver = CalibrationConfig::default().solver_config();
        assert_eq!(solver.max_iterations, 100);
        assert_eq!(solver.absolute_tolerance, 1e-10);
    }
}
