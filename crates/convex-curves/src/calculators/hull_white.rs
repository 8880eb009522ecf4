//! One-factor Hull-White parameters with piecewise-constant volatility.

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};

/// Mean reversion and a piecewise-constant volatility term structure.
///
/// `volatilities[i]` applies between `volatility_times[i - 1]` and
/// `volatility_times[i]`, with an implicit 0 before the first change time and
/// the last volatility applying forever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullWhiteParameters {
    mean_reversion: f64,
    volatilities: Vec<f64>,
    volatility_times: Vec<f64>,
}

impl HullWhiteParameters {
    /// Creates the parameters, validating the volatility grid.
    pub fn new(
        mean_reversion: f64,
        volatilities: Vec<f64>,
        volatility_times: Vec<f64>,
    ) -> CurveResult<Self> {
        if !mean_reversion.is_finite() || mean_reversion <= 0.0 {
            return Err(CurveError::configuration(format!(
                "Hull-White mean reversion must be positive, got {mean_reversion}"
            )));
        }
        if volatilities.is_empty() || volatilities.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(CurveError::configuration(
                "Hull-White volatilities must be non-empty and non-negative",
            ));
        }
        if volatility_times.len() + 1 != volatilities.len() {
            return Err(CurveError::configuration(format!(
                "{} volatilities need {} change times, got {}",
                volatilities.len(),
                volatilities.len() - 1,
                volatility_times.len()
            )));
        }
        if volatility_times.first().is_some_and(|t| *t <= 0.0)
            || volatility_times.windows(2).any(|w| w[1] <= w[0])
        {
            return Err(CurveError::configuration(
                "volatility change times must be positive and increasing",
            ));
        }
        Ok(Self {
            mean_reversion,
            volatilities,
            volatility_times,
        })
    }

    /// Constant volatility.
    pub fn constant(mean_reversion: f64, volatility: f64) -> CurveResult<Self> {
        Self::new(mean_reversion, vec![volatility], Vec::new())
    }

    /// Mean reversion speed.
    #[must_use]
    pub fn mean_reversion(&self) -> f64 {
        self.mean_reversion
    }

    /// Volatility levels.
    #[must_use]
    pub fn volatilities(&self) -> &[f64] {
        &self.volatilities
    }

    /// Volatility change times.
    #[must_use]
    pub fn volatility_times(&self) -> &[f64] {
        &self.volatility_times
    }

    /// Futures convexity factor γ for a future with last trading time `t0`
    /// on the period `[t1, t2]`.
    ///
    /// The futures price is `1 - γ F + (1 - γ) / δ` for forward `F` and
    /// accrual `δ`.
    #[must_use]
    pub fn futures_convexity_factor(&self, t0: f64, t1: f64, t2: f64) -> f64 {
        let a = self.mean_reversion;
        let factor1 = (-a * t1).exp() - (-a * t2).exp();
        let numerator = 2.0 * a * a * a;

        let mut s = vec![0.0];
        s.extend(self.volatility_times.iter().copied().filter(|t| *t < t0));
        s.push(t0.max(0.0));

        let factor2: f64 = s
            .windows(2)
            .zip(&self.volatilities)
            .map(|(w, sigma)| {
                sigma
                    * sigma
                    * ((a * w[1]).exp() - (a * w[0]).exp())
                    * (2.0 - (-a * (t2 - w[1])).exp() - (-a * (t2 - w[0])).exp())
            })
            .sum();
        (factor1 / numerator * factor2).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_convexity_factor_above_one() {
        let params = HullWhiteParameters::constant(0.01, 0.01).unwrap();
        let gamma = params.futures_convexity_factor(2.0, 2.0, 2.25);
        assert!(gamma > 1.0);
        assert!(gamma < 1.001);
        assert_relative_eq!(params.futures_convexity_factor(0.0, 0.0, 0.25), 1.0);
    }

    #[test]
    fn test_piecewise_matches_constant_when_flat() {
        let flat = HullWhiteParameters::constant(0.05, 0.012).unwrap();
        let piecewise =
            HullWhiteParameters::new(0.05, vec![0.012, 0.012, 0.012], vec![0.5, 1.5]).unwrap();
        assert_relative_eq!(
            flat.futures_convexity_factor(3.0, 3.0, 3.25),
            piecewise.futures_convexity_factor(3.0, 3.0, 3.25),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_validation() {
        assert!(HullWhiteParameters::constant(0.0, 0.01).is_err());
        assert!(HullWhiteParameters::new(0.01, vec![0.01, 0.02], vec![]).is_err());
        assert!(HullWhiteParameters::new(0.01, vec![0.01, 0.02, 0.03], vec![2.0, 1.0]).is_err());
    }
}
