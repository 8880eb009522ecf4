//! Spot FX rates carried alongside the curves.

use std::collections::BTreeMap;

use convex_core::types::Currency;

use crate::error::{CurveError, CurveResult};

/// Spot exchange rates between currencies.
///
/// A rate `r` for `(from, to)` means one unit of `from` buys `r` units of
/// `to`. Inverses are stored on insert, and cross rates through one common
/// currency are derived on lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FxMatrix {
    rates: BTreeMap<(Currency, Currency), f64>,
}

impl FxMatrix {
    /// An empty matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the rate from `from` to `to`.
    pub fn add_rate(&mut self, from: Currency, to: Currency, rate: f64) -> CurveResult<()> {
        if from == to {
            return Err(CurveError::configuration(format!(
                "FX rate {from}/{to} is implied"
            )));
        }
        if !rate.is_finite() || rate <= 0.0 {
            return Err(CurveError::configuration(format!(
                "FX rate {from}/{to} must be positive, got {rate}"
            )));
        }
        self.rates.insert((from, to), rate);
        self.rates.insert((to, from), 1.0 / rate);
        Ok(())
    }

    /// Builder-style [`add_rate`](Self::add_rate).
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: f64) -> CurveResult<Self> {
        self.add_rate(from, to, rate)?;
        Ok(self)
    }

    /// Units of `to` per unit of `from`.
    pub fn rate(&self, from: Currency, to: Currency) -> CurveResult<f64> {
        if from == to {
            return Ok(1.0);
        }
        if let Some(rate) = self.rates.get(&(from, to)) {
            return Ok(*rate);
        }
        self.rates
            .iter()
            .filter(|((source, _), _)| *source == from)
            .find_map(|((_, via), first)| self.rates.get(&(*via, to)).map(|second| first * second))
            .ok_or_else(|| CurveError::curve_not_found(format!("FX rate {from}/{to}")))
    }

    /// Copies every rate of `other` into this matrix, replacing on conflict.
    pub fn merge(&mut self, other: &FxMatrix) {
        self.rates
            .extend(other.rates.iter().map(|(pair, rate)| (*pair, *rate)));
    }

    /// True if no rates are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direct_inverse_and_cross() {
        let fx = FxMatrix::new()
            .with_rate(Currency::EUR, Currency::USD, 1.10)
            .unwrap()
            .with_rate(Currency::GBP, Currency::USD, 1.25)
            .unwrap();
        assert_relative_eq!(fx.rate(Currency::EUR, Currency::USD).unwrap(), 1.10);
        assert_relative_eq!(fx.rate(Currency::USD, Currency::EUR).unwrap(), 1.0 / 1.10);
        assert_relative_eq!(
            fx.rate(Currency::EUR, Currency::GBP).unwrap(),
            1.10 / 1.25,
            epsilon = 1e-14
        );
        assert_eq!(fx.rate(Currency::JPY, Currency::JPY).unwrap(), 1.0);
        assert!(fx.rate(Currency::JPY, Currency::USD).is_err());
    }

    #[test]
    fn test_invalid_rates() {
        let mut fx = FxMatrix::new();
        assert!(fx.add_rate(Currency::USD, Currency::USD, 1.0).is_err());
        assert!(fx.add_rate(Currency::EUR, Currency::USD, -1.0).is_err());
        assert!(fx.is_empty());
    }
}
