//! Market-quote par spreads and their curve sensitivities.

use convex_core::types::{IborIndex, OvernightIndex};

use super::{MulticurveSensitivity, ParSpreadCalculator, ParSpreadSensitivityCalculator};
use crate::curves::Curve;
use crate::error::{CurveError, CurveResult};
use crate::instruments::{
    BondSecurity, Cash, FloatingCoupon, ForwardRateAgreement, InstrumentDerivative,
    InterestRateFuture, Swap,
};
use crate::provider::{IborCurveKind, ParameterProvider};

/// How futures prices are adjusted for convexity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FuturesConvexity {
    /// Futures rate equals the forward rate.
    #[default]
    None,
    /// Ho-Lee adjustment `½ σ² t_fixing t_end` added to the forward rate.
    HoLee {
        /// Normal rate volatility.
        volatility: f64,
    },
    /// Hull-White factor from the provider's model parameters.
    HullWhite,
}

/// Par spreads in the quoting convention of each instrument.
///
/// - Deposits, FRAs and swaps: model rate minus quoted rate
/// - Futures: model price minus quoted price
/// - Bonds: model dirty price minus quoted dirty price, on the issuer curve
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarketQuoteCalculator {
    convexity: FuturesConvexity,
}

/// A value and its zero-rate sensitivities.
struct Priced {
    value: f64,
    sensitivity: MulticurveSensitivity,
}

impl MarketQuoteCalculator {
    /// Calculator with the given futures convexity treatment.
    #[must_use]
    pub fn new(convexity: FuturesConvexity) -> Self {
        Self { convexity }
    }

    /// The futures convexity treatment.
    #[must_use]
    pub fn convexity(&self) -> FuturesConvexity {
        self.convexity
    }

    fn price(
        &self,
        instrument: &InstrumentDerivative,
        provider: &ParameterProvider,
    ) -> CurveResult<Priced> {
        match instrument {
            InstrumentDerivative::Cash(cash) => cash_spread(cash, provider),
            InstrumentDerivative::Fra(fra) => fra_spread(fra, provider),
            InstrumentDerivative::Swap(swap) => swap_spread(swap, provider),
            InstrumentDerivative::Future(future) => self.future_spread(future, provider),
            InstrumentDerivative::Bond(bond) => bond_spread(bond, provider),
        }
    }

    fn future_spread(
        &self,
        future: &InterestRateFuture,
        provider: &ParameterProvider,
    ) -> CurveResult<Priced> {
        let forward = ibor_forward(
            provider,
            &future.index,
            future.fixing_start,
            future.fixing_end,
            future.fixing_accrual,
        )?;
        let (price, slope) = match self.convexity {
            FuturesConvexity::None => (1.0 - forward.value, -1.0),
            FuturesConvexity::HoLee { volatility } => {
                let adjustment =
                    0.5 * volatility * volatility * future.last_trading_time * future.fixing_end;
                (1.0 - forward.value - adjustment, -1.0)
            }
            FuturesConvexity::HullWhite => {
                let (parameters, currency) = provider.hull_white().ok_or_else(|| {
                    CurveError::configuration("Hull-White parameters missing from provider")
                })?;
                if currency != future.index.currency() {
                    return Err(CurveError::configuration(format!(
                        "Hull-White parameters are for {currency}, future is on {}",
                        future.index
                    )));
                }
                let gamma = parameters.futures_convexity_factor(
                    future.last_trading_time,
                    future.fixing_start,
                    future.fixing_end,
                );
                (
                    1.0 - gamma * forward.value + (1.0 - gamma) / future.fixing_accrual,
                    -gamma,
                )
            }
        };
        Ok(Priced {
            value: price - future.reference_price,
            sensitivity: forward.sensitivity.scaled(slope),
        })
    }
}

impl ParSpreadCalculator for MarketQuoteCalculator {
    fn par_spread(
        &self,
        instrument: &InstrumentDerivative,
        provider: &ParameterProvider,
    ) -> CurveResult<f64> {
        Ok(self.price(instrument, provider)?.value)
    }
}

impl ParSpreadSensitivityCalculator for MarketQuoteCalculator {
    fn par_spread_sensitivity(
        &self,
        instrument: &InstrumentDerivative,
        provider: &ParameterProvider,
    ) -> CurveResult<MulticurveSensitivity> {
        Ok(self.price(instrument, provider)?.sensitivity)
    }
}

/// Records `∂value/∂DF(t)` on `curve` as a zero-rate sensitivity.
fn add_discount_sensitivity(
    sensitivity: &mut MulticurveSensitivity,
    curve: &dyn Curve,
    t: f64,
    df: f64,
    d_value_d_df: f64,
) {
    if t > 0.0 {
        sensitivity.add(curve.name(), t, -t * df * d_value_d_df);
    }
}

/// `(P(t1)/P(t2) - 1) / δ` on `curve`.
fn simple_forward(curve: &dyn Curve, t1: f64, t2: f64, accrual: f64) -> CurveResult<Priced> {
    let p1 = curve.discount_factor(t1)?;
    let p2 = curve.discount_factor(t2)?;
    let mut sensitivity = MulticurveSensitivity::new();
    add_discount_sensitivity(&mut sensitivity, curve, t1, p1, 1.0 / (p2 * accrual));
    add_discount_sensitivity(&mut sensitivity, curve, t2, p2, -p1 / (p2 * p2 * accrual));
    Ok(Priced {
        value: (p1 / p2 - 1.0) / accrual,
        sensitivity,
    })
}

fn ibor_forward(
    provider: &ParameterProvider,
    index: &IborIndex,
    fixing_start: f64,
    fixing_end: f64,
    accrual: f64,
) -> CurveResult<Priced> {
    let curve = provider.ibor_curve(index)?;
    match provider.ibor_curve_kind() {
        IborCurveKind::DiscountFactor => {
            simple_forward(curve.as_ref(), fixing_start, fixing_end, accrual)
        }
        IborCurveKind::DirectForward => {
            let mut sensitivity = MulticurveSensitivity::new();
            sensitivity.add(curve.name(), fixing_start, 1.0);
            Ok(Priced {
                value: curve.zero_rate(fixing_start)?,
                sensitivity,
            })
        }
    }
}

/// Compounded overnight amount `A · P(s)/P(e) - 1` per unit notional.
fn overnight_amount(
    provider: &ParameterProvider,
    index: &OvernightIndex,
    start_time: f64,
    end_time: f64,
    accrued_factor: f64,
) -> CurveResult<Priced> {
    let curve = provider.overnight_curve(index)?;
    let p1 = curve.discount_factor(start_time)?;
    let p2 = curve.discount_factor(end_time)?;
    let mut sensitivity = MulticurveSensitivity::new();
    add_discount_sensitivity(&mut sensitivity, curve.as_ref(), start_time, p1, accrued_factor / p2);
    add_discount_sensitivity(
        &mut sensitivity,
        curve.as_ref(),
        end_time,
        p2,
        -accrued_factor * p1 / (p2 * p2),
    );
    Ok(Priced {
        value: accrued_factor * p1 / p2 - 1.0,
        sensitivity,
    })
}

fn cash_spread(cash: &Cash, provider: &ParameterProvider) -> CurveResult<Priced> {
    let curve = provider.discounting_curve(cash.currency)?;
    let forward = simple_forward(curve.as_ref(), cash.start_time, cash.end_time, cash.accrual)?;
    Ok(Priced {
        value: forward.value - cash.rate,
        sensitivity: forward.sensitivity,
    })
}

fn fra_spread(fra: &ForwardRateAgreement, provider: &ParameterProvider) -> CurveResult<Priced> {
    let forward = ibor_forward(
        provider,
        &fra.index,
        fra.fixing_start,
        fra.fixing_end,
        fra.fixing_accrual,
    )?;
    Ok(Priced {
        value: forward.value - fra.rate,
        sensitivity: forward.sensitivity,
    })
}

fn swap_spread(swap: &Swap, provider: &ParameterProvider) -> CurveResult<Priced> {
    let discounting = provider.discounting_curve(swap.currency)?;

    let mut annuity = 0.0;
    let mut annuity_sensitivity = MulticurveSensitivity::new();
    for payment in &swap.fixed_leg {
        let df = discounting.discount_factor(payment.payment_time)?;
        annuity += payment.accrual * df;
        add_discount_sensitivity(
            &mut annuity_sensitivity,
            discounting.as_ref(),
            payment.payment_time,
            df,
            payment.accrual,
        );
    }
    if annuity.abs() < f64::EPSILON {
        return Err(CurveError::invalid_instrument(
            "swap has no remaining fixed payments",
        ));
    }

    let mut floating_pv = 0.0;
    let mut floating_sensitivity = MulticurveSensitivity::new();
    for coupon in &swap.floating_leg {
        let amount = match coupon {
            FloatingCoupon::Fixed { accrual, rate, .. } => Priced {
                value: accrual * rate,
                sensitivity: MulticurveSensitivity::new(),
            },
            FloatingCoupon::Ibor {
                index,
                fixing_start,
                fixing_end,
                fixing_accrual,
                accrual,
                ..
            } => {
                let forward =
                    ibor_forward(provider, index, *fixing_start, *fixing_end, *fixing_accrual)?;
                Priced {
                    value: accrual * forward.value,
                    sensitivity: forward.sensitivity.scaled(*accrual),
                }
            }
            FloatingCoupon::Overnight {
                index,
                start_time,
                end_time,
                accrued_factor,
                ..
            } => overnight_amount(provider, index, *start_time, *end_time, *accrued_factor)?,
        };
        let payment_time = coupon.payment_time();
        let df = discounting.discount_factor(payment_time)?;
        floating_pv += amount.value * df;
        floating_sensitivity.plus(&amount.sensitivity.scaled(df));
        add_discount_sensitivity(
            &mut floating_sensitivity,
            discounting.as_ref(),
            payment_time,
            df,
            amount.value,
        );
    }

    let mut sensitivity = floating_sensitivity.scaled(1.0 / annuity);
    sensitivity.plus(&annuity_sensitivity.scaled(-floating_pv / (annuity * annuity)));
    Ok(Priced {
        value: floating_pv / annuity - swap.fixed_rate,
        sensitivity,
    })
}

fn bond_spread(bond: &BondSecurity, provider: &ParameterProvider) -> CurveResult<Priced> {
    let curve = provider.issuer_curve(&bond.issuer)?;
    let mut pv = 0.0;
    let mut sensitivity = MulticurveSensitivity::new();
    for (t, amount) in &bond.cash_flows {
        let df = curve.discount_factor(*t)?;
        pv += amount * df;
        add_discount_sensitivity(&mut sensitivity, curve.as_ref(), *t, df, *amount);
    }
    Ok(Priced {
        value: pv - bond.dirty_price,
        sensitivity,
    })
}
