//! Dated instrument definitions, as quoted in the market.

use convex_core::daycounts::DayCountConvention;
use convex_core::types::{
    Currency, Date, FixingSet, IborIndex, Index, LegalEntity, OvernightIndex, Tenor, TenorUnit,
};
use serde::{Deserialize, Serialize};

use super::derivatives::{
    BondSecurity, Cash, FixedPayment, FloatingCoupon, ForwardRateAgreement, InstrumentDerivative,
    InterestRateFuture, Swap,
};
use super::time_between;
use crate::error::{CurveError, CurveResult};

/// Final periods shorter than this merge into the previous one.
const MIN_STUB_DAYS: i64 = 7;

/// A deposit from `start` to `end` at `rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositDefinition {
    /// Currency.
    pub currency: Currency,
    /// Start date.
    pub start: Date,
    /// End date.
    pub end: Date,
    /// Quoted rate.
    pub rate: f64,
    /// Accrual convention.
    pub day_count: DayCountConvention,
}

impl DepositDefinition {
    /// Creates a deposit between two dates.
    pub fn new(
        currency: Currency,
        start: Date,
        end: Date,
        rate: f64,
        day_count: DayCountConvention,
    ) -> CurveResult<Self> {
        if end <= start {
            return Err(CurveError::invalid_instrument(format!(
                "deposit must end after it starts: {start} to {end}"
            )));
        }
        Ok(Self {
            currency,
            start,
            end,
            rate,
            day_count,
        })
    }

    /// Creates a deposit of length `tenor` from `start`.
    pub fn from_tenor(
        currency: Currency,
        start: Date,
        tenor: Tenor,
        rate: f64,
        day_count: DayCountConvention,
    ) -> CurveResult<Self> {
        Self::new(currency, start, tenor.add_to(start)?, rate, day_count)
    }

    fn to_cash(&self, valuation: Date) -> CurveResult<Cash> {
        if self.end <= valuation {
            return Err(CurveError::invalid_instrument(format!(
                "deposit ending {} has matured at {valuation}",
                self.end
            )));
        }
        let start = self.start.max(valuation);
        Ok(Cash {
            currency: self.currency,
            start_time: time_between(valuation, start),
            end_time: time_between(valuation, self.end),
            accrual: self.day_count.year_fraction(start, self.end),
            rate: self.rate,
        })
    }
}

/// A forward rate agreement on one period of a term index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraDefinition {
    /// Index.
    pub index: IborIndex,
    /// Accrual start.
    pub accrual_start: Date,
    /// Accrual end.
    pub accrual_end: Date,
    /// Quoted rate.
    pub rate: f64,
}

impl FraDefinition {
    /// Creates a FRA on the index period starting at `accrual_start`.
    pub fn new(index: IborIndex, accrual_start: Date, rate: f64) -> CurveResult<Self> {
        let accrual_end = index.accrual_end(accrual_start)?;
        Ok(Self {
            index,
            accrual_start,
            accrual_end,
            rate,
        })
    }

    fn to_fra(&self, valuation: Date) -> CurveResult<ForwardRateAgreement> {
        let fixing_date = self.index.fixing_date(self.accrual_start);
        if fixing_date < valuation {
            return Err(CurveError::invalid_instrument(format!(
                "FRA on {} fixed on {fixing_date}, before {valuation}",
                self.index
            )));
        }
        Ok(ForwardRateAgreement {
            index: self.index.clone(),
            fixing_start: time_between(valuation, self.accrual_start),
            fixing_end: time_between(valuation, self.accrual_end),
            fixing_accrual: self
                .index
                .day_count()
                .year_fraction(self.accrual_start, self.accrual_end),
            rate: self.rate,
        })
    }
}

/// The floating side of a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FloatingLegDefinition {
    /// Term-index coupons, one per index period.
    Ibor {
        /// Index.
        index: IborIndex,
    },
    /// Compounded overnight coupons.
    Overnight {
        /// Index.
        index: OvernightIndex,
        /// Length of each compounding period.
        payment_tenor: Tenor,
    },
}

/// A fixed versus floating swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapDefinition {
    /// Currency of both legs.
    pub currency: Currency,
    /// Effective date.
    pub start: Date,
    /// Maturity date.
    pub maturity: Date,
    /// Fixed rate.
    pub fixed_rate: f64,
    /// Fixed payment frequency.
    pub fixed_tenor: Tenor,
    /// Fixed leg accrual convention.
    pub fixed_day_count: DayCountConvention,
    /// Floating leg.
    pub floating: FloatingLegDefinition,
}

impl SwapDefinition {
    /// A swap against a term index.
    pub fn ibor(
        index: IborIndex,
        start: Date,
        tenor: Tenor,
        fixed_rate: f64,
        fixed_tenor: Tenor,
        fixed_day_count: DayCountConvention,
    ) -> CurveResult<Self> {
        Ok(Self {
            currency: index.currency(),
            start,
            maturity: tenor.add_to(start)?,
            fixed_rate,
            fixed_tenor,
            fixed_day_count,
            floating: FloatingLegDefinition::Ibor { index },
        })
    }

    /// An overnight indexed swap with the same payment frequency on both legs.
    pub fn overnight(
        index: OvernightIndex,
        start: Date,
        tenor: Tenor,
        fixed_rate: f64,
        payment_tenor: Tenor,
        fixed_day_count: DayCountConvention,
    ) -> CurveResult<Self> {
        Ok(Self {
            currency: index.currency(),
            start,
            maturity: tenor.add_to(start)?,
            fixed_rate,
            fixed_tenor: payment_tenor,
            fixed_day_count,
            floating: FloatingLegDefinition::Overnight {
                index,
                payment_tenor,
            },
        })
    }

    fn to_swap(&self, valuation: Date, fixings: &FixingSet) -> CurveResult<Swap> {
        if self.maturity <= valuation {
            return Err(CurveError::invalid_instrument(format!(
                "swap maturing {} has matured at {valuation}",
                self.maturity
            )));
        }
        let fixed_leg = schedule(self.start, self.maturity, self.fixed_tenor)?
            .into_iter()
            .filter(|(_, end)| *end > valuation)
            .map(|(start, end)| FixedPayment {
                payment_time: time_between(valuation, end),
                accrual: self.fixed_day_count.year_fraction(start, end),
            })
            .collect();

        let floating_leg = match &self.floating {
            FloatingLegDefinition::Ibor { index } => {
                schedule(self.start, self.maturity, index.tenor())?
                    .into_iter()
                    .filter(|(_, end)| *end > valuation)
                    .map(|(start, end)| ibor_coupon(index, start, end, valuation, fixings))
                    .collect::<CurveResult<Vec<_>>>()?
            }
            FloatingLegDefinition::Overnight {
                index,
                payment_tenor,
            } => schedule(self.start, self.maturity, *payment_tenor)?
                .into_iter()
                .filter(|(_, end)| *end > valuation)
                .map(|(start, end)| overnight_coupon(index, start, end, valuation, fixings))
                .collect::<CurveResult<Vec<_>>>()?,
        };

        Ok(Swap {
            currency: self.currency,
            fixed_rate: self.fixed_rate,
            fixed_leg,
            floating_leg,
        })
    }
}

fn ibor_coupon(
    index: &IborIndex,
    start: Date,
    end: Date,
    valuation: Date,
    fixings: &FixingSet,
) -> CurveResult<FloatingCoupon> {
    let fixing_date = index.fixing_date(start);
    let accrual = index.day_count().year_fraction(start, end);
    let payment_time = time_between(valuation, end);
    let known = fixings.fixing(&Index::from(index.clone()), fixing_date);
    match known {
        Some(rate) if fixing_date <= valuation => Ok(FloatingCoupon::Fixed {
            payment_time,
            accrual,
            rate,
        }),
        None if fixing_date < valuation => {
            Err(CurveError::missing_fixing(index.name(), fixing_date))
        }
        _ => {
            let fixing_end = index.accrual_end(start)?;
            Ok(FloatingCoupon::Ibor {
                index: index.clone(),
                fixing_start: time_between(valuation, start),
                fixing_end: time_between(valuation, fixing_end),
                fixing_accrual: index.day_count().year_fraction(start, fixing_end),
                payment_time,
                accrual,
            })
        }
    }
}

fn overnight_coupon(
    index: &OvernightIndex,
    start: Date,
    end: Date,
    valuation: Date,
    fixings: &FixingSet,
) -> CurveResult<FloatingCoupon> {
    let mut accrued_factor = 1.0;
    if start < valuation {
        let series = fixings.get(&Index::from(index.clone()));
        let mut day = start;
        while day < valuation {
            let next = day.add_days(1);
            let rate = series
                .and_then(|s| s.latest_on_or_before(day))
                .map(|(_, rate)| rate)
                .ok_or_else(|| CurveError::missing_fixing(index.name(), day))?;
            accrued_factor *= 1.0 + rate * index.day_count().year_fraction(day, next);
            day = next;
        }
    }
    Ok(FloatingCoupon::Overnight {
        index: index.clone(),
        start_time: time_between(valuation, start.max(valuation)),
        end_time: time_between(valuation, end),
        accrued_factor,
        payment_time: time_between(valuation, end),
    })
}

/// A term-index futures contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureDefinition {
    /// Index.
    pub index: IborIndex,
    /// Last trading date, which is also the fixing date.
    pub last_trading_date: Date,
    /// Quoted price, e.g. 0.9725.
    pub reference_price: f64,
}

impl FutureDefinition {
    /// Creates a futures contract.
    pub fn new(index: IborIndex, last_trading_date: Date, reference_price: f64) -> Self {
        Self {
            index,
            last_trading_date,
            reference_price,
        }
    }

    fn to_future(&self, valuation: Date) -> CurveResult<InterestRateFuture> {
        if self.last_trading_date < valuation {
            return Err(CurveError::invalid_instrument(format!(
                "future on {} stopped trading on {}",
                self.index, self.last_trading_date
            )));
        }
        let start = self.index.accrual_start(self.last_trading_date);
        let end = self.index.accrual_end(start)?;
        Ok(InterestRateFuture {
            index: self.index.clone(),
            last_trading_time: time_between(valuation, self.last_trading_date),
            fixing_start: time_between(valuation, start),
            fixing_end: time_between(valuation, end),
            fixing_accrual: self.index.day_count().year_fraction(start, end),
            reference_price: self.reference_price,
        })
    }
}

/// A fixed-coupon bullet bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondDefinition {
    /// Issuer.
    pub issuer: LegalEntity,
    /// Currency.
    pub currency: Currency,
    /// First accrual date.
    pub start: Date,
    /// Maturity date.
    pub maturity: Date,
    /// Annual coupon rate.
    pub coupon: f64,
    /// Coupon frequency.
    pub coupon_tenor: Tenor,
    /// Coupon accrual convention.
    pub day_count: DayCountConvention,
    /// Dirty price per unit notional.
    pub dirty_price: f64,
}

impl BondDefinition {
    /// A semi-annual 30/360 bond priced at par.
    pub fn new(
        issuer: LegalEntity,
        currency: Currency,
        start: Date,
        maturity: Date,
        coupon: f64,
    ) -> Self {
        Self {
            issuer,
            currency,
            start,
            maturity,
            coupon,
            coupon_tenor: Tenor::SIX_MONTHS,
            day_count: DayCountConvention::Thirty360,
            dirty_price: 1.0,
        }
    }

    /// Sets the coupon frequency.
    #[must_use]
    pub fn with_coupon_tenor(mut self, tenor: Tenor) -> Self {
        self.coupon_tenor = tenor;
        self
    }

    /// Sets the accrual convention.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Sets the dirty price per unit notional.
    #[must_use]
    pub fn with_dirty_price(mut self, price: f64) -> Self {
        self.dirty_price = price;
        self
    }

    fn to_bond(&self, valuation: Date) -> CurveResult<BondSecurity> {
        if self.maturity <= valuation {
            return Err(CurveError::invalid_instrument(format!(
                "bond of {} matured on {}",
                self.issuer.short_name, self.maturity
            )));
        }
        let mut cash_flows: Vec<(f64, f64)> = schedule(self.start, self.maturity, self.coupon_tenor)?
            .into_iter()
            .filter(|(_, end)| *end > valuation)
            .map(|(start, end)| {
                (
                    time_between(valuation, end),
                    self.coupon * self.day_count.year_fraction(start, end),
                )
            })
            .collect();
        if let Some(last) = cash_flows.last_mut() {
            last.1 += 1.0;
        }
        Ok(BondSecurity {
            currency: self.currency,
            issuer: self.issuer.clone(),
            cash_flows,
            dirty_price: self.dirty_price,
        })
    }
}

/// A calibration instrument as defined in the market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstrumentDefinition {
    /// Deposit.
    Deposit(DepositDefinition),
    /// FRA.
    Fra(FraDefinition),
    /// Swap.
    Swap(SwapDefinition),
    /// Futures contract.
    Future(FutureDefinition),
    /// Bond.
    Bond(BondDefinition),
}

impl InstrumentDefinition {
    /// Converts to year-fraction form at `valuation`, fixing past coupons
    /// from `fixings`.
    pub fn to_derivative(
        &self,
        valuation: Date,
        fixings: &FixingSet,
    ) -> CurveResult<InstrumentDerivative> {
        Ok(match self {
            Self::Deposit(d) => InstrumentDerivative::Cash(d.to_cash(valuation)?),
            Self::Fra(f) => InstrumentDerivative::Fra(f.to_fra(valuation)?),
            Self::Swap(s) => InstrumentDerivative::Swap(s.to_swap(valuation, fixings)?),
            Self::Future(f) => InstrumentDerivative::Future(f.to_future(valuation)?),
            Self::Bond(b) => InstrumentDerivative::Bond(b.to_bond(valuation)?),
        })
    }

    /// The quote as a rate, used to seed calibration.
    #[must_use]
    pub fn market_rate(&self) -> f64 {
        match self {
            Self::Deposit(d) => d.rate,
            Self::Fra(f) => f.rate,
            Self::Swap(s) => s.fixed_rate,
            Self::Future(f) => 1.0 - f.reference_price,
            Self::Bond(b) => b.coupon,
        }
    }

    /// Final date of the instrument.
    #[must_use]
    pub fn maturity(&self) -> Date {
        match self {
            Self::Deposit(d) => d.end,
            Self::Fra(f) => f.accrual_end,
            Self::Swap(s) => s.maturity,
            Self::Future(f) => f.last_trading_date,
            Self::Bond(b) => b.maturity,
        }
    }
}

impl From<DepositDefinition> for InstrumentDefinition {
    fn from(d: DepositDefinition) -> Self {
        Self::Deposit(d)
    }
}

impl From<FraDefinition> for InstrumentDefinition {
    fn from(f: FraDefinition) -> Self {
        Self::Fra(f)
    }
}

impl From<SwapDefinition> for InstrumentDefinition {
    fn from(s: SwapDefinition) -> Self {
        Self::Swap(s)
    }
}

impl From<FutureDefinition> for InstrumentDefinition {
    fn from(f: FutureDefinition) -> Self {
        Self::Future(f)
    }
}

impl From<BondDefinition> for InstrumentDefinition {
    fn from(b: BondDefinition) -> Self {
        Self::Bond(b)
    }
}

/// `k` periods of `tenor`.
fn multiple(tenor: Tenor, k: u32) -> Tenor {
    let n = tenor.amount() * k;
    match tenor.unit() {
        TenorUnit::Days => Tenor::days(n),
        TenorUnit::Weeks => Tenor::weeks(n),
        TenorUnit::Months => Tenor::months(n),
        TenorUnit::Years => Tenor::years(n),
    }
}

/// Accrual periods rolled forward from `start`; a short final stub merges
/// into the previous period.
pub(crate) fn schedule(start: Date, end: Date, tenor: Tenor) -> CurveResult<Vec<(Date, Date)>> {
    if tenor.amount() == 0 {
        return Err(CurveError::invalid_instrument("schedule tenor must be positive"));
    }
    let mut periods = Vec::new();
    let mut period_start = start;
    let mut k = 1;
    while period_start < end {
        let next = multiple(tenor, k).add_to(start)?;
        let period_end = if end - next < MIN_STUB_DAYS { end } else { next };
        periods.push((period_start, period_end));
        period_start = period_end;
        k += 1;
    }
    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use convex_core::types::FixingSeries;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn libor() -> IborIndex {
        IborIndex::new("USD LIBOR 3M", Currency::USD, Tenor::months(3), 2, DayCountConvention::Act360)
    }

    fn sofr() -> OvernightIndex {
        OvernightIndex::new("SOFR", Currency::USD, 1, DayCountConvention::Act360)
    }

    #[test]
    fn test_schedule_merges_short_stub() {
        let periods = schedule(d(2025, 1, 15), d(2026, 1, 18), Tenor::months(6)).unwrap();
        assert_eq!(
            periods,
            vec![(d(2025, 1, 15), d(2025, 7, 15)), (d(2025, 7, 15), d(2026, 1, 18))]
        );
    }

    #[test]
    fn test_deposit_times() {
        let valuation = d(2025, 1, 15);
        let deposit = DepositDefinition::from_tenor(
            Currency::USD,
            valuation,
            Tenor::days(2),
            0.015,
            DayCountConvention::Act360,
        )
        .unwrap();
        let InstrumentDerivative::Cash(cash) = InstrumentDefinition::from(deposit)
            .to_derivative(valuation, &FixingSet::new())
            .unwrap()
        else {
            panic!("expected cash");
        };
        assert_eq!(cash.start_time, 0.0);
        assert_relative_eq!(cash.end_time, 2.0 / 365.0);
        assert_relative_eq!(cash.accrual, 2.0 / 360.0);
    }

    #[test]
    fn test_past_ibor_fixing_is_required() {
        let valuation = d(2025, 3, 1);
        let swap = InstrumentDefinition::from(
            SwapDefinition::ibor(
                libor(),
                d(2025, 1, 15),
                Tenor::years(1),
                0.02,
                Tenor::months(6),
                DayCountConvention::Thirty360,
            )
            .unwrap(),
        );
        let err = swap.to_derivative(valuation, &FixingSet::new()).unwrap_err();
        assert!(matches!(err, CurveError::MissingFixing { .. }));

        let fixings = FixingSet::new().with_series(
            libor(),
            FixingSeries::new().with_fixing(d(2025, 1, 13), 0.021),
        );
        let InstrumentDerivative::Swap(swap) = swap.to_derivative(valuation, &fixings).unwrap()
        else {
            panic!("expected swap");
        };
        assert_eq!(swap.floating_leg.len(), 4);
        assert!(matches!(
            swap.floating_leg[0],
            FloatingCoupon::Fixed { rate, .. } if rate == 0.021
        ));
        assert!(matches!(swap.floating_leg[1], FloatingCoupon::Ibor { .. }));
    }

    #[test]
    fn test_running_overnight_coupon_compounds_fixings() {
        let valuation = d(2025, 1, 17);
        let ois = InstrumentDefinition::from(
            SwapDefinition::overnight(
                sofr(),
                d(2025, 1, 15),
                Tenor::years(1),
                0.04,
                Tenor::years(1),
                DayCountConvention::Act360,
            )
            .unwrap(),
        );
        assert!(matches!(
            ois.to_derivative(valuation, &FixingSet::new()),
            Err(CurveError::MissingFixing { .. })
        ));

        let fixings = FixingSet::new().with_series(
            sofr(),
            FixingSeries::new()
                .with_fixing(d(2025, 1, 15), 0.036)
                .with_fixing(d(2025, 1, 16), 0.036),
        );
        let InstrumentDerivative::Swap(swap) = ois.to_derivative(valuation, &fixings).unwrap()
        else {
            panic!("expected swap");
        };
        let FloatingCoupon::Overnight {
            start_time,
            accrued_factor,
            ..
        } = swap.floating_leg[0]
        else {
            panic!("expected overnight coupon");
        };
        assert_eq!(start_time, 0.0);
        assert_relative_eq!(accrued_factor, (1.0_f64 + 0.036 / 360.0).powi(2), epsilon = 1e-15);
    }

    #[test]
    fn test_matured_instruments_rejected() {
        let valuation = d(2025, 6, 1);
        let future = InstrumentDefinition::from(FutureDefinition::new(libor(), d(2025, 3, 19), 0.97));
        assert!(matches!(
            future.to_derivative(valuation, &FixingSet::new()),
            Err(CurveError::InvalidInstrument { .. })
        ));
        assert_relative_eq!(future.market_rate(), 0.03, epsilon = 1e-15);
    }

    #[test]
    fn test_bond_cash_flows() {
        let valuation = d(2025, 1, 15);
        let bond = BondDefinition::new(
            LegalEntity::new("T", "US TREASURY"),
            Currency::USD,
            d(2025, 1, 15),
            d(2027, 1, 15),
            0.04,
        );
        let InstrumentDerivative::Bond(bond) = InstrumentDefinition::from(bond)
            .to_derivative(valuation, &FixingSet::new())
            .unwrap()
        else {
            panic!("expected bond");
        };
        assert_eq!(bond.cash_flows.len(), 4);
        assert_relative_eq!(bond.cash_flows[0].1, 0.02);
        assert_relative_eq!(bond.cash_flows[3].1, 1.02);
    }
}
