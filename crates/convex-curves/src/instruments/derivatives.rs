//! Instruments expressed in year fractions from the valuation date.
//!
//! These are what calculators price. They are produced from the dated
//! definitions in [`super::definitions`] once the valuation date and past
//! fixings are known.

use convex_core::types::{Currency, IborIndex, LegalEntity, OvernightIndex};

/// A deposit on the discounting curve of its currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Cash {
    /// Currency.
    pub currency: Currency,
    /// Start time (0 if the deposit has started).
    pub start_time: f64,
    /// End time.
    pub end_time: f64,
    /// Accrual factor of the deposit.
    pub accrual: f64,
    /// Quoted rate.
    pub rate: f64,
}

/// A forward rate agreement on a term index.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardRateAgreement {
    /// Index.
    pub index: IborIndex,
    /// Fixing period start time.
    pub fixing_start: f64,
    /// Fixing period end time.
    pub fixing_end: f64,
    /// Accrual factor of the fixing period.
    pub fixing_accrual: f64,
    /// Quoted rate.
    pub rate: f64,
}

/// A known fixed-leg payment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPayment {
    /// Payment time.
    pub payment_time: f64,
    /// Accrual factor.
    pub accrual: f64,
}

/// One coupon of a floating leg.
#[derive(Debug, Clone, PartialEq)]
pub enum FloatingCoupon {
    /// A coupon whose rate has already fixed.
    Fixed {
        /// Payment time.
        payment_time: f64,
        /// Accrual factor.
        accrual: f64,
        /// The fixed rate.
        rate: f64,
    },
    /// A term-index coupon still to fix.
    Ibor {
        /// Index.
        index: IborIndex,
        /// Fixing period start time.
        fixing_start: f64,
        /// Fixing period end time.
        fixing_end: f64,
        /// Accrual factor of the fixing period.
        fixing_accrual: f64,
        /// Payment time.
        payment_time: f64,
        /// Accrual factor of the coupon.
        accrual: f64,
    },
    /// A compounded overnight coupon.
    Overnight {
        /// Index.
        index: OvernightIndex,
        /// Start of the unfixed part of the period (0 if already running).
        start_time: f64,
        /// End of the period.
        end_time: f64,
        /// Compounded growth factor of the part already fixed.
        accrued_factor: f64,
        /// Payment time.
        payment_time: f64,
    },
}

impl FloatingCoupon {
    /// Payment time.
    #[must_use]
    pub fn payment_time(&self) -> f64 {
        match self {
            Self::Fixed { payment_time, .. }
            | Self::Ibor { payment_time, .. }
            | Self::Overnight { payment_time, .. } => *payment_time,
        }
    }
}

/// A fixed versus floating swap, receiving the floating leg.
#[derive(Debug, Clone, PartialEq)]
pub struct Swap {
    /// Currency of both legs.
    pub currency: Currency,
    /// Fixed rate.
    pub fixed_rate: f64,
    /// Remaining fixed payments.
    pub fixed_leg: Vec<FixedPayment>,
    /// Remaining floating coupons.
    pub floating_leg: Vec<FloatingCoupon>,
}

/// A term-index futures contract.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestRateFuture {
    /// Index.
    pub index: IborIndex,
    /// Last trading time.
    pub last_trading_time: f64,
    /// Fixing period start time.
    pub fixing_start: f64,
    /// Fixing period end time.
    pub fixing_end: f64,
    /// Accrual factor of the fixing period.
    pub fixing_accrual: f64,
    /// Quoted price, e.g. 0.9725.
    pub reference_price: f64,
}

/// A fixed-coupon bond priced on its issuer curve.
#[derive(Debug, Clone, PartialEq)]
pub struct BondSecurity {
    /// Currency.
    pub currency: Currency,
    /// Issuer.
    pub issuer: LegalEntity,
    /// Remaining cash flows per unit notional as `(time, amount)`.
    pub cash_flows: Vec<(f64, f64)>,
    /// Dirty price per unit notional.
    pub dirty_price: f64,
}

/// A calibration instrument at a valuation date.
#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentDerivative {
    /// Deposit.
    Cash(Cash),
    /// FRA.
    Fra(ForwardRateAgreement),
    /// Swap (term-index or overnight floating leg).
    Swap(Swap),
    /// Futures contract.
    Future(InterestRateFuture),
    /// Bond.
    Bond(BondSecurity),
}
