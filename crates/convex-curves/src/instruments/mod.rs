//! Calibration instruments.
//!
//! Instruments are defined on dates ([`InstrumentDefinition`]) and converted
//! at each valuation date into year-fraction form ([`InstrumentDerivative`]),
//! the form calculators price. Times are ACT/365F from the valuation date.

pub mod definitions;
pub mod derivatives;
mod node_time;

pub use definitions::{
    BondDefinition, DepositDefinition, FloatingLegDefinition, FraDefinition, FutureDefinition,
    InstrumentDefinition, SwapDefinition,
};
pub use derivatives::{
    BondSecurity, Cash, FixedPayment, FloatingCoupon, ForwardRateAgreement, InstrumentDerivative,
    InterestRateFuture, Swap,
};
pub use node_time::NodeTimeCalculator;

use convex_core::daycounts::DayCountConvention;
use convex_core::types::Date;

/// Year fraction from `valuation` to `date`, ACT/365F.
#[must_use]
pub fn time_between(valuation: Date, date: Date) -> f64 {
    DayCountConvention::Act365Fixed.year_fraction(valuation, date)
}
