//! Where on the time axis an instrument pins its curve.

use serde::{Deserialize, Serialize};

use super::derivatives::{FloatingCoupon, InstrumentDerivative};

/// Rule mapping a calibration instrument to the node time of its curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeTimeCalculator {
    /// Time of the last cash flow.
    #[default]
    Maturity,
    /// End of the last floating fixing period.
    LastFixingEnd,
    /// Start of the last floating fixing period.
    LastFixingStart,
}

impl NodeTimeCalculator {
    /// The node time for `instrument`.
    #[must_use]
    pub fn node_time(&self, instrument: &InstrumentDerivative) -> f64 {
        match instrument {
            InstrumentDerivative::Cash(c) => match self {
                Self::LastFixingStart => c.start_time,
                Self::Maturity | Self::LastFixingEnd => c.end_time,
            },
            InstrumentDerivative::Fra(f) => match self {
                Self::LastFixingStart => f.fixing_start,
                Self::Maturity | Self::LastFixingEnd => f.fixing_end,
            },
            InstrumentDerivative::Future(f) => match self {
                Self::LastFixingStart => f.fixing_start,
                Self::Maturity | Self::LastFixingEnd => f.fixing_end,
            },
            InstrumentDerivative::Bond(b) => b.cash_flows.last().map_or(0.0, |(t, _)| *t),
            InstrumentDerivative::Swap(s) => {
                let maturity = s
                    .fixed_leg
                    .iter()
                    .map(|p| p.payment_time)
                    .chain(s.floating_leg.iter().map(FloatingCoupon::payment_time))
                    .fold(0.0_f64, f64::max);
                let last = s.floating_leg.last();
                match (self, last) {
                    (Self::Maturity, _) | (_, None | Some(FloatingCoupon::Fixed { .. })) => maturity,
                    (Self::LastFixingEnd, Some(FloatingCoupon::Ibor { fixing_end, .. })) => *fixing_end,
                    (Self::LastFixingStart, Some(FloatingCoupon::Ibor { fixing_start, .. })) => {
                        *fixing_start
                    }
                    (Self::LastFixingEnd, Some(FloatingCoupon::Overnight { end_time, .. })) => *end_time,
                    (Self::LastFixingStart, Some(FloatingCoupon::Overnight { start_time, .. })) => {
                        *start_time
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::derivatives::{Cash, FixedPayment, Swap};
    use convex_core::daycounts::DayCountConvention;
    use convex_core::types::{Currency, IborIndex, Tenor};

    #[test]
    fn test_swap_node_times() {
        let index = IborIndex::new("EURIBOR 6M", Currency::EUR, Tenor::months(6), 2, DayCountConvention::Act360);
        let swap = InstrumentDerivative::Swap(Swap {
            currency: Currency::EUR,
            fixed_rate: 0.03,
            fixed_leg: vec![FixedPayment {
                payment_time: 2.0,
                accrual: 1.0,
            }],
            floating_leg: vec![FloatingCoupon::Ibor {
                index,
                fixing_start: 1.5,
                fixing_end: 2.01,
                fixing_accrual: 0.5,
                payment_time: 2.0,
                accrual: 0.5,
            }],
        });
        assert_eq!(NodeTimeCalculator::Maturity.node_time(&swap), 2.0);
        assert_eq!(NodeTimeCalculator::LastFixingEnd.node_time(&swap), 2.01);
        assert_eq!(NodeTimeCalculator::LastFixingStart.node_time(&swap), 1.5);
    }

    #[test]
    fn test_cash_node_times() {
        let cash = InstrumentDerivative::Cash(Cash {
            currency: Currency::USD,
            start_time: 0.0,
            end_time: 0.25,
            accrual: 0.25,
            rate: 0.02,
        });
        assert_eq!(NodeTimeCalculator::default().node_time(&cash), 0.25);
        assert_eq!(NodeTimeCalculator::LastFixingStart.node_time(&cash), 0.0);
    }
}
