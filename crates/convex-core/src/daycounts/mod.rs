//! Day count conventions used for accrual fractions.
//!
//! Curve time itself is always ACT/365 Fixed from the valuation date; the
//! conventions here only drive coupon and index accruals.
//!
//! # Usage
//!
//! ```rust
//! use convex_core::daycounts::DayCountConvention;
//! use convex_core::types::Date;
//!
//! let start = Date::from_ymd(2025, 1, 15).unwrap();
//! let end = Date::from_ymd(2025, 7, 15).unwrap();
//! let yf = DayCountConvention::Act360.year_fraction(start, end);
//! assert!((yf - 181.0 / 360.0).abs() < 1e-15);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConvexError;
use crate::types::Date;

/// Supported day count conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DayCountConvention {
    /// Actual/360 - money market instruments and most ibor indices
    #[default]
    Act360,

    /// Actual/365 Fixed - GBP money markets, curve time
    Act365Fixed,

    /// 30/360 US (Bond Basis) - USD fixed legs and corporate bonds
    Thirty360,
}

impl DayCountConvention {
    /// Returns the market name of the convention.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Act360 => "ACT/360",
            DayCountConvention::Act365Fixed => "ACT/365F",
            DayCountConvention::Thirty360 => "30/360",
        }
    }

    /// Day count numerator between two dates.
    #[must_use]
    pub fn day_count(&self, start: Date, end: Date) -> i64 {
        match self {
            DayCountConvention::Act360 | DayCountConvention::Act365Fixed => {
                start.days_between(&end)
            }
            DayCountConvention::Thirty360 => thirty_360_days(start, end),
        }
    }

    /// Year fraction between two dates. Negative if `end < start`.
    #[must_use]
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        let days = self.day_count(start, end) as f64;
        match self {
            DayCountConvention::Act360 | DayCountConvention::Thirty360 => days / 360.0,
            DayCountConvention::Act365Fixed => days / 365.0,
        }
    }
}

fn thirty_360_days(start: Date, end: Date) -> i64 {
    let mut d1 = i64::from(start.day());
    let mut d2 = i64::from(end.day());
    if d1 == 31 {
        d1 = 30;
    }
    if d2 == 31 && d1 == 30 {
        d2 = 30;
    }
    let years = i64::from(end.year() - start.year());
    let months = i64::from(end.month()) - i64::from(start.month());
    360 * years + 30 * months + (d2 - d1)
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DayCountConvention {
    type Err = ConvexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACT/360" | "A360" => Ok(DayCountConvention::Act360),
            "ACT/365F" | "ACT/365 FIXED" | "A365F" => Ok(DayCountConvention::Act365Fixed),
            "30/360" | "30/360 US" | "BOND BASIS" => Ok(DayCountConvention::Thirty360),
            _ => Err(ConvexError::UnknownDayCount {
                name: s.to_string(),
            }),
        }
    }
}
