//! Interest rate indices: term (ibor-type) and overnight.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::daycounts::DayCountConvention;
use crate::error::ConvexResult;
use crate::types::{Currency, Date, Tenor};

/// A term rate index such as USD 3M LIBOR or EURIBOR 6M.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IborIndex {
    name: String,
    currency: Currency,
    tenor: Tenor,
    spot_lag: u32,
    day_count: DayCountConvention,
}

impl IborIndex {
    /// Creates a term rate index.
    ///
    /// `spot_lag` is the number of calendar days between fixing and the
    /// start of the underlying deposit.
    pub fn new(
        name: impl Into<String>,
        currency: Currency,
        tenor: Tenor,
        spot_lag: u32,
        day_count: DayCountConvention,
    ) -> Self {
        Self {
            name: name.into(),
            currency,
            tenor,
            spot_lag,
            day_count,
        }
    }

    /// Index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Tenor of the underlying deposit.
    #[must_use]
    pub fn tenor(&self) -> Tenor {
        self.tenor
    }

    /// Spot lag in calendar days.
    #[must_use]
    pub fn spot_lag(&self) -> u32 {
        self.spot_lag
    }

    /// Accrual convention of the underlying deposit.
    #[must_use]
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Fixing date for a deposit starting on `accrual_start`.
    #[must_use]
    pub fn fixing_date(&self, accrual_start: Date) -> Date {
        accrual_start.add_days(-i64::from(self.spot_lag))
    }

    /// Accrual start for a fixing on `fixing_date`.
    #[must_use]
    pub fn accrual_start(&self, fixing_date: Date) -> Date {
        fixing_date.add_days(i64::from(self.spot_lag))
    }

    /// Maturity of the underlying deposit starting on `accrual_start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the date arithmetic overflows.
    pub fn accrual_end(&self, accrual_start: Date) -> ConvexResult<Date> {
        self.tenor.add_to(accrual_start)
    }
}

impl fmt::Display for IborIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An overnight index such as SOFR, EONIA or Fed Funds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OvernightIndex {
    name: String,
    currency: Currency,
    publication_lag: u32,
    day_count: DayCountConvention,
}

impl OvernightIndex {
    /// Creates an overnight index.
    pub fn new(
        name: impl Into<String>,
        currency: Currency,
        publication_lag: u32,
        day_count: DayCountConvention,
    ) -> Self {
        Self {
            name: name.into(),
            currency,
            publication_lag,
            day_count,
        }
    }

    /// Index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Publication lag in days (0 or 1).
    #[must_use]
    pub fn publication_lag(&self) -> u32 {
        self.publication_lag
    }

    /// Accrual convention.
    #[must_use]
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }
}

impl fmt::Display for OvernightIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Either kind of index; used to key fixing series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Index {
    /// A term rate index.
    Ibor(IborIndex),
    /// An overnight index.
    Overnight(OvernightIndex),
}

impl Index {
    /// Index name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Index::Ibor(index) => index.name(),
            Index::Overnight(index) => index.name(),
        }
    }

    /// Index currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        match self {
            Index::Ibor(index) => index.currency(),
            Index::Overnight(index) => index.currency(),
        }
    }
}

impl From<IborIndex> for Index {
    fn from(index: IborIndex) -> Self {
        Index::Ibor(index)
    }
}

impl From<OvernightIndex> for Index {
    fn from(index: OvernightIndex) -> Self {
        Index::Overnight(index)
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
