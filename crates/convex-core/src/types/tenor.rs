//! Tenors such as `2D`, `3M` or `10Y`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConvexError, ConvexResult};
use crate::types::Date;

/// Unit of a [`Tenor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenorUnit {
    /// Calendar days.
    Days,
    /// Weeks of seven calendar days.
    Weeks,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

/// A period length expressed as an amount of a calendar unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tenor {
    amount: u32,
    unit: TenorUnit,
}

impl Tenor {
    /// Overnight (one day).
    pub const ON: Tenor = Tenor::days(1);
    /// Three months.
    pub const THREE_MONTHS: Tenor = Tenor::months(3);
    /// Six months.
    pub const SIX_MONTHS: Tenor = Tenor::months(6);
    /// One year.
    pub const ONE_YEAR: Tenor = Tenor::years(1);

    /// A tenor of `n` days.
    #[must_use]
    pub const fn days(n: u32) -> Self {
        Self {
            amount: n,
            unit: TenorUnit::Days,
        }
    }

    /// A tenor of `n` weeks.
    #[must_use]
    pub const fn weeks(n: u32) -> Self {
        Self {
            amount: n,
            unit: TenorUnit::Weeks,
        }
    }

    /// A tenor of `n` months.
    #[must_use]
    pub const fn months(n: u32) -> Self {
        Self {
            amount: n,
            unit: TenorUnit::Months,
        }
    }

    /// A tenor of `n` years.
    #[must_use]
    pub const fn years(n: u32) -> Self {
        Self {
            amount: n,
            unit: TenorUnit::Years,
        }
    }

    /// The amount of units.
    #[must_use]
    pub fn amount(&self) -> u32 {
        self.amount
    }

    /// The unit.
    #[must_use]
    pub fn unit(&self) -> TenorUnit {
        self.unit
    }

    /// Whole months in this tenor, if it is month or year based.
    #[must_use]
    pub fn whole_months(&self) -> Option<u32> {
        match self.unit {
            TenorUnit::Months => Some(self.amount),
            TenorUnit::Years => Some(self.amount * 12),
            TenorUnit::Days | TenorUnit::Weeks => None,
        }
    }

    /// Approximate length in years (30/360-style months, 365-day years).
    #[must_use]
    pub fn approximate_years(&self) -> f64 {
        let n = f64::from(self.amount);
        match self.unit {
            TenorUnit::Days => n / 365.0,
            TenorUnit::Weeks => n * 7.0 / 365.0,
            TenorUnit::Months => n / 12.0,
            TenorUnit::Years => n,
        }
    }

    /// Adds this tenor to a date (no business-day adjustment).
    ///
    /// # Errors
    ///
    /// Returns `ConvexError::InvalidDate` if the result is out of range.
    pub fn add_to(&self, date: Date) -> ConvexResult<Date> {
        let n = i64::from(self.amount);
        match self.unit {
            TenorUnit::Days => Ok(date.add_days(n)),
            TenorUnit::Weeks => Ok(date.add_days(7 * n)),
            TenorUnit::Months => date.add_months(self.amount as i32),
            TenorUnit::Years => date.add_years(self.amount as i32),
        }
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            TenorUnit::Days => 'D',
            TenorUnit::Weeks => 'W',
            TenorUnit::Months => 'M',
            TenorUnit::Years => 'Y',
        };
        write!(f, "{}{}", self.amount, suffix)
    }
}

impl FromStr for Tenor {
    type Err = ConvexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_uppercase();
        if text == "ON" || text == "O/N" {
            return Ok(Tenor::ON);
        }
        if text.len() < 2 {
            return Err(ConvexError::invalid_tenor(s));
        }
        let (digits, unit) = text.split_at(text.len() - 1);
        let amount: u32 = digits
            .parse()
            .map_err(|_| ConvexError::invalid_tenor(s))?;
        let unit = match unit {
            "D" => TenorUnit::Days,
            "W" => TenorUnit::Weeks,
            "M" => TenorUnit::Months,
            "Y" => TenorUnit::Years,
            _ => return Err(ConvexError::invalid_tenor(s)),
        };
        Ok(Tenor { amount, unit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tenors() {
        assert_eq!("3M".parse::<Tenor>().unwrap(), Tenor::months(3));
        assert_eq!("10y".parse::<Tenor>().unwrap(), Tenor::years(10));
        assert_eq!("ON".parse::<Tenor>().unwrap(), Tenor::days(1));
        assert_eq!("2w".parse::<Tenor>().unwrap(), Tenor::weeks(2));
        assert!("3Q".parse::<Tenor>().is_err());
        assert!("M".parse::<Tenor>().is_err());
    }

    #[test]
    fn test_add_to() {
        let d = Date::from_ymd(2025, 1, 31).unwrap();
        assert_eq!(Tenor::months(1).add_to(d).unwrap().to_string(), "2025-02-28");
        assert_eq!(Tenor::days(2).add_to(d).unwrap().to_string(), "2025-02-02");
        assert_eq!(Tenor::years(1).add_to(d).unwrap().to_string(), "2026-01-31");
    }

    #[test]
    fn test_display_round_trip() {
        for t in ["1D", "2W", "6M", "30Y"] {
            assert_eq!(t.parse::<Tenor>().unwrap().to_string(), t);
        }
    }
}
