//! Borrower reference data used to route bonds to issuer curves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::Currency;

/// Broad issuer sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sector {
    /// Sovereign government
    Government,
    /// Government agency or supranational
    Agency,
    /// Non-financial corporate
    Corporate,
    /// Bank or other financial institution
    Financial,
    /// Municipal or regional authority
    Municipal,
}

impl Sector {
    /// Short label used in issuer keys.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Sector::Government => "Government",
            Sector::Agency => "Agency",
            Sector::Corporate => "Corporate",
            Sector::Financial => "Financial",
            Sector::Municipal => "Municipal",
        }
    }
}

/// A rating assigned by one agency, in that agency's notation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgencyRating {
    /// Agency name, e.g. "S&P" or "Moody's".
    pub agency: String,
    /// Rating in the agency's notation, e.g. "AA+" or "Aa1".
    pub rating: String,
}

/// Geographic region of an entity: its countries and currencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Region name.
    pub name: String,
    /// ISO country codes.
    pub countries: BTreeSet<String>,
    /// Currencies of the region.
    pub currencies: BTreeSet<Currency>,
}

impl Region {
    /// A single-country region.
    pub fn country(name: impl Into<String>, country: impl Into<String>, currency: Currency) -> Self {
        Self {
            name: name.into(),
            countries: BTreeSet::from([country.into()]),
            currencies: BTreeSet::from([currency]),
        }
    }
}

/// A legal entity (bond issuer or borrower).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalEntity {
    /// Ticker.
    pub ticker: String,
    /// Short name.
    pub short_name: String,
    /// Ratings by agency.
    pub credit_ratings: Vec<AgencyRating>,
    /// Sector, if known.
    pub sector: Option<Sector>,
    /// Region, if known.
    pub region: Option<Region>,
}

impl LegalEntity {
    /// Creates an entity with only a ticker and short name.
    pub fn new(ticker: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            short_name: short_name.into(),
            credit_ratings: Vec::new(),
            sector: None,
            region: None,
        }
    }

    /// Adds a rating.
    #[must_use]
    pub fn with_rating(mut self, agency: impl Into<String>, rating: impl Into<String>) -> Self {
        self.credit_ratings.push(AgencyRating {
            agency: agency.into(),
            rating: rating.into(),
        });
        self
    }

    /// Sets the sector.
    #[must_use]
    pub fn with_sector(mut self, sector: Sector) -> Self {
        self.sector = Some(sector);
        self
    }

    /// Sets the region.
    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// The rating assigned by `agency`, if any.
    #[must_use]
    pub fn rating_by(&self, agency: &str) -> Option<&str> {
        self.credit_ratings
            .iter()
            .find(|r| r.agency.eq_ignore_ascii_case(agency))
            .map(|r| r.rating.as_str())
    }
}
