//! Routing bond issuers to issuer curves.
//!
//! A [`LegalEntityFilter`] reduces a [`LegalEntity`] to an [`IssuerKey`] made
//! of the attributes it looks at. An [`IssuerMatcher`] pairs a filter with the
//! key a curve is registered under; a bond is priced off the first curve
//! whose matcher accepts its issuer.
//!
//! ```rust
//! use std::sync::Arc;
//! use convex_core::prelude::*;
//! use convex_curves::issuer::{IssuerKey, IssuerMatcher, Matcher, ShortNameFilter};
//!
//! let matcher = IssuerMatcher::new(IssuerKey::single("US TREASURY"), Arc::new(ShortNameFilter));
//! assert!(matcher.matches(&LegalEntity::new("T", "US TREASURY")));
//! assert!(!matcher.matches(&LegalEntity::new("DBR", "BUNDESREPUBLIK")));
//! ```

use std::fmt;
use std::sync::Arc;

use convex_core::types::LegalEntity;
use serde::{Deserialize, Serialize};

/// The attributes of an issuer selected by a filter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IssuerKey(Vec<String>);

impl IssuerKey {
    /// A key from several attributes, in filter order.
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// A key with a single attribute.
    pub fn single(part: impl Into<String>) -> Self {
        Self(vec![part.into()])
    }

    /// The attributes.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for IssuerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Extracts the attributes of a legal entity that identify its curve.
pub trait LegalEntityFilter: Send + Sync + fmt::Debug {
    /// The key for `entity`, or `None` when it lacks the attribute.
    fn classify(&self, entity: &LegalEntity) -> Option<IssuerKey>;

    /// Identifies the filter and its settings.
    ///
    /// Two filters with the same identity classify every entity alike.
    fn identity(&self) -> String {
        format!("{self:?}")
    }
}

/// Classifies by short name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortNameFilter;

impl LegalEntityFilter for ShortNameFilter {
    fn classify(&self, entity: &LegalEntity) -> Option<IssuerKey> {
        Some(IssuerKey::single(entity.short_name.clone()))
    }
}

/// Classifies by ticker.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickerFilter;

impl LegalEntityFilter for TickerFilter {
    fn classify(&self, entity: &LegalEntity) -> Option<IssuerKey> {
        Some(IssuerKey::single(entity.ticker.clone()))
    }
}

/// Classifies by sector.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectorFilter;

impl LegalEntityFilter for SectorFilter {
    fn classify(&self, entity: &LegalEntity) -> Option<IssuerKey> {
        entity.sector.map(|s| IssuerKey::single(s.label()))
    }
}

/// Classifies by region: its name, and optionally its countries and
/// currencies.
#[derive(Debug, Clone, Copy)]
pub struct RegionFilter {
    /// Include the region name.
    pub use_name: bool,
    /// Include the sorted country codes.
    pub use_countries: bool,
    /// Include the sorted currency codes.
    pub use_currencies: bool,
}

impl Default for RegionFilter {
    fn default() -> Self {
        Self {
            use_name: true,
            use_countries: false,
            use_currencies: false,
        }
    }
}

impl LegalEntityFilter for RegionFilter {
    fn classify(&self, entity: &LegalEntity) -> Option<IssuerKey> {
        let region = entity.region.as_ref()?;
        let mut parts = Vec::new();
        if self.use_name {
            parts.push(region.name.clone());
        }
        if self.use_countries {
            parts.extend(region.countries.iter().cloned());
        }
        if self.use_currencies {
            parts.extend(region.currencies.iter().map(|c| c.code().to_string()));
        }
        Some(IssuerKey(parts))
    }
}

/// Classifies by the ratings of the listed agencies, in list order.
///
/// Entities missing a rating from any listed agency are not classified.
#[derive(Debug, Clone, Default)]
pub struct CreditRatingFilter {
    agencies: Vec<String>,
}

impl CreditRatingFilter {
    /// A filter over the given agencies.
    pub fn new<I, S>(agencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            agencies: agencies.into_iter().map(Into::into).collect(),
        }
    }
}

impl LegalEntityFilter for CreditRatingFilter {
    fn classify(&self, entity: &LegalEntity) -> Option<IssuerKey> {
        self.agencies
            .iter()
            .map(|agency| entity.rating_by(agency).map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(IssuerKey)
    }
}

/// Concatenates the keys of several filters.
#[derive(Debug, Clone, Default)]
pub struct CombinedFilter {
    filters: Vec<Arc<dyn LegalEntityFilter>>,
}

impl CombinedFilter {
    /// Combines `filters` in order.
    #[must_use]
    pub fn new(filters: Vec<Arc<dyn LegalEntityFilter>>) -> Self {
        Self { filters }
    }
}

impl LegalEntityFilter for CombinedFilter {
    fn classify(&self, entity: &LegalEntity) -> Option<IssuerKey> {
        let mut parts = Vec::new();
        for filter in &self.filters {
            parts.extend(filter.classify(entity)?.0);
        }
        Some(IssuerKey(parts))
    }
}

/// Decides whether an issuer belongs to a curve.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// True if `entity` is priced off the curve this matcher is attached to.
    fn matches(&self, entity: &LegalEntity) -> bool;

    /// The key the curve is registered under.
    fn key(&self) -> &IssuerKey;

    /// Identity of the filter the key is compared against.
    fn filter_identity(&self) -> String;

    /// True if `other` has the same key and filter.
    fn same_registration(&self, other: &dyn Matcher) -> bool {
        self.key() == other.key() && self.filter_identity() == other.filter_identity()
    }
}

/// Matches issuers whose filtered key equals a fixed key.
#[derive(Debug, Clone)]
pub struct IssuerMatcher {
    key: IssuerKey,
    filter: Arc<dyn LegalEntityFilter>,
}

impl IssuerMatcher {
    /// Creates a matcher.
    pub fn new(key: IssuerKey, filter: Arc<dyn LegalEntityFilter>) -> Self {
        Self { key, filter }
    }
}

impl Matcher for IssuerMatcher {
    fn matches(&self, entity: &LegalEntity) -> bool {
        self.filter.classify(entity).as_ref() == Some(&self.key)
    }

    fn key(&self) -> &IssuerKey {
        &self.key
    }

    fn filter_identity(&self) -> String {
        self.filter.identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convex_core::types::{Currency, Region, Sector};

    fn bund_issuer() -> LegalEntity {
        LegalEntity::new("DBR", "BUNDESREPUBLIK")
            .with_rating("S&P", "AAA")
            .with_rating("Moody's", "Aaa")
            .with_sector(Sector::Government)
            .with_region(Region::country("Germany", "DE", Currency::EUR))
    }

    #[test]
    fn test_simple_filters() {
        let entity = bund_issuer();
        assert_eq!(
            TickerFilter.classify(&entity),
            Some(IssuerKey::single("DBR"))
        );
        assert_eq!(
            SectorFilter.classify(&entity),
            Some(IssuerKey::single("Government"))
        );
        assert_eq!(
            SectorFilter.classify(&LegalEntity::new("X", "X")),
            None
        );
    }

    #[test]
    fn test_region_filter() {
        let filter = RegionFilter {
            use_name: true,
            use_countries: true,
            use_currencies: true,
        };
        assert_eq!(
            filter.classify(&bund_issuer()),
            Some(IssuerKey::new(["Germany", "DE", "EUR"]))
        );
    }

    #[test]
    fn test_rating_filter_requires_every_agency() {
        let entity = bund_issuer();
        let filter = CreditRatingFilter::new(["Moody's", "S&P"]);
        assert_eq!(
            filter.classify(&entity),
            Some(IssuerKey::new(["Aaa", "AAA"]))
        );
        assert_eq!(CreditRatingFilter::new(["Fitch"]).classify(&entity), None);
    }

    #[test]
    fn test_combined_matcher() {
        let filter = CombinedFilter::new(vec![
            Arc::new(SectorFilter),
            Arc::new(CreditRatingFilter::new(["S&P"])),
        ]);
        let matcher = IssuerMatcher::new(IssuerKey::new(["Government", "AAA"]), Arc::new(filter));
        assert!(matcher.matches(&bund_issuer()));
        assert!(!matcher.matches(&LegalEntity::new("X", "X").with_sector(Sector::Government)));
        assert_eq!(matcher.key().to_string(), "Government/AAA");
    }

    #[test]
    fn test_registration_includes_filter() {
        let key = IssuerKey::single("AAA");
        let sp = IssuerMatcher::new(key.clone(), Arc::new(CreditRatingFilter::new(["S&P"])));
        let fitch = IssuerMatcher::new(key.clone(), Arc::new(CreditRatingFilter::new(["Fitch"])));
        let sp_again = IssuerMatcher::new(key, Arc::new(CreditRatingFilter::new(["S&P"])));

        assert!(!sp.same_registration(&fitch));
        assert!(sp.same_registration(&sp_again));
        assert!(!sp.same_registration(&IssuerMatcher::new(
            IssuerKey::single("AA"),
            Arc::new(CreditRatingFilter::new(["S&P"]))
        )));
    }

    #[test]
    fn test_filter_choice_changes_classification() {
        let entity = bund_issuer();
        let by_rating = IssuerMatcher::new(
            IssuerKey::single("AAA"),
            Arc::new(CreditRatingFilter::new(["S&P"])),
        );
        let by_ticker = IssuerMatcher::new(IssuerKey::single("AAA"), Arc::new(TickerFilter));
        assert!(by_rating.matches(&entity));
        assert!(!by_ticker.matches(&entity));

        let other = LegalEntity::new("OAT", "REPUBLIQUE FRANCAISE").with_rating("S&P", "AA");
        assert!(!by_rating.matches(&other));
    }
}
