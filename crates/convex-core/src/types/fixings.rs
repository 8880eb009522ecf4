//! Historical index fixings.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::types::{Date, Index};

/// Observed fixings of one index, ordered by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixingSeries {
    values: BTreeMap<Date, f64>,
}

impl FixingSeries {
    /// Creates an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the fixing on `date`.
    pub fn insert(&mut self, date: Date, value: f64) {
        self.values.insert(date, value);
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with_fixing(mut self, date: Date, value: f64) -> Self {
        self.insert(date, value);
        self
    }

    /// The fixing published exactly on `date`.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.values.get(&date).copied()
    }

    /// The most recent fixing on or before `date`.
    #[must_use]
    pub fn latest_on_or_before(&self, date: Date) -> Option<(Date, f64)> {
        self.values
            .range(..=date)
            .next_back()
            .map(|(d, v)| (*d, *v))
    }

    /// Number of fixings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the series holds no fixings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merges `other` into this series; `other` wins on shared dates.
    pub fn merge(&mut self, other: &FixingSeries) {
        for (date, value) in &other.values {
            self.values.insert(*date, *value);
        }
    }

    /// Iterates over `(date, fixing)` in date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.values.iter().map(|(d, v)| (*d, *v))
    }
}

impl FromIterator<(Date, f64)> for FixingSeries {
    fn from_iter<T: IntoIterator<Item = (Date, f64)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Fixing series keyed by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixingSet {
    series: HashMap<Index, FixingSeries>,
}

impl FixingSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a series for `index`, merging with any existing one.
    pub fn insert(&mut self, index: impl Into<Index>, series: FixingSeries) {
        self.series.entry(index.into()).or_default().merge(&series);
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with_series(mut self, index: impl Into<Index>, series: FixingSeries) -> Self {
        self.insert(index, series);
        self
    }

    /// The series for `index`.
    #[must_use]
    pub fn get(&self, index: &Index) -> Option<&FixingSeries> {
        self.series.get(index)
    }

    /// The fixing of `index` published on `date`.
    #[must_use]
    pub fn fixing(&self, index: &Index, date: Date) -> Option<f64> {
        self.series.get(index).and_then(|s| s.get(date))
    }

    /// Merges all series of `other`; `other` wins on shared dates.
    pub fn merge(&mut self, other: &FixingSet) {
        for (index, series) in &other.series {
            self.series.entry(index.clone()).or_default().merge(series);
        }
    }

    /// Number of indices with a series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// True if no series are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
