//! Building-block bundle: how calibrated parameters respond to market quotes.
//!
//! Every calibrated curve carries a [`BundleEntry`]: the [`BuildingBlock`]
//! listing whose market quotes the curve depends on (its own, plus those of
//! every curve it was built on), and the matrix `∂parameters/∂quotes` over
//! those columns. Later blocks chain through the entries of earlier ones, so
//! a spread curve reports its sensitivity to the base curve's quotes too.

use std::collections::BTreeMap;

use nalgebra::DMatrix;

/// Column layout of a transition matrix: for each curve, where its market
/// quotes start and how many there are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingBlock {
    curves: Vec<(String, usize, usize)>,
}

impl BuildingBlock {
    /// An empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `count` columns for `curve` and returns where they start.
    ///
    /// A curve already in the layout keeps its columns.
    pub fn push(&mut self, curve: &str, count: usize) -> usize {
        if let Some((start, _)) = self.position(curve) {
            return start;
        }
        let start = self.size();
        self.curves.push((curve.to_string(), start, count));
        start
    }

    /// First column and column count of `curve`.
    #[must_use]
    pub fn position(&self, curve: &str) -> Option<(usize, usize)> {
        self.curves
            .iter()
            .find(|(name, _, _)| name == curve)
            .map(|(_, start, count)| (*start, *count))
    }

    /// Total number of columns.
    #[must_use]
    pub fn size(&self) -> usize {
        self.curves.last().map_or(0, |(_, start, count)| start + count)
    }

    /// Curves in column order with their start and count.
    pub fn curves(&self) -> impl Iterator<Item = (&str, usize, usize)> {
        self.curves
            .iter()
            .map(|(name, start, count)| (name.as_str(), *start, *count))
    }
}

/// Layout and transition matrix of one curve.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleEntry {
    block: BuildingBlock,
    matrix: DMatrix<f64>,
}

impl BundleEntry {
    /// Creates an entry; the matrix has one row per curve parameter and one
    /// column per quote in `block`.
    #[must_use]
    pub fn new(block: BuildingBlock, matrix: DMatrix<f64>) -> Self {
        Self { block, matrix }
    }

    /// Column layout.
    #[must_use]
    pub fn block(&self) -> &BuildingBlock {
        &self.block
    }

    /// `∂parameters/∂quotes`.
    #[must_use]
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// The matrix spread onto the columns of `target`, which must contain
    /// every curve of this entry's block.
    pub(crate) fn embedded_in(&self, target: &BuildingBlock) -> DMatrix<f64> {
        let mut embedded = DMatrix::zeros(self.matrix.nrows(), target.size());
        for (curve, start, count) in self.block.curves() {
            if let Some((to, _)) = target.position(curve) {
                embedded
                    .columns_mut(to, count)
                    .copy_from(&self.matrix.columns(start, count));
            }
        }
        embedded
    }
}

/// Bundle entries of all calibrated curves, by curve name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingBlockBundle {
    entries: BTreeMap<String, BundleEntry>,
}

impl BuildingBlockBundle {
    /// An empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry of `curve`.
    pub fn add(&mut self, curve: impl Into<String>, entry: BundleEntry) {
        self.entries.insert(curve.into(), entry);
    }

    /// Entry of `curve`.
    #[must_use]
    pub fn get(&self, curve: &str) -> Option<&BundleEntry> {
        self.entries.get(curve)
    }

    /// True if `curve` has an entry.
    #[must_use]
    pub fn contains(&self, curve: &str) -> bool {
        self.entries.contains_key(curve)
    }

    /// Copies every entry of `other`, replacing on conflict.
    pub fn merge(&mut self, other: &BuildingBlockBundle) {
        self.entries.extend(
            other
                .entries
                .iter()
                .map(|(name, entry)| (name.clone(), entry.clone())),
        );
    }

    /// Curves with an entry, sorted.
    pub fn curve_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the bundle is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_layout() {
        let mut block = BuildingBlock::new();
        assert_eq!(block.push("OIS", 3), 0);
        assert_eq!(block.push("LIBOR", 2), 3);
        assert_eq!(block.push("OIS", 3), 0);
        assert_eq!(block.size(), 5);
        assert_eq!(block.position("LIBOR"), Some((3, 2)));
        assert_eq!(block.position("EURIBOR"), None);
    }

    #[test]
    fn test_embedding_moves_columns() {
        let mut source = BuildingBlock::new();
        source.push("OIS", 2);
        let entry = BundleEntry::new(source, DMatrix::from_row_slice(1, 2, &[1.0, 2.0]));

        let mut target = BuildingBlock::new();
        target.push("EUR", 1);
        target.push("OIS", 2);
        let embedded = entry.embedded_in(&target);
        assert_eq!(embedded, DMatrix::from_row_slice(1, 3, &[0.0, 1.0, 2.0]));
    }

    #[test]
    fn test_merge_replaces() {
        let mut block = BuildingBlock::new();
        block.push("OIS", 1);
        let mut first = BuildingBlockBundle::new();
        first.add("OIS", BundleEntry::new(block.clone(), DMatrix::from_element(1, 1, 1.0)));
        let mut second = BuildingBlockBundle::new();
        second.add("OIS", BundleEntry::new(block, DMatrix::from_element(1, 1, 2.0)));
        first.merge(&second);
        assert_eq!(first.len(), 1);
        assert_eq!(first.get("OIS").unwrap().matrix()[(0, 0)], 2.0);
    }
}
