//! Aggregation engine: pure queries over an immutable slice of records.
//!
//! ```text
//!   &[Record] ──► distribution   counts / percent per category
//!            ├──► grouped        per-group Summary of a Feature
//!            ├──► overlap        shared key values between partitions
//!            ├──► split          per-partition rows and category counts
//!            ├──► profile        column coverage, composition, correlation
//!            └──► symbols        symbol prefix / marker breakdowns
//! ```
//!
//! Nothing here mutates its input or keeps state between calls; calling any
//! query twice on the same slice gives identical results. Empty input gives
//! an empty result, never NaN.
use std::collections::HashMap;

pub mod distribution;
pub mod grouped;
pub mod overlap;
pub mod profile;
pub mod split;
pub mod symbols;

pub use distribution::{category_distribution, CategoryCount, Denominator, Distribution};
pub use grouped::{feature_summary, feature_values, grouped_statistics, GroupSummary, GroupedStatistics};
pub use overlap::{distinct_values, leaked_values, overlap_between, partition_overlap, PartitionOverlap};
pub use profile::{column_profile, feature_correlations, mean_composition, ColumnProfile, CorrelationMatrix, MeanComposition};
pub use split::{split_composition, PartitionBreakdown, SplitComposition};
pub use symbols::{marker_distribution, prefix_cross_tab, symbol_prefix_distribution, CrossTab};

/// Counter that remembers first-encounter order, so sorting by count keeps
/// ties deterministic.
#[derive(Debug, Default)]
pub(crate) struct Tally<'a> {
    entries: Vec<(&'a str, usize)>,
    index: HashMap<&'a str, usize>,
}

impl<'a> Tally<'a> {
    pub(crate) fn add(&mut self, label: &'a str) {
        match self.index.get(label) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(label, self.entries.len());
                self.entries.push((label, 1));
            }
        }
    }

    pub(crate) fn get(&self, label: &str) -> usize {
        self.index.get(label).map(|&i| self.entries[i].1).unwrap_or(0)
    }

    pub(crate) fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// Count descending; ties keep first-encounter order.
    pub(crate) fn into_sorted(mut self) -> Vec<(&'a str, usize)> {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries
    }
}

/// Groups values under labels, keeping first-encounter order of labels.
#[derive(Debug, Default)]
pub(crate) struct Buckets<'a, T> {
    entries: Vec<(&'a str, Vec<T>)>,
    index: HashMap<&'a str, usize>,
}

impl<'a, T> Buckets<'a, T> {
    pub(crate) fn push(&mut self, label: &'a str, value: T) {
        match self.index.get(label) {
            Some(&i) => self.entries[i].1.push(value),
            None => {
                self.index.insert(label, self.entries.len());
                self.entries.push((label, vec![value]));
            }
        }
    }

    pub(crate) fn into_entries(self) -> Vec<(&'a str, Vec<T>)> {
        self.entries
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::data::model::{Partition, Record};

    /// `(partition, sequence, symbol, gene_type)` rows.
    pub(crate) fn records(rows: &[(Partition, Option<&str>, Option<&str>, Option<&str>)]) -> Vec<Record> {
        rows.iter()
            .map(|&(partition, sequence, symbol, gene_type)| Record {
                sequence: sequence.map(str::to_string),
                symbol: symbol.map(str::to_string),
                gene_type: gene_type.map(str::to_string),
                gene_group_method: Some("NCBI Ortholog".to_string()),
                ..Record::empty(partition)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_sorts_by_count_then_first_seen() {
        let mut t = Tally::default();
        for label in ["b", "a", "c", "a", "c", "d"] {
            t.add(label);
        }
        assert_eq!(t.get("a"), 2);
        assert_eq!(t.get("zzz"), 0);
        assert_eq!(t.total(), 6);
        assert_eq!(t.into_sorted(), vec![("a", 2), ("c", 2), ("b", 1), ("d", 1)]);
    }
}
