use serde::Serialize;

use super::distribution::{Denominator, Distribution};
use super::Tally;
use crate::data::filter::AllowList;
use crate::data::model::Record;
use crate::data::schema::Column;
use crate::features::{symbol_prefix, SymbolConvention};

/// Distribution of symbol prefixes (leading `A-Z` run). Symbols without a
/// prefix are not counted; percentages are over all rows.
pub fn symbol_prefix_distribution(table: &[Record]) -> Distribution {
    Distribution::from_labels(
        table.len(),
        table
            .iter()
            .filter_map(|r| r.symbol.as_deref())
            .map(symbol_prefix)
            .filter(|p| !p.is_empty()),
        &AllowList::Any,
        Denominator::AllRows,
    )
}

/// Distribution of `column` among records whose symbol ends with the
/// convention's marker letter. Percentages are over those records.
pub fn marker_distribution(
    table: &[Record],
    column: Column,
    convention: &SymbolConvention,
) -> Distribution {
    let marked: Vec<&Record> = table
        .iter()
        .filter(|r| {
            r.symbol
                .as_deref()
                .is_some_and(|s| s.ends_with(convention.marker))
        })
        .collect();
    Distribution::from_labels(
        marked.len(),
        marked.iter().filter_map(|r| r.value(column)),
        &AllowList::Any,
        Denominator::AllRows,
    )
}

/// Counts of `column` values for the most frequent symbol prefixes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `counts[row][column]`.
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Top `top_n` symbol prefixes × the given `labels` of `column`.
pub fn prefix_cross_tab(table: &[Record], column: Column, labels: &[String], top_n: usize) -> CrossTab {
    let prefixes: Vec<String> = symbol_prefix_distribution(table)
        .top(top_n)
        .iter()
        .map(|e| e.label.clone())
        .collect();

    let counts = prefixes
        .iter()
        .map(|prefix| {
            let mut tally = Tally::default();
            for record in table {
                let matches = record
                    .symbol
                    .as_deref()
                    .is_some_and(|s| symbol_prefix(s) == prefix.as_str());
                if !matches {
                    continue;
                }
                if let Some(v) = record.value(column) {
                    tally.add(v);
                }
            }
            labels.iter().map(|l| tally.get(l)).collect()
        })
        .collect();

    CrossTab {
        rows: prefixes,
        columns: labels.to_vec(),
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::records;
    use crate::data::model::Partition::*;

    fn sample() -> Vec<Record> {
        records(&[
            (Train, None, Some("LOC101"), Some("PSEUDO")),
            (Train, None, Some("LOC102"), Some("ncRNA")),
            (Train, None, Some("RPL21P"), Some("PSEUDO")),
            (Test, None, Some("RPS3P"), Some("PSEUDO")),
            (Test, None, Some("mir-21"), Some("ncRNA")),
            (Test, None, None, Some("tRNA")),
            (Validation, None, Some("LOC103"), Some("PSEUDO")),
        ])
    }

    #[test]
    fn prefixes_ranked() {
        let dist = symbol_prefix_distribution(&sample());
        assert_eq!(dist.entries[0].label, "LOC");
        assert_eq!(dist.entries[0].count, 3);
        assert_eq!(dist.count("RPL"), 1);
        assert_eq!(dist.total, 7);
        assert_eq!(dist.counted(), 5);
    }

    #[test]
    fn marker_suffixed_symbols() {
        let dist = marker_distribution(&sample(), Column::GeneType, &SymbolConvention::default());
        assert_eq!(dist.total, 2);
        assert_eq!(dist.count("PSEUDO"), 2);
        assert!((dist.percent_sum() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn cross_tab_by_prefix() {
        let labels = vec!["PSEUDO".to_string(), "ncRNA".to_string()];
        let tab = prefix_cross_tab(&sample(), Column::GeneType, &labels, 2);
        assert_eq!(tab.rows, ["LOC", "RPL"]);
        assert_eq!(tab.counts[0], vec![2, 1]);
        assert_eq!(tab.counts[1], vec![1, 0]);
        assert!(prefix_cross_tab(&[], Column::GeneType, &labels, 5).is_empty());
    }
}
