use serde::Serialize;

use super::Buckets;
use crate::data::filter::{filtered_indices, AllowList};
use crate::data::model::Record;
use crate::data::schema::{Column, Feature};
use crate::features::Extractor;
use crate::stats::Summary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub label: String,
    pub stats: Summary,
}

/// Statistics of one feature per value of a grouping column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedStatistics {
    pub column: Column,
    pub feature: Feature,
    /// Largest group first; ties keep first-encounter order.
    pub groups: Vec<GroupSummary>,
}

impl GroupedStatistics {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&Summary> {
        self.groups.iter().find(|g| g.label == label).map(|g| &g.stats)
    }

    /// Groups re-ordered to follow `labels`; labels without rows are skipped.
    pub fn ordered_by(&self, labels: &[String]) -> Vec<&GroupSummary> {
        labels
            .iter()
            .filter_map(|l| self.groups.iter().find(|g| &g.label == l))
            .collect()
    }
}

/// Per-group count, mean, median, sample std, min and max of `feature`.
///
/// Rows whose group value is missing or not allowed are skipped. Groups with
/// no rows do not appear.
pub fn grouped_statistics(
    table: &[Record],
    column: Column,
    feature: Feature,
    allow: &AllowList,
    extractor: &Extractor,
) -> GroupedStatistics {
    let mut buckets = Buckets::default();
    for i in filtered_indices(table, column, allow) {
        let record = &table[i];
        if let Some(label) = record.value(column) {
            buckets.push(label, feature.measure(&extractor.extract(record)));
        }
    }

    let mut groups: Vec<GroupSummary> = buckets
        .into_entries()
        .into_iter()
        .filter_map(|(label, values)| {
            Summary::from_values(&values).map(|stats| GroupSummary {
                label: label.to_string(),
                stats,
            })
        })
        .collect();
    groups.sort_by(|a, b| b.stats.count.cmp(&a.stats.count));

    GroupedStatistics {
        column,
        feature,
        groups,
    }
}

/// `feature` for every record, in input order.
pub fn feature_values(table: &[Record], feature: Feature, extractor: &Extractor) -> Vec<f64> {
    table
        .iter()
        .map(|r| feature.measure(&extractor.extract(r)))
        .collect()
}

/// Statistics of `feature` over the whole table; `None` when it is empty.
pub fn feature_summary(table: &[Record], feature: Feature, extractor: &Extractor) -> Option<Summary> {
    Summary::from_values(&feature_values(table, feature, extractor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::records;
    use crate::data::model::Partition::{self, *};

    fn sample() -> Vec<Record> {
        records(&[
            (Train, Some("<ATGC>"), None, Some("PSEUDO")),
            (Train, Some("AT"), None, Some("PSEUDO")),
            (Train, Some("ATGCATGC"), None, Some("tRNA")),
            (Test, None, None, Some("tRNA")),
            (Test, Some("A"), None, Some("tRNA")),
            (Test, Some("AAA"), None, None),
            (Test, Some("GG"), None, Some("junk")),
        ])
    }

    #[test]
    fn per_group_lengths() {
        let rows = sample();
        let stats = grouped_statistics(
            &rows,
            Column::GeneType,
            Feature::SequenceLength,
            &AllowList::Any,
            &Extractor::default(),
        );
        let labels: Vec<_> = stats.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["tRNA", "PSEUDO", "junk"]);

        let trna = stats.get("tRNA").unwrap();
        assert_eq!(trna.count, 3);
        assert_eq!(trna.min, 0.0);
        assert_eq!(trna.max, 8.0);
        assert_eq!(trna.median, 1.0);
        assert!((trna.mean - 3.0).abs() < 1e-12);

        let pseudo = stats.get("PSEUDO").unwrap();
        assert_eq!(pseudo.count, 2);
        assert_eq!(pseudo.median, 3.0);
    }

    #[test]
    fn counts_match_rows_and_mean_is_bounded() {
        let rows = sample();
        let extractor = Extractor::default();
        for feature in Feature::ALL {
            let stats = grouped_statistics(&rows, Column::GeneType, feature, &AllowList::Any, &extractor);
            for g in &stats.groups {
                let expected = rows.iter().filter(|r| r.gene_type.as_deref() == Some(g.label.as_str())).count();
                assert_eq!(g.stats.count, expected);
                assert!(g.stats.min <= g.stats.mean && g.stats.mean <= g.stats.max);
            }
        }
    }

    #[test]
    fn allow_list_scopes_groups() {
        let stats = grouped_statistics(
            &sample(),
            Column::GeneType,
            Feature::SequenceLength,
            &AllowList::only(["PSEUDO", "rRNA"]),
            &Extractor::default(),
        );
        assert_eq!(stats.groups.len(), 1);
        assert!(stats.get("rRNA").is_none());
        let ordered = stats.ordered_by(&["rRNA".to_string(), "PSEUDO".to_string()]);
        assert_eq!(ordered.len(), 1);
    }

    #[test]
    fn empty_partition_gives_empty_groups() {
        let rows = sample();
        let validation: Vec<_> = rows
            .iter()
            .filter(|r| r.partition == Partition::Validation)
            .cloned()
            .collect();
        let stats = grouped_statistics(
            &validation,
            Column::GeneType,
            Feature::SequenceLength,
            &AllowList::Any,
            &Extractor::default(),
        );
        assert!(stats.is_empty());
        assert!(feature_summary(&validation, Feature::GcFraction, &Extractor::default()).is_none());
    }

    #[test]
    fn grouping_by_partition() {
        let stats = grouped_statistics(
            &sample(),
            Column::Partition,
            Feature::SequenceLength,
            &AllowList::Any,
            &Extractor::default(),
        );
        assert_eq!(stats.get("test").unwrap().count, 4);
        assert_eq!(stats.get("train").unwrap().count, 3);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let rows = sample();
        let run = || {
            grouped_statistics(
                &rows,
                Column::GeneType,
                Feature::GcFraction,
                &AllowList::only(["PSEUDO", "tRNA"]),
                &Extractor::default(),
            )
        };
        assert_eq!(run(), run());
    }
}
