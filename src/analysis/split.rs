use serde::Serialize;

use super::distribution::{category_distribution, Denominator};
use super::Tally;
use crate::data::filter::AllowList;
use crate::data::model::{Partition, Record};
use crate::data::schema::Column;

/// One partition's size and its counts over the compared labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionBreakdown {
    pub partition: Partition,
    pub rows: usize,
    /// Percent of all rows in the table.
    pub share: f64,
    /// Count per label, aligned with `SplitComposition::labels`.
    pub counts: Vec<usize>,
}

/// Per-partition row counts and label counts, side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitComposition {
    pub column: Column,
    pub total: usize,
    pub labels: Vec<String>,
    pub partitions: Vec<PartitionBreakdown>,
}

impl SplitComposition {
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn rows(&self, partition: Partition) -> usize {
        self.breakdown(partition).map(|b| b.rows).unwrap_or(0)
    }

    pub fn count(&self, partition: Partition, label: &str) -> usize {
        let Some(col) = self.labels.iter().position(|l| l == label) else {
            return 0;
        };
        self.breakdown(partition).map(|b| b.counts[col]).unwrap_or(0)
    }

    pub fn breakdown(&self, partition: Partition) -> Option<&PartitionBreakdown> {
        self.partitions.iter().find(|b| b.partition == partition)
    }
}

/// Rows and label counts for train, test and validation.
///
/// Every partition is listed, with zeros when it has no rows, unless the table
/// itself is empty. Labels follow the allow-list order for `Only`, and overall
/// frequency for `Any`; labels with no rows keep a zero column.
pub fn split_composition(table: &[Record], column: Column, allow: &AllowList) -> SplitComposition {
    if table.is_empty() {
        return SplitComposition {
            column,
            total: 0,
            labels: Vec::new(),
            partitions: Vec::new(),
        };
    }

    let labels: Vec<String> = match allow.labels() {
        Some(labels) => labels.to_vec(),
        None => category_distribution(table, column, allow, Denominator::AllRows)
            .entries
            .into_iter()
            .map(|e| e.label)
            .collect(),
    };

    let total = table.len();
    let partitions = Partition::ALL
        .into_iter()
        .map(|partition| {
            let mut rows = 0;
            let mut tally = Tally::default();
            for record in table.iter().filter(|r| r.partition == partition) {
                rows += 1;
                if let Some(v) = record.value(column) {
                    tally.add(v);
                }
            }
            PartitionBreakdown {
                partition,
                rows,
                share: rows as f64 / total as f64 * 100.0,
                counts: labels.iter().map(|l| tally.get(l)).collect(),
            }
        })
        .collect();

    SplitComposition {
        column,
        total,
        labels,
        partitions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::records;

    fn sized(train: usize, test: usize, validation: usize) -> Vec<Record> {
        let mut rows = Vec::new();
        for (partition, n) in [
            (Partition::Train, train),
            (Partition::Test, test),
            (Partition::Validation, validation),
        ] {
            for i in 0..n {
                let gene_type = if i % 2 == 0 { "PSEUDO" } else { "ncRNA" };
                rows.extend(records(&[(partition, Some("AT"), None, Some(gene_type))]));
            }
        }
        rows
    }

    #[test]
    fn seven_two_one_split() {
        let rows = sized(700, 200, 100);
        let split = split_composition(&rows, Column::GeneType, &AllowList::Any);
        assert_eq!(split.total, 1000);
        assert_eq!(split.rows(Partition::Train), 700);
        assert_eq!(split.rows(Partition::Test), 200);
        assert_eq!(split.rows(Partition::Validation), 100);
        assert!((split.breakdown(Partition::Train).unwrap().share - 70.0).abs() < 1e-9);
        assert_eq!(split.count(Partition::Train, "PSEUDO"), 350);
        assert_eq!(split.count(Partition::Validation, "ncRNA"), 50);
    }

    #[test]
    fn allow_list_order_and_zero_columns() {
        let rows = sized(4, 2, 0);
        let allow = AllowList::only(["ncRNA", "tRNA", "PSEUDO"]);
        let split = split_composition(&rows, Column::GeneType, &allow);
        assert_eq!(split.labels, ["ncRNA", "tRNA", "PSEUDO"]);
        assert_eq!(split.breakdown(Partition::Train).unwrap().counts, vec![2, 0, 2]);
        let validation = split.breakdown(Partition::Validation).unwrap();
        assert_eq!(validation.rows, 0);
        assert_eq!(validation.counts, vec![0, 0, 0]);
    }

    #[test]
    fn empty_table_gives_empty_split() {
        let split = split_composition(&[], Column::GeneType, &AllowList::Any);
        assert!(split.is_empty());
        assert_eq!(split.total, 0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let rows = sized(7, 2, 1);
        let allow = AllowList::only(["PSEUDO", "ncRNA", "tRNA"]);
        assert_eq!(
            split_composition(&rows, Column::GeneType, &allow),
            split_composition(&rows, Column::GeneType, &allow)
        );
    }
}
