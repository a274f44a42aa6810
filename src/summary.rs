//! Everything the text report and the JSON export print, computed once.

use serde::Serialize;

use crate::analysis::{
    category_distribution, column_profile, feature_summary, grouped_statistics, leaked_values,
    mean_composition, partition_overlap, split_composition, ColumnProfile, Denominator,
    Distribution, GroupedStatistics, MeanComposition, PartitionOverlap, SplitComposition,
};
use crate::config::AnalysisConfig;
use crate::data::filter::AllowList;
use crate::data::model::{Dataset, Partition, Record};
use crate::data::schema::{Column, Feature};
use crate::features::Extractor;
use crate::stats::Summary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOverview {
    pub partition: Partition,
    pub file: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
}

/// A record as shown in the sample section, sequence shortened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    pub row_id: Option<String>,
    pub sequence: Option<String>,
    pub symbol: Option<String>,
    pub gene_type: Option<String>,
    pub gene_group_method: Option<String>,
    pub description: Option<String>,
}

impl SampleRow {
    fn of(record: &Record, width: usize) -> Self {
        SampleRow {
            row_id: record.row_id.clone(),
            sequence: record.sequence.as_deref().map(|s| truncate(s, width)),
            symbol: record.symbol.clone(),
            gene_type: record.gene_type.clone(),
            gene_group_method: record.gene_group_method.clone(),
            description: record.description.clone(),
        }
    }
}

/// First `width` characters followed by `...` when `text` is longer.
pub fn truncate(text: &str, width: usize) -> String {
    match text.char_indices().nth(width) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub label_column: Column,
    pub files: Vec<FileOverview>,
    pub total_rows: usize,
    pub profiles: Vec<ColumnProfile>,
    /// Label column over all rows, any value.
    pub labels: Distribution,
    pub labels_by_partition: SplitComposition,
    pub group_methods: Distribution,
    pub sequence_length: Option<Summary>,
    pub length_by_label: GroupedStatistics,
    pub gc_fraction: Option<Summary>,
    pub composition: Option<MeanComposition>,
    pub sequence_overlap: Vec<PartitionOverlap>,
    /// Distinct sequences found in more than one partition.
    pub leaked_sequences: usize,
    /// Label column restricted to recognized values.
    pub recognized_labels: Distribution,
    pub imbalance: Vec<(String, f64)>,
    pub sample: Vec<SampleRow>,
}

impl DatasetSummary {
    pub fn compute(dataset: &Dataset, config: &AnalysisConfig, label_column: Column) -> Self {
        let table = dataset.records();
        let extractor = Extractor::new(config.symbol_convention());

        let files = dataset
            .partitions()
            .iter()
            .map(|info| FileOverview {
                partition: info.partition,
                file: info.file_name(),
                rows: info.rows(),
                columns: info.columns.len(),
                column_names: info.columns.clone(),
            })
            .collect();

        let recognized_labels =
            category_distribution(table, label_column, &config.label_allow(), Denominator::AllRows);
        let imbalance = recognized_labels.imbalance_ratios();

        let sample = dataset
            .partition(Partition::Train)
            .iter()
            .take(config.sample_rows)
            .map(|r| SampleRow::of(r, config.sample_sequence_width))
            .collect();

        let summary = DatasetSummary {
            label_column,
            files,
            total_rows: table.len(),
            profiles: Column::REQUIRED
                .into_iter()
                .map(|c| column_profile(table, c))
                .collect(),
            labels: category_distribution(table, label_column, &AllowList::Any, Denominator::AllRows),
            labels_by_partition: split_composition(table, label_column, &AllowList::Any),
            group_methods: category_distribution(
                table,
                Column::GeneGroupMethod,
                &AllowList::Any,
                Denominator::AllRows,
            ),
            sequence_length: feature_summary(table, Feature::SequenceLength, &extractor),
            length_by_label: grouped_statistics(
                table,
                label_column,
                Feature::SequenceLength,
                &AllowList::Any,
                &extractor,
            ),
            gc_fraction: feature_summary(table, Feature::GcFraction, &extractor),
            composition: mean_composition(table),
            sequence_overlap: partition_overlap(table, Column::Sequence),
            leaked_sequences: leaked_values(table, Column::Sequence),
            recognized_labels,
            imbalance,
            sample,
        };
        log::debug!(
            "summarized {} rows, {} labels, {} leaked sequences",
            summary.total_rows,
            summary.labels.len(),
            summary.leaked_sequences
        );
        summary
    }

    /// Most common value of the label column, if any row carries one.
    pub fn most_common_label(&self) -> Option<&str> {
        self.labels.most_common().map(|e| e.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PartitionTable;
    use std::path::PathBuf;

    fn table(partition: Partition, rows: &[(&str, &str)]) -> PartitionTable {
        PartitionTable {
            partition,
            source: PathBuf::from(format!("data/{}.csv", partition.as_str())),
            columns: vec!["NucleotideSequence".into(), "GeneType".into()],
            records: rows
                .iter()
                .map(|&(seq, gene_type)| Record {
                    sequence: Some(seq.to_string()),
                    gene_type: Some(gene_type.to_string()),
                    ..Record::empty(partition)
                })
                .collect(),
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_partitions(vec![
            table(
                Partition::Train,
                &[("<ATGC>", "PSEUDO"), ("<AAAA>", "PSEUDO"), ("<GGGGCCCC>", "tRNA")],
            ),
            table(Partition::Test, &[("<ATGC>", "ncRNA"), ("<TT>", "mystery")]),
            table(Partition::Validation, &[("<GG>", "PSEUDO")]),
        ])
    }

    #[test]
    fn summary_sections() {
        let s = DatasetSummary::compute(&dataset(), &AnalysisConfig::default(), Column::GeneType);
        assert_eq!(s.total_rows, 6);
        assert_eq!(s.files.len(), 3);
        assert_eq!(s.files[0].file, "train.csv");
        assert_eq!(s.most_common_label(), Some("PSEUDO"));
        assert_eq!(s.labels.len(), 4);
        assert_eq!(s.recognized_labels.len(), 3);
        assert_eq!(s.leaked_sequences, 1);
        assert_eq!(s.sequence_overlap[0].shared, 1);
        assert_eq!(s.sequence_length.unwrap().max, 8.0);
        assert_eq!(s.labels_by_partition.rows(Partition::Validation), 1);
        assert_eq!(s.group_methods.total, 6);
        assert!(s.group_methods.is_empty());
        assert_eq!(s.sample.len(), 3);
    }

    #[test]
    fn truncation_is_char_based() {
        assert_eq!(truncate("ATGC", 4), "ATGC");
        assert_eq!(truncate("ATGCA", 4), "ATGC...");
        assert_eq!(truncate("ééé", 2), "éé...");
    }
}
