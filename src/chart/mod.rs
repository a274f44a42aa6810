//! SVG chart set.
//!
//! ```text
//!  Dataset ──► ChartData::compute ──► figures::* ──► NN_name.svg
//!               (all aggregation)      (layout only)
//! ```

mod figures;
pub mod svg;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::analysis::{
    category_distribution, column_profile, feature_correlations, feature_values,
    grouped_statistics, leaked_values, marker_distribution, mean_composition, partition_overlap,
    prefix_cross_tab, split_composition, symbol_prefix_distribution, CorrelationMatrix, CrossTab,
    Denominator, Distribution, GroupSummary, MeanComposition, PartitionOverlap, SplitComposition,
};
use crate::config::{AnalysisConfig, ChartStyle};
use crate::data::filter::AllowList;
use crate::data::model::{Dataset, Record};
use crate::data::schema::{Column, Feature};
use crate::features::Extractor;
use crate::report::fmt_int;
use crate::stats::{Histogram, Summary};

/// Sequences shorter than this are flagged on the dashboard.
pub const SHORT_SEQUENCE: usize = 10;
/// Largest-to-smallest class ratio above which imbalance is flagged.
pub const IMBALANCE_ALERT: f64 = 10.0;

// ---------------------------------------------------------------------------
// Chart inputs
// ---------------------------------------------------------------------------

/// Every aggregate the figures draw, computed up front.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub label_column: Column,
    pub total_rows: usize,
    /// Distinct values of the label column, recognized or not.
    pub label_count: usize,
    pub recognized: Distribution,
    pub imbalance: Vec<(String, f64)>,
    pub length: Option<Summary>,
    pub length_hist: Option<Histogram>,
    pub length_by_focus: Vec<GroupSummary>,
    pub split: SplitComposition,
    pub overlaps: Vec<PartitionOverlap>,
    pub leaked: usize,
    /// GC content in percent.
    pub gc: Option<Summary>,
    pub gc_hist: Option<Histogram>,
    pub gc_by_focus: Vec<GroupSummary>,
    pub composition: Option<MeanComposition>,
    pub prefixes: Distribution,
    pub top_prefixes: usize,
    pub prefix_by_label: CrossTab,
    pub marker: char,
    pub marker_labels: Distribution,
    pub symbol_length_hist: Option<Histogram>,
    pub correlations: CorrelationMatrix,
    pub short_sequences: usize,
    pub missing_cells: usize,
}

impl ChartData {
    pub fn compute(dataset: &Dataset, config: &AnalysisConfig, label_column: Column) -> Self {
        let table = dataset.records();
        let extractor = Extractor::new(config.symbol_convention());
        let bins = config.histogram_bins;

        let recognized =
            category_distribution(table, label_column, &config.label_allow(), Denominator::AllRows);
        let imbalance = recognized.imbalance_ratios();
        let label_count =
            category_distribution(table, label_column, &AllowList::Any, Denominator::AllRows).len();

        let lengths = feature_values(table, Feature::SequenceLength, &extractor);
        let short_sequences = lengths
            .iter()
            .filter(|l| **l < SHORT_SEQUENCE as f64)
            .count();

        let focus = config.focus_allow();
        let length_by_focus = grouped_statistics(
            table,
            label_column,
            Feature::SequenceLength,
            &focus,
            &extractor,
        )
        .ordered_by(&config.focus_labels)
        .into_iter()
        .cloned()
        .collect();

        let gc: Vec<f64> = feature_values(table, Feature::GcFraction, &extractor)
            .into_iter()
            .map(|f| f * 100.0)
            .collect();
        let gc_by_focus = grouped_statistics(table, label_column, Feature::GcFraction, &focus, &extractor)
            .ordered_by(&config.focus_labels)
            .into_iter()
            .map(|g| GroupSummary {
                label: g.label.clone(),
                stats: percent(g.stats),
            })
            .collect();

        let with_symbol: Vec<Record> = table.iter().filter(|r| r.symbol.is_some()).cloned().collect();
        let symbol_lengths = feature_values(&with_symbol, Feature::SymbolLength, &extractor);

        let missing_cells = Column::REQUIRED
            .into_iter()
            .map(|c| column_profile(table, c).missing)
            .sum();

        let data = ChartData {
            label_column,
            total_rows: table.len(),
            label_count,
            recognized,
            imbalance,
            length: Summary::from_values(&lengths),
            length_hist: Histogram::build(&lengths, bins),
            length_by_focus,
            split: split_composition(table, label_column, &config.split_allow()),
            overlaps: partition_overlap(table, Column::Sequence),
            leaked: leaked_values(table, Column::Sequence),
            gc: Summary::from_values(&gc),
            gc_hist: Histogram::build(&gc, bins),
            gc_by_focus,
            composition: mean_composition(table),
            prefixes: symbol_prefix_distribution(table),
            top_prefixes: config.top_prefixes,
            prefix_by_label: prefix_cross_tab(
                table,
                label_column,
                &config.split_labels,
                config.top_prefixes.min(10),
            ),
            marker: config.symbol_marker,
            marker_labels: marker_distribution(table, label_column, &config.symbol_convention()),
            symbol_length_hist: Histogram::build(&symbol_lengths, bins),
            correlations: feature_correlations(table, &Feature::ALL, &extractor),
            short_sequences,
            missing_cells,
        };
        log::debug!(
            "chart data: {} rows, {} recognized labels, {} leaked",
            data.total_rows,
            data.recognized.len(),
            data.leaked
        );
        data
    }

    /// Problems worth a look, most severe first; a single `Good` entry when
    /// nothing was found.
    pub fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        if self.leaked > 0 {
            issues.push(Issue {
                severity: Severity::Warning,
                text: format!(
                    "Data leakage: {} sequences appear in more than one partition",
                    fmt_int(self.leaked)
                ),
            });
        }
        let worst = self.imbalance.iter().map(|(_, r)| *r).fold(1.0, f64::max);
        if worst > IMBALANCE_ALERT {
            issues.push(Issue {
                severity: Severity::Warning,
                text: format!("Class imbalance: largest class is {worst:.0}x the smallest"),
            });
        }
        if self.short_sequences > 0 {
            issues.push(Issue {
                severity: Severity::Caution,
                text: format!(
                    "{} sequences shorter than {} bases",
                    fmt_int(self.short_sequences),
                    SHORT_SEQUENCE
                ),
            });
        }
        if self.missing_cells > 0 {
            issues.push(Issue {
                severity: Severity::Caution,
                text: format!("{} missing values", fmt_int(self.missing_cells)),
            });
        }
        if issues.is_empty() {
            issues.push(Issue {
                severity: Severity::Good,
                text: "No issues detected".to_string(),
            });
        }
        issues
    }
}

fn percent(s: Summary) -> Summary {
    Summary {
        mean: s.mean * 100.0,
        median: s.median * 100.0,
        std: s.std * 100.0,
        min: s.min * 100.0,
        max: s.max * 100.0,
        ..s
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Caution,
    Good,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Writes the eight figures into `out_dir` (created if missing) and returns
/// the written paths in order.
pub fn render_all(data: &ChartData, style: &ChartStyle, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;

    let outputs: [(&str, fn(&ChartData, &ChartStyle) -> Result<String, std::fmt::Error>); 8] = [
        ("01_gene_type_distribution.svg", figures::label_distribution),
        ("02_sequence_length_distribution.svg", figures::sequence_lengths),
        ("03_data_split_analysis.svg", figures::data_split),
        ("04_nucleotide_composition.svg", figures::nucleotide_composition),
        ("05_class_imbalance.svg", figures::class_imbalance),
        ("06_symbol_patterns.svg", figures::symbol_patterns),
        ("07_correlation_heatmap.svg", figures::correlation_heatmap),
        ("08_summary_dashboard.svg", figures::dashboard),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (name, draw) in outputs {
        let path = out_dir.join(name);
        let svg = draw(data, style).with_context(|| format!("failed to render {name}"))?;
        fs::write(&path, svg).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Partition, PartitionTable};

    fn table(partition: Partition, rows: &[(&str, &str, &str)]) -> PartitionTable {
        PartitionTable {
            partition,
            source: PathBuf::from(format!("{}.csv", partition.as_str())),
            columns: Vec::new(),
            records: rows
                .iter()
                .map(|&(seq, symbol, gene_type)| Record {
                    sequence: Some(seq.to_string()),
                    symbol: Some(symbol.to_string()),
                    gene_type: Some(gene_type.to_string()),
                    gene_group_method: Some("NCBI Ortholog".to_string()),
                    description: Some("desc".to_string()),
                    ..Record::empty(partition)
                })
                .collect(),
        }
    }

    fn long(base: &str) -> String {
        format!("<{}>", base.repeat(20))
    }

    #[test]
    fn clean_dataset_has_no_issues() {
        let (a, b) = (long("AT"), long("GC"));
        let dataset = Dataset::from_partitions(vec![
            table(Partition::Train, &[(&a, "LOC1", "PSEUDO"), (&b, "RPL1P", "tRNA")]),
            table(Partition::Test, &[(&long("AAG"), "LOC2", "PSEUDO")]),
        ]);
        let data = ChartData::compute(&dataset, &AnalysisConfig::default(), Column::GeneType);
        assert_eq!(data.issues(), vec![Issue { severity: Severity::Good, text: "No issues detected".into() }]);
        assert_eq!(data.length_by_focus[0].label, "PSEUDO");
        assert_eq!(data.gc_by_focus.len(), 2);
        assert!((data.gc.unwrap().max - 100.0).abs() < 1e-9);
        assert_eq!(data.marker_labels.count("tRNA"), 1);
    }

    #[test]
    fn issues_flag_leakage_short_and_missing() {
        let a = long("AT");
        let mut train = table(Partition::Train, &[(&a, "LOC1", "PSEUDO"), ("<AC>", "X", "tRNA")]);
        train.records[1].description = None;
        let dataset = Dataset::from_partitions(vec![
            train,
            table(Partition::Validation, &[(&a, "LOC2", "PSEUDO")]),
        ]);
        let data = ChartData::compute(&dataset, &AnalysisConfig::default(), Column::GeneType);
        let issues = data.issues();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(issues[0].text.contains("1 sequences"));
        assert!(issues[1].text.contains("shorter than 10"));
        assert_eq!(issues[2].text, "1 missing values");
    }

    #[test]
    fn render_writes_every_figure() {
        let a = long("ATGC");
        let dataset = Dataset::from_partitions(vec![
            table(Partition::Train, &[(&a, "LOC1", "PSEUDO"), ("<GGCA>", "RPS3P", "ncRNA")]),
            table(Partition::Test, &[(&a, "MIR21", "ncRNA")]),
            table(Partition::Validation, &[("<TTT>", "LOC9", "tRNA")]),
        ]);
        let data = ChartData::compute(&dataset, &AnalysisConfig::default(), Column::GeneType);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts");
        let written = render_all(&data, &ChartStyle::default(), &out).unwrap();
        assert_eq!(written.len(), 8);
        for path in &written {
            let svg = std::fs::read_to_string(path).unwrap();
            assert!(svg.starts_with("<svg"), "{}", path.display());
        }
        assert!(written[7].ends_with("08_summary_dashboard.svg"));
    }

    #[test]
    fn empty_dataset_still_renders() {
        let dataset = Dataset::from_partitions(Vec::new());
        let data = ChartData::compute(&dataset, &AnalysisConfig::default(), Column::GeneType);
        assert!(data.length_hist.is_none());
        let dir = tempfile::tempdir().unwrap();
        let written = render_all(&data, &ChartStyle::default(), dir.path()).unwrap();
        let dashboard = std::fs::read_to_string(&written[7]).unwrap();
        assert!(dashboard.contains("(no data)"));
    }
}
