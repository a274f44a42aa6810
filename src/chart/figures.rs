use std::fmt;

use super::svg::{Bars, Figure, Marker, Series, Slice};
use super::{ChartData, Severity};
use crate::analysis::{Distribution, GroupSummary};
use crate::color::{ColorMap, Palette};
use crate::config::ChartStyle;
use crate::data::model::Partition;
use crate::report::fmt_int;

type Svg = Result<String, fmt::Error>;

fn labels_of(dist: &Distribution) -> Vec<String> {
    dist.entries.iter().map(|e| e.label.clone()).collect()
}

fn counts_of(dist: &Distribution) -> Vec<f64> {
    dist.entries.iter().map(|e| e.count as f64).collect()
}

fn count_notes(dist: &Distribution) -> Vec<String> {
    dist.entries.iter().map(|e| fmt_int(e.count)).collect()
}

/// Recognized labels keep the same color in every figure.
fn label_colors(data: &ChartData, style: &ChartStyle) -> ColorMap {
    let palette = Palette::from_style(style);
    ColorMap::new(data.recognized.entries.iter().map(|e| e.label.as_str()), &palette)
}

fn colors_for(map: &ColorMap, labels: &[String]) -> Vec<String> {
    labels.iter().map(|l| map.color_for(l).to_string()).collect()
}

fn group_labels(groups: &[GroupSummary]) -> Vec<String> {
    groups.iter().map(|g| g.label.clone()).collect()
}

fn partition_names() -> Vec<String> {
    Partition::ALL.iter().map(|p| p.title().to_string()).collect()
}

// ---------------------------------------------------------------------------
// 01 – label distribution
// ---------------------------------------------------------------------------

pub(super) fn label_distribution(data: &ChartData, style: &ChartStyle) -> Svg {
    let column = data.label_column.header();
    let mut fig = Figure::new(style, &format!("{column} Distribution"), 1, 2);
    let colors = label_colors(data, style);
    let labels = labels_of(&data.recognized);
    let values = counts_of(&data.recognized);
    let notes = count_notes(&data.recognized);
    let fills = colors_for(&colors, &labels);

    fig.panel(0, 0).hbars(
        &format!("{column} Distribution (Count)"),
        &Bars {
            labels: &labels,
            values: &values,
            colors: &fills,
            annotations: Some(&notes),
            value_label: "Count",
            ..Bars::default()
        },
    )?;
    let slices: Vec<Slice> = data
        .recognized
        .entries
        .iter()
        .map(|e| Slice {
            label: e.label.clone(),
            value: e.count as f64,
            color: colors.color_for(&e.label).to_string(),
        })
        .collect();
    fig.panel(0, 1)
        .pie(&format!("{column} Distribution (Percentage)"), &slices)?;
    fig.finish()
}

// ---------------------------------------------------------------------------
// 02 – sequence lengths
// ---------------------------------------------------------------------------

pub(super) fn sequence_lengths(data: &ChartData, style: &ChartStyle) -> Svg {
    let column = data.label_column.header();
    let palette = Palette::from_style(style);
    let mut fig = Figure::new(style, "Sequence Length Analysis", 2, 2);

    let markers: Vec<Marker> = data
        .length
        .map(|s| {
            vec![
                Marker {
                    label: format!("Mean: {:.0}", s.mean),
                    value: s.mean,
                    color: style.mean_marker.clone(),
                },
                Marker {
                    label: format!("Median: {:.0}", s.median),
                    value: s.median,
                    color: style.median_marker.clone(),
                },
            ]
        })
        .unwrap_or_default();
    fig.panel(0, 0).histogram(
        "Overall Sequence Length Distribution",
        data.length_hist.as_ref(),
        &palette.get(0),
        &markers,
        "Sequence Length",
    )?;

    let labels = group_labels(&data.length_by_focus);
    let means: Vec<f64> = data.length_by_focus.iter().map(|g| g.stats.mean).collect();
    let stds: Vec<f64> = data.length_by_focus.iter().map(|g| g.stats.std).collect();
    let fills = colors_for(&label_colors(data, style), &labels);
    fig.panel(0, 1).bars(
        &format!("Sequence Length by {column} (mean ± std)"),
        &Bars {
            labels: &labels,
            values: &means,
            colors: &fills,
            errors: Some(&stds),
            value_label: "Sequence Length",
            ..Bars::default()
        },
    )?;

    let series = vec![
        Series {
            name: "Mean".to_string(),
            color: palette.get(0),
            values: means.clone(),
        },
        Series {
            name: "Median".to_string(),
            color: palette.get(1),
            values: data.length_by_focus.iter().map(|g| g.stats.median).collect(),
        },
    ];
    fig.panel_span(1, 0, 2).grouped_bars(
        &format!("Mean & Median Length by {column}"),
        &labels,
        &series,
        "Sequence Length",
    )?;
    fig.finish()
}

// ---------------------------------------------------------------------------
// 03 – data split
// ---------------------------------------------------------------------------

pub(super) fn data_split(data: &ChartData, style: &ChartStyle) -> Svg {
    let palette = Palette::from_style(style);
    let partition_colors = palette.take(Partition::ALL.len());
    let mut fig = Figure::new(style, "Data Split Analysis", 2, 2);

    let names = partition_names();
    let sizes: Vec<f64> = Partition::ALL
        .iter()
        .map(|p| data.split.rows(*p) as f64)
        .collect();
    let notes: Vec<String> = Partition::ALL
        .iter()
        .map(|p| fmt_int(data.split.rows(*p)))
        .collect();
    if data.split.is_empty() {
        fig.panel(0, 0).empty("Dataset Split Sizes")?;
    } else {
        fig.panel(0, 0).bars(
            "Dataset Split Sizes",
            &Bars {
                labels: &names,
                values: &sizes,
                colors: &partition_colors,
                annotations: Some(&notes),
                value_label: "Number of Samples",
                ..Bars::default()
            },
        )?;
    }

    let slices: Vec<Slice> = names
        .iter()
        .zip(&sizes)
        .zip(&partition_colors)
        .map(|((label, value), color)| Slice {
            label: label.clone(),
            value: *value,
            color: color.clone(),
        })
        .collect();
    fig.panel(0, 1).pie("Dataset Split Proportions", &slices)?;

    let series: Vec<Series> = data
        .split
        .partitions
        .iter()
        .zip(&partition_colors)
        .map(|(b, color)| Series {
            name: b.partition.title().to_string(),
            color: color.clone(),
            values: b.counts.iter().map(|c| *c as f64).collect(),
        })
        .collect();
    fig.panel(1, 0).grouped_bars(
        &format!("{} Distribution per Dataset", data.label_column.header()),
        &data.split.labels,
        &series,
        "Count",
    )?;

    let pairs: Vec<String> = data.overlaps.iter().map(|o| o.label()).collect();
    let shared: Vec<f64> = data.overlaps.iter().map(|o| o.shared as f64).collect();
    let shared_notes: Vec<String> = data.overlaps.iter().map(|o| fmt_int(o.shared)).collect();
    let leak_colors: Vec<String> = data
        .overlaps
        .iter()
        .map(|o| {
            if o.first == Partition::Train {
                style.warning.clone()
            } else {
                style.caution.clone()
            }
        })
        .collect();
    fig.panel(1, 1).bars(
        "Data Leakage: Overlapping Sequences Between Sets",
        &Bars {
            labels: &pairs,
            values: &shared,
            colors: &leak_colors,
            annotations: Some(&shared_notes),
            value_label: "Shared Sequences",
            ..Bars::default()
        },
    )?;
    fig.finish()
}

// ---------------------------------------------------------------------------
// 04 – nucleotide composition
// ---------------------------------------------------------------------------

pub(super) fn nucleotide_composition(data: &ChartData, style: &ChartStyle) -> Svg {
    let column = data.label_column.header();
    let palette = Palette::from_style(style);
    let mut fig = Figure::new(style, "Nucleotide Composition Analysis", 2, 2);

    let markers: Vec<Marker> = data
        .gc
        .map(|s| {
            vec![Marker {
                label: format!("Mean: {:.1}%", s.mean),
                value: s.mean,
                color: style.mean_marker.clone(),
            }]
        })
        .unwrap_or_default();
    fig.panel(0, 0).histogram(
        "GC Content Distribution",
        data.gc_hist.as_ref(),
        &palette.get(0),
        &markers,
        "GC Content (%)",
    )?;

    match &data.composition {
        Some(c) => {
            let bases: Vec<String> = ["A", "T", "G", "C"].iter().map(|b| b.to_string()).collect();
            let means = vec![c.a * 100.0, c.t * 100.0, c.g * 100.0, c.c * 100.0];
            let notes: Vec<String> = means.iter().map(|m| format!("{m:.1}%")).collect();
            fig.panel(0, 1).bars(
                "Average Nucleotide Composition",
                &Bars {
                    labels: &bases,
                    values: &means,
                    colors: &style.nucleotides,
                    annotations: Some(&notes),
                    value_label: "Percentage (%)",
                    ..Bars::default()
                },
            )?;
        }
        None => fig.panel(0, 1).empty("Average Nucleotide Composition")?,
    }

    let labels = group_labels(&data.gc_by_focus);
    let means: Vec<f64> = data.gc_by_focus.iter().map(|g| g.stats.mean).collect();
    let stds: Vec<f64> = data.gc_by_focus.iter().map(|g| g.stats.std).collect();
    let notes: Vec<String> = means.iter().map(|m| format!("{m:.1}%")).collect();
    let fills = colors_for(&label_colors(data, style), &labels);
    fig.panel(1, 0).hbars(
        &format!("GC Content by {column}"),
        &Bars {
            labels: &labels,
            values: &means,
            colors: &fills,
            annotations: Some(&notes),
            value_label: "Mean GC Content (%)",
            ..Bars::default()
        },
    )?;
    fig.panel(1, 1).bars(
        &format!("GC Content Spread by {column} (mean ± std)"),
        &Bars {
            labels: &labels,
            values: &means,
            colors: &fills,
            errors: Some(&stds),
            value_label: "GC Content (%)",
            ..Bars::default()
        },
    )?;
    fig.finish()
}

// ---------------------------------------------------------------------------
// 05 – class imbalance
// ---------------------------------------------------------------------------

pub(super) fn class_imbalance(data: &ChartData, style: &ChartStyle) -> Svg {
    let mut fig = Figure::new(style, "Class Imbalance Analysis", 1, 2);
    let colors = label_colors(data, style);
    let labels = labels_of(&data.recognized);
    let fills = colors_for(&colors, &labels);
    let values = counts_of(&data.recognized);
    let notes = count_notes(&data.recognized);

    fig.panel(0, 0).bars(
        "Class Distribution (Log Scale)",
        &Bars {
            labels: &labels,
            values: &values,
            colors: &fills,
            annotations: Some(&notes),
            log_scale: true,
            value_label: "Count (log scale)",
            ..Bars::default()
        },
    )?;

    let ratio_labels: Vec<String> = data.imbalance.iter().map(|(l, _)| l.clone()).collect();
    let ratios: Vec<f64> = data.imbalance.iter().map(|(_, r)| *r).collect();
    let ratio_notes: Vec<String> = ratios.iter().map(|r| format!("{r:.1}x")).collect();
    fig.panel(0, 1).hbars(
        "Class Imbalance Ratios",
        &Bars {
            labels: &ratio_labels,
            values: &ratios,
            colors: &colors_for(&colors, &ratio_labels),
            annotations: Some(&ratio_notes),
            value_label: "Ratio to Largest Class",
            ..Bars::default()
        },
    )?;
    fig.finish()
}

// ---------------------------------------------------------------------------
// 06 – symbol patterns
// ---------------------------------------------------------------------------

pub(super) fn symbol_patterns(data: &ChartData, style: &ChartStyle) -> Svg {
    let column = data.label_column.header();
    let palette = Palette::from_style(style);
    let mut fig = Figure::new(style, "Symbol Pattern Analysis", 2, 2);

    let top = data.prefixes.top(data.top_prefixes);
    let prefix_labels: Vec<String> = top.iter().map(|e| e.label.clone()).collect();
    let prefix_counts: Vec<f64> = top.iter().map(|e| e.count as f64).collect();
    let prefix_notes: Vec<String> = top.iter().map(|e| fmt_int(e.count)).collect();
    let first = [palette.get(0)];
    fig.panel(0, 0).hbars(
        &format!("Top {} Symbol Prefixes", prefix_labels.len()),
        &Bars {
            labels: &prefix_labels,
            values: &prefix_counts,
            colors: &first,
            annotations: Some(&prefix_notes),
            value_label: "Count",
            ..Bars::default()
        },
    )?;

    let tab = &data.prefix_by_label;
    let colors = label_colors(data, style);
    let series: Vec<Series> = tab
        .columns
        .iter()
        .enumerate()
        .map(|(j, label)| Series {
            name: label.clone(),
            color: colors.color_for(label).to_string(),
            values: tab.counts.iter().map(|row| row[j] as f64).collect(),
        })
        .collect();
    fig.panel(0, 1).grouped_bars(
        &format!("{column} Distribution by Symbol Prefix"),
        &tab.rows,
        &series,
        "Count",
    )?;

    let marker_labels = labels_of(&data.marker_labels);
    let marker_counts = counts_of(&data.marker_labels);
    let second = [palette.get(1)];
    fig.panel(1, 0).bars(
        &format!("{column} for Symbols Ending with \"{}\"", data.marker),
        &Bars {
            labels: &marker_labels,
            values: &marker_counts,
            colors: &second,
            annotations: Some(&count_notes(&data.marker_labels)),
            value_label: "Count",
            ..Bars::default()
        },
    )?;

    fig.panel(1, 1).histogram(
        "Symbol Length Distribution",
        data.symbol_length_hist.as_ref(),
        &palette.get(2),
        &[],
        "Symbol Length",
    )?;
    fig.finish()
}

// ---------------------------------------------------------------------------
// 07 – correlation heatmap
// ---------------------------------------------------------------------------

pub(super) fn correlation_heatmap(data: &ChartData, style: &ChartStyle) -> Svg {
    let mut fig = Figure::new(style, "Feature Correlation Heatmap", 1, 1);
    let names: Vec<String> = data
        .correlations
        .features
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    if data.total_rows == 0 {
        fig.panel(0, 0).empty("Pearson correlation")?;
    } else {
        fig.panel(0, 0)
            .heatmap("Pearson correlation", &names, &data.correlations.values)?;
    }
    fig.finish()
}

// ---------------------------------------------------------------------------
// 08 – dashboard
// ---------------------------------------------------------------------------

pub(super) fn dashboard(data: &ChartData, style: &ChartStyle) -> Svg {
    let palette = Palette::from_style(style);
    let mut fig = Figure::new(style, "DNA Dataset Summary Dashboard", 3, 4);
    let column = data.label_column.header();

    fig.panel(0, 0)
        .stat_tile("Dataset Size", &fmt_int(data.total_rows), "Total Samples", &palette.get(0))?;
    fig.panel(0, 1)
        .stat_tile("Labels", &data.label_count.to_string(), column, &palette.get(1))?;
    fig.panel(0, 2)
        .stat_tile("Data Leakage", &fmt_int(data.leaked), "Leaked Sequences", &style.warning)?;
    let mean_len = data
        .length
        .map(|s| format!("{:.0}", s.mean))
        .unwrap_or_else(|| "-".to_string());
    fig.panel(0, 3)
        .stat_tile("Sequences", &mean_len, "Avg Sequence Length", &palette.get(2))?;

    let colors = label_colors(data, style);
    let labels = labels_of(&data.recognized);
    let values = counts_of(&data.recognized);
    let fills = colors_for(&colors, &labels);
    fig.panel_span(1, 0, 2).hbars(
        &format!("{column} Distribution"),
        &Bars {
            labels: &labels,
            values: &values,
            colors: &fills,
            annotations: Some(&count_notes(&data.recognized)),
            value_label: "Count",
            ..Bars::default()
        },
    )?;

    let markers: Vec<Marker> = data
        .length
        .map(|s| {
            vec![Marker {
                label: format!("Mean: {:.0}", s.mean),
                value: s.mean,
                color: style.mean_marker.clone(),
            }]
        })
        .unwrap_or_default();
    fig.panel_span(1, 2, 2).histogram(
        "Sequence Length Distribution",
        data.length_hist.as_ref(),
        &palette.get(0),
        &markers,
        "Sequence Length",
    )?;

    let split_colors = palette.take(Partition::ALL.len());
    let slices: Vec<Slice> = Partition::ALL
        .iter()
        .zip(&split_colors)
        .map(|(p, color)| Slice {
            label: p.title().to_string(),
            value: data.split.rows(*p) as f64,
            color: color.clone(),
        })
        .collect();
    fig.panel_span(2, 0, 2).pie("Data Split", &slices)?;

    let issues: Vec<(String, String)> = data
        .issues()
        .into_iter()
        .map(|issue| {
            let color = match issue.severity {
                Severity::Warning => style.warning.clone(),
                Severity::Caution => style.text.clone(),
                Severity::Good => style.good.clone(),
            };
            (issue.text, color)
        })
        .collect();
    fig.panel_span(2, 2, 2).text_list("Issues Detected", &issues)?;
    fig.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::data::model::{Dataset, PartitionTable, Record};
    use crate::data::schema::Column;
    use std::path::PathBuf;

    fn data() -> ChartData {
        let records = |p: Partition, rows: &[(&str, &str)]| PartitionTable {
            partition: p,
            source: PathBuf::from("x.csv"),
            columns: Vec::new(),
            records: rows
                .iter()
                .map(|&(seq, gt)| Record {
                    sequence: Some(seq.to_string()),
                    symbol: Some("LOC1".to_string()),
                    gene_type: Some(gt.to_string()),
                    ..Record::empty(p)
                })
                .collect(),
        };
        let dataset = Dataset::from_partitions(vec![
            records(Partition::Train, &[("<ATGCATGCATGC>", "PSEUDO"), ("<GGGG>", "tRNA")]),
            records(Partition::Test, &[("<ATGCATGCATGC>", "PSEUDO")]),
        ]);
        ChartData::compute(&dataset, &AnalysisConfig::default(), Column::GeneType)
    }

    #[test]
    fn split_figure_lists_all_partitions() {
        let svg = data_split(&data(), &ChartStyle::default()).unwrap();
        for name in ["Train", "Test", "Validation"] {
            assert!(svg.contains(name), "{name}");
        }
        assert!(svg.contains("Train∩Test"));
    }

    #[test]
    fn log_scale_figure_labels_axis() {
        let svg = class_imbalance(&data(), &ChartStyle::default()).unwrap();
        assert!(svg.contains("Count (log scale)"));
        assert!(svg.contains("2.0x"));
    }

    #[test]
    fn dashboard_shows_issues() {
        let svg = dashboard(&data(), &ChartStyle::default()).unwrap();
        assert!(svg.contains("Data leakage: 1 sequences"));
        assert!(svg.contains(&ChartStyle::default().warning));
    }

    #[test]
    fn heatmap_names_features() {
        let svg = correlation_heatmap(&data(), &ChartStyle::default()).unwrap();
        assert!(svg.contains("seq_length"));
        assert!(svg.contains("n/a"));
    }
}
