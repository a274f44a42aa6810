use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::AllowList;
use crate::features::SymbolConvention;

// ---------------------------------------------------------------------------
// Settings file
// ---------------------------------------------------------------------------

/// Optional JSON settings, every field defaulted:
///
/// ```json
/// {
///   "analysis": { "top_prefixes": 20, "symbol_marker": "P" },
///   "style": { "palette": ["#2E86AB", "#A23B72"], "panel_width": 640 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub analysis: AnalysisConfig,
    pub style: ChartStyle,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("parsing settings file {}", path.display()))?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }
}

// ---------------------------------------------------------------------------
// Analysis parameters
// ---------------------------------------------------------------------------

const RECOGNIZED_GENE_TYPES: [&str; 10] = [
    "PSEUDO",
    "BIOLOGICAL_REGION",
    "ncRNA",
    "snoRNA",
    "PROTEIN_CODING",
    "tRNA",
    "OTHER",
    "rRNA",
    "snRNA",
    "scRNA",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Recognized label values; anything else is ignored by label-scoped
    /// charts and the imbalance section.
    pub label_allow_list: Vec<String>,
    /// Labels compared in the length and GC panels.
    pub focus_labels: Vec<String>,
    /// Labels compared across partitions.
    pub split_labels: Vec<String>,
    pub symbol_marker: char,
    pub symbol_prefix: String,
    pub top_prefixes: usize,
    pub histogram_bins: usize,
    pub sample_rows: usize,
    pub sample_sequence_width: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            label_allow_list: RECOGNIZED_GENE_TYPES.iter().map(|s| s.to_string()).collect(),
            focus_labels: [
                "PSEUDO",
                "BIOLOGICAL_REGION",
                "ncRNA",
                "PROTEIN_CODING",
                "tRNA",
                "snoRNA",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            split_labels: ["PSEUDO", "BIOLOGICAL_REGION", "ncRNA", "PROTEIN_CODING"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            symbol_marker: 'P',
            symbol_prefix: "LOC".to_string(),
            top_prefixes: 15,
            histogram_bins: 50,
            sample_rows: 5,
            sample_sequence_width: 50,
        }
    }
}

impl AnalysisConfig {
    pub fn label_allow(&self) -> AllowList {
        AllowList::Only(self.label_allow_list.clone())
    }

    pub fn focus_allow(&self) -> AllowList {
        AllowList::Only(self.focus_labels.clone())
    }

    pub fn split_allow(&self) -> AllowList {
        AllowList::Only(self.split_labels.clone())
    }

    pub fn symbol_convention(&self) -> SymbolConvention {
        SymbolConvention {
            marker: self.symbol_marker,
            prefix: self.symbol_prefix.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart style
// ---------------------------------------------------------------------------

/// Everything the chart renderer needs to know about looks. Passed explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    /// Categorical colors, used in order; extended with generated hues.
    pub palette: Vec<String>,
    pub panel_width: f64,
    pub panel_height: f64,
    pub font_family: String,
    pub font_size: f64,
    pub title_size: f64,
    pub suptitle_size: f64,
    pub background: String,
    pub grid: String,
    pub text: String,
    pub warning: String,
    pub caution: String,
    pub good: String,
    pub mean_marker: String,
    pub median_marker: String,
    /// Colors of A, T, G and C.
    pub nucleotides: [String; 4],
}

impl Default for ChartStyle {
    fn default() -> Self {
        let hex = |s: &str| s.to_string();
        ChartStyle {
            palette: [
                "#2E86AB", "#A23B72", "#F18F01", "#C73E1D", "#3B1F2B", "#95C623", "#5C4D7D",
                "#E8E8E8", "#FF6B6B", "#4ECDC4",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            panel_width: 560.0,
            panel_height: 400.0,
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 12.0,
            title_size: 14.0,
            suptitle_size: 18.0,
            background: hex("#FFFFFF"),
            grid: hex("#E5E5E5"),
            text: hex("#222222"),
            warning: hex("#FF6B6B"),
            caution: hex("#FFE66D"),
            good: hex("#95C623"),
            mean_marker: hex("#D62728"),
            median_marker: hex("#2CA02C"),
            nucleotides: [hex("#FF6B6B"), hex("#4ECDC4"), hex("#FFE66D"), hex("#95E1D3")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_recognized_types() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.label_allow_list.len(), 10);
        assert_eq!(
            cfg.focus_labels,
            ["PSEUDO", "BIOLOGICAL_REGION", "ncRNA", "PROTEIN_CODING", "tRNA", "snoRNA"]
        );
        assert!(cfg.label_allow().allows("scRNA"));
        assert!(!cfg.focus_allow().allows("scRNA"));
    }

    #[test]
    fn partial_settings_keep_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{"analysis": {"top_prefixes": 3}, "style": {"font_size": 9}}"#)
                .unwrap();
        assert_eq!(s.analysis.top_prefixes, 3);
        assert_eq!(s.analysis.histogram_bins, 50);
        assert_eq!(s.style.font_size, 9.0);
        assert_eq!(s.style.palette.len(), 10);
    }
}
