use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::SchemaError;
use crate::features::RecordFeatures;

// ---------------------------------------------------------------------------
// Column – the known text columns of a record
// ---------------------------------------------------------------------------

/// Known columns of the sequence tables. `Partition` is derived at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Column {
    Sequence,
    Symbol,
    GeneType,
    GeneGroupMethod,
    Description,
    Partition,
}

impl Column {
    /// Columns every input file must provide.
    pub const REQUIRED: [Column; 5] = [
        Column::Sequence,
        Column::Symbol,
        Column::GeneType,
        Column::GeneGroupMethod,
        Column::Description,
    ];

    /// Header name as written in the input files.
    pub fn header(self) -> &'static str {
        match self {
            Column::Sequence => "NucleotideSequence",
            Column::Symbol => "Symbol",
            Column::GeneType => "GeneType",
            Column::GeneGroupMethod => "GeneGroupMethod",
            Column::Description => "Description",
            Column::Partition => "Partition",
        }
    }

    /// Resolve a user-supplied name. Matching is case-insensitive and accepts
    /// snake_case aliases (`gene_type`, `sequence`, `source`, ...).
    pub fn from_name(name: &str) -> Result<Column, SchemaError> {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        let column = match key.as_str() {
            "nucleotidesequence" | "sequence" | "seq" => Column::Sequence,
            "symbol" => Column::Symbol,
            "genetype" => Column::GeneType,
            "genegroupmethod" => Column::GeneGroupMethod,
            "description" => Column::Description,
            "partition" | "source" | "split" => Column::Partition,
            _ => return Err(SchemaError::UnknownColumn(name.to_string())),
        };
        Ok(column)
    }

    /// Whether `header` names this column in an input file.
    pub fn matches_header(self, header: &str) -> bool {
        self != Column::Partition && header.trim().eq_ignore_ascii_case(self.header())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::from_name(s)
    }
}

// ---------------------------------------------------------------------------
// Feature – numeric per-record values derived by the extractor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Feature {
    SequenceLength,
    GcFraction,
    SymbolLength,
    DescriptionLength,
    EndsWithMarker,
    StartsWithPrefix,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::SequenceLength,
        Feature::SymbolLength,
        Feature::DescriptionLength,
        Feature::EndsWithMarker,
        Feature::StartsWithPrefix,
        Feature::GcFraction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::SequenceLength => "seq_length",
            Feature::GcFraction => "gc_fraction",
            Feature::SymbolLength => "symbol_length",
            Feature::DescriptionLength => "desc_length",
            Feature::EndsWithMarker => "ends_with_marker",
            Feature::StartsWithPrefix => "starts_with_prefix",
        }
    }

    pub fn from_name(name: &str) -> Result<Feature, SchemaError> {
        let key = name.trim().to_ascii_lowercase().replace('-', "_");
        let feature = match key.as_str() {
            "seq_length" | "sequence_length" | "length" => Feature::SequenceLength,
            "gc" | "gc_fraction" | "gc_content" => Feature::GcFraction,
            "symbol_length" => Feature::SymbolLength,
            "desc_length" | "description_length" => Feature::DescriptionLength,
            "ends_with_marker" => Feature::EndsWithMarker,
            "starts_with_prefix" => Feature::StartsWithPrefix,
            _ => return Err(SchemaError::UnknownFeature(name.to_string())),
        };
        Ok(feature)
    }

    /// Pick this feature's value out of an extracted feature set.
    pub fn measure(self, features: &RecordFeatures) -> f64 {
        match self {
            Feature::SequenceLength => features.sequence_length as f64,
            Feature::GcFraction => features.composition.gc_fraction(),
            Feature::SymbolLength => features.symbol.length as f64,
            Feature::DescriptionLength => features.description_length as f64,
            Feature::EndsWithMarker => f64::from(u8::from(features.symbol.ends_with_marker)),
            Feature::StartsWithPrefix => f64::from(u8::from(features.symbol.starts_with_prefix)),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_resolve_case_insensitively() {
        assert_eq!(Column::from_name("GeneType").unwrap(), Column::GeneType);
        assert_eq!(Column::from_name("genetype").unwrap(), Column::GeneType);
        assert_eq!(Column::from_name("gene_type").unwrap(), Column::GeneType);
        assert_eq!(
            Column::from_name("NUCLEOTIDESEQUENCE").unwrap(),
            Column::Sequence
        );
        assert_eq!(Column::from_name("source").unwrap(), Column::Partition);
    }

    #[test]
    fn unknown_column_is_schema_error() {
        assert_eq!(
            Column::from_name("Organism"),
            Err(SchemaError::UnknownColumn("Organism".to_string()))
        );
        assert!("nope".parse::<Feature>().is_err());
    }

    #[test]
    fn partition_never_matches_a_file_header() {
        assert!(!Column::Partition.matches_header("Partition"));
        assert!(Column::Symbol.matches_header(" symbol "));
    }

    #[test]
    fn feature_names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(Feature::from_name(feature.name()).unwrap(), feature);
        }
    }
}
