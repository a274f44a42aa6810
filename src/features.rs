//! Per-record feature extraction.
//!
//! Every function here is total: missing or malformed input degrades to zero,
//! empty or `false`, never to an error.

use serde::{Deserialize, Serialize};

use crate::data::model::Record;

/// Characters wrapped around sequences in the source files.
pub const SEQUENCE_MARKERS: [char; 2] = ['<', '>'];

/// Strip surrounding whitespace and marker runs from a raw sequence.
pub fn strip_markers(raw: &str) -> &str {
    raw.trim().trim_matches(&SEQUENCE_MARKERS[..]).trim()
}

/// Character count after stripping markers. Missing → 0.
pub fn sequence_length(raw: Option<&str>) -> usize {
    raw.map(|s| strip_markers(s).chars().count()).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Nucleotide composition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NucleotideComposition {
    pub length: usize,
    pub a: usize,
    pub t: usize,
    pub g: usize,
    pub c: usize,
}

impl NucleotideComposition {
    /// Count bases over the stripped, uppercased sequence.
    pub fn of(raw: Option<&str>) -> Self {
        let mut comp = NucleotideComposition::default();
        let Some(raw) = raw else {
            return comp;
        };
        for ch in strip_markers(raw).chars() {
            comp.length += 1;
            match ch.to_ascii_uppercase() {
                'A' => comp.a += 1,
                'T' => comp.t += 1,
                'G' => comp.g += 1,
                'C' => comp.c += 1,
                _ => {}
            }
        }
        comp
    }

    fn fraction(&self, count: usize) -> f64 {
        if self.length == 0 {
            0.0
        } else {
            count as f64 / self.length as f64
        }
    }

    pub fn a_fraction(&self) -> f64 {
        self.fraction(self.a)
    }

    pub fn t_fraction(&self) -> f64 {
        self.fraction(self.t)
    }

    pub fn g_fraction(&self) -> f64 {
        self.fraction(self.g)
    }

    pub fn c_fraction(&self) -> f64 {
        self.fraction(self.c)
    }

    /// (G + C) / length; 0 for an empty sequence.
    pub fn gc_fraction(&self) -> f64 {
        self.fraction(self.g + self.c)
    }

    /// Share of characters that are not A, T, G or C (N, gaps, junk).
    pub fn other_fraction(&self) -> f64 {
        self.fraction(self.length - (self.a + self.t + self.g + self.c))
    }
}

// ---------------------------------------------------------------------------
// Symbol shape
// ---------------------------------------------------------------------------

/// Naming conventions checked on gene symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolConvention {
    /// Trailing letter marking pseudogenes, e.g. `ABC1P`.
    pub marker: char,
    /// Prefix of uncharacterised loci, e.g. `LOC100287102`.
    pub prefix: String,
}

impl Default for SymbolConvention {
    fn default() -> Self {
        SymbolConvention {
            marker: 'P',
            prefix: "LOC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolFeatures {
    pub length: usize,
    /// Leading run of `A-Z`; empty if the symbol starts otherwise.
    pub prefix: String,
    pub ends_with_marker: bool,
    pub starts_with_prefix: bool,
}

impl SymbolFeatures {
    pub fn of(symbol: Option<&str>, convention: &SymbolConvention) -> Self {
        let Some(symbol) = symbol else {
            return SymbolFeatures::default();
        };
        SymbolFeatures {
            length: symbol.chars().count(),
            prefix: symbol_prefix(symbol).to_string(),
            ends_with_marker: symbol.ends_with(convention.marker),
            starts_with_prefix: !convention.prefix.is_empty()
                && symbol.starts_with(convention.prefix.as_str()),
        }
    }
}

/// Longest leading run of uppercase ASCII letters.
pub fn symbol_prefix(symbol: &str) -> &str {
    let end = symbol
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(symbol.len());
    &symbol[..end]
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Everything derived from one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordFeatures {
    pub sequence_length: usize,
    pub composition: NucleotideComposition,
    pub symbol: SymbolFeatures,
    pub description_length: usize,
}

/// Maps records to their feature sets under a fixed symbol convention.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    convention: SymbolConvention,
}

impl Extractor {
    pub fn new(convention: SymbolConvention) -> Self {
        Extractor { convention }
    }

    pub fn extract(&self, record: &Record) -> RecordFeatures {
        let composition = NucleotideComposition::of(record.sequence.as_deref());
        RecordFeatures {
            sequence_length: composition.length,
            composition,
            symbol: SymbolFeatures::of(record.symbol.as_deref(), &self.convention),
            description_length: record
                .description
                .as_deref()
                .map(|d| d.chars().count())
                .unwrap_or(0),
        }
    }
}
