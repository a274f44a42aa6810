use std::collections::HashSet;

use serde::Serialize;

use crate::data::model::Record;
use crate::data::schema::{Column, Feature};
use crate::features::{Extractor, NucleotideComposition, RecordFeatures};
use crate::stats::{pearson, RunningStats};

// ---------------------------------------------------------------------------
// Column coverage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProfile {
    pub column: Column,
    pub present: usize,
    pub missing: usize,
    pub distinct: usize,
}

pub fn column_profile(table: &[Record], column: Column) -> ColumnProfile {
    let mut present = 0;
    let mut distinct = HashSet::new();
    for v in table.iter().filter_map(|r| r.value(column)) {
        present += 1;
        distinct.insert(v);
    }
    ColumnProfile {
        column,
        present,
        missing: table.len() - present,
        distinct: distinct.len(),
    }
}

// ---------------------------------------------------------------------------
// Mean nucleotide composition
// ---------------------------------------------------------------------------

/// Mean per-sequence base fractions over non-empty sequences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanComposition {
    pub sequences: usize,
    pub a: f64,
    pub t: f64,
    pub g: f64,
    pub c: f64,
    pub gc: f64,
}

pub fn mean_composition(table: &[Record]) -> Option<MeanComposition> {
    let mut acc = [RunningStats::default(); 5];
    for record in table {
        let comp = NucleotideComposition::of(record.sequence.as_deref());
        if comp.length == 0 {
            continue;
        }
        let fractions = [
            comp.a_fraction(),
            comp.t_fraction(),
            comp.g_fraction(),
            comp.c_fraction(),
            comp.gc_fraction(),
        ];
        for (stat, f) in acc.iter_mut().zip(fractions) {
            stat.push(f);
        }
    }
    let [a, t, g, c, gc] = acc.map(|s| s.mean());
    Some(MeanComposition {
        sequences: acc[0].count(),
        a: a?,
        t: t?,
        g: g?,
        c: c?,
        gc: gc?,
    })
}

// ---------------------------------------------------------------------------
// Feature correlation
// ---------------------------------------------------------------------------

/// Pearson correlation between every pair of features. Cells are `None` when
/// a feature is constant over the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub features: Vec<Feature>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Feature, b: Feature) -> Option<f64> {
        let i = self.features.iter().position(|f| *f == a)?;
        let j = self.features.iter().position(|f| *f == b)?;
        self.values[i][j]
    }
}

pub fn feature_correlations(
    table: &[Record],
    features: &[Feature],
    extractor: &Extractor,
) -> CorrelationMatrix {
    let extracted: Vec<RecordFeatures> = table.iter().map(|r| extractor.extract(r)).collect();
    let columns: Vec<Vec<f64>> = features
        .iter()
        .map(|f| extracted.iter().map(|x| f.measure(x)).collect())
        .collect();

    let values = columns
        .iter()
        .map(|xs| columns.iter().map(|ys| pearson(xs, ys)).collect())
        .collect();

    CorrelationMatrix {
        features: features.to_vec(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::records;
    use crate::data::model::Partition::*;

    #[test]
    fn profile_counts_missing_and_distinct() {
        let rows = records(&[
            (Train, Some("AT"), Some("A"), None),
            (Train, Some("AT"), None, None),
            (Test, Some("GC"), Some("B"), Some("tRNA")),
        ]);
        let p = column_profile(&rows, Column::Sequence);
        assert_eq!((p.present, p.missing, p.distinct), (3, 0, 2));
        let p = column_profile(&rows, Column::GeneType);
        assert_eq!((p.present, p.missing, p.distinct), (1, 2, 1));
    }

    #[test]
    fn mean_composition_skips_empty_sequences() {
        let rows = records(&[
            (Train, Some("<ATGC>"), None, None),
            (Train, Some("AT"), None, None),
            (Test, None, None, None),
            (Test, Some("<>"), None, None),
        ]);
        let mean = mean_composition(&rows).unwrap();
        assert_eq!(mean.sequences, 2);
        assert!((mean.gc - 0.25).abs() < 1e-12);
        assert!((mean.a - 0.375).abs() < 1e-12);
        assert!(mean_composition(&rows[2..]).is_none());
    }

    #[test]
    fn correlation_diagonal_and_constant_features() {
        let rows = records(&[
            (Train, Some("A"), Some("X"), None),
            (Train, Some("AA"), Some("XX"), None),
            (Train, Some("AAAA"), Some("XXXX"), None),
        ]);
        let features = [Feature::SequenceLength, Feature::SymbolLength, Feature::GcFraction];
        let m = feature_correlations(&rows, &features, &Extractor::default());
        let r = m.get(Feature::SequenceLength, Feature::SymbolLength).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert!((m.get(Feature::SymbolLength, Feature::SymbolLength).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(m.get(Feature::GcFraction, Feature::SequenceLength), None);
        assert_eq!(m.values.len(), 3);
    }
}
