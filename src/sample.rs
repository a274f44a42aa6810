//! Deterministic synthetic dataset for demos and tests.
//!
//! Three CSV files shaped like the real exports: an unnamed index column,
//! `<`/`>`-wrapped sequences, a skewed label mix, a few unrecognized labels,
//! missing descriptions and some sequences copied across partitions.

use std::path::Path;

use anyhow::{Context, Result};

use crate::data::loader::DatasetPaths;
use crate::data::model::Partition;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Label, relative weight, GC bias.
const GENE_TYPES: [(&str, f64, f64); 11] = [
    ("PSEUDO", 40.0, 0.45),
    ("BIOLOGICAL_REGION", 20.0, 0.40),
    ("ncRNA", 15.0, 0.48),
    ("PROTEIN_CODING", 12.0, 0.52),
    ("snoRNA", 4.0, 0.46),
    ("tRNA", 4.0, 0.58),
    ("OTHER", 2.0, 0.42),
    ("rRNA", 1.0, 0.55),
    ("snRNA", 1.0, 0.50),
    ("scRNA", 0.5, 0.50),
    ("unassigned", 0.5, 0.41),
];

const PREFIXES: [&str; 8] = ["RPL", "RPS", "MIR", "SNOR", "TRN", "OR", "ZNF", "HIST"];

const HEADER: [&str; 6] = [
    "",
    "NucleotideSequence",
    "Symbol",
    "Description",
    "GeneType",
    "GeneGroupMethod",
];

#[derive(Debug, Clone, PartialEq)]
pub struct SampleSpec {
    pub train: usize,
    pub test: usize,
    pub validation: usize,
    /// Train sequences re-used in test and validation.
    pub leaked: usize,
    pub seed: u64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        SampleSpec {
            train: 700,
            test: 200,
            validation: 100,
            leaked: 12,
            seed: 42,
        }
    }
}

impl SampleSpec {
    fn rows(&self, partition: Partition) -> usize {
        match partition {
            Partition::Train => self.train,
            Partition::Test => self.test,
            Partition::Validation => self.validation,
        }
    }
}

/// One generated row, in `HEADER` order minus the index.
#[derive(Debug, Clone)]
struct SampleRow {
    sequence: String,
    symbol: String,
    description: Option<String>,
    gene_type: &'static str,
    method: &'static str,
}

fn pick_gene_type(rng: &mut SimpleRng) -> (&'static str, f64) {
    let total: f64 = GENE_TYPES.iter().map(|(_, w, _)| w).sum();
    let mut roll = rng.next_f64() * total;
    for &(name, weight, gc) in &GENE_TYPES {
        if roll < weight {
            return (name, gc);
        }
        roll -= weight;
    }
    ("PSEUDO", 0.45)
}

fn sequence(rng: &mut SimpleRng, gc_bias: f64) -> String {
    let len = if rng.chance(0.01) {
        1 + rng.below(8)
    } else {
        rng.gauss(6.0, 0.6).exp().clamp(12.0, 3000.0) as usize
    };
    let mut seq = String::with_capacity(len + 2);
    seq.push('<');
    for _ in 0..len {
        let base = if rng.chance(gc_bias) {
            if rng.chance(0.5) { 'G' } else { 'C' }
        } else if rng.chance(0.5) {
            'A'
        } else {
            'T'
        };
        seq.push(base);
    }
    seq.push('>');
    seq
}

fn symbol(rng: &mut SimpleRng, gene_type: &str) -> String {
    if rng.chance(0.3) {
        return format!("LOC{}", 100_000 + rng.below(900_000));
    }
    let prefix = PREFIXES[rng.below(PREFIXES.len())];
    let mut s = format!("{prefix}{}", 1 + rng.below(40));
    if gene_type == "PSEUDO" && rng.chance(0.6) {
        s.push('P');
    }
    s
}

fn row(rng: &mut SimpleRng) -> SampleRow {
    let (gene_type, gc) = pick_gene_type(rng);
    let symbol = symbol(rng, gene_type);
    let description = (!rng.chance(0.02)).then(|| match gene_type {
        "PSEUDO" => format!("{symbol} pseudogene"),
        "tRNA" => "transfer RNA".to_string(),
        _ => format!("{} {}", gene_type.to_lowercase(), symbol),
    });
    SampleRow {
        sequence: sequence(rng, gc),
        symbol,
        description,
        gene_type,
        method: if rng.chance(0.9) { "NCBI Ortholog" } else { "Curated" },
    }
}

fn generate(spec: &SampleSpec) -> [Vec<SampleRow>; 3] {
    let mut rng = SimpleRng::new(spec.seed);
    let mut parts: [Vec<SampleRow>; 3] = Default::default();
    for (i, partition) in Partition::ALL.into_iter().enumerate() {
        parts[i] = (0..spec.rows(partition)).map(|_| row(&mut rng)).collect();
    }

    // Alternate copies between test and validation.
    let [train, test, validation] = &mut parts;
    let leaked = spec.leaked.min(train.len());
    for k in 0..leaked {
        let target = if k % 2 == 0 { &mut *test } else { &mut *validation };
        if target.is_empty() {
            continue;
        }
        let slot = rng.below(target.len());
        target[slot].sequence = train[k * train.len() / leaked.max(1)].sequence.clone();
    }
    parts
}

/// Writes `train.csv`, `test.csv` and `validation.csv` into `dir`.
pub fn write_sample(dir: &Path, spec: &SampleSpec) -> Result<DatasetPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir {}", dir.display()))?;
    let paths = DatasetPaths::in_dir(dir);
    let parts = generate(spec);

    for (partition, rows) in Partition::ALL.into_iter().zip(parts.iter()) {
        let path = paths.get(partition);
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        writer.write_record(HEADER)?;
        for (i, r) in rows.iter().enumerate() {
            writer.write_record([
                i.to_string().as_str(),
                r.sequence.as_str(),
                r.symbol.as_str(),
                r.description.as_deref().unwrap_or(""),
                r.gene_type,
                r.method,
            ])?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {} rows to {}", rows.len(), path.display());
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::leaked_values;
    use crate::data::loader::load_dataset;
    use crate::data::schema::Column;

    #[test]
    fn generation_is_deterministic() {
        let spec = SampleSpec::default();
        let a = generate(&spec);
        let b = generate(&spec);
        for (x, y) in a.iter().zip(b.iter()) {
            let xs: Vec<_> = x.iter().map(|r| &r.sequence).collect();
            let ys: Vec<_> = y.iter().map(|r| &r.sequence).collect();
            assert_eq!(xs, ys);
        }
    }

    #[test]
    fn written_sample_loads_with_leakage() {
        let dir = tempfile::tempdir().unwrap();
        let spec = SampleSpec {
            train: 70,
            test: 20,
            validation: 10,
            leaked: 4,
            seed: 7,
        };
        let paths = write_sample(dir.path(), &spec).unwrap();
        let dataset = load_dataset(&paths).unwrap();
        assert_eq!(dataset.len(), 100);
        assert_eq!(dataset.partition(Partition::Test).len(), 20);
        assert_eq!(dataset.records()[0].row_id.as_deref(), Some("0"));
        assert!(dataset.records().iter().all(|r| r.sequence.as_deref().is_some_and(|s| s.starts_with('<'))));
        assert!(leaked_values(dataset.records(), Column::Sequence) >= 1);
    }
}
