/// Data layer: typed schema, loading, and filtering.
///
/// Architecture:
/// ```text
///  train.csv / test.tsv / validation.json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → PartitionTable, resolve headers via schema
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  Vec<Record> tagged by Partition, per-file info
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply allow-lists → filtered indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
