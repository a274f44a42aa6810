use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

use serde::Serialize;

use super::schema::Column;

// ---------------------------------------------------------------------------
// Partition – which source file a record came from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Train,
    Test,
    Validation,
}

impl Partition {
    /// Load and concatenation order.
    pub const ALL: [Partition; 3] = [Partition::Train, Partition::Test, Partition::Validation];

    pub fn as_str(self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Test => "test",
            Partition::Validation => "validation",
        }
    }

    /// Capitalised form used for chart and table labels.
    pub fn title(self) -> &'static str {
        match self {
            Partition::Train => "Train",
            Partition::Test => "Test",
            Partition::Validation => "Validation",
        }
    }

    fn index(self) -> usize {
        match self {
            Partition::Train => 0,
            Partition::Test => 1,
            Partition::Validation => 2,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of a partition file
// ---------------------------------------------------------------------------

/// A single labeled sequence entry. Empty cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Implicit row-identity column, if the file carries one.
    pub row_id: Option<String>,
    pub sequence: Option<String>,
    pub symbol: Option<String>,
    pub gene_type: Option<String>,
    pub gene_group_method: Option<String>,
    pub description: Option<String>,
    pub partition: Partition,
}

impl Record {
    /// An all-missing record tagged with `partition`.
    pub fn empty(partition: Partition) -> Self {
        Record {
            row_id: None,
            sequence: None,
            symbol: None,
            gene_type: None,
            gene_group_method: None,
            description: None,
            partition,
        }
    }

    /// Typed cell access. `Partition` is always present.
    pub fn value(&self, column: Column) -> Option<&str> {
        match column {
            Column::Sequence => self.sequence.as_deref(),
            Column::Symbol => self.symbol.as_deref(),
            Column::GeneType => self.gene_type.as_deref(),
            Column::GeneGroupMethod => self.gene_group_method.as_deref(),
            Column::Description => self.description.as_deref(),
            Column::Partition => Some(self.partition.as_str()),
        }
    }

    pub(crate) fn slot_mut(&mut self, column: Column) -> Option<&mut Option<String>> {
        match column {
            Column::Sequence => Some(&mut self.sequence),
            Column::Symbol => Some(&mut self.symbol),
            Column::GeneType => Some(&mut self.gene_type),
            Column::GeneGroupMethod => Some(&mut self.gene_group_method),
            Column::Description => Some(&mut self.description),
            Column::Partition => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PartitionTable – one loaded file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PartitionTable {
    pub partition: Partition,
    pub source: PathBuf,
    /// Header names in file order, including the row-identity column.
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

/// Per-partition bookkeeping kept by the dataset after concatenation.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionInfo {
    pub partition: Partition,
    pub source: PathBuf,
    pub columns: Vec<String>,
    #[serde(skip)]
    range: Range<usize>,
}

impl PartitionInfo {
    pub fn rows(&self) -> usize {
        self.range.len()
    }

    /// File name of the source, for display.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

// ---------------------------------------------------------------------------
// Dataset – the three partitions concatenated
// ---------------------------------------------------------------------------

/// The full loaded dataset: train, test and validation rows in that order.
/// Read-only once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    partitions: Vec<PartitionInfo>,
}

impl Dataset {
    /// Concatenate partition tables in `Partition::ALL` order, preserving row
    /// order inside each table. Tables are re-tagged with their partition.
    pub fn from_partitions(mut tables: Vec<PartitionTable>) -> Self {
        tables.sort_by_key(|t| t.partition.index());

        let total: usize = tables.iter().map(|t| t.records.len()).sum();
        let mut records = Vec::with_capacity(total);
        let mut partitions = Vec::with_capacity(tables.len());

        for table in tables {
            let start = records.len();
            let partition = table.partition;
            records.extend(table.records.into_iter().map(|mut r| {
                r.partition = partition;
                r
            }));
            partitions.push(PartitionInfo {
                partition,
                source: table.source,
                columns: table.columns,
                range: start..records.len(),
            });
        }

        Dataset {
            records,
            partitions,
        }
    }

    /// All rows of all partitions.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Rows of a single partition; empty when it was never loaded.
    pub fn partition(&self, partition: Partition) -> &[Record] {
        self.info(partition)
            .map(|info| &self.records[info.range.clone()])
            .unwrap_or(&[])
    }

    pub fn info(&self, partition: Partition) -> Option<&PartitionInfo> {
        self.partitions.iter().find(|p| p.partition == partition)
    }

    pub fn partitions(&self) -> &[PartitionInfo] {
        &self.partitions
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(partition: Partition, symbols: &[&str]) -> PartitionTable {
        PartitionTable {
            partition,
            source: PathBuf::from(format!("{partition}.csv")),
            columns: vec!["".into(), "Symbol".into()],
            records: symbols
                .iter()
                .map(|s| Record {
                    symbol: Some(s.to_string()),
                    ..Record::empty(partition)
                })
                .collect(),
        }
    }

    #[test]
    fn concatenates_in_partition_order() {
        let ds = Dataset::from_partitions(vec![
            table(Partition::Validation, &["V1"]),
            table(Partition::Train, &["A", "B"]),
            table(Partition::Test, &["T1", "T2", "T3"]),
        ]);

        let symbols: Vec<_> = ds.records().iter().filter_map(|r| r.symbol.as_deref()).collect();
        assert_eq!(symbols, ["A", "B", "T1", "T2", "T3", "V1"]);
        assert_eq!(ds.partition(Partition::Test).len(), 3);
        assert!(ds
            .partition(Partition::Validation)
            .iter()
            .all(|r| r.partition == Partition::Validation));
        assert_eq!(ds.info(Partition::Train).unwrap().file_name(), "train.csv");
    }

    #[test]
    fn missing_partition_is_empty_slice() {
        let ds = Dataset::from_partitions(vec![table(Partition::Train, &["A"])]);
        assert!(ds.partition(Partition::Validation).is_empty());
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn partition_column_is_always_present() {
        let r = Record::empty(Partition::Test);
        assert_eq!(r.value(Column::Partition), Some("test"));
        assert_eq!(r.value(Column::Symbol), None);
    }
}
