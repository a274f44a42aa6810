use std::fs::File;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;

use super::model::{Dataset, Partition, PartitionTable, Record};
use super::schema::Column;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Locations of the three partition files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub train: PathBuf,
    pub test: PathBuf,
    pub validation: PathBuf,
}

impl DatasetPaths {
    /// `train.csv`, `test.csv` and `validation.csv` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        DatasetPaths {
            train: dir.join("train.csv"),
            test: dir.join("test.csv"),
            validation: dir.join("validation.csv"),
        }
    }

    pub fn get(&self, partition: Partition) -> &Path {
        match partition {
            Partition::Train => &self.train,
            Partition::Test => &self.test,
            Partition::Validation => &self.validation,
        }
    }
}

/// Load all three partitions and concatenate them. Stops at the first file
/// that fails.
pub fn load_dataset(paths: &DatasetPaths) -> Result<Dataset, LoadError> {
    let mut tables = Vec::with_capacity(Partition::ALL.len());
    for partition in Partition::ALL {
        tables.push(load_partition(paths.get(partition), partition)?);
    }
    let dataset = Dataset::from_partitions(tables);
    log::info!("dataset ready: {} records in total", dataset.len());
    Ok(dataset)
}

/// Load one partition file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`         – comma separated, header row required
/// * `.tsv`, `.tab` – tab separated, header row required
/// * `.json`        – `[{ "NucleotideSequence": "...", "Symbol": "...", ... }, ...]`
pub fn load_partition(path: &Path, partition: Partition) -> Result<PartitionTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_delimited(path, partition, b',')?,
        "tsv" | "tab" => load_delimited(path, partition, b'\t')?,
        "json" => load_json(path, partition)?,
        _ => {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    log::info!(
        "loaded {} partition from {}: {} rows, {} columns",
        partition,
        path.display(),
        table.records.len(),
        table.columns.len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

/// Position of every known column within a header row.
#[derive(Debug)]
struct ColumnIndex {
    row_id: Option<usize>,
    known: Vec<(Column, usize)>,
}

impl ColumnIndex {
    /// Match headers case-insensitively. The first column is the row-identity
    /// column unless it names a known column itself.
    fn resolve(headers: &[String], path: &Path) -> Result<Self, LoadError> {
        let mut known = Vec::with_capacity(Column::REQUIRED.len());
        let mut missing = Vec::new();

        for column in Column::REQUIRED {
            match headers.iter().position(|h| column.matches_header(h)) {
                Some(idx) => known.push((column, idx)),
                None => missing.push(column.header()),
            }
        }

        if !missing.is_empty() {
            return Err(LoadError::MissingColumns {
                path: path.to_path_buf(),
                columns: missing,
            });
        }

        let row_id = match headers.first() {
            Some(first) if !Column::REQUIRED.iter().any(|c| c.matches_header(first)) => Some(0),
            _ => None,
        };

        Ok(ColumnIndex { row_id, known })
    }

    /// Build a record from a row of cells. Absent and empty cells are missing.
    fn record<'c, F>(&self, partition: Partition, cell: F) -> Record
    where
        F: Fn(usize) -> Option<std::borrow::Cow<'c, str>>,
    {
        let present = |idx: usize| cell(idx).filter(|v| !v.is_empty()).map(|v| v.into_owned());

        let mut record = Record::empty(partition);
        record.row_id = self.row_id.and_then(|idx| present(idx));
        for &(column, idx) in &self.known {
            if let Some(slot) = record.slot_mut(column) {
                *slot = present(idx);
            }
        }
        record
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line. Rows may be shorter or
/// longer than the header; non-UTF-8 bytes are replaced, never rejected.
fn load_delimited(
    path: &Path,
    partition: Partition,
    delimiter: u8,
) -> Result<PartitionTable, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let index = ColumnIndex::resolve(&headers, path)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.byte_records().enumerate() {
        let row = result.map_err(csv_err)?;
        if row.len() != headers.len() {
            log::debug!(
                "{} row {}: {} cells for {} columns",
                path.display(),
                row_no,
                row.len(),
                headers.len()
            );
        }
        records.push(index.record(partition, |idx| {
            row.get(idx).map(String::from_utf8_lossy)
        }));
    }

    if records.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(PartitionTable {
        partition,
        source: path.to_path_buf(),
        columns: headers,
        records,
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "NucleotideSequence": "<ATGC...>",
///     "Symbol": "LOC1001",
///     "GeneType": "PSEUDO",
///     "GeneGroupMethod": "NCBI Ortholog",
///     "Description": "..."
///   },
///   ...
/// ]
/// ```
///
/// Scalars other than strings are kept as their JSON text; `null` is missing.
fn load_json(path: &Path, partition: Partition) -> Result<PartitionTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = root.as_array().ok_or_else(|| LoadError::NotRecords {
        path: path.to_path_buf(),
    })?;

    if rows.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    // Column order: first appearance across all objects.
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        let obj = row.as_object().ok_or_else(|| LoadError::NotRecords {
            path: path.to_path_buf(),
        })?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let index = ColumnIndex::resolve(&headers, path)?;

    let records = rows
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            index.record(partition, |idx| {
                obj.get(&headers[idx]).and_then(json_to_cell)
            })
        })
        .collect();

    Ok(PartitionTable {
        partition,
        source: path.to_path_buf(),
        columns: headers,
        records,
    })
}

fn json_to_cell(val: &JsonValue) -> Option<std::borrow::Cow<'static, str>> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone().into()),
        other => Some(other.to_string().into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = ",NucleotideSequence,Symbol,GeneType,GeneGroupMethod,Description\n";

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_csv_with_row_id_and_missing_cells() {
        let dir = TempDir::new().unwrap();
        let body = format!(
            "{HEADER}0,<ATGC>,LOC1,PSEUDO,NCBI Ortholog,some gene\n1,,ABCP,,NCBI Ortholog,\n"
        );
        let path = write(&dir, "train.csv", &body);

        let table = load_partition(&path, Partition::Train).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.columns.len(), 6);

        let first = &table.records[0];
        assert_eq!(first.row_id.as_deref(), Some("0"));
        assert_eq!(first.sequence.as_deref(), Some("<ATGC>"));
        assert_eq!(first.partition, Partition::Train);

        let second = &table.records[1];
        assert_eq!(second.sequence, None);
        assert_eq!(second.gene_type, None);
        assert_eq!(second.description, None);
        assert_eq!(second.symbol.as_deref(), Some("ABCP"));
    }

    #[test]
    fn header_matching_ignores_case() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "test.csv",
            "nucleotidesequence,SYMBOL,genetype,genegroupmethod,description\nAT,X,tRNA,m,d\n",
        );
        let table = load_partition(&path, Partition::Test).unwrap();
        assert_eq!(table.records[0].row_id, None);
        assert_eq!(table.records[0].gene_type.as_deref(), Some("tRNA"));
    }

    #[test]
    fn short_rows_pass_through() {
        let dir = TempDir::new().unwrap();
        let body = format!("{HEADER}0,ATG,SYM\n");
        let path = write(&dir, "validation.csv", &body);
        let table = load_partition(&path, Partition::Validation).unwrap();
        assert_eq!(table.records[0].symbol.as_deref(), Some("SYM"));
        assert_eq!(table.records[0].gene_type, None);
    }

    #[test]
    fn missing_columns_are_named() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "train.csv", ",NucleotideSequence,Symbol\n0,AT,X\n");
        let err = load_partition(&path, Partition::Train).unwrap_err();
        match &err {
            LoadError::MissingColumns { columns, .. } => {
                assert_eq!(columns, &["GeneType", "GeneGroupMethod", "Description"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("GeneGroupMethod"));
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "test.csv", HEADER);
        assert!(matches!(
            load_partition(&path, Partition::Test),
            Err(LoadError::Empty { .. })
        ));
        let blank = write(&dir, "blank.csv", "");
        assert!(matches!(
            load_partition(&blank, Partition::Test),
            Err(LoadError::Empty { .. })
        ));
    }

    #[test]
    fn unreadable_and_unsupported_files_fail() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_partition(&dir.path().join("nope.csv"), Partition::Train),
            Err(LoadError::Io { .. })
        ));
        let path = write(&dir, "train.parquet", "x");
        assert!(matches!(
            load_partition(&path, Partition::Train),
            Err(LoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn loads_tsv_and_json() {
        let dir = TempDir::new().unwrap();
        let tsv = write(
            &dir,
            "test.tsv",
            "id\tNucleotideSequence\tSymbol\tGeneType\tGeneGroupMethod\tDescription\n7\tGGCC\tS\tncRNA\tm\td\n",
        );
        let table = load_partition(&tsv, Partition::Test).unwrap();
        assert_eq!(table.records[0].row_id.as_deref(), Some("7"));
        assert_eq!(table.records[0].sequence.as_deref(), Some("GGCC"));

        let json = write(
            &dir,
            "validation.json",
            r#"[{"NucleotideSequence":"AT","Symbol":null,"GeneType":"tRNA","GeneGroupMethod":"m","Description":12}]"#,
        );
        let table = load_partition(&json, Partition::Validation).unwrap();
        let r = &table.records[0];
        assert_eq!(r.symbol, None);
        assert_eq!(r.description.as_deref(), Some("12"));
        assert_eq!(r.partition, Partition::Validation);

        let not_records = write(&dir, "bad.json", r#"{"a": 1}"#);
        assert!(matches!(
            load_partition(&not_records, Partition::Test),
            Err(LoadError::NotRecords { .. })
        ));
    }

    #[test]
    fn json_keeps_key_order_and_row_id() {
        let dir = TempDir::new().unwrap();
        let json = write(
            &dir,
            "train.json",
            r#"[
                {"id":"7","NucleotideSequence":"AT","Symbol":"S","GeneType":"tRNA","GeneGroupMethod":"m","Description":"d"},
                {"id":8,"NucleotideSequence":"GC","Symbol":"T","GeneType":"PSEUDO","GeneGroupMethod":"m","Description":"e","Extra":1}
            ]"#,
        );
        let table = load_partition(&json, Partition::Train).unwrap();
        assert_eq!(
            table.columns,
            [
                "id",
                "NucleotideSequence",
                "Symbol",
                "GeneType",
                "GeneGroupMethod",
                "Description",
                "Extra"
            ]
        );
        assert_eq!(table.records[0].row_id.as_deref(), Some("7"));
        assert_eq!(table.records[1].row_id.as_deref(), Some("8"));
        assert_eq!(table.records[1].gene_type.as_deref(), Some("PSEUDO"));
    }

    #[test]
    fn load_dataset_stops_at_first_bad_file() {
        let dir = TempDir::new().unwrap();
        let good = format!("{HEADER}0,AT,X,tRNA,m,d\n");
        write(&dir, "train.csv", &good);
        write(&dir, "test.csv", &good);
        let err = load_dataset(&DatasetPaths::in_dir(dir.path())).unwrap_err();
        assert!(err.to_string().contains("validation.csv"));

        write(&dir, "validation.csv", &good);
        let ds = load_dataset(&DatasetPaths::in_dir(dir.path())).unwrap();
        assert_eq!(ds.len(), 3);
    }
}
