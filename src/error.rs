use std::path::PathBuf;

use thiserror::Error;

/// Structural problems with an input file. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tabular data in {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON in {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not a JSON array of record objects", .path.display())]
    NotRecords { path: PathBuf },

    #[error("{} has no data rows", .path.display())]
    Empty { path: PathBuf },

    #[error("{} is missing required column(s): {}", .path.display(), .columns.join(", "))]
    MissingColumns {
        path: PathBuf,
        columns: Vec<&'static str>,
    },

    #[error("unsupported input format for {} (expected .csv, .tsv, .tab or .json)", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

/// A column or feature name that does not resolve against the typed schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("unknown feature `{0}`")]
    UnknownFeature(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn io_cause_is_chained_not_repeated() {
        let err = LoadError::Io {
            path: PathBuf::from("data/train.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.to_string(), "cannot read data/train.csv");
        assert_eq!(err.source().map(|e| e.to_string()).as_deref(), Some("no such file"));

        let chain = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chain.matches("no such file").count(), 1);
    }

    #[test]
    fn json_cause_is_chained() {
        let source = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err = LoadError::Json {
            path: PathBuf::from("test.json"),
            source,
        };
        assert_eq!(err.to_string(), "malformed JSON in test.json");
        assert!(err.source().is_some());
    }
}
