//! Error types for SDE conversion

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("SDE path {} does not exist", .0.display())]
    SdeNotFound(PathBuf),

    #[error("required input {file} not found under {}", dir.display())]
    MissingInputFile { file: String, dir: PathBuf },

    #[error("malformed record at {}:{line}: {source}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown converter '{name}' (valid: {})", valid.join(", "))]
    UnknownConverter { name: String, valid: Vec<String> },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite write failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
