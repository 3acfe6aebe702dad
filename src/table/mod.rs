//! Tabular input and output
//!
//! Reads the artist and collaboration tables produced by ingestion and
//! writes ranked prediction tables. All files are CSV with a header row.

pub mod reader;
pub mod writer;

use thiserror::Error;

pub use reader::{read_artists, read_artists_from, read_collaborations, read_collaborations_from};
pub use writer::{read_report, write_predictions, write_predictions_to, Report};

/// Table I/O errors
#[derive(Error, Debug)]
pub enum TableError {
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid row in {path} at line {line}: {message}")]
    InvalidRow {
        path: String,
        line: u64,
        message: String,
    },
}

pub type TableResult<T> = Result<T, TableError>;

impl TableError {
    pub(crate) fn csv(path: &str, source: csv::Error) -> Self {
        TableError::Csv {
            path: path.to_string(),
            source,
        }
    }
}
