use feedq_core::{ConfigError, StoreError};
use thiserror::Error;

use crate::importer::ImportBatch;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("text is empty after normalization")]
    EmptyInput,

    #[error("no text column found in CSV header {headers:?}")]
    ColumnDetection { headers: Vec<String> },

    #[error("unreadable CSV stream: {0}")]
    Csv(#[from] csv::Error),

    /// The stream failed after some rows were already processed. `batch`
    /// holds the counts for those rows, including ones already stored.
    #[error(
        "CSV stream became unreadable after {} row(s) of {}: {source}",
        .batch.total_processed,
        .batch.filename
    )]
    StreamAborted {
        batch: Box<ImportBatch>,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("feedback item {0} not found")]
    NotFound(i64),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Failure of a single CSV row. Counted in the batch `errors` tally and
/// logged with the row index; never returned from an import.
#[derive(Debug, Error)]
pub enum ImportRowError {
    #[error("malformed row: {0}")]
    Csv(#[source] csv::Error),

    #[error("failed to persist row: {0}")]
    Store(#[from] StoreError),
}
