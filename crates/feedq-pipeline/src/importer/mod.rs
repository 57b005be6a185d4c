//! Batch CSV import with column auto-detection and per-row fault isolation.

mod columns;

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use csv::StringRecord;
use feedq_core::{FeedbackStore, Metadata};
use futures::{stream, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

pub use columns::{detect_columns, ColumnMap, ColumnRole};

use crate::error::{ImportRowError, PipelineError};
use crate::normalize::normalize;
use crate::pipeline::{FeedbackPipeline, IngestOutcome};
use crate::scorer::SignalScorer;

/// Source tag used when the caller does not supply one.
pub const DEFAULT_IMPORT_SOURCE: &str = "app_store_csv";

/// Counters for one import call.
///
/// `total_processed == imported + skipped + errors` always holds, including
/// for a cancelled batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportBatch {
    pub filename: String,
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
    pub total_processed: usize,
    /// How many of `skipped` were duplicates of stored items.
    pub duplicates: usize,
    /// True if the batch stopped early on cancellation or timeout.
    pub cancelled: bool,
}

impl ImportBatch {
    fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            imported: 0,
            skipped: 0,
            errors: 0,
            total_processed: 0,
            duplicates: 0,
            cancelled: false,
        }
    }

    fn record(&mut self, row: usize, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Imported => self.imported += 1,
            RowOutcome::Skipped(reason) => {
                tracing::debug!(row, reason = reason.as_str(), "row skipped");
                self.skipped += 1;
                if *reason == SkipReason::Duplicate {
                    self.duplicates += 1;
                }
            }
            RowOutcome::Failed(e) => {
                tracing::warn!(row, filename = %self.filename, error = %e, "row failed");
                self.errors += 1;
            }
        }
        self.total_processed += 1;
    }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Source tag stamped on every row of the batch.
    pub source: String,
    /// Rows processed concurrently. Zero is treated as one.
    pub concurrency: usize,
    /// Stop taking new rows after this long.
    pub timeout: Option<Duration>,
    /// Stop taking new rows once cancelled.
    pub cancel: CancellationToken,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            source: DEFAULT_IMPORT_SOURCE.to_string(),
            concurrency: 4,
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    Empty,
    Duplicate,
}

impl SkipReason {
    fn as_str(self) -> &'static str {
        match self {
            SkipReason::Empty => "empty",
            SkipReason::Duplicate => "duplicate",
        }
    }
}

#[derive(Debug)]
enum RowOutcome {
    Imported,
    Skipped(SkipReason),
    Failed(ImportRowError),
}

impl<S: FeedbackStore, C: SignalScorer> FeedbackPipeline<S, C> {
    /// Import every data row of a CSV stream.
    ///
    /// Rows run through the same path as [`FeedbackPipeline::ingest`]. Empty
    /// and duplicate rows are skipped, malformed rows and persistence failures
    /// are counted as errors, and neither stops the batch. On cancellation or
    /// timeout, rows already started finish and the partial batch is
    /// returned with `cancelled` set.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ColumnDetection`] if the header has no text
    /// column, [`PipelineError::Csv`] if the header cannot be read, or
    /// [`PipelineError::StreamAborted`] with the partial batch if reading
    /// fails part way through.
    pub async fn import_csv<R: Read>(
        &self,
        filename: &str,
        reader: R,
        options: &ImportOptions,
    ) -> Result<ImportBatch, PipelineError> {
        let mut csv = csv::ReaderBuilder::new()
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv.headers()?.clone();
        let columns = detect_columns(&headers)?;
        tracing::info!(
            filename,
            text = ?columns.header(ColumnRole::Text),
            title = ?columns.header(ColumnRole::Title),
            rating = ?columns.header(ColumnRole::Rating),
            "detected CSV columns"
        );

        let stopped = AtomicBool::new(false);
        let stop = async {
            match options.timeout {
                Some(limit) => {
                    tokio::select! {
                        () = options.cancel.cancelled() => {}
                        () = tokio::time::sleep(limit) => {}
                    }
                }
                None => options.cancel.cancelled().await,
            }
            stopped.store(true, Ordering::SeqCst);
        };
        let stop = std::pin::pin!(stop);

        let mut batch = ImportBatch::new(filename);
        let mut fatal = None;
        {
            // Row numbers are 1-based data rows, header excluded.
            let rows = csv.records().enumerate().map_while(|(i, record)| match record {
                Err(e) if e.is_io_error() => {
                    fatal = Some(e);
                    None
                }
                other => Some((i + 1, other)),
            });

            let mut outcomes = stream::iter(rows)
                .take_until(stop)
                .map(|(row, record)| self.import_row(row, record, &columns, &options.source))
                .buffer_unordered(options.concurrency.max(1));

            while let Some((row, outcome)) = outcomes.next().await {
                batch.record(row, &outcome);
            }
        }

        if let Some(e) = fatal {
            tracing::warn!(
                filename,
                imported = batch.imported,
                skipped = batch.skipped,
                errors = batch.errors,
                error = %e,
                "CSV stream became unreadable; aborting batch"
            );
            return Err(PipelineError::StreamAborted {
                batch: Box::new(batch),
                source: e,
            });
        }

        batch.cancelled = stopped.load(Ordering::SeqCst);
        tracing::info!(
            filename,
            imported = batch.imported,
            skipped = batch.skipped,
            errors = batch.errors,
            total = batch.total_processed,
            cancelled = batch.cancelled,
            "CSV import finished"
        );
        Ok(batch)
    }

    async fn import_row(
        &self,
        row: usize,
        record: Result<StringRecord, csv::Error>,
        columns: &ColumnMap,
        source: &str,
    ) -> (usize, RowOutcome) {
        (row, self.row_outcome(record, columns, source).await)
    }

    async fn row_outcome(
        &self,
        record: Result<StringRecord, csv::Error>,
        columns: &ColumnMap,
        source: &str,
    ) -> RowOutcome {
        let record = match record {
            Ok(record) => record,
            Err(e) => return RowOutcome::Failed(ImportRowError::Csv(e)),
        };

        let Some(text) = row_text(&record, columns) else {
            return RowOutcome::Skipped(SkipReason::Empty);
        };
        let Ok(normalized) = normalize(&text) else {
            return RowOutcome::Skipped(SkipReason::Empty);
        };
        let metadata = row_metadata(&record, columns);
        let analysis =
            self.analyze_normalized(normalized.text_norm, normalized.text_hash, metadata.as_ref());

        match self.persist(&text, source, metadata, analysis).await {
            Ok(IngestOutcome::Saved(_)) => RowOutcome::Imported,
            Ok(IngestOutcome::Duplicate { .. }) => RowOutcome::Skipped(SkipReason::Duplicate),
            Err(e) => RowOutcome::Failed(ImportRowError::Store(e)),
        }
    }
}

/// Cell value, or `None` for blank, `nan` and `none` cells.
fn cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    let value = record.get(index?)?.trim();
    let placeholder = value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("none");
    (!value.is_empty() && !placeholder).then_some(value)
}

/// The text to ingest: the text cell, falling back to the title, or
/// `"{title}. {text}"` when both are present and differ.
fn row_text(record: &StringRecord, columns: &ColumnMap) -> Option<String> {
    let text = cell(record, Some(columns.text));
    let title = cell(record, columns.title);
    match (title, text) {
        (Some(title), Some(text)) if title != text => Some(format!("{title}. {text}")),
        (_, Some(text)) => Some(text.to_string()),
        (Some(title), None) => Some(title.to_string()),
        (None, None) => None,
    }
}

/// Optional columns as metadata. A rating that does not parse as a finite
/// number is kept as the raw string.
fn row_metadata(record: &StringRecord, columns: &ColumnMap) -> Option<Metadata> {
    let mut metadata = Metadata::new();
    for role in ColumnRole::ALL {
        let Some(key) = role.metadata_key() else {
            continue;
        };
        let Some(value) = cell(record, columns.index(role)) else {
            continue;
        };
        let json = if role == ColumnRole::Rating {
            value
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map_or_else(
                    || serde_json::Value::String(value.to_string()),
                    serde_json::Value::Number,
                )
        } else {
            serde_json::Value::String(value.to_string())
        };
        metadata.insert(key.to_string(), json);
    }
    (!metadata.is_empty()).then_some(metadata)
}

#[cfg(test)]
#[path = "../importer_test.rs"]
mod tests;
