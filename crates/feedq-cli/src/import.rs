//! CSV import command handler.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use feedq_core::{AppConfig, FeedbackStore, PipelineConfig};
use feedq_pipeline::{
    FeedbackPipeline, ImportBatch, ImportOptions, MemoryStore, PipelineError, SignalScorer,
    DEFAULT_IMPORT_SOURCE,
};
use tokio_util::sync::CancellationToken;

const DEFAULT_CONCURRENCY: usize = 4;

/// Import knobs after merging flags over the app config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportSettings {
    pub source: String,
    pub concurrency: usize,
    pub timeout_secs: Option<u64>,
}

impl ImportSettings {
    /// Flags win over `config`; `config` may be absent for a dry run.
    pub(crate) fn resolve(
        config: Option<&AppConfig>,
        source: Option<String>,
        concurrency: Option<usize>,
        timeout_secs: Option<u64>,
    ) -> Self {
        Self {
            source: source
                .or_else(|| config.map(|c| c.import_source.clone()))
                .unwrap_or_else(|| DEFAULT_IMPORT_SOURCE.to_string()),
            concurrency: concurrency
                .or_else(|| config.map(|c| c.import_concurrency))
                .unwrap_or(DEFAULT_CONCURRENCY)
                .max(1),
            timeout_secs: timeout_secs.or_else(|| config.and_then(|c| c.import_timeout_secs)),
        }
    }
}

/// Import `file` into the pipeline's store. Ctrl-C stops the batch between
/// rows and the partial counts are still printed.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, has no text column, or
/// becomes unreadable mid-stream.
pub(crate) async fn run_import<S: FeedbackStore, C: SignalScorer>(
    pipeline: &FeedbackPipeline<S, C>,
    file: &Path,
    settings: &ImportSettings,
) -> anyhow::Result<ImportBatch> {
    let reader = BufReader::new(
        File::open(file).with_context(|| format!("failed to open {}", file.display()))?,
    );
    let filename = file
        .file_name()
        .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned());

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; finishing rows in flight");
                cancel.cancel();
            }
        })
    };

    let options = ImportOptions {
        source: settings.source.clone(),
        concurrency: settings.concurrency,
        timeout: settings.timeout_secs.map(Duration::from_secs),
        cancel,
    };
    let result = pipeline.import_csv(&filename, reader, &options).await;
    ctrl_c.abort();

    match result {
        Ok(batch) => {
            print_batch(&batch);
            Ok(batch)
        }
        Err(PipelineError::StreamAborted { batch, source }) => {
            print_batch(&batch);
            Err(anyhow::Error::new(source).context(format!(
                "{} became unreadable after {} row(s); rows reported above were kept",
                batch.filename, batch.total_processed
            )))
        }
        Err(e) => Err(e.into()),
    }
}

/// Run the import against an in-memory store. Nothing is written, and
/// duplicates are only detected within the file itself.
///
/// # Errors
///
/// See [`run_import`].
pub(crate) async fn run_import_dry_run(
    pipeline_config: Arc<PipelineConfig>,
    file: &Path,
    settings: &ImportSettings,
) -> anyhow::Result<ImportBatch> {
    let pipeline = FeedbackPipeline::new(MemoryStore::new(), pipeline_config)?;
    println!("dry-run: scoring rows in memory; nothing will be stored");
    run_import(&pipeline, file, settings).await
}

fn print_batch(batch: &ImportBatch) {
    println!(
        "{}: imported {}, skipped {} ({} duplicate), errors {}, processed {}",
        batch.filename,
        batch.imported,
        batch.skipped,
        batch.duplicates,
        batch.errors,
        batch.total_processed
    );
    if batch.cancelled {
        println!("import stopped early; re-run to pick up the remaining rows");
    }
}
