//! Feedback command handlers for the CLI.
//!
//! Called from `main` once the pipeline and its store are built. `score`
//! runs without a database; everything else goes through Postgres.

mod query;

use std::collections::BTreeSet;
use std::sync::Arc;

use feedq_core::{FeedbackItem, PipelineConfig, Tag};
use feedq_db::PgFeedbackStore;
use feedq_pipeline::{Analysis, FeedbackPipeline, IngestOutcome, MemoryStore, PipelineError};

pub(crate) use query::{run_kpis, run_list, run_prioritized, run_status};

type PgPipeline = FeedbackPipeline<PgFeedbackStore>;

/// Score text and print the analysis without storing anything.
///
/// # Errors
///
/// Returns an error if the pipeline config is invalid or the text is empty
/// after normalization.
pub(crate) fn run_score(
    pipeline_config: Arc<PipelineConfig>,
    text: &str,
    json: bool,
) -> anyhow::Result<()> {
    let pipeline = FeedbackPipeline::new(MemoryStore::new(), pipeline_config)?;
    let analysis = pipeline.analyze(text, None)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(&analysis);
    }
    Ok(())
}

/// Ingest one item. A duplicate is reported, not treated as a failure.
///
/// # Errors
///
/// Returns an error if the text is empty after normalization or the insert
/// fails.
pub(crate) async fn run_ingest(pipeline: &PgPipeline, text: &str, source: &str) -> anyhow::Result<()> {
    match pipeline.ingest(text, source, None).await {
        Ok(IngestOutcome::Saved(item)) => {
            println!(
                "saved #{} priority {} tags [{}]",
                item.id,
                fmt_score(item.priority),
                fmt_tags(&item.tags)
            );
            Ok(())
        }
        Ok(IngestOutcome::Duplicate { text_hash }) => {
            println!("duplicate of existing feedback ({}); not saved", short_hash(&text_hash));
            Ok(())
        }
        Err(PipelineError::EmptyInput) => {
            anyhow::bail!("nothing to score: the text is empty after normalization")
        }
        Err(e) => Err(e.into()),
    }
}

/// # Errors
///
/// Returns an error if the item does not exist or the update fails.
pub(crate) async fn run_rescore_one(pipeline: &PgPipeline, id: i64) -> anyhow::Result<()> {
    let item = pipeline.rescore(id).await?;
    println!(
        "rescored #{}: priority {} tags [{}]",
        item.id,
        fmt_score(item.priority),
        fmt_tags(&item.tags)
    );
    Ok(())
}

/// Re-score the newest `limit` items; per-item failures are listed.
///
/// # Errors
///
/// Returns an error if `limit` is out of range or the items cannot be
/// listed.
pub(crate) async fn run_rescore_recent(pipeline: &PgPipeline, limit: u32) -> anyhow::Result<()> {
    let summary = pipeline.rescore_recent(limit).await?;
    println!("rescored {} item(s)", summary.rescored.len());
    if !summary.failed.is_empty() {
        let ids: Vec<String> = summary.failed.iter().map(i64::to_string).collect();
        println!("failed: {}", ids.join(", "));
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the item does not exist or the lookup fails.
pub(crate) async fn run_route(pipeline: &PgPipeline, id: i64) -> anyhow::Result<()> {
    let plan = pipeline.route(id).await?;
    println!("team:      {}", plan.team.label());
    println!("next step: {}", plan.next_step.label());
    Ok(())
}

fn print_analysis(analysis: &Analysis) {
    let signals = analysis.signals;
    println!("normalized: {}", analysis.text_norm);
    println!("hash:       {}", short_hash(&analysis.text_hash));
    println!("sentiment:  {:+.3}", signals.sentiment);
    println!("urgency:    {:.3} ({})", signals.urgency, analysis.urgency_band);
    println!("impact:     {:.3}", signals.impact);
    println!("priority:   {:.3}", analysis.priority);
    println!("tags:       [{}]", fmt_tags(&analysis.tags));
    println!("team:       {}", analysis.action.team.label());
    println!("next step:  {}", analysis.action.next_step.label());
}

/// Format an optional score for display, returning `"—"` when `None`.
fn fmt_score(score: Option<f64>) -> String {
    score.map_or_else(|| "\u{2014}".to_string(), |s| format!("{s:.2}"))
}

fn fmt_tags(tags: &BTreeSet<Tag>) -> String {
    tags.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
}

fn short_hash(text_hash: &str) -> &str {
    text_hash.get(..12).unwrap_or(text_hash)
}

/// First `max` characters of `text` on one line, with an ellipsis if cut.
fn excerpt(text: &str, max: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}\u{2026}")
}

fn print_items(items: &[FeedbackItem]) {
    println!(
        "{:<7}{:<9}{:<9}{:<9}{:<28}TEXT",
        "ID", "PRIORITY", "URGENCY", "IMPACT", "TAGS"
    );
    for item in items {
        println!(
            "{:<7}{:<9}{:<9}{:<9}{:<28}{}",
            item.id,
            fmt_score(item.priority),
            fmt_score(item.urgency),
            fmt_score(item.impact),
            fmt_tags(&item.tags),
            excerpt(&item.raw_text, 60)
        );
    }
}
