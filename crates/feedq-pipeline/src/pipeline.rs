//! Single-item pipeline orchestration over a [`FeedbackStore`].

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use feedq_core::{
    FeedbackItem, FeedbackQuery, FeedbackStore, InsertOutcome, Metadata, NewFeedbackItem,
    PipelineConfig, ScoreUpdate, Signals, SourceCount, StoreError, Tag,
};
use serde::Serialize;

use crate::dedup::Deduplicator;
use crate::error::PipelineError;
use crate::kpi::{compute_kpis, KpiReport, MAX_KPI_WINDOW_DAYS};
use crate::normalize::normalize;
use crate::priority::{Band, PriorityAggregator};
use crate::routing::{route, ActionPlan};
use crate::scorer::{LexiconScorer, SignalScorer};
use crate::tagger::TagExtractor;

/// Largest batch accepted by [`FeedbackPipeline::rescore_recent`].
pub const MAX_RESCORE_BATCH: u32 = 500;

/// Everything the pipeline derives from one piece of raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub text_norm: String,
    pub text_hash: String,
    pub signals: Signals,
    pub priority: f64,
    pub tags: BTreeSet<Tag>,
    pub urgency_band: Band,
    pub action: ActionPlan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Saved(FeedbackItem),
    /// An item with the same fingerprint exists; nothing was written.
    Duplicate { text_hash: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RescoreSummary {
    pub rescored: Vec<FeedbackItem>,
    /// Ids whose re-score failed; each failure is logged.
    pub failed: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatus {
    pub total: i64,
    pub sources: Vec<SourceCount>,
    /// Lower bound of the `recent` counts in `sources`.
    pub recent_since: DateTime<Utc>,
}

/// The intake pipeline: normalize, dedup, score, aggregate, tag, persist.
///
/// Generic over the persistence collaborator and the scoring strategy. All
/// tuning comes from the immutable [`PipelineConfig`] given at construction.
pub struct FeedbackPipeline<S, C = LexiconScorer> {
    store: S,
    scorer: C,
    aggregator: PriorityAggregator,
    tagger: TagExtractor,
    config: Arc<PipelineConfig>,
}

impl<S: FeedbackStore> FeedbackPipeline<S, LexiconScorer> {
    /// Build a pipeline using the lexicon scorer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if `config` fails validation.
    pub fn new(store: S, config: Arc<PipelineConfig>) -> Result<Self, PipelineError> {
        let scorer = LexiconScorer::new(Arc::clone(&config));
        Self::with_scorer(store, scorer, config)
    }
}

impl<S: FeedbackStore, C: SignalScorer> FeedbackPipeline<S, C> {
    /// Build a pipeline with a caller-supplied scoring strategy.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if `config` fails validation.
    pub fn with_scorer(store: S, scorer: C, config: Arc<PipelineConfig>) -> Result<Self, PipelineError> {
        config.validate()?;
        let aggregator = PriorityAggregator::new(config.weights)?;
        let tagger = TagExtractor::new(&config);
        tracing::debug!(scorer = scorer.name(), "feedback pipeline ready");
        Ok(Self {
            store,
            scorer,
            aggregator,
            tagger,
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run normalize, score, aggregate and tag without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] if nothing is left after
    /// normalization.
    pub fn analyze(&self, raw: &str, metadata: Option<&Metadata>) -> Result<Analysis, PipelineError> {
        let normalized = normalize(raw)?;
        Ok(self.analyze_normalized(normalized.text_norm, normalized.text_hash, metadata))
    }

    pub(crate) fn analyze_normalized(
        &self,
        text_norm: String,
        text_hash: String,
        metadata: Option<&Metadata>,
    ) -> Analysis {
        let signals = self.scorer.score(&text_norm, metadata);
        let priority = self.aggregator.aggregate(signals);
        let tags = self.tagger.extract_tags(&text_norm, signals.sentiment);
        let action = route(&text_norm, &tags, signals, priority);
        Analysis {
            urgency_band: Band::of(signals.urgency, &self.config.urgency),
            text_norm,
            text_hash,
            signals,
            priority,
            tags,
            action,
        }
    }

    /// Ingest one piece of feedback.
    ///
    /// A duplicate is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] for text with nothing to score,
    /// or [`PipelineError::Store`] if persistence fails.
    pub async fn ingest(
        &self,
        raw: &str,
        source: &str,
        metadata: Option<Metadata>,
    ) -> Result<IngestOutcome, PipelineError> {
        let normalized = normalize(raw)?;

        if Deduplicator::new(&self.store)
            .is_duplicate(&normalized.text_hash)
            .await?
        {
            return Ok(IngestOutcome::Duplicate {
                text_hash: normalized.text_hash,
            });
        }

        let analysis =
            self.analyze_normalized(normalized.text_norm, normalized.text_hash, metadata.as_ref());
        Ok(self.persist(raw, source, metadata, analysis).await?)
    }

    pub(crate) async fn persist(
        &self,
        raw: &str,
        source: &str,
        metadata: Option<Metadata>,
        analysis: Analysis,
    ) -> Result<IngestOutcome, StoreError> {
        let text_hash = analysis.text_hash.clone();
        let item = NewFeedbackItem {
            source: source.to_string(),
            raw_text: raw.to_string(),
            text_norm: analysis.text_norm,
            text_hash: analysis.text_hash,
            signals: analysis.signals,
            priority: analysis.priority,
            tags: analysis.tags,
            metadata,
            created_at: Utc::now(),
        };

        match self.store.insert_if_absent(item).await? {
            InsertOutcome::Inserted(item) => {
                tracing::debug!(id = item.id, source, priority = analysis.priority, "feedback saved");
                Ok(IngestOutcome::Saved(item))
            }
            InsertOutcome::Duplicate => {
                tracing::debug!(%text_hash, "lost insert race to identical feedback");
                Ok(IngestOutcome::Duplicate { text_hash })
            }
        }
    }

    /// Newest items first.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if the query fails.
    pub async fn list(&self, limit: u32) -> Result<Vec<FeedbackItem>, PipelineError> {
        Ok(self.store.query(&FeedbackQuery::newest(limit)).await?)
    }

    /// Scored items in queue order (priority, urgency, impact, oldest first).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if the query fails.
    pub async fn prioritized(&self, limit: u32) -> Result<Vec<FeedbackItem>, PipelineError> {
        Ok(self.store.query(&FeedbackQuery::prioritized(limit)).await?)
    }

    /// Recompute derived fields of a stored item under the current config.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] for an unknown id,
    /// [`PipelineError::EmptyInput`] if the stored text normalizes to
    /// nothing, or [`PipelineError::Store`] on persistence failure.
    pub async fn rescore(&self, id: i64) -> Result<FeedbackItem, PipelineError> {
        let item = self.store.get(id).await?.ok_or(PipelineError::NotFound(id))?;
        let analysis = self.analyze(&item.raw_text, item.metadata.as_ref())?;
        let update = ScoreUpdate {
            text_norm: analysis.text_norm,
            signals: analysis.signals,
            priority: analysis.priority,
            tags: analysis.tags,
        };
        match self.store.update_scores(id, update).await {
            Ok(updated) => Ok(updated),
            Err(StoreError::NotFound(id)) => Err(PipelineError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Re-score the newest `limit` items, continuing past failures.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidArgument`] unless `1 <= limit <= 500`,
    /// or [`PipelineError::Store`] if the items cannot be listed.
    pub async fn rescore_recent(&self, limit: u32) -> Result<RescoreSummary, PipelineError> {
        if !(1..=MAX_RESCORE_BATCH).contains(&limit) {
            return Err(PipelineError::InvalidArgument(format!(
                "rescore limit must be between 1 and {MAX_RESCORE_BATCH}, got {limit}"
            )));
        }

        let items = self.list(limit).await?;
        let mut summary = RescoreSummary {
            rescored: Vec::with_capacity(items.len()),
            failed: Vec::new(),
        };
        for item in items {
            match self.rescore(item.id).await {
                Ok(updated) => summary.rescored.push(updated),
                Err(e) => {
                    tracing::warn!(id = item.id, error = %e, "rescore failed");
                    summary.failed.push(item.id);
                }
            }
        }
        tracing::info!(
            rescored = summary.rescored.len(),
            failed = summary.failed.len(),
            "rescore complete"
        );
        Ok(summary)
    }

    /// KPIs over the trailing `days` ending now.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidArgument`] unless `1 <= days <= 180`,
    /// or [`PipelineError::Store`] if the query fails.
    pub async fn kpis(&self, days: u32) -> Result<KpiReport, PipelineError> {
        self.kpis_at(days, Utc::now()).await
    }

    /// As [`Self::kpis`], with an explicit reference time.
    ///
    /// # Errors
    ///
    /// See [`Self::kpis`].
    pub async fn kpis_at(&self, days: u32, now: DateTime<Utc>) -> Result<KpiReport, PipelineError> {
        if !(1..=MAX_KPI_WINDOW_DAYS).contains(&days) {
            return Err(PipelineError::InvalidArgument(format!(
                "kpi window must be between 1 and {MAX_KPI_WINDOW_DAYS} days, got {days}"
            )));
        }
        let since = now - Duration::days(i64::from(days));
        let items = self.store.query(&FeedbackQuery::since(since)).await?;
        Ok(compute_kpis(&items, days, now, &self.config))
    }

    /// Item totals per source, with counts for the last 24 hours.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if the query fails.
    pub async fn import_status(&self) -> Result<ImportStatus, PipelineError> {
        let recent_since = Utc::now() - Duration::hours(24);
        let sources = self.store.count_by_source(recent_since).await?;
        Ok(ImportStatus {
            total: sources.iter().map(|s| s.total).sum(),
            sources,
            recent_since,
        })
    }

    /// Owning team and next step for a stored item.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] for an unknown id, or
    /// [`PipelineError::Store`] if the lookup fails. Items that were never
    /// scored are analyzed on the fly.
    pub async fn route(&self, id: i64) -> Result<ActionPlan, PipelineError> {
        let item = self.store.get(id).await?.ok_or(PipelineError::NotFound(id))?;
        match (item.signals(), item.priority) {
            (Some(signals), Some(priority)) => Ok(route(&item.text_norm, &item.tags, signals, priority)),
            _ => Ok(self.analyze(&item.raw_text, item.metadata.as_ref())?.action),
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
