//! Persistence seam for feedback items.
//!
//! The pipeline is generic over [`FeedbackStore`] so the same ingestion and
//! import code runs against Postgres in production and an in-memory store in
//! tests and dry runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::feedback::{FeedbackItem, NewFeedbackItem, ScoreUpdate};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("feedback item {0} not found")]
    NotFound(i64),

    #[error("stored feedback item {id} is corrupt: {reason}")]
    Corrupt { id: i64, reason: String },

    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Result of an atomic insert keyed on `text_hash`.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(FeedbackItem),
    /// An item with the same `text_hash` already exists; nothing was written.
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackOrder {
    /// `created_at` descending.
    #[default]
    Newest,
    /// priority, urgency, impact descending, then `created_at` ascending.
    Priority,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedbackQuery {
    pub since: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub order: FeedbackOrder,
    pub limit: Option<u32>,
}

impl FeedbackQuery {
    #[must_use]
    pub fn newest(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn prioritized(limit: u32) -> Self {
        Self {
            order: FeedbackOrder::Priority,
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Every item created at or after `since`, newest first.
    #[must_use]
    pub fn since(since: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            ..Self::default()
        }
    }
}

/// Per-source item counts for import status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCount {
    pub source: String,
    pub total: i64,
    /// Items created at or after the `since` bound of the request.
    pub recent: i64,
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Insert `item` unless an item with the same `text_hash` exists.
    ///
    /// Must be atomic: two concurrent inserts of the same hash yield exactly
    /// one `Inserted`.
    async fn insert_if_absent(&self, item: NewFeedbackItem) -> Result<InsertOutcome, StoreError>;

    async fn exists_by_hash(&self, text_hash: &str) -> Result<bool, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<FeedbackItem>, StoreError>;

    async fn query(&self, query: &FeedbackQuery) -> Result<Vec<FeedbackItem>, StoreError>;

    /// Overwrite the derived fields of item `id`; `text_hash` is left alone.
    ///
    /// Returns [`StoreError::NotFound`] if the item does not exist.
    async fn update_scores(&self, id: i64, update: ScoreUpdate)
        -> Result<FeedbackItem, StoreError>;

    /// Totals per source, plus how many of each were created since `since`.
    async fn count_by_source(&self, since: DateTime<Utc>) -> Result<Vec<SourceCount>, StoreError>;
}
