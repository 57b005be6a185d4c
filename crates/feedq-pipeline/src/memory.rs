//! In-process [`FeedbackStore`] for tests and dry-run imports.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feedq_core::{
    FeedbackItem, FeedbackOrder, FeedbackQuery, FeedbackStore, InsertOutcome, NewFeedbackItem,
    ScoreUpdate, SourceCount, StoreError,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::priority::priority_order;

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    items: Vec<FeedbackItem>,
    by_hash: HashMap<String, usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn insert_if_absent(&self, item: NewFeedbackItem) -> Result<InsertOutcome, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.by_hash.contains_key(&item.text_hash) {
            return Ok(InsertOutcome::Duplicate);
        }

        let index = inner.items.len();
        let id = i64::try_from(index + 1).map_err(StoreError::backend)?;
        let stored = FeedbackItem {
            id,
            public_id: Uuid::new_v4(),
            source: item.source,
            raw_text: item.raw_text,
            text_norm: item.text_norm,
            text_hash: item.text_hash,
            sentiment: Some(item.signals.sentiment),
            urgency: Some(item.signals.urgency),
            impact: Some(item.signals.impact),
            priority: Some(item.priority),
            tags: item.tags,
            metadata: item.metadata,
            summary: None,
            consensus_score: None,
            created_at: item.created_at,
        };
        inner.by_hash.insert(stored.text_hash.clone(), index);
        inner.items.push(stored.clone());
        Ok(InsertOutcome::Inserted(stored))
    }

    async fn exists_by_hash(&self, text_hash: &str) -> Result<bool, StoreError> {
        Ok(self.inner.lock().await.by_hash.contains_key(text_hash))
    }

    async fn get(&self, id: i64) -> Result<Option<FeedbackItem>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.items.iter().find(|i| i.id == id).cloned())
    }

    async fn query(&self, query: &FeedbackQuery) -> Result<Vec<FeedbackItem>, StoreError> {
        let inner = self.inner.lock().await;
        let mut items: Vec<FeedbackItem> = inner
            .items
            .iter()
            .filter(|i| query.since.is_none_or(|since| i.created_at >= since))
            .filter(|i| query.source.as_deref().is_none_or(|s| i.source == s))
            .filter(|i| query.order != FeedbackOrder::Priority || i.priority.is_some())
            .cloned()
            .collect();

        match query.order {
            FeedbackOrder::Newest => {
                items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            }
            FeedbackOrder::Priority => items.sort_by(priority_order),
        }
        if let Some(limit) = query.limit {
            items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(items)
    }

    async fn update_scores(
        &self,
        id: i64,
        update: ScoreUpdate,
    ) -> Result<FeedbackItem, StoreError> {
        let mut inner = self.inner.lock().await;
        let item = inner
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound(id))?;
        item.text_norm = update.text_norm;
        item.sentiment = Some(update.signals.sentiment);
        item.urgency = Some(update.signals.urgency);
        item.impact = Some(update.signals.impact);
        item.priority = Some(update.priority);
        item.tags = update.tags;
        Ok(item.clone())
    }

    async fn count_by_source(&self, since: DateTime<Utc>) -> Result<Vec<SourceCount>, StoreError> {
        let inner = self.inner.lock().await;
        let mut counts: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
        for item in &inner.items {
            let entry = counts.entry(item.source.as_str()).or_default();
            entry.0 += 1;
            if item.created_at >= since {
                entry.1 += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(source, (total, recent))| SourceCount {
                source: source.to_string(),
                total,
                recent,
            })
            .collect())
    }
}
