//! [`FeedbackStore`] backed by Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feedq_core::{
    FeedbackItem, FeedbackQuery, FeedbackStore, InsertOutcome, NewFeedbackItem, ScoreUpdate,
    SourceCount, StoreError,
};
use sqlx::PgPool;

use crate::feedback::{
    count_feedback_by_source, feedback_exists_by_hash, get_feedback, insert_feedback_if_absent,
    query_feedback, update_feedback_scores,
};
use crate::DbError;

#[derive(Debug, Clone)]
pub struct PgFeedbackStore {
    pool: PgPool,
}

impl PgFeedbackStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(id) => StoreError::NotFound(id),
            DbError::Corrupt { id, reason } => StoreError::Corrupt { id, reason },
            other => StoreError::backend(other),
        }
    }
}

#[async_trait]
impl FeedbackStore for PgFeedbackStore {
    async fn insert_if_absent(&self, item: NewFeedbackItem) -> Result<InsertOutcome, StoreError> {
        match insert_feedback_if_absent(&self.pool, &item).await? {
            Some(row) => Ok(InsertOutcome::Inserted(row.into_item()?)),
            None => Ok(InsertOutcome::Duplicate),
        }
    }

    async fn exists_by_hash(&self, text_hash: &str) -> Result<bool, StoreError> {
        Ok(feedback_exists_by_hash(&self.pool, text_hash).await?)
    }

    async fn get(&self, id: i64) -> Result<Option<FeedbackItem>, StoreError> {
        match get_feedback(&self.pool, id).await? {
            Some(row) => Ok(Some(row.into_item()?)),
            None => Ok(None),
        }
    }

    async fn query(&self, query: &FeedbackQuery) -> Result<Vec<FeedbackItem>, StoreError> {
        let rows = query_feedback(&self.pool, query).await?;
        rows.into_iter()
            .map(|row| row.into_item().map_err(StoreError::from))
            .collect()
    }

    async fn update_scores(
        &self,
        id: i64,
        update: ScoreUpdate,
    ) -> Result<FeedbackItem, StoreError> {
        let row = update_feedback_scores(&self.pool, id, &update).await?;
        Ok(row.into_item()?)
    }

    async fn count_by_source(&self, since: DateTime<Utc>) -> Result<Vec<SourceCount>, StoreError> {
        Ok(count_feedback_by_source(&self.pool, since).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_map_to_store_errors() {
        assert!(matches!(
            StoreError::from(DbError::NotFound(3)),
            StoreError::NotFound(3)
        ));
        assert!(matches!(
            StoreError::from(DbError::Corrupt {
                id: 4,
                reason: "bad tag".to_string()
            }),
            StoreError::Corrupt { id: 4, .. }
        ));
        assert!(matches!(
            StoreError::from(DbError::MissingDatabaseUrl),
            StoreError::Backend(_)
        ));
    }
}
