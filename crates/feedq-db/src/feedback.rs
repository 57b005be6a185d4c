//! Database operations for the `feedback` table.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use feedq_core::{
    FeedbackItem, FeedbackOrder, FeedbackQuery, Metadata, NewFeedbackItem, ScoreUpdate,
    SourceCount, Tag,
};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const FEEDBACK_COLUMNS: &str = "id, public_id, source, raw_text, text_norm, text_hash, \
     sentiment, urgency, impact, priority, tags, metadata, summary, consensus_score, created_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `feedback` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedbackRow {
    pub id: i64,
    pub public_id: Uuid,
    pub source: String,
    pub raw_text: String,
    pub text_norm: String,
    pub text_hash: String,
    pub sentiment: Option<f64>,
    pub urgency: Option<f64>,
    pub impact: Option<f64>,
    pub priority: Option<f64>,
    /// Tag names as stored; see [`Tag::as_str`].
    pub tags: Vec<String>,
    /// JSONB object, or `NULL` when the item carried no metadata.
    pub metadata: Option<Value>,
    pub summary: Option<String>,
    pub consensus_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRow {
    /// Convert to the domain type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Corrupt`] if a stored tag is not in the vocabulary
    /// or `metadata` is not a JSON object.
    pub fn into_item(self) -> Result<FeedbackItem, DbError> {
        let id = self.id;
        let corrupt = |reason: String| DbError::Corrupt { id, reason };

        let tags = self
            .tags
            .iter()
            .map(|t| Tag::from_str(t).map_err(|e| corrupt(e.to_string())))
            .collect::<Result<BTreeSet<Tag>, DbError>>()?;

        let metadata = match self.metadata {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map),
            Some(other) => return Err(corrupt(format!("metadata is not an object: {other}"))),
        };

        Ok(FeedbackItem {
            id,
            public_id: self.public_id,
            source: self.source,
            raw_text: self.raw_text,
            text_norm: self.text_norm,
            text_hash: self.text_hash,
            sentiment: self.sentiment,
            urgency: self.urgency,
            impact: self.impact,
            priority: self.priority,
            tags,
            metadata,
            summary: self.summary,
            consensus_score: self.consensus_score,
            created_at: self.created_at,
        })
    }
}

fn tag_names(tags: &BTreeSet<Tag>) -> Vec<String> {
    tags.iter().map(|t| t.as_str().to_string()).collect()
}

fn metadata_value(metadata: Option<&Metadata>) -> Option<Value> {
    metadata.map(|m| Value::Object(m.clone()))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a scored item unless one with the same `text_hash` exists.
///
/// Relies on the `UNIQUE (text_hash)` constraint, so concurrent inserts of
/// the same fingerprint produce exactly one row. Returns `None` when the row
/// already existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_feedback_if_absent(
    pool: &PgPool,
    item: &NewFeedbackItem,
) -> Result<Option<FeedbackRow>, DbError> {
    let sql = format!(
        "INSERT INTO feedback \
             (source, raw_text, text_norm, text_hash, sentiment, urgency, impact, \
              priority, tags, metadata, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (text_hash) DO NOTHING \
         RETURNING {FEEDBACK_COLUMNS}"
    );
    let row = sqlx::query_as::<_, FeedbackRow>(&sql)
        .bind(&item.source)
        .bind(&item.raw_text)
        .bind(&item.text_norm)
        .bind(&item.text_hash)
        .bind(item.signals.sentiment)
        .bind(item.signals.urgency)
        .bind(item.signals.impact)
        .bind(item.priority)
        .bind(tag_names(&item.tags))
        .bind(metadata_value(item.metadata.as_ref()))
        .bind(item.created_at)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn feedback_exists_by_hash(pool: &PgPool, text_hash: &str) -> Result<bool, DbError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM feedback WHERE text_hash = $1)")
            .bind(text_hash)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_feedback(pool: &PgPool, id: i64) -> Result<Option<FeedbackRow>, DbError> {
    let sql = format!("SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE id = $1");
    let row = sqlx::query_as::<_, FeedbackRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// List items matching `query`.
///
/// [`FeedbackOrder::Priority`] returns scored items only, ordered by
/// priority, urgency and impact descending, then oldest first.
/// [`FeedbackOrder::Newest`] orders by `created_at DESC, id DESC`. A `None`
/// limit returns every match.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn query_feedback(
    pool: &PgPool,
    query: &FeedbackQuery,
) -> Result<Vec<FeedbackRow>, DbError> {
    let (scored_only, order_by) = match query.order {
        FeedbackOrder::Newest => ("", "created_at DESC, id DESC"),
        FeedbackOrder::Priority => (
            "AND priority IS NOT NULL ",
            "priority DESC, urgency DESC NULLS LAST, impact DESC NULLS LAST, \
             created_at ASC, id ASC",
        ),
    };
    let sql = format!(
        "SELECT {FEEDBACK_COLUMNS} \
         FROM feedback \
         WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
           AND ($2::TEXT IS NULL OR source = $2) \
           {scored_only}\
         ORDER BY {order_by} \
         LIMIT $3"
    );
    let rows = sqlx::query_as::<_, FeedbackRow>(&sql)
        .bind(query.since)
        .bind(query.source.as_deref())
        .bind(query.limit.map(i64::from))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Overwrite the derived columns of item `id` and bump `updated_at`.
///
/// `text_hash`, `raw_text` and `created_at` are never touched.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has this id, or [`DbError::Sqlx`]
/// if the update fails.
pub async fn update_feedback_scores(
    pool: &PgPool,
    id: i64,
    update: &ScoreUpdate,
) -> Result<FeedbackRow, DbError> {
    let sql = format!(
        "UPDATE feedback SET \
             text_norm  = $2, \
             sentiment  = $3, \
             urgency    = $4, \
             impact     = $5, \
             priority   = $6, \
             tags       = $7, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {FEEDBACK_COLUMNS}"
    );
    sqlx::query_as::<_, FeedbackRow>(&sql)
        .bind(id)
        .bind(&update.text_norm)
        .bind(update.signals.sentiment)
        .bind(update.signals.urgency)
        .bind(update.signals.impact)
        .bind(update.priority)
        .bind(tag_names(&update.tags))
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound(id))
}

/// Item totals per source, alphabetically, with the count created at or
/// after `since`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_feedback_by_source(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<Vec<SourceCount>, DbError> {
    let rows = sqlx::query_as::<_, (String, i64, i64)>(
        "SELECT source, \
                COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE created_at >= $1) AS recent \
         FROM feedback \
         GROUP BY source \
         ORDER BY source",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(source, total, recent)| SourceCount {
            source,
            total,
            recent,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(tags: &[&str], metadata: Option<Value>) -> FeedbackRow {
        FeedbackRow {
            id: 7,
            public_id: Uuid::new_v4(),
            source: "manual".to_string(),
            raw_text: "Checkout is broken".to_string(),
            text_norm: "checkout is broken".to_string(),
            text_hash: "abc".to_string(),
            sentiment: Some(-0.4),
            urgency: Some(0.5),
            impact: Some(0.2),
            priority: Some(0.48),
            tags: tags.iter().map(ToString::to_string).collect(),
            metadata,
            summary: None,
            consensus_score: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn into_item_parses_tags_and_metadata() {
        let item = row(&["bug", "negative"], Some(json!({"rating": 2.0})))
            .into_item()
            .unwrap();
        assert_eq!(item.tags, BTreeSet::from([Tag::Bug, Tag::Negative]));
        assert_eq!(item.rating(), Some(2.0));
    }

    #[test]
    fn json_null_metadata_is_none() {
        let item = row(&["neutral"], Some(Value::Null)).into_item().unwrap();
        assert!(item.metadata.is_none());
    }

    #[test]
    fn unknown_tag_is_corrupt() {
        let err = row(&["bug", "urgent"], None).into_item().unwrap_err();
        assert!(matches!(err, DbError::Corrupt { id: 7, .. }));
    }

    #[test]
    fn non_object_metadata_is_corrupt() {
        let err = row(&["neutral"], Some(json!([1, 2]))).into_item().unwrap_err();
        assert!(matches!(err, DbError::Corrupt { id: 7, .. }));
    }

    #[test]
    fn tag_names_use_wire_form() {
        let tags = BTreeSet::from([Tag::FeatureRequest, Tag::VeryPositive]);
        assert_eq!(tag_names(&tags), vec!["feature_request", "very_positive"]);
    }
}
