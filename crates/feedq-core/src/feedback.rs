use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Open key/value mapping carried through from CSV import (rating, review
/// date, app version, reviewer). Never interpreted by tagging.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Categorical label from the fixed vocabulary.
///
/// `Bug`, `FeatureRequest` and `Billing` are content-axis tags; `Negative`,
/// `Neutral` and `VeryPositive` are sentiment-axis tags. Exactly one
/// sentiment-axis tag is attached to every scored item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Bug,
    FeatureRequest,
    Billing,
    Negative,
    Neutral,
    VeryPositive,
}

impl Tag {
    pub const ALL: [Tag; 6] = [
        Tag::Bug,
        Tag::FeatureRequest,
        Tag::Billing,
        Tag::Negative,
        Tag::Neutral,
        Tag::VeryPositive,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Bug => "bug",
            Tag::FeatureRequest => "feature_request",
            Tag::Billing => "billing",
            Tag::Negative => "negative",
            Tag::Neutral => "neutral",
            Tag::VeryPositive => "very_positive",
        }
    }

    #[must_use]
    pub fn is_sentiment_axis(self) -> bool {
        matches!(self, Tag::Negative | Tag::Neutral | Tag::VeryPositive)
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownTag(s.to_string()))
    }
}

/// The three independent signal scores for one piece of feedback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    /// In `[-1.0, 1.0]`.
    pub sentiment: f64,
    /// In `[0.0, 1.0]`.
    pub urgency: f64,
    /// In `[0.0, 1.0]`.
    pub impact: f64,
}

/// A persisted feedback record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub id: i64,
    pub public_id: Uuid,
    /// Origin tag, e.g. `"manual"` or `"app_store_csv"`.
    pub source: String,
    pub raw_text: String,
    pub text_norm: String,
    /// Fingerprint of `text_norm`; the dedup key.
    pub text_hash: String,
    pub sentiment: Option<f64>,
    pub urgency: Option<f64>,
    pub impact: Option<f64>,
    pub priority: Option<f64>,
    pub tags: BTreeSet<Tag>,
    pub metadata: Option<Metadata>,
    /// Filled in by an external text-generation collaborator, if ever.
    pub summary: Option<String>,
    /// Filled in by an external multi-rater agreement process, if ever.
    pub consensus_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl FeedbackItem {
    /// Returns the three signals if all of them have been computed.
    #[must_use]
    pub fn signals(&self) -> Option<Signals> {
        Some(Signals {
            sentiment: self.sentiment?,
            urgency: self.urgency?,
            impact: self.impact?,
        })
    }

    /// Returns the sentiment-axis tag, if the item has been tagged.
    #[must_use]
    pub fn sentiment_tag(&self) -> Option<Tag> {
        self.tags.iter().copied().find(|t| t.is_sentiment_axis())
    }

    /// Reads a numeric `rating` out of the metadata, if present.
    #[must_use]
    pub fn rating(&self) -> Option<f64> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("rating"))
            .and_then(serde_json::Value::as_f64)
    }
}

/// A fully scored item ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedbackItem {
    pub source: String,
    pub raw_text: String,
    pub text_norm: String,
    pub text_hash: String,
    pub signals: Signals,
    pub priority: f64,
    pub tags: BTreeSet<Tag>,
    pub metadata: Option<Metadata>,
    pub created_at: DateTime<Utc>,
}

/// Recomputed derived fields written back by a re-score.
///
/// Carries no `text_hash`; the dedup key of a stored item never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreUpdate {
    pub text_norm: String,
    pub signals: Signals,
    pub priority: f64,
    pub tags: BTreeSet<Tag>,
}
