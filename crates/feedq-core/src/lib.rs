//! Shared domain types and configuration for the feedback intake pipeline.

pub mod app_config;
pub mod config;
pub mod feedback;
mod lexicon;
pub mod pipeline_config;
pub mod store;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use feedback::{FeedbackItem, Metadata, NewFeedbackItem, ScoreUpdate, Signals, Tag};
pub use pipeline_config::{
    load_pipeline_config, parse_pipeline_config, ImpactTuning, PipelineConfig, PriorityWeights,
    SentimentBands, SentimentTuning, TagKeywords, UrgencyTuning, WeightedCue,
};
pub use store::{
    FeedbackOrder, FeedbackQuery, FeedbackStore, InsertOutcome, SourceCount, StoreError,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read pipeline config {path}: {source}")]
    PipelineFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline config: {0}")]
    PipelineFileParse(#[from] serde_yaml::Error),

    #[error("priority weights must sum to 1.0, got {sum}")]
    InvalidWeights { sum: f64 },

    #[error("pipeline config validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown tag: {0}")]
    UnknownTag(String),
}
