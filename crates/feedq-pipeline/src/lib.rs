//! Feedback intake and prioritization.
//!
//! Normalizes raw feedback text, drops duplicates by fingerprint, scores
//! sentiment, urgency and impact with a configurable lexicon, folds the
//! signals into a single priority, tags items, and persists them through a
//! [`feedq_core::FeedbackStore`]. Batch CSV import and trailing-window KPIs
//! sit on top of the same path.

pub mod dedup;
pub mod error;
pub mod importer;
pub mod kpi;
pub mod memory;
pub mod normalize;
pub mod pipeline;
pub mod priority;
pub mod routing;
pub mod scorer;
pub mod tagger;

mod tokens;

pub use dedup::Deduplicator;
pub use error::{ImportRowError, PipelineError};
pub use importer::{
    detect_columns, ColumnMap, ColumnRole, ImportBatch, ImportOptions, DEFAULT_IMPORT_SOURCE,
};
pub use kpi::{compute_kpis, DailySentiment, KpiReport, MAX_KPI_WINDOW_DAYS};
pub use memory::MemoryStore;
pub use normalize::{normalize, NormalizedText};
pub use pipeline::{
    Analysis, FeedbackPipeline, ImportStatus, IngestOutcome, RescoreSummary, MAX_RESCORE_BATCH,
};
pub use priority::{priority_order, Band, PriorityAggregator};
pub use routing::{route, ActionPlan, NextStep, Team};
pub use scorer::{LexiconScorer, SignalScorer};
pub use tagger::TagExtractor;
