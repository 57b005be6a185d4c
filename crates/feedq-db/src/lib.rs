//! Postgres persistence for feedback items.

use thiserror::Error;

pub mod feedback;
pub mod pool;
pub mod store;

pub use feedback::{
    count_feedback_by_source, feedback_exists_by_hash, get_feedback, insert_feedback_if_absent,
    query_feedback, update_feedback_scores, FeedbackRow,
};
pub use pool::{connect_pool, connect_pool_from_config, health_check, run_migrations, PoolConfig};
pub use store::PgFeedbackStore;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database URL is empty")]
    MissingDatabaseUrl,
    #[error("feedback item {0} not found")]
    NotFound(i64),
    #[error("feedback row {id} is corrupt: {reason}")]
    Corrupt { id: i64, reason: String },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}
