//! Offline tests for feedq-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use feedq_core::{AppConfig, Environment};
use feedq_db::{FeedbackRow, PoolConfig};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        pipeline_config_path: Some(PathBuf::from("./config/pipeline.yaml")),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        import_concurrency: 4,
        import_timeout_secs: None,
        import_source: "app_store_csv".to_string(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout, std::time::Duration::from_secs(9));
}

#[tokio::test]
async fn blank_database_url_is_rejected_before_connecting() {
    let mut config = app_config();
    config.database_url = "  ".to_string();
    let err = feedq_db::connect_pool_from_config(&config)
        .await
        .unwrap_err();
    assert!(matches!(err, feedq_db::DbError::MissingDatabaseUrl));
}

/// Compile-time smoke test: confirm that [`FeedbackRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn feedback_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = FeedbackRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        source: "manual".to_string(),
        raw_text: "Would love a dark mode.".to_string(),
        text_norm: "would love a dark mode.".to_string(),
        text_hash: "0".repeat(64),
        sentiment: Some(0.375),
        urgency: Some(0.1),
        impact: Some(0.0),
        priority: None,
        tags: vec!["feature_request".to_string(), "neutral".to_string()],
        metadata: None,
        summary: None,
        consensus_score: None,
        created_at: Utc::now(),
    };

    let item = row.into_item().unwrap();
    assert_eq!(item.id, 1);
    assert_eq!(item.tags.len(), 2);
    assert!(item.priority.is_none());
    assert!(item.summary.is_none());
}
