//! End-to-end properties of the intake pipeline over the in-memory store.

use std::sync::Arc;

use feedq_core::{ConfigError, PipelineConfig, PriorityWeights, Signals, Tag};
use feedq_pipeline::{
    normalize, FeedbackPipeline, ImportOptions, IngestOutcome, MemoryStore, PriorityAggregator,
    TagExtractor,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const CRASH: &str = "The app crashes every time I upload a file! All our customers are affected.";
const DARK_MODE: &str = "Would love a dark mode.";

const SAMPLES: &[&str] = &[
    CRASH,
    DARK_MODE,
    "I was charged twice this month, please refund.",
    "  Mixed   CASE\twith\n\nwhitespace ",
    "Not bad at all, the update is not slow anymore",
    "Check https://example.com/help or mail help@example.com",
    "Ünïcödé “quotes” — and dashes",
];

fn pipeline() -> FeedbackPipeline<MemoryStore> {
    FeedbackPipeline::new(MemoryStore::new(), Arc::new(PipelineConfig::default()))
        .expect("default config is valid")
}

fn steps(n: u32) -> impl Iterator<Item = f64> {
    (0..=n).map(move |i| f64::from(i) / f64::from(n))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn fingerprint_is_deterministic_and_whitespace_insensitive() {
    for text in SAMPLES {
        let a = normalize(text).unwrap();
        let b = normalize(text).unwrap();
        let padded = normalize(&format!("{text} ")).unwrap();
        assert_eq!(a, b, "{text:?}");
        assert_eq!(a, padded, "{text:?}");
        assert_eq!(a.text_hash.len(), 64);
    }
}

#[test]
fn priority_stays_in_unit_range() {
    let aggregator = PriorityAggregator::new(PipelineConfig::default().weights).unwrap();
    for sentiment in steps(8).map(|s| s * 2.0 - 1.0) {
        for urgency in steps(8) {
            for impact in steps(8) {
                let p = aggregator.aggregate(Signals {
                    sentiment,
                    urgency,
                    impact,
                });
                assert!((0.0..=1.0).contains(&p), "{sentiment} {urgency} {impact} -> {p}");
            }
        }
    }
}

#[test]
fn weights_must_sum_to_one() {
    let heavy = PriorityWeights {
        urgency: 0.6,
        impact: 0.5,
        sentiment: 0.2,
    };
    assert!(matches!(
        PriorityAggregator::new(heavy),
        Err(ConfigError::InvalidWeights { .. })
    ));

    let lopsided = PriorityWeights {
        urgency: 0.0,
        impact: 1.0,
        sentiment: 0.0,
    };
    let aggregator = PriorityAggregator::new(lopsided).unwrap();
    let p = aggregator.aggregate(Signals {
        sentiment: -1.0,
        urgency: 1.0,
        impact: 1.0,
    });
    assert!((p - 1.0).abs() < 1e-12);
}

#[test]
fn every_item_gets_a_sentiment_tag() {
    let config = PipelineConfig::default();
    let tagger = TagExtractor::new(&config);
    for text in SAMPLES {
        let norm = normalize(text).unwrap().text_norm;
        for sentiment in [-1.0, -0.2, 0.0, 0.59, 0.6, 1.0] {
            let tags = tagger.extract_tags(&norm, sentiment);
            let axis = tags.iter().filter(|t| t.is_sentiment_axis()).count();
            assert_eq!(axis, 1, "{text:?} at {sentiment}: {tags:?}");
        }
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn crash_report_outranks_feature_request() {
    let p = pipeline();
    let IngestOutcome::Saved(crash) = p.ingest(CRASH, "manual", None).await.unwrap() else {
        panic!("crash report was not saved");
    };
    let IngestOutcome::Saved(dark) = p.ingest(DARK_MODE, "manual", None).await.unwrap() else {
        panic!("feature request was not saved");
    };

    assert!(crash.tags.contains(&Tag::Bug));
    assert_eq!(crash.sentiment_tag(), Some(Tag::Negative));
    assert!(crash.urgency.unwrap() > 0.6);
    assert!(crash.priority.unwrap() > 0.7);

    assert!(dark.tags.contains(&Tag::FeatureRequest));
    assert!(matches!(dark.sentiment_tag(), Some(Tag::Neutral | Tag::VeryPositive)));
    assert!(dark.priority.unwrap() < crash.priority.unwrap() - 0.3);

    let queue = p.prioritized(10).await.unwrap();
    assert_eq!(queue[0].id, crash.id);
}

#[tokio::test]
async fn same_text_twice_persists_once() {
    let p = pipeline();
    assert!(matches!(
        p.ingest(DARK_MODE, "manual", None).await.unwrap(),
        IngestOutcome::Saved(_)
    ));
    assert!(matches!(
        p.ingest(DARK_MODE, "manual", None).await.unwrap(),
        IngestOutcome::Duplicate { .. }
    ));
    assert_eq!(p.list(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn csv_with_title_review_rating() {
    let csv = "title,review,rating\nUpload bug,The app crashes when I upload photos,2\n";
    let p = pipeline();
    let batch = p
        .import_csv("reviews.csv", std::io::Cursor::new(csv), &ImportOptions::default())
        .await
        .unwrap();
    assert_eq!(batch.imported, 1);
    assert_eq!(batch.total_processed, 1);

    let item = &p.list(1).await.unwrap()[0];
    assert!(item.raw_text.ends_with("The app crashes when I upload photos"));
    assert_eq!(item.rating(), Some(2.0));
}

#[tokio::test]
async fn batch_isolates_the_empty_row() {
    let mut csv = String::from("text\n");
    for i in 0..10 {
        csv.push_str(&format!("Feedback entry {i}\n"));
    }
    csv.push_str("\"\"\n");

    let p = pipeline();
    let batch = p
        .import_csv("batch.csv", std::io::Cursor::new(csv), &ImportOptions::default())
        .await
        .unwrap();
    assert_eq!(
        (batch.imported, batch.skipped, batch.errors, batch.total_processed),
        (10, 1, 0, 11)
    );
}
