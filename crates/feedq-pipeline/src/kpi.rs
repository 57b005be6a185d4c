//! Trailing-window KPI rollup over persisted feedback.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use feedq_core::{FeedbackItem, PipelineConfig};
use serde::Serialize;

/// Largest accepted KPI window.
pub const MAX_KPI_WINDOW_DAYS: u32 = 180;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySentiment {
    /// UTC calendar day.
    pub date: NaiveDate,
    pub avg_sentiment: f64,
    /// Items with a sentiment score on this day.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    pub window_days: u32,
    pub total: usize,
    /// Items with `urgency >= urgent_threshold`.
    pub urgent: usize,
    /// Items in the very-positive sentiment band.
    pub positive: usize,
    /// Items in the negative sentiment band.
    pub negative: usize,
    /// Mean priority of scored items; `0.0` when there are none.
    pub avg_priority: f64,
    /// One entry per UTC day that has at least one scored item, ascending.
    /// Days without items are omitted rather than reported as null.
    pub sentiment_over_time: Vec<DailySentiment>,
}

/// Roll up `items` created within `window_days` before `now`.
///
/// Items outside the window are ignored, so callers may pass a superset.
/// Unscored fields are left out of the counts and means they would feed.
#[must_use]
pub fn compute_kpis(
    items: &[FeedbackItem],
    window_days: u32,
    now: DateTime<Utc>,
    config: &PipelineConfig,
) -> KpiReport {
    let since = now - Duration::days(i64::from(window_days));
    let in_window: Vec<&FeedbackItem> = items
        .iter()
        .filter(|i| i.created_at >= since && i.created_at <= now)
        .collect();

    let urgent_threshold = config.urgency.urgent_threshold;
    let bands = config.bands;

    let urgent = in_window
        .iter()
        .filter(|i| i.urgency.is_some_and(|u| u >= urgent_threshold))
        .count();
    let positive = in_window
        .iter()
        .filter(|i| i.sentiment.is_some_and(|s| s >= bands.very_positive_min))
        .count();
    let negative = in_window
        .iter()
        .filter(|i| i.sentiment.is_some_and(|s| s <= bands.negative_max))
        .count();

    let priorities: Vec<f64> = in_window.iter().filter_map(|i| i.priority).collect();
    let avg_priority = mean(priorities.iter().sum(), priorities.len());

    let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for item in &in_window {
        if let Some(sentiment) = item.sentiment {
            let day = by_day.entry(item.created_at.date_naive()).or_default();
            day.0 += sentiment;
            day.1 += 1;
        }
    }
    let sentiment_over_time = by_day
        .into_iter()
        .map(|(date, (sum, count))| DailySentiment {
            date,
            avg_sentiment: mean(sum, count),
            count,
        })
        .collect();

    KpiReport {
        window_days,
        total: in_window.len(),
        urgent,
        positive,
        negative,
        avg_priority,
        sentiment_over_time,
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let denom = count as f64;
    sum / denom
}
