//! Priority aggregation, queue ordering and display banding.

use std::cmp::Ordering;

use feedq_core::{ConfigError, FeedbackItem, PriorityWeights, Signals, UrgencyTuning};

/// Combines the three signals into one ranking score in `[0, 1]`.
///
/// Constructed only from validated weights, so for in-range signals the
/// weighted sum is already inside `[0, 1]`; the final clamp only absorbs
/// rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityAggregator {
    weights: PriorityWeights,
}

impl PriorityAggregator {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWeights`] if the weights do not sum to
    /// 1.0, or [`ConfigError::Validation`] if any weight is negative.
    pub fn new(weights: PriorityWeights) -> Result<Self, ConfigError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    #[must_use]
    pub fn weights(&self) -> PriorityWeights {
        self.weights
    }

    #[must_use]
    pub fn aggregate(&self, signals: Signals) -> f64 {
        let w = &self.weights;
        let sentiment = signals.sentiment.clamp(-1.0, 1.0);
        let normalized_sentiment = (sentiment + 1.0) / 2.0;
        let priority = w.urgency * signals.urgency.clamp(0.0, 1.0)
            + w.impact * signals.impact.clamp(0.0, 1.0)
            + w.sentiment * (1.0 - normalized_sentiment);
        priority.clamp(0.0, 1.0)
    }
}

/// Queue order: priority, urgency, impact descending, then oldest first,
/// then lowest id. Unscored fields sort after scored ones.
#[must_use]
pub fn priority_order(a: &FeedbackItem, b: &FeedbackItem) -> Ordering {
    desc(a.priority, b.priority)
        .then_with(|| desc(a.urgency, b.urgency))
        .then_with(|| desc(a.impact, b.impact))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Coarse Low/Medium/High label for a `[0, 1]` score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Medium,
    High,
}

impl Band {
    #[must_use]
    pub fn of(score: f64, tuning: &UrgencyTuning) -> Self {
        if score >= tuning.urgent_threshold {
            Band::High
        } else if score >= tuning.medium_threshold {
            Band::Medium
        } else {
            Band::Low
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::Medium => "medium",
            Band::High => "high",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn aggregator() -> PriorityAggregator {
        PriorityAggregator::new(PriorityWeights::default()).unwrap()
    }

    fn signals(sentiment: f64, urgency: f64, impact: f64) -> Signals {
        Signals {
            sentiment,
            urgency,
            impact,
        }
    }

    fn item(id: i64, priority: Option<f64>, urgency: f64, impact: f64, day: u32) -> FeedbackItem {
        FeedbackItem {
            id,
            public_id: Uuid::new_v4(),
            source: "manual".to_string(),
            raw_text: String::new(),
            text_norm: String::new(),
            text_hash: format!("h{id}"),
            sentiment: Some(0.0),
            urgency: Some(urgency),
            impact: Some(impact),
            priority,
            tags: std::collections::BTreeSet::new(),
            metadata: None,
            summary: None,
            consensus_score: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn reference_formula() {
        let p = aggregator().aggregate(signals(0.0, 0.5, 0.5));
        // 0.45*0.5 + 0.40*0.5 + 0.15*(1 - 0.5)
        assert!((p - 0.5).abs() < 1e-12, "got {p}");
    }

    #[test]
    fn extremes_hit_bounds() {
        let a = aggregator();
        assert!((a.aggregate(signals(-1.0, 1.0, 1.0)) - 1.0).abs() < 1e-12);
        assert!(a.aggregate(signals(1.0, 0.0, 0.0)).abs() < 1e-12);
    }

    #[test]
    fn priority_stays_in_bounds_over_grid() {
        let a = aggregator();
        let steps = [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0];
        for s in [-1.0, -0.5, 0.0, 0.5, 1.0] {
            for u in steps {
                for i in steps {
                    let p = a.aggregate(signals(s, u, i));
                    assert!((0.0..=1.0).contains(&p), "s={s} u={u} i={i} p={p}");
                }
            }
        }
    }

    #[test]
    fn positive_tone_lowers_priority() {
        let a = aggregator();
        assert!(a.aggregate(signals(0.9, 0.4, 0.4)) < a.aggregate(signals(-0.9, 0.4, 0.4)));
    }

    #[test]
    fn weights_summing_to_1_3_are_rejected() {
        let err = PriorityAggregator::new(PriorityWeights {
            urgency: 0.6,
            impact: 0.5,
            sentiment: 0.2,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWeights { .. }));
    }

    #[test]
    fn custom_weights_are_used() {
        let a = PriorityAggregator::new(PriorityWeights {
            urgency: 1.0,
            impact: 0.0,
            sentiment: 0.0,
        })
        .unwrap();
        assert!((a.aggregate(signals(0.3, 0.7, 0.1)) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn order_breaks_ties_by_urgency_impact_then_age() {
        let mut items = vec![
            item(1, Some(0.5), 0.4, 0.9, 3),
            item(2, Some(0.5), 0.6, 0.1, 4),
            item(3, Some(0.5), 0.4, 0.9, 1),
            item(4, Some(0.9), 0.1, 0.1, 5),
            item(5, None, 1.0, 1.0, 1),
            item(6, Some(0.5), 0.4, 0.2, 2),
        ];
        items.sort_by(priority_order);
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1, 6, 5]);
    }

    #[test]
    fn bands_use_inclusive_lower_edges() {
        let t = UrgencyTuning::default();
        assert_eq!(Band::of(0.0, &t), Band::Low);
        assert_eq!(Band::of(0.329, &t), Band::Low);
        assert_eq!(Band::of(0.33, &t), Band::Medium);
        assert_eq!(Band::of(0.66, &t), Band::High);
        assert_eq!(Band::of(1.0, &t), Band::High);
    }
}
