//! Signal scoring: sentiment, urgency and impact from normalized text.

use std::collections::HashSet;
use std::sync::Arc;

use feedq_core::{Metadata, PipelineConfig, Signals};

use crate::tokens::{tokenize, CueMatcher};

/// Pluggable scoring strategy.
///
/// Implementations must be deterministic: identical input yields identical
/// signals. Input is non-empty normalized text; empty text is rejected by the
/// normalizer before a scorer ever sees it.
pub trait SignalScorer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn score(&self, text_norm: &str, metadata: Option<&Metadata>) -> Signals;
}

/// Keyword/heuristic scorer driven entirely by [`PipelineConfig`].
///
/// - sentiment: distinct positive (`P`) and negative (`N`) cue weights,
///   `(P - N) / (P + N + smoothing)`, with cues flipped when a negator
///   appears a few tokens before them.
/// - urgency: distinct urgency cues, exclamation density and negative tone,
///   saturated with `1 - e^-x` above a configured floor.
/// - impact: distinct scale/surface cues, a long-text bonus and, for
///   negative feedback, a low star rating, saturated with `1 - e^-x`.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    config: Arc<PipelineConfig>,
    sentiment_cues: CueMatcher,
    urgency_cues: CueMatcher,
    impact_cues: CueMatcher,
    negators: HashSet<String>,
}

impl LexiconScorer {
    #[must_use]
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self {
            sentiment_cues: CueMatcher::new(&config.sentiment.cues),
            urgency_cues: CueMatcher::new(&config.urgency.cues),
            impact_cues: CueMatcher::new(&config.impact.cues),
            negators: config.sentiment.negators.iter().cloned().collect(),
            config,
        }
    }

    fn sentiment(&self, tokens: &[&str]) -> f64 {
        let window = self.config.sentiment.negation_window;
        let mut seen = HashSet::new();
        let mut positive = 0.0;
        let mut negative = 0.0;

        for hit in self.sentiment_cues.hits(tokens) {
            let negated = tokens[hit.start.saturating_sub(window)..hit.start]
                .iter()
                .any(|t| self.negators.contains(*t));
            if !seen.insert((hit.cue, negated)) {
                continue;
            }
            let weight = if negated { -hit.weight } else { hit.weight };
            if weight >= 0.0 {
                positive += weight;
            } else {
                negative -= weight;
            }
        }

        let denom = positive + negative + self.config.sentiment.smoothing;
        ((positive - negative) / denom).clamp(-1.0, 1.0)
    }

    fn urgency(&self, tokens: &[&str], text_norm: &str, sentiment: f64) -> f64 {
        let tuning = &self.config.urgency;
        let saturation = tuning.exclamation_saturation.max(1);
        let bangs = u32::try_from(text_norm.matches('!').count())
            .unwrap_or(u32::MAX)
            .min(saturation);

        let raw = self.urgency_cues.distinct_sum(tokens)
            + tuning.exclamation_weight * f64::from(bangs) / f64::from(saturation)
            + tuning.negativity_weight * (-sentiment).max(0.0);

        (tuning.floor + (1.0 - tuning.floor) * saturate(raw)).clamp(0.0, 1.0)
    }

    fn impact(&self, tokens: &[&str], text_norm: &str, sentiment: f64, rating: Option<f64>) -> f64 {
        let tuning = &self.config.impact;
        let mut raw = self.impact_cues.distinct_sum(tokens);

        if text_norm.chars().count() >= tuning.long_text_chars {
            raw += tuning.long_text_weight;
        }

        if let Some(rating) = rating.filter(|r| r.is_finite()) {
            if sentiment < 0.0 {
                let span = tuning.rating_max - tuning.rating_min;
                let badness = (tuning.rating_max - rating.clamp(tuning.rating_min, tuning.rating_max)) / span;
                raw += tuning.rating_weight * badness;
            }
        }

        saturate(raw).clamp(0.0, 1.0)
    }
}

impl SignalScorer for LexiconScorer {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn score(&self, text_norm: &str, metadata: Option<&Metadata>) -> Signals {
        let tokens = tokenize(text_norm);
        let rating = metadata
            .and_then(|m| m.get("rating"))
            .and_then(serde_json::Value::as_f64);

        let sentiment = self.sentiment(&tokens);
        Signals {
            sentiment,
            urgency: self.urgency(&tokens, text_norm, sentiment),
            impact: self.impact(&tokens, text_norm, sentiment, rating),
        }
    }
}

/// Maps `[0, inf)` onto `[0, 1)`.
fn saturate(x: f64) -> f64 {
    1.0 - (-x.max(0.0)).exp()
}

#[cfg(test)]
#[path = "scorer_test.rs"]
mod tests;
