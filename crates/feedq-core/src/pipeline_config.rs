//! Immutable tuning for the scoring pipeline: priority weights, thresholds
//! and every keyword table.
//!
//! Defaults are compiled in. A YAML file may override any subset of fields;
//! omitted fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::feedback::Tag;
use crate::lexicon;
use crate::ConfigError;

/// Allowed drift of the priority weight sum away from 1.0.
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// One lexicon entry: a lowercase single word or space-separated phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCue {
    pub term: String,
    pub weight: f64,
}

impl WeightedCue {
    #[must_use]
    pub fn new(term: &str, weight: f64) -> Self {
        Self {
            term: term.to_string(),
            weight,
        }
    }
}

fn cues(table: &[(&str, f64)]) -> Vec<WeightedCue> {
    table.iter().map(|&(t, w)| WeightedCue::new(t, w)).collect()
}

fn words(table: &[&str]) -> Vec<String> {
    table.iter().map(|s| (*s).to_string()).collect()
}

/// Weight vector for `priority = w_u*urgency + w_i*impact + w_c*(1 - norm_sentiment)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PriorityWeights {
    pub urgency: f64,
    pub impact: f64,
    /// Weight of the inverted, `[0,1]`-normalized sentiment.
    pub sentiment: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            urgency: 0.45,
            impact: 0.40,
            sentiment: 0.15,
        }
    }
}

impl PriorityWeights {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.urgency + self.impact + self.sentiment
    }

    /// Checks that every weight is finite and non-negative and that the
    /// weights sum to 1.0 within [`WEIGHT_SUM_EPSILON`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWeights`] when the sum is off, or
    /// [`ConfigError::Validation`] for a negative or non-finite weight.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, w) in [
            ("urgency", self.urgency),
            ("impact", self.impact),
            ("sentiment", self.sentiment),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "priority weight '{name}' must be a non-negative number, got {w}"
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ConfigError::InvalidWeights { sum });
        }
        Ok(())
    }
}

/// Sentiment cut points shared by the tag extractor and the KPI rollup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentimentBands {
    /// `sentiment <= negative_max` is negative.
    pub negative_max: f64,
    /// `sentiment >= very_positive_min` is very positive.
    pub very_positive_min: f64,
}

impl SentimentBands {
    /// The sentiment-axis tag for a sentiment score.
    #[must_use]
    pub fn classify(&self, sentiment: f64) -> Tag {
        if sentiment <= self.negative_max {
            Tag::Negative
        } else if sentiment >= self.very_positive_min {
            Tag::VeryPositive
        } else {
            Tag::Neutral
        }
    }
}

impl Default for SentimentBands {
    fn default() -> Self {
        Self {
            negative_max: -0.2,
            very_positive_min: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentimentTuning {
    /// Added to the denominator of the bounded ratio `(P - N) / (P + N + k)`.
    pub smoothing: f64,
    /// How many tokens before a cue are searched for a negator.
    pub negation_window: usize,
    pub negators: Vec<String>,
    pub cues: Vec<WeightedCue>,
}

impl Default for SentimentTuning {
    fn default() -> Self {
        Self {
            smoothing: 1.0,
            negation_window: 3,
            negators: words(lexicon::NEGATORS),
            cues: cues(lexicon::SENTIMENT_CUES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UrgencyTuning {
    /// Urgency of feedback with no urgency evidence at all.
    pub floor: f64,
    /// Lower edge of the "Medium" display band.
    pub medium_threshold: f64,
    /// Lower edge of the "High" display band; also the KPI "urgent" cut.
    pub urgent_threshold: f64,
    pub exclamation_weight: f64,
    /// Number of `!` at which the exclamation contribution saturates.
    pub exclamation_saturation: u32,
    /// Contribution of negative tone, scaled by `max(0, -sentiment)`.
    pub negativity_weight: f64,
    pub cues: Vec<WeightedCue>,
}

impl Default for UrgencyTuning {
    fn default() -> Self {
        Self {
            floor: 0.1,
            medium_threshold: 0.33,
            urgent_threshold: 0.66,
            exclamation_weight: 0.25,
            exclamation_saturation: 3,
            negativity_weight: 0.5,
            cues: cues(lexicon::URGENCY_CUES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImpactTuning {
    /// Normalized texts at least this many characters long get `long_text_weight`.
    pub long_text_chars: usize,
    pub long_text_weight: f64,
    /// Contribution of a worst-possible star rating on a negative review.
    pub rating_weight: f64,
    pub rating_min: f64,
    pub rating_max: f64,
    pub cues: Vec<WeightedCue>,
}

impl Default for ImpactTuning {
    fn default() -> Self {
        Self {
            long_text_chars: 140,
            long_text_weight: 0.2,
            rating_weight: 0.6,
            rating_min: 1.0,
            rating_max: 5.0,
            cues: cues(lexicon::IMPACT_CUES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagKeywords {
    pub bug: Vec<String>,
    pub feature_request: Vec<String>,
    pub billing: Vec<String>,
}

impl Default for TagKeywords {
    fn default() -> Self {
        Self {
            bug: words(lexicon::BUG_KEYWORDS),
            feature_request: words(lexicon::FEATURE_REQUEST_KEYWORDS),
            billing: words(lexicon::BILLING_KEYWORDS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub weights: PriorityWeights,
    pub bands: SentimentBands,
    pub sentiment: SentimentTuning,
    pub urgency: UrgencyTuning,
    pub impact: ImpactTuning,
    pub tags: TagKeywords,
}

impl PipelineConfig {
    /// Validate the whole configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWeights`] if the priority weights do not
    /// sum to 1.0, or [`ConfigError::Validation`] for any other inconsistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;

        let bands = &self.bands;
        if !(-1.0..=1.0).contains(&bands.negative_max)
            || !(-1.0..=1.0).contains(&bands.very_positive_min)
            || bands.negative_max >= bands.very_positive_min
        {
            return Err(ConfigError::Validation(format!(
                "sentiment bands must satisfy -1 <= negative_max < very_positive_min <= 1, got {} and {}",
                bands.negative_max, bands.very_positive_min
            )));
        }

        if !self.sentiment.smoothing.is_finite() || self.sentiment.smoothing <= 0.0 {
            return Err(ConfigError::Validation(
                "sentiment.smoothing must be positive".to_string(),
            ));
        }

        let u = &self.urgency;
        if !(0.0..1.0).contains(&u.floor) {
            return Err(ConfigError::Validation(format!(
                "urgency.floor must be in [0, 1), got {}",
                u.floor
            )));
        }
        if !(0.0..=1.0).contains(&u.medium_threshold)
            || !(0.0..=1.0).contains(&u.urgent_threshold)
            || u.medium_threshold > u.urgent_threshold
        {
            return Err(ConfigError::Validation(
                "urgency thresholds must satisfy 0 <= medium <= urgent <= 1".to_string(),
            ));
        }
        if u.exclamation_saturation == 0 {
            return Err(ConfigError::Validation(
                "urgency.exclamation_saturation must be at least 1".to_string(),
            ));
        }
        non_negative("urgency.exclamation_weight", u.exclamation_weight)?;
        non_negative("urgency.negativity_weight", u.negativity_weight)?;

        let i = &self.impact;
        non_negative("impact.long_text_weight", i.long_text_weight)?;
        non_negative("impact.rating_weight", i.rating_weight)?;
        if !(i.rating_min.is_finite() && i.rating_max.is_finite()) || i.rating_min >= i.rating_max
        {
            return Err(ConfigError::Validation(
                "impact.rating_min must be below impact.rating_max".to_string(),
            ));
        }

        validate_cues("sentiment.cues", &self.sentiment.cues, true)?;
        validate_cues("urgency.cues", &u.cues, false)?;
        validate_cues("impact.cues", &i.cues, false)?;

        for (name, list) in [
            ("tags.bug", &self.tags.bug),
            ("tags.feature_request", &self.tags.feature_request),
            ("tags.billing", &self.tags.billing),
        ] {
            if list.iter().all(|k| k.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "{name} must contain at least one keyword"
                )));
            }
        }

        Ok(())
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

fn validate_cues(name: &str, cues: &[WeightedCue], signed: bool) -> Result<(), ConfigError> {
    for cue in cues {
        if cue.term.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{name} contains a blank term")));
        }
        if cue.term != cue.term.to_lowercase() {
            return Err(ConfigError::Validation(format!(
                "{name} term '{}' must be lowercase",
                cue.term
            )));
        }
        let ok = cue.weight.is_finite() && (signed || cue.weight >= 0.0);
        if !ok {
            return Err(ConfigError::Validation(format!(
                "{name} term '{}' has invalid weight {}",
                cue.term, cue.weight
            )));
        }
    }
    Ok(())
}

/// Load and validate a pipeline configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PipelineFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_pipeline_config(&content)
}

/// Parse and validate a pipeline configuration from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text cannot be parsed or fails validation.
pub fn parse_pipeline_config(yaml: &str) -> Result<PipelineConfig, ConfigError> {
    let config: PipelineConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[path = "pipeline_config_test.rs"]
mod tests;
