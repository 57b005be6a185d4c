use std::collections::BTreeSet;

use feedq_core::{PipelineConfig, SentimentBands, Tag};

use crate::tokens::{tokenize, CueMatcher};

/// Assigns content-axis tags from keyword sets and exactly one
/// sentiment-axis tag from the already-computed sentiment score.
#[derive(Debug, Clone)]
pub struct TagExtractor {
    content: Vec<(Tag, CueMatcher)>,
    bands: SentimentBands,
}

impl TagExtractor {
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        let keywords = &config.tags;
        Self {
            content: vec![
                (Tag::Bug, CueMatcher::keywords(&keywords.bug)),
                (Tag::FeatureRequest, CueMatcher::keywords(&keywords.feature_request)),
                (Tag::Billing, CueMatcher::keywords(&keywords.billing)),
            ],
            bands: config.bands,
        }
    }

    /// Never returns an empty set.
    #[must_use]
    pub fn extract_tags(&self, text_norm: &str, sentiment: f64) -> BTreeSet<Tag> {
        let tokens = tokenize(text_norm);
        let mut tags: BTreeSet<Tag> = self
            .content
            .iter()
            .filter(|(_, matcher)| matcher.any(&tokens))
            .map(|(tag, _)| *tag)
            .collect();
        tags.insert(self.bands.classify(sentiment));
        tags
    }
}
