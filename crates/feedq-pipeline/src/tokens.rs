//! Tokenization and cue matching shared by the scorer, tagger and router.

use feedq_core::WeightedCue;

/// Split normalized text into word tokens.
///
/// Any character that is neither alphanumeric nor an apostrophe separates
/// tokens; apostrophes at token edges are trimmed so `don't` survives but
/// `'quoted'` becomes `quoted`.
pub(crate) fn tokenize(text_norm: &str) -> Vec<&str> {
    text_norm
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .collect()
}

/// A match of one cue at a token offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Hit {
    pub cue: usize,
    pub start: usize,
    pub weight: f64,
}

/// Precompiled list of single-word and multi-word cues.
#[derive(Debug, Clone)]
pub(crate) struct CueMatcher {
    cues: Vec<(Vec<String>, f64)>,
}

impl CueMatcher {
    pub(crate) fn new(cues: &[WeightedCue]) -> Self {
        Self {
            cues: cues
                .iter()
                .map(|c| (tokenize(&c.term).into_iter().map(str::to_string).collect(), c.weight))
                .filter(|(words, _): &(Vec<String>, f64)| !words.is_empty())
                .collect(),
        }
    }

    /// Keyword sets are cues without a weight.
    pub(crate) fn keywords(words: &[String]) -> Self {
        let cues: Vec<WeightedCue> = words.iter().map(|w| WeightedCue::new(w, 1.0)).collect();
        Self::new(&cues)
    }

    /// Every occurrence of every cue, in cue order.
    pub(crate) fn hits(&self, tokens: &[&str]) -> Vec<Hit> {
        let mut hits = Vec::new();
        for (cue, (words, weight)) in self.cues.iter().enumerate() {
            if words.len() > tokens.len() {
                continue;
            }
            for start in 0..=tokens.len() - words.len() {
                let window = &tokens[start..start + words.len()];
                if window.iter().zip(words).all(|(t, w)| *t == w.as_str()) {
                    hits.push(Hit {
                        cue,
                        start,
                        weight: *weight,
                    });
                }
            }
        }
        hits
    }

    /// Sum of weights of the distinct cues present; repeats count once.
    pub(crate) fn distinct_sum(&self, tokens: &[&str]) -> f64 {
        let mut last = None;
        let mut sum = 0.0;
        for hit in self.hits(tokens) {
            if last != Some(hit.cue) {
                sum += hit.weight;
                last = Some(hit.cue);
            }
        }
        sum
    }

    pub(crate) fn any(&self, tokens: &[&str]) -> bool {
        !self.hits(tokens).is_empty()
    }
}
