//! CSV header role detection.

use csv::StringRecord;
use serde::Serialize;

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Text,
    Rating,
    Title,
    Date,
    Version,
    Reviewer,
}

impl ColumnRole {
    /// Resolution order. Earlier roles claim ambiguous headers first.
    pub const ALL: [ColumnRole; 6] = [
        ColumnRole::Text,
        ColumnRole::Rating,
        ColumnRole::Title,
        ColumnRole::Date,
        ColumnRole::Version,
        ColumnRole::Reviewer,
    ];

    /// Header names for this role, most specific first.
    #[must_use]
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            ColumnRole::Text => &["review", "content", "text", "comment", "feedback", "body", "message"],
            ColumnRole::Rating => &["rating", "score", "stars", "star"],
            ColumnRole::Title => &["title", "subject", "headline", "summary"],
            ColumnRole::Date => &["date", "created", "submitted", "time", "timestamp"],
            ColumnRole::Version => &["version", "app_version", "build"],
            ColumnRole::Reviewer => &["reviewer", "user", "author", "name"],
        }
    }

    /// Metadata key the column's value is stored under. Text and title feed
    /// the ingested text instead.
    #[must_use]
    pub fn metadata_key(self) -> Option<&'static str> {
        match self {
            ColumnRole::Text | ColumnRole::Title => None,
            ColumnRole::Rating => Some("rating"),
            ColumnRole::Date => Some("review_date"),
            ColumnRole::Version => Some("app_version"),
            ColumnRole::Reviewer => Some("reviewer"),
        }
    }
}

/// Column index per detected role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub text: usize,
    pub rating: Option<usize>,
    pub title: Option<usize>,
    pub date: Option<usize>,
    pub version: Option<usize>,
    pub reviewer: Option<usize>,
    /// Header names as they appeared in the file.
    pub headers: Vec<String>,
}

impl ColumnMap {
    #[must_use]
    pub fn index(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Text => Some(self.text),
            ColumnRole::Rating => self.rating,
            ColumnRole::Title => self.title,
            ColumnRole::Date => self.date,
            ColumnRole::Version => self.version,
            ColumnRole::Reviewer => self.reviewer,
        }
    }

    /// Header name of the column holding `role`.
    #[must_use]
    pub fn header(&self, role: ColumnRole) -> Option<&str> {
        self.index(role)
            .and_then(|i| self.headers.get(i))
            .map(String::as_str)
    }
}

/// Assign header columns to roles.
///
/// For each role in [`ColumnRole::ALL`] order, candidates are tried first as
/// exact (case-insensitive, trimmed) header matches, then as substrings of
/// the header. A column is claimed by at most one role, so `review,reviewer`
/// maps `review` to text and `reviewer` to reviewer.
///
/// # Errors
///
/// Returns [`PipelineError::ColumnDetection`] if no text column is found.
pub fn detect_columns(headers: &StringRecord) -> Result<ColumnMap, PipelineError> {
    let original: Vec<String> = headers.iter().map(str::to_string).collect();
    let lowered: Vec<String> = original
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();
    let mut claimed = vec![false; lowered.len()];

    let mut found = [None; ColumnRole::ALL.len()];
    for (slot, role) in found.iter_mut().zip(ColumnRole::ALL) {
        *slot = claim(role, &lowered, &mut claimed);
    }
    let [text, rating, title, date, version, reviewer] = found;

    let Some(text) = text else {
        return Err(PipelineError::ColumnDetection { headers: original });
    };

    Ok(ColumnMap {
        text,
        rating,
        title,
        date,
        version,
        reviewer,
        headers: original,
    })
}

fn claim(role: ColumnRole, headers: &[String], claimed: &mut [bool]) -> Option<usize> {
    let exact = |cand: &str| {
        headers
            .iter()
            .enumerate()
            .position(|(i, h)| !claimed[i] && h == cand)
    };
    let partial = |cand: &str| {
        headers
            .iter()
            .enumerate()
            .position(|(i, h)| !claimed[i] && h.contains(cand))
    };

    let candidates = role.candidates();
    let index = candidates
        .iter()
        .find_map(|c| exact(c))
        .or_else(|| candidates.iter().find_map(|c| partial(c)))?;
    claimed[index] = true;
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(headers: &[&str]) -> Result<ColumnMap, PipelineError> {
        detect_columns(&StringRecord::from(headers.to_vec()))
    }

    #[test]
    fn title_review_rating() {
        let map = detect(&["title", "review", "rating"]).unwrap();
        assert_eq!(map.text, 1);
        assert_eq!(map.title, Some(0));
        assert_eq!(map.rating, Some(2));
        assert_eq!(map.header(ColumnRole::Text), Some("review"));
    }

    #[test]
    fn matching_is_case_insensitive_and_trimmed() {
        let map = detect(&[" Stars ", "REVIEW"]).unwrap();
        assert_eq!(map.text, 1);
        assert_eq!(map.rating, Some(0));
    }

    #[test]
    fn exact_match_beats_earlier_substring_match() {
        // "reviewer" contains "review" but the exact "review" column wins.
        let map = detect(&["reviewer", "review"]).unwrap();
        assert_eq!(map.text, 1);
        assert_eq!(map.reviewer, Some(0));
    }

    #[test]
    fn substring_match_is_used_when_no_exact_header() {
        let map = detect(&["Review Text", "User Name", "App Version"]).unwrap();
        assert_eq!(map.text, 0);
        assert_eq!(map.reviewer, Some(1));
        assert_eq!(map.version, Some(2));
    }

    #[test]
    fn comment_beats_feedback() {
        let map = detect(&["feedback", "comment"]).unwrap();
        assert_eq!(map.header(ColumnRole::Text), Some("comment"));
    }

    #[test]
    fn a_column_claims_one_role() {
        // "summary" is a title candidate but must not also become text.
        let map = detect(&["summary", "body"]).unwrap();
        assert_eq!(map.text, 1);
        assert_eq!(map.title, Some(0));
    }

    #[test]
    fn bom_is_ignored() {
        let map = detect(&["\u{feff}content", "date"]).unwrap();
        assert_eq!(map.text, 0);
        assert_eq!(map.date, Some(1));
    }

    #[test]
    fn missing_text_column_is_an_error() {
        let err = detect(&["rating", "date"]).unwrap_err();
        match err {
            PipelineError::ColumnDetection { headers } => assert_eq!(headers, vec!["rating", "date"]),
            other => panic!("expected ColumnDetection, got {other:?}"),
        }
    }

    #[test]
    fn metadata_keys() {
        assert_eq!(ColumnRole::Rating.metadata_key(), Some("rating"));
        assert_eq!(ColumnRole::Date.metadata_key(), Some("review_date"));
        assert_eq!(ColumnRole::Title.metadata_key(), None);
    }
}
