//! Text canonicalization and content fingerprinting.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::PipelineError;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("valid url regex"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Lowercased, whitespace-collapsed text with punctuation kept.
    pub text_norm: String,
    /// Hex SHA-256 of the punctuation-stripped form of `text_norm`, or of
    /// `text_norm` itself when stripping leaves nothing.
    pub text_hash: String,
}

/// Canonicalize `raw` and compute its fingerprint.
///
/// Lowercases, maps typographic quotes and dashes to ASCII, blanks out URLs
/// and e-mail addresses, collapses whitespace runs and trims. The hash is
/// taken over the same text with punctuation removed, so inputs that differ
/// only in casing, spacing or punctuation collide.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] when the normalized text is empty.
pub fn normalize(raw: &str) -> Result<NormalizedText, PipelineError> {
    let folded: String = raw.chars().map(fold_char).collect::<String>().to_lowercase();
    let scrubbed = URL_RE.replace_all(&folded, " ");
    let scrubbed = EMAIL_RE.replace_all(&scrubbed, " ");
    let text_norm = collapse_whitespace(&scrubbed);
    if text_norm.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    // Text made only of symbols (emoji, "???") is hashed as-is.
    let key = hash_key(&text_norm);
    let key = if key.is_empty() { text_norm.as_str() } else { key.as_str() };

    Ok(NormalizedText {
        text_hash: format!("{:x}", Sha256::digest(key.as_bytes())),
        text_norm,
    })
}

fn fold_char(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{02BC}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        '\u{2013}' | '\u{2014}' => '-',
        '\u{00A0}' | '\u{2007}' | '\u{202F}' => ' ',
        _ => c,
    }
}

fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}

/// `text_norm` without punctuation or symbols, whitespace re-collapsed.
fn hash_key(text_norm: &str) -> String {
    let stripped: String = text_norm
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    collapse_whitespace(&stripped)
}
