//! Candidate profile extractor: raw CV / portfolio / job text → normalized term sequence.
//!
//! Pure and allocation-light: one lowercased buffer per call, one `String` per kept term.
//! Term order is preserved and duplicates are kept, since frequency matters downstream.
//! All knobs live in `ExtractorConfig`; there is no process-wide stopword list.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stopwords applied when no override is configured.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "is", "in", "at", "on", "of", "for", "with", "to", "from", "by",
    "it", "this", "that",
];

pub const DEFAULT_MAX_PROFILE_CHARS: usize = 200_000;

/// Normalization options for the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub case_fold: bool,
    /// Split on every non-word character. When false, split on whitespace only.
    pub strip_punctuation: bool,
    pub remove_stopwords: bool,
    /// Ordered so that serialized configs and debug output are stable.
    pub stopwords: BTreeSet<String>,
    /// Minimum token length in characters. Tokens shorter than this are dropped.
    pub min_token_length: usize,
    /// Profiles longer than this (in characters) are rejected by `extract_profile`.
    pub max_profile_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            case_fold: true,
            strip_punctuation: true,
            remove_stopwords: true,
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
            min_token_length: 1,
            max_profile_chars: DEFAULT_MAX_PROFILE_CHARS,
        }
    }
}

impl ExtractorConfig {
    /// Adds extra stopwords. Words are case-folded when `case_fold` is on so they
    /// compare against normalized tokens.
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref().trim();
            if word.is_empty() {
                continue;
            }
            let word = if self.case_fold {
                word.to_lowercase()
            } else {
                word.to_string()
            };
            self.stopwords.insert(word);
        }
        self
    }
}

/// Why a candidate profile could not be turned into terms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    /// Upstream document-to-text extraction produced nothing (e.g. unreadable attachment).
    #[error("profile text is unavailable")]
    MissingText,

    #[error("profile text is {chars} characters, limit is {limit}")]
    TooLarge { chars: usize, limit: usize },
}

/// Normalizes `text` into an ordered term sequence.
///
/// Empty or whitespace-only input yields an empty sequence.
pub fn extract_terms(text: &str, config: &ExtractorConfig) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let buffer = if config.case_fold {
        text.to_lowercase()
    } else {
        text.to_string()
    };

    let mut terms = Vec::new();
    let raw_tokens: Box<dyn Iterator<Item = &str>> = if config.strip_punctuation {
        Box::new(buffer.split(|c: char| !is_word_char(c)))
    } else {
        Box::new(buffer.split_whitespace())
    };

    for token in raw_tokens {
        if token.is_empty() || token.chars().count() < config.min_token_length {
            continue;
        }
        if config.remove_stopwords && config.stopwords.contains(token) {
            continue;
        }
        terms.push(token.to_string());
    }

    terms
}

/// Extracts a candidate or job profile that may be missing upstream.
///
/// `None` and oversized texts are extraction failures; callers exclude such
/// profiles instead of failing the whole ranking.
pub fn extract_profile(
    text: Option<&str>,
    config: &ExtractorConfig,
) -> Result<Vec<String>, ExtractionError> {
    let text = text.ok_or(ExtractionError::MissingText)?;
    let chars = text.chars().count();
    if chars > config.max_profile_chars {
        return Err(ExtractionError::TooLarge {
            chars,
            limit: config.max_profile_chars,
        });
    }
    Ok(extract_terms(text, config))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
