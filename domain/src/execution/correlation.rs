//! Text heuristics for attributing completion signals by task description.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fraction of the smaller description's significant words that must be shared.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.4;

/// Words shorter than this many characters are ignored for overlap.
const MIN_SIGNIFICANT_LEN: usize = 3;

/// Which strategy attributed a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    ExecutionId,
    ContentExact,
    ContentSimilarity,
    Temporal,
}

impl CorrelationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationMethod::ExecutionId => "execution_id",
            CorrelationMethod::ContentExact => "content_exact",
            CorrelationMethod::ContentSimilarity => "content_similarity",
            CorrelationMethod::Temporal => "temporal",
        }
    }
}

/// How a candidate description matched the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentMatch {
    Exact,
    Overlap(f64),
}

impl ContentMatch {
    /// Ordering score; exact matches outrank any overlap.
    pub fn score(&self) -> f64 {
        match self {
            ContentMatch::Exact => 2.0,
            ContentMatch::Overlap(ratio) => *ratio,
        }
    }

    pub fn method(&self) -> CorrelationMethod {
        match self {
            ContentMatch::Exact => CorrelationMethod::ContentExact,
            ContentMatch::Overlap(_) => CorrelationMethod::ContentSimilarity,
        }
    }
}

/// Lower-case, drop punctuation, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Distinct normalized words of at least three characters.
pub fn significant_words(text: &str) -> HashSet<String> {
    normalize(text)
        .split(' ')
        .filter(|w| w.chars().count() >= MIN_SIGNIFICANT_LEN)
        .map(str::to_string)
        .collect()
}

/// Shared significant words divided by the size of the smaller set.
pub fn overlap_ratio(a: &str, b: &str) -> f64 {
    let left = significant_words(a);
    let right = significant_words(b);
    let smaller = left.len().min(right.len());
    if smaller == 0 {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    shared as f64 / smaller as f64
}

/// Compare a signal's description against an execution's.
pub fn match_content(query: &str, candidate: &str, threshold: f64) -> Option<ContentMatch> {
    let query_norm = normalize(query);
    if query_norm.is_empty() {
        return None;
    }
    if query_norm == normalize(candidate) {
        return Some(ContentMatch::Exact);
    }
    let ratio = overlap_ratio(query, candidate);
    (ratio >= threshold).then_some(ContentMatch::Overlap(ratio))
}
