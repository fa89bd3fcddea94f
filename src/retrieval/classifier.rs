//! Adaptive query-type classification
//!
//! Classifies queries as technical (exact-match intent: identifiers,
//! version numbers, quoted phrases) or conceptual (explanatory intent:
//! "how does...", "explain...") and resolves fusion weights accordingly.
//! Technical queries lean on BM25, conceptual queries lean on the dense
//! results.

use crate::config::FusionConfig;
use serde::Serialize;
use std::fmt;

/// Query classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Technical,
    Conceptual,
    Balanced,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::Technical => write!(f, "technical"),
            QueryKind::Conceptual => write!(f, "conceptual"),
            QueryKind::Balanced => write!(f, "balanced"),
        }
    }
}

/// Fusion weights for the two retrieval methods. Always sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionWeights {
    pub dense: f32,
    pub bm25: f32,
}

const CONCEPTUAL_LEADS: &[&str] = &[
    "how ",
    "why ",
    "explain ",
    "describe ",
    "what is ",
    "what are ",
    "tell me about ",
    "compare ",
];

/// Classify a query by counting technical and conceptual signals.
///
/// Whichever side has strictly more signals wins; a tie (including no
/// signals at all) is balanced.
pub fn classify(query: &str) -> QueryKind {
    let lower = query.to_lowercase();
    let words: Vec<&str> = query.split_whitespace().collect();

    let technical_signals = [
        words.iter().any(|w| w.contains('_') || w.contains("::")),
        words.iter().any(|w| is_camel_case(w)),
        query.chars().any(|c| c.is_ascii_digit()),
        query.contains('(') || query.contains(')'),
        words.iter().any(|w| is_dotted_name(w)),
        query.contains('"'),
    ]
    .iter()
    .filter(|&&s| s)
    .count();

    let conceptual_signals = [
        CONCEPTUAL_LEADS.iter().any(|lead| lower.starts_with(lead)),
        words.len() >= 8,
        lower.contains("difference between"),
    ]
    .iter()
    .filter(|&&s| s)
    .count();

    if technical_signals > conceptual_signals {
        QueryKind::Technical
    } else if conceptual_signals > technical_signals {
        QueryKind::Conceptual
    } else {
        QueryKind::Balanced
    }
}

/// Resolve fusion weights for a classified query.
///
/// The base dense weight shifts by `adaptive_shift` toward BM25 for
/// technical queries and toward dense for conceptual queries, clamped to
/// `[min_weight, max_weight]`. The BM25 weight is the complement, so the
/// pair always sums to 1.0.
pub fn fusion_weights(kind: QueryKind, config: &FusionConfig) -> FusionWeights {
    let shift = match kind {
        QueryKind::Technical => -config.adaptive_shift,
        QueryKind::Conceptual => config.adaptive_shift,
        QueryKind::Balanced => 0.0,
    };
    let dense = (config.dense_weight + shift).clamp(config.min_weight, config.max_weight);
    FusionWeights {
        dense,
        bm25: 1.0 - dense,
    }
}

/// A word with an interior uppercase letter following a lowercase one,
/// e.g. `HybridSearchEngine` or `topK`.
fn is_camel_case(word: &str) -> bool {
    let mut prev_lower = false;
    for ch in word.chars() {
        if ch.is_uppercase() && prev_lower {
            return true;
        }
        prev_lower = ch.is_lowercase();
    }
    false
}

/// A dotted identifier like `config.toml` or `engine.search`, excluding
/// sentence-final periods.
fn is_dotted_name(word: &str) -> bool {
    word.contains('.') && !word.starts_with('.') && !word.ends_with('.')
}
