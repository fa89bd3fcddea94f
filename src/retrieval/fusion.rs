//! Result fusion strategies
//!
//! Implements Reciprocal Rank Fusion (RRF) and min-max-normalized weighted
//! score fusion for combining results from multiple retrieval methods.

use crate::types::DocumentId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Retrieval method that produced a ranked list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMethod {
    Dense,
    Bm25,
}

impl fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalMethod::Dense => write!(f, "dense"),
            RetrievalMethod::Bm25 => write!(f, "bm25"),
        }
    }
}

/// Reciprocal Rank Fusion (RRF) parameters
#[derive(Debug, Clone)]
pub struct RrfConfig {
    /// K parameter for RRF (default: 60)
    pub k: usize,
}

impl Default for RrfConfig {
    fn default() -> Self {
        Self { k: 60 }
    }
}

/// A ranked result from a single retrieval method
#[derive(Debug, Clone)]
pub struct RankedResult {
    pub doc_id: DocumentId,
    /// 1-indexed rank within the method's result list
    pub rank: usize,
    pub original_score: f32,
    pub method: RetrievalMethod,
}

/// Fused result after combining multiple ranking sources
#[derive(Debug, Clone)]
pub struct FusedResult {
    pub doc_id: DocumentId,
    pub score: f32,
    pub contributing_methods: Vec<RetrievalMethod>,
    pub rank_per_method: HashMap<RetrievalMethod, usize>,
}

impl FusedResult {
    fn new(doc_id: DocumentId) -> Self {
        Self {
            doc_id,
            score: 0.0,
            contributing_methods: Vec::new(),
            rank_per_method: HashMap::new(),
        }
    }

    fn contribute(&mut self, amount: f32, rank: usize, method: RetrievalMethod) {
        self.score += amount;
        if !self.contributing_methods.contains(&method) {
            self.contributing_methods.push(method);
        }
        self.rank_per_method.insert(method, rank);
    }
}

/// Convert raw `(doc_id, score)` pairs (already sorted by score descending)
/// to ranked results for fusion.
pub fn to_ranked_results(results: &[(DocumentId, f32)], method: RetrievalMethod) -> Vec<RankedResult> {
    results
        .iter()
        .enumerate()
        .map(|(rank, (doc_id, score))| RankedResult {
            doc_id: doc_id.clone(),
            rank: rank + 1,
            original_score: *score,
            method,
        })
        .collect()
}

/// Compute Reciprocal Rank Fusion over multiple ranked lists.
///
/// RRF score = Σ 1/(k + rank_r(d)) for all rankers r.
///
/// Works on ranks rather than scores, requiring no calibration across
/// heterogeneous retrieval methods.
pub fn reciprocal_rank_fusion(
    ranked_lists: &[Vec<RankedResult>],
    config: &RrfConfig,
) -> Vec<FusedResult> {
    let mut fused: HashMap<DocumentId, FusedResult> = HashMap::new();

    for results in ranked_lists {
        for result in results {
            let contribution = 1.0 / (config.k as f32 + result.rank as f32);
            fused
                .entry(result.doc_id.clone())
                .or_insert_with(|| FusedResult::new(result.doc_id.clone()))
                .contribute(contribution, result.rank, result.method);
        }
    }

    sort_fused(fused.into_values().collect())
}

/// Weighted score fusion over multiple ranked lists.
///
/// Raw scores are min-max normalized to [0, 1] within each list (a
/// degenerate range normalizes to 1.0), multiplied by the list's weight,
/// and summed per document. `weights` must parallel `ranked_lists`.
pub fn weighted_score_fusion(
    ranked_lists: &[Vec<RankedResult>],
    weights: &[f32],
) -> Vec<FusedResult> {
    assert_eq!(ranked_lists.len(), weights.len());

    let mut fused: HashMap<DocumentId, FusedResult> = HashMap::new();

    for (results, &weight) in ranked_lists.iter().zip(weights.iter()) {
        if results.is_empty() {
            continue;
        }
        let max_score = results
            .iter()
            .map(|r| r.original_score)
            .fold(f32::MIN, f32::max);
        let min_score = results
            .iter()
            .map(|r| r.original_score)
            .fold(f32::MAX, f32::min);
        let range = max_score - min_score;

        for result in results {
            let normalized = if range > 0.0 {
                (result.original_score - min_score) / range
            } else {
                1.0
            };
            fused
                .entry(result.doc_id.clone())
                .or_insert_with(|| FusedResult::new(result.doc_id.clone()))
                .contribute(weight * normalized, result.rank, result.method);
        }
    }

    sort_fused(fused.into_values().collect())
}

/// Sort fused results by score descending, ties broken by ascending doc id
/// so output ordering is deterministic.
fn sort_fused(mut results: Vec<FusedResult>) -> Vec<FusedResult> {
    results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id)));
    results
}
