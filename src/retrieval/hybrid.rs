//! Hybrid search engine
//!
//! Combines the in-memory BM25 index with externally computed dense
//! (vector-similarity) hits, fusing the two ranked lists with RRF or
//! weighted score fusion. Adaptive mode classifies the query first and
//! shifts the weights toward the method the query favors.

use super::bm25::Bm25Index;
use super::classifier::{classify, fusion_weights};
use super::fusion::{
    reciprocal_rank_fusion, to_ranked_results, weighted_score_fusion, FusedResult, RankedResult,
    RetrievalMethod, RrfConfig,
};
use super::store::{CorpusStore, StoredDocument};
use super::tokenize::tokenize;
use crate::config::{Config, FusionConfig, RetrievalConfig};
use crate::types::{ContentHash, DenseHit, Document, DocumentId, EngineStats, Query, SearchResult};
use crate::util::truncate_str;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Weight given to the fused score when reranking by term overlap
const RERANK_FUSED_WEIGHT: f32 = 0.7;
/// Weight given to query term overlap when reranking
const RERANK_OVERLAP_WEIGHT: f32 = 0.3;

/// How to combine BM25 and dense result lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionMode {
    /// Reciprocal Rank Fusion, rank-based and calibration-free
    Rrf,
    /// Min-max normalized weighted score fusion with configured weights
    Weighted,
    /// Weighted fusion with weights adjusted per query classification
    Adaptive,
}

impl fmt::Display for FusionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FusionMode::Rrf => write!(f, "rrf"),
            FusionMode::Weighted => write!(f, "weighted"),
            FusionMode::Adaptive => write!(f, "adaptive"),
        }
    }
}

/// Hybrid search over a persistent corpus.
///
/// The document corpus lives in sled; the BM25 index is rebuilt from it on
/// open. Dense hits are supplied by the caller per query, so the engine
/// never needs an embedding model of its own.
pub struct HybridSearchEngine {
    store: CorpusStore,
    bm25: Bm25Index,
    retrieval: RetrievalConfig,
    fusion: FusionConfig,
}

impl HybridSearchEngine {
    /// Open the corpus at `data_dir` and build the BM25 index from it.
    /// The directory is created if missing.
    pub fn open(data_dir: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;
        let store = CorpusStore::open(data_dir)?;
        let mut bm25 = Bm25Index::with_params(config.bm25.k1, config.bm25.b);
        for stored in store.iter() {
            bm25.add_document(stored.document.id.clone(), &stored.document.content);
        }
        info!("Opened corpus with {} documents", bm25.len());

        Ok(Self {
            store,
            bm25,
            retrieval: config.retrieval.clone(),
            fusion: config.fusion.clone(),
        })
    }

    /// Index a document into the corpus.
    ///
    /// Exact duplicates (same normalized content hash) are not re-indexed;
    /// the id of the already-stored document is returned instead. Indexing
    /// an existing id with new content is an upsert.
    pub fn index_document(&mut self, document: Document) -> Result<DocumentId> {
        if document.id.is_empty() {
            bail!("Document id must not be empty");
        }
        if document.content.trim().is_empty() {
            bail!("Document content must not be empty");
        }

        let content_hash = ContentHash::compute(&document.content);
        if let Some(existing_id) = self.store.doc_id_for_hash(&content_hash) {
            if existing_id != document.id {
                debug!(
                    "Skipping duplicate content: {} already stored as {}",
                    document.id, existing_id
                );
                return Ok(existing_id);
            }
        }

        let doc_id = document.id.clone();
        self.bm25.add_document(doc_id.clone(), &document.content);
        self.store.store(&StoredDocument {
            document,
            content_hash,
        })?;
        Ok(doc_id)
    }

    /// Remove a document from the corpus and the index. Returns `true` if
    /// it existed.
    pub fn remove_document(&mut self, doc_id: &str) -> Result<bool> {
        let in_store = self.store.remove(doc_id)?;
        let in_index = self.bm25.remove_document(doc_id);
        Ok(in_store || in_index)
    }

    /// Run a hybrid search.
    ///
    /// `dense_hits` are vector-similarity results computed outside the
    /// engine; pass an empty slice for BM25-only retrieval. Results are
    /// fused per `mode`, hydrated from the store, and optionally reranked
    /// by query term overlap.
    pub fn search(&self, query: &Query, dense_hits: &[DenseHit], mode: FusionMode) -> Vec<SearchResult> {
        let blank_query = query.text.trim().is_empty();
        if query.top_k == 0 || (blank_query && dense_hits.is_empty()) {
            return Vec::new();
        }

        let dense_list = self.rank_dense_hits(dense_hits);
        let bm25_list = if blank_query {
            Vec::new()
        } else {
            let raw = self.bm25.search(&query.text, self.retrieval.candidate_count);
            to_ranked_results(&raw, RetrievalMethod::Bm25)
        };
        let lists = vec![dense_list, bm25_list];

        let fused = match mode {
            FusionMode::Rrf => {
                let rrf = RrfConfig {
                    k: self.retrieval.rrf_k,
                };
                reciprocal_rank_fusion(&lists, &rrf)
            }
            FusionMode::Weighted => {
                let weights =
                    self.weights_for_lists(&lists, self.fusion.dense_weight, self.fusion.bm25_weight);
                weighted_score_fusion(&lists, &weights)
            }
            FusionMode::Adaptive => {
                let kind = classify(&query.text);
                let weights = fusion_weights(kind, &self.fusion);
                debug!(
                    "Classified query as {}: dense={:.2} bm25={:.2}",
                    kind, weights.dense, weights.bm25
                );
                let per_list = self.weights_for_lists(&lists, weights.dense, weights.bm25);
                weighted_score_fusion(&lists, &per_list)
            }
        };

        let mut results = self.hydrate(fused, query.top_k);
        if self.retrieval.enable_reranking && !blank_query {
            rerank_by_term_overlap(&mut results, &query.text);
        }

        info!(
            "Search '{}' ({} mode) returned {} results",
            truncate_str(&query.text, 50),
            mode,
            results.len()
        );
        results
    }

    /// Corpus statistics from the live BM25 index
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            document_count: self.bm25.len(),
            vocabulary_size: self.bm25.vocabulary_size(),
            avg_document_length: self.bm25.avg_document_length(),
            total_tokens: self.bm25.total_tokens(),
        }
    }

    /// Flush the corpus to disk
    pub fn save(&self) -> Result<()> {
        self.store.save()
    }

    /// Validate and rank caller-supplied dense hits.
    ///
    /// Non-finite scores are dropped, duplicate doc ids keep their first
    /// occurrence, and the survivors are sorted by score descending before
    /// being capped at the candidate count.
    fn rank_dense_hits(&self, dense_hits: &[DenseHit]) -> Vec<RankedResult> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut hits: Vec<&DenseHit> = Vec::new();
        for hit in dense_hits {
            if !hit.score.is_finite() {
                warn!("Dropping dense hit {} with non-finite score", hit.doc_id);
                continue;
            }
            if seen.insert(hit.doc_id.as_str()) {
                hits.push(hit);
            }
        }
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        hits.truncate(self.retrieval.candidate_count);

        let pairs: Vec<(DocumentId, f32)> = hits
            .into_iter()
            .map(|h| (h.doc_id.clone(), h.score))
            .collect();
        to_ranked_results(&pairs, RetrievalMethod::Dense)
    }

    /// Map each list to the weight of the method it carries
    fn weights_for_lists(&self, lists: &[Vec<RankedResult>], dense: f32, bm25: f32) -> Vec<f32> {
        lists
            .iter()
            .map(|list| match list.first().map(|r| r.method) {
                Some(RetrievalMethod::Dense) => dense,
                Some(RetrievalMethod::Bm25) => bm25,
                None => 0.0,
            })
            .collect()
    }

    /// Turn fused results into search results by loading documents from
    /// the store. Ids the store no longer knows (e.g. stale dense hits)
    /// are dropped.
    fn hydrate(&self, fused: Vec<FusedResult>, top_k: usize) -> Vec<SearchResult> {
        let mut results = Vec::with_capacity(top_k);
        for item in fused {
            if results.len() >= top_k {
                break;
            }
            let Some(stored) = self.store.get(&item.doc_id) else {
                debug!("Dropping fused result {}: not in corpus", item.doc_id);
                continue;
            };
            let mut result = SearchResult::new(stored.document, item.score);
            result.matched_by = item
                .contributing_methods
                .iter()
                .map(|m| m.to_string())
                .collect();
            results.push(result);
        }
        results
    }
}

/// Rerank hydrated results by blending the fused score with query term
/// overlap against the document content.
///
/// Fused scores are min-max normalized first so the blend behaves the same
/// for RRF scores (small magnitudes) and weighted scores.
fn rerank_by_term_overlap(results: &mut [SearchResult], query: &str) {
    if results.len() < 2 {
        return;
    }
    let query_terms: HashSet<String> = tokenize(query).into_iter().collect();
    if query_terms.is_empty() {
        return;
    }

    let max = results
        .iter()
        .map(|r| r.relevance_score)
        .fold(f32::MIN, f32::max);
    let min = results
        .iter()
        .map(|r| r.relevance_score)
        .fold(f32::MAX, f32::min);
    let range = max - min;

    for result in results.iter_mut() {
        let normalized = if range > 0.0 {
            (result.relevance_score - min) / range
        } else {
            1.0
        };
        let doc_terms: HashSet<String> = tokenize(&result.document.content).into_iter().collect();
        let overlap =
            query_terms.intersection(&doc_terms).count() as f32 / query_terms.len() as f32;
        result.relevance_score =
            RERANK_FUSED_WEIGHT * normalized + RERANK_OVERLAP_WEIGHT * overlap;
    }

    results.sort_by(|a, b| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then_with(|| a.document.id.cmp(&b.document.id))
    });
}
