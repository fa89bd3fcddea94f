//! Retrieval pipeline: BM25 lexical search, result fusion, query
//! classification, and the hybrid engine that ties them together.

mod bm25;
mod classifier;
mod fusion;
mod hybrid;
mod snippet;
mod store;
mod tokenize;

pub use bm25::{Bm25Index, DEFAULT_B, DEFAULT_K1};
pub use classifier::{classify, fusion_weights, FusionWeights, QueryKind};
pub use fusion::{
    reciprocal_rank_fusion, to_ranked_results, weighted_score_fusion, FusedResult, RankedResult,
    RetrievalMethod, RrfConfig,
};
pub use hybrid::{FusionMode, HybridSearchEngine};
pub use snippet::extract_snippet;
pub use store::{CorpusStore, StoredDocument};
pub use tokenize::tokenize;
