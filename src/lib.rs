//! Rankfuse: Hybrid Search Fusion Engine
//!
//! Combines sparse BM25 keyword retrieval with externally computed dense
//! vector-similarity results, featuring:
//! - Hand-rolled Okapi BM25 inverted index with tombstone deletion
//! - Reciprocal Rank Fusion (RRF) and min-max weighted score fusion
//! - Heuristic adaptive query classification (technical / conceptual /
//!   balanced) that re-weights the fusion per query
//! - Persistent document corpus with content-hash deduplication

pub mod config;
pub mod retrieval;
pub mod types;
pub mod util;

pub use config::Config;
pub use types::*;
