//! BM25 lexical search
//!
//! An in-memory Okapi BM25 inverted index. Scores combine term frequency
//! saturation (k1), document length normalization (b), and smoothed inverse
//! document frequency. Deletion uses tombstones: removed documents keep
//! their slot but are skipped during scoring and excluded from corpus
//! statistics.

use super::tokenize::tokenize;
use crate::types::DocumentId;
use std::collections::HashMap;
use tracing::debug;

/// Default term-frequency saturation parameter
pub const DEFAULT_K1: f32 = 1.5;
/// Default length-normalization parameter
pub const DEFAULT_B: f32 = 0.75;

/// A single posting: which document slot a term occurs in, and how often
#[derive(Debug, Clone, Copy)]
struct Posting {
    slot: u32,
    tf: u32,
}

/// Per-document bookkeeping
#[derive(Debug, Clone)]
struct DocSlot {
    id: DocumentId,
    len: u32,
    removed: bool,
}

/// In-memory BM25 inverted index
pub struct Bm25Index {
    k1: f32,
    b: f32,
    /// term -> postings, slots in insertion order
    postings: HashMap<String, Vec<Posting>>,
    docs: Vec<DocSlot>,
    slots: HashMap<DocumentId, u32>,
    active_docs: usize,
    active_tokens: u64,
}

impl Bm25Index {
    /// Create an index with default Okapi parameters (k1 = 1.5, b = 0.75)
    pub fn new() -> Self {
        Self::with_params(DEFAULT_K1, DEFAULT_B)
    }

    /// Create an index with explicit k1 and b parameters
    pub fn with_params(k1: f32, b: f32) -> Self {
        Self {
            k1,
            b,
            postings: HashMap::new(),
            docs: Vec::new(),
            slots: HashMap::new(),
            active_docs: 0,
            active_tokens: 0,
        }
    }

    /// Add a document to the index. Re-adding an existing id is an upsert:
    /// the previous version is tombstoned and the new text indexed fresh.
    pub fn add_document(&mut self, doc_id: DocumentId, text: &str) {
        if self.slots.contains_key(&doc_id) {
            self.remove_document(&doc_id);
        }

        let tokens = tokenize(text);
        let slot = self.docs.len() as u32;

        let mut term_freqs: HashMap<String, u32> = HashMap::new();
        for token in &tokens {
            *term_freqs.entry(token.clone()).or_default() += 1;
        }
        for (term, tf) in term_freqs {
            self.postings.entry(term).or_default().push(Posting { slot, tf });
        }

        let len = tokens.len() as u32;
        self.docs.push(DocSlot {
            id: doc_id.clone(),
            len,
            removed: false,
        });
        self.slots.insert(doc_id, slot);
        self.active_docs += 1;
        self.active_tokens += len as u64;
    }

    /// Tombstone a document. Returns `true` if the id was indexed.
    pub fn remove_document(&mut self, doc_id: &str) -> bool {
        let Some(slot) = self.slots.remove(doc_id) else {
            return false;
        };
        let doc = &mut self.docs[slot as usize];
        doc.removed = true;
        self.active_docs -= 1;
        self.active_tokens -= doc.len as u64;
        true
    }

    /// Search for documents matching the query.
    ///
    /// Returns up to `k` `(doc_id, score)` pairs sorted by BM25 score
    /// descending, ties broken by ascending doc id. Empty queries, an empty
    /// index, or `k == 0` return no results.
    pub fn search(&self, query: &str, k: usize) -> Vec<(DocumentId, f32)> {
        if k == 0 || self.active_docs == 0 {
            return Vec::new();
        }
        let terms = tokenize(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let n = self.active_docs as f32;
        let avgdl = self.avg_document_length().max(1.0);
        let mut scores: HashMap<u32, f32> = HashMap::new();

        for term in &terms {
            let Some(postings) = self.postings.get(term) else {
                continue;
            };
            let df = postings
                .iter()
                .filter(|p| !self.docs[p.slot as usize].removed)
                .count();
            if df == 0 {
                continue;
            }
            let idf = (1.0 + (n - df as f32 + 0.5) / (df as f32 + 0.5)).ln();

            for posting in postings {
                let doc = &self.docs[posting.slot as usize];
                if doc.removed {
                    continue;
                }
                let tf = posting.tf as f32;
                let norm = self.k1 * (1.0 - self.b + self.b * doc.len as f32 / avgdl);
                *scores.entry(posting.slot).or_default() +=
                    idf * (tf * (self.k1 + 1.0)) / (tf + norm);
            }
        }

        let mut ranked: Vec<(DocumentId, f32)> = scores
            .into_iter()
            .map(|(slot, score)| (self.docs[slot as usize].id.clone(), score))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(k);

        debug!("BM25 search matched {} documents", ranked.len());
        ranked
    }

    /// Number of live (non-tombstoned) documents
    pub fn len(&self) -> usize {
        self.active_docs
    }

    /// Returns `true` if no live documents are indexed
    pub fn is_empty(&self) -> bool {
        self.active_docs == 0
    }

    /// Number of distinct terms seen by the index.
    ///
    /// Terms occurring only in tombstoned documents still count; the
    /// vocabulary never shrinks without a rebuild.
    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }

    /// Average length (in tokens) of live documents
    pub fn avg_document_length(&self) -> f32 {
        if self.active_docs == 0 {
            0.0
        } else {
            self.active_tokens as f32 / self.active_docs as f32
        }
    }

    /// Total tokens across live documents
    pub fn total_tokens(&self) -> u64 {
        self.active_tokens
    }
}

impl Default for Bm25Index {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_of<'a>(results: &'a [(DocumentId, f32)], id: &str) -> Option<f32> {
        results.iter().find(|(d, _)| d == id).map(|(_, s)| *s)
    }

    #[test]
    fn test_basic_search() {
        let mut index = Bm25Index::new();
        index.add_document("d1".into(), "the quick brown fox jumps over the lazy dog");
        index.add_document("d2".into(), "the lazy cat sleeps all day");
        index.add_document("d3".into(), "quick brown rabbits hop in the garden");

        let results = index.search("quick brown", 10);
        assert!(!results.is_empty());
        // d1 and d3 contain both terms; d2 contains neither
        assert!(score_of(&results, "d1").is_some());
        assert!(score_of(&results, "d3").is_some());
        assert!(score_of(&results, "d2").is_none());
    }

    #[test]
    fn test_term_frequency_increases_score() {
        let mut index = Bm25Index::new();
        index.add_document("once".into(), "rust programming");
        index.add_document("thrice".into(), "rust rust rust is a programming language");
        index.add_document("never".into(), "python programming");

        let results = index.search("rust", 10);
        let once = score_of(&results, "once").unwrap();
        let thrice = score_of(&results, "thrice").unwrap();
        assert!(
            thrice > once,
            "repeated term should outweigh length penalty here: {} vs {}",
            thrice,
            once
        );
        assert!(score_of(&results, "never").is_none());
    }

    #[test]
    fn test_rare_terms_outweigh_common_terms() {
        let mut index = Bm25Index::new();
        index.add_document("d1".into(), "alpha beta");
        index.add_document("d2".into(), "alpha gamma");
        index.add_document("d3".into(), "alpha delta");

        // "delta" is rare, "alpha" is everywhere; d3 matches both
        let results = index.search("alpha delta", 10);
        assert_eq!(results[0].0, "d3");
    }

    #[test]
    fn test_empty_query_returns_empty() {
        let mut index = Bm25Index::new();
        index.add_document("d1".into(), "some content");
        assert!(index.search("", 10).is_empty());
        assert!(index.search("   \t\n", 10).is_empty());
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let index = Bm25Index::new();
        assert!(index.search("anything", 10).is_empty());
    }

    #[test]
    fn test_k_zero_returns_empty() {
        let mut index = Bm25Index::new();
        index.add_document("d1".into(), "some content");
        assert!(index.search("content", 0).is_empty());
    }

    #[test]
    fn test_unknown_terms_contribute_nothing() {
        let mut index = Bm25Index::new();
        index.add_document("d1".into(), "alpha bravo charlie");
        let results = index.search("zebra quagga", 10);
        assert!(results.is_empty());
    }

    #[test]
    fn test_top_k_limits_results() {
        let mut index = Bm25Index::new();
        for i in 0..10 {
            index.add_document(format!("d{}", i), &format!("shared term plus word{}", i));
        }
        let results = index.search("shared", 3);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_scores_non_negative_and_finite() {
        let mut index = Bm25Index::new();
        index.add_document("d1".into(), "alpha alpha alpha");
        index.add_document("d2".into(), "alpha beta");
        for (_, score) in index.search("alpha beta", 10) {
            assert!(score.is_finite());
            assert!(score >= 0.0);
        }
    }

    #[test]
    fn test_remove_document_tombstones() {
        let mut index = Bm25Index::new();
        index.add_document("d1".into(), "unique alpha bravo content");
        index.add_document("d2".into(), "different charlie delta content");
        assert_eq!(index.len(), 2);

        assert!(index.remove_document("d1"));
        assert_eq!(index.len(), 1);
        assert!(index.search("alpha bravo", 10).is_empty());

        // d2 still findable
        let results = index.search("charlie delta", 10);
        assert_eq!(results[0].0, "d2");
    }

    #[test]
    fn test_remove_nonexistent_is_noop() {
        let mut index = Bm25Index::new();
        index.add_document("d1".into(), "content");
        assert!(!index.remove_document("ghost"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_upsert_replaces_previous_text() {
        let mut index = Bm25Index::new();
        index.add_document("d1".into(), "original ancient text");
        index.add_document("d1".into(), "replacement modern text");

        assert_eq!(index.len(), 1);
        assert!(index.search("ancient", 10).is_empty());
        let results = index.search("replacement", 10);
        assert_eq!(results[0].0, "d1");
    }

    #[test]
    fn test_corpus_stats() {
        let mut index = Bm25Index::new();
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
        assert_eq!(index.avg_document_length(), 0.0);

        index.add_document("d1".into(), "one two three four");
        index.add_document("d2".into(), "five six");
        assert_eq!(index.len(), 2);
        assert_eq!(index.total_tokens(), 6);
        assert!((index.avg_document_length() - 3.0).abs() < f32::EPSILON);
        assert_eq!(index.vocabulary_size(), 6);

        index.remove_document("d1");
        assert_eq!(index.total_tokens(), 2);
        assert!((index.avg_document_length() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_case_insensitive_matching() {
        let mut index = Bm25Index::new();
        index.add_document("d1".into(), "Rust Programming Language");
        assert!(!index.search("rust", 1).is_empty());
        assert!(!index.search("RUST", 1).is_empty());
        assert!(!index.search("RuSt", 1).is_empty());
    }

    #[test]
    fn test_length_normalization_prefers_shorter_doc() {
        let mut index = Bm25Index::with_params(DEFAULT_K1, DEFAULT_B);
        // Same single occurrence of the query term, very different lengths
        index.add_document("short".into(), "target word");
        index.add_document(
            "long".into(),
            "target surrounded by a great many other words that dilute the match \
             considerably across this much longer document body",
        );

        let results = index.search("target", 10);
        assert_eq!(results[0].0, "short");
    }
}
