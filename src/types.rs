//! Core types for the rankfuse engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for a document
pub type DocumentId = String;

/// Exact content hash using SHA256 (64-character hex string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA256 hash of normalized content.
    ///
    /// Content is lowercased and whitespace-collapsed before hashing so that
    /// trivially reformatted duplicates share a hash.
    pub fn compute(content: &str) -> Self {
        let normalized = Self::normalize(content);
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        let result = hasher.finalize();
        ContentHash(hex::encode(result))
    }

    fn normalize(content: &str) -> String {
        let lower = content.to_lowercase();
        let mut result = String::with_capacity(lower.len());
        for (i, word) in lower.split_whitespace().enumerate() {
            if i > 0 {
                result.push(' ');
            }
            result.push_str(word);
        }
        result
    }

    /// Get the underlying string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn generate_document_id() -> DocumentId {
    uuid::Uuid::new_v4().to_string()
}

/// Document to be indexed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(default = "generate_document_id")]
    pub id: DocumentId,
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: generate_document_id(),
            content: content.into(),
            title: None,
            url: None,
            metadata: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A dense (vector-similarity) hit computed externally, e.g. by a vector
/// database. Scores are similarity values where higher is better; the fusion
/// algorithms only require consistent ordering within one result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseHit {
    pub doc_id: DocumentId,
    pub score: f32,
}

impl DenseHit {
    pub fn new(doc_id: impl Into<String>, score: f32) -> Self {
        Self {
            doc_id: doc_id.into(),
            score,
        }
    }
}

/// Query request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub top_k: usize,
}

impl Query {
    pub fn new(text: impl Into<String>, top_k: usize) -> Self {
        Self {
            text: text.into(),
            top_k,
        }
    }
}

/// A search result from hybrid retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub document: Document,
    pub relevance_score: f32,
    /// Which retrieval methods matched (dense, bm25)
    pub matched_by: Vec<String>,
    /// Best-matching sentence snippet for citations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl SearchResult {
    pub fn new(document: Document, relevance_score: f32) -> Self {
        Self {
            document,
            relevance_score,
            matched_by: Vec::new(),
            snippet: None,
        }
    }
}

/// Corpus-level statistics reported by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub document_count: usize,
    pub vocabulary_size: usize,
    pub avg_document_length: f32,
    pub total_tokens: u64,
}
