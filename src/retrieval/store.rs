//! Corpus storage and persistence
//!
//! Uses sled embedded database so documents are stored and retrieved
//! on-demand without loading everything into memory. A secondary tree maps
//! content hashes to document ids for ingest deduplication.

use crate::types::{ContentHash, Document, DocumentId};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// A document as persisted, with its content hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub document: Document,
    pub content_hash: ContentHash,
}

/// Persistent document storage using sled
pub struct CorpusStore {
    db: sled::Db,
    /// Secondary index: content_hash -> document_id
    hash_index: sled::Tree,
}

impl CorpusStore {
    /// Open or create the corpus database under `data_dir`
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let db_path = data_dir.as_ref().join("corpus.sled");
        let db = sled::open(&db_path)
            .with_context(|| format!("Failed to open corpus database at {:?}", db_path))?;
        let hash_index = db
            .open_tree("hash_index")
            .context("Failed to open content hash index tree")?;
        Ok(Self { db, hash_index })
    }

    /// Store a document, replacing any previous version with the same id.
    /// The hash entry of the replaced content is dropped so it cannot
    /// deduplicate future documents against content this id no longer has.
    pub fn store(&self, stored: &StoredDocument) -> Result<()> {
        let doc_id = &stored.document.id;
        if let Some(previous) = self.get(doc_id) {
            if previous.content_hash != stored.content_hash {
                self.hash_index
                    .remove(previous.content_hash.as_str().as_bytes())
                    .with_context(|| {
                        format!("Failed to remove replaced content hash for {}", doc_id)
                    })?;
            }
        }
        let data = bincode::serialize(stored)
            .with_context(|| format!("Failed to serialize document {}", doc_id))?;
        self.db
            .insert(doc_id.as_bytes(), data)
            .with_context(|| format!("Failed to store document {}", doc_id))?;
        self.hash_index
            .insert(stored.content_hash.as_str().as_bytes(), doc_id.as_bytes())
            .with_context(|| format!("Failed to index content hash for {}", doc_id))?;
        Ok(())
    }

    /// Fetch a document by id
    pub fn get(&self, doc_id: &str) -> Option<StoredDocument> {
        let data = self.db.get(doc_id.as_bytes()).ok().flatten()?;
        match bincode::deserialize(&data) {
            Ok(stored) => Some(stored),
            Err(e) => {
                warn!("Failed to deserialize document {}: {}", doc_id, e);
                None
            }
        }
    }

    /// Look up the id of a document with the given content hash
    pub fn doc_id_for_hash(&self, hash: &ContentHash) -> Option<DocumentId> {
        let data = self.hash_index.get(hash.as_str().as_bytes()).ok().flatten()?;
        String::from_utf8(data.to_vec()).ok()
    }

    /// Remove a document. Returns `true` if it existed.
    pub fn remove(&self, doc_id: &str) -> Result<bool> {
        let Some(stored) = self.get(doc_id) else {
            return Ok(false);
        };
        self.hash_index
            .remove(stored.content_hash.as_str().as_bytes())
            .with_context(|| format!("Failed to remove content hash for {}", doc_id))?;
        self.db
            .remove(doc_id.as_bytes())
            .with_context(|| format!("Failed to remove document {}", doc_id))?;
        Ok(true)
    }

    /// Iterate over all stored documents
    pub fn iter(&self) -> impl Iterator<Item = StoredDocument> + '_ {
        self.db.iter().filter_map(|entry| {
            let (_, value) = entry.ok()?;
            bincode::deserialize(&value).ok()
        })
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Returns `true` if the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Flush buffered writes to disk
    pub fn save(&self) -> Result<()> {
        self.db.flush().context("Failed to flush corpus database")?;
        Ok(())
    }
}
