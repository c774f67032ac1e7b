//! Bounded per-process cache of processed documents, keyed by source content hash.

use crate::pipeline::ProcessedDocument;
use crate::validation::validate_cache_capacity;
use crate::ExtractionResult;
use moka::sync::Cache;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Lowercase hex SHA-256 of the source bytes.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Size-bounded cache shared by request handlers.
#[derive(Clone, Debug)]
pub struct DocumentCache {
    inner: Cache<String, Arc<ProcessedDocument>>,
}

impl DocumentCache {
    /// # Errors
    ///
    /// Returns `ExtractionError::InvalidInput` if `capacity` is zero.
    pub fn new(capacity: usize) -> ExtractionResult<Self> {
        validate_cache_capacity(capacity)?;
        Ok(Self {
            inner: Cache::builder().max_capacity(capacity as u64).build(),
        })
    }

    pub fn get(&self, hash: &str) -> Option<Arc<ProcessedDocument>> {
        self.inner.get(hash)
    }

    pub fn insert(&self, document: Arc<ProcessedDocument>) {
        self.inner.insert(document.content_hash.clone(), document);
    }
}
