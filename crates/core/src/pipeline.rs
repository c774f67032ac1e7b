//! Upload-to-document pipeline used by the binaries.
//!
//! Size validation, content hashing, cache lookup, text acquisition and extraction, in that
//! order. When text acquisition fails the extractors are never invoked.

use crate::aggregate::DocumentExtractor;
use crate::cache::{content_hash, DocumentCache};
use crate::collaborators::TextSource;
use crate::records::AggregatedDocument;
use crate::validation::validate_source_size;
use crate::{ExtractionError, ExtractionResult};
use std::sync::Arc;

/// An extracted document together with facts about its source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub content_hash: String,
    pub page_count: usize,
    pub document: AggregatedDocument,
}

/// Turns uploaded bytes into a [`ProcessedDocument`], reusing a cached result for identical
/// content when a cache is given.
///
/// # Errors
///
/// - `ExtractionError::InvalidInput` if the upload is too large
/// - `ExtractionError::Source` if the text source fails
pub fn process_bytes(
    source: &dyn TextSource,
    bytes: &[u8],
    extractor: &DocumentExtractor,
    cache: Option<&DocumentCache>,
) -> ExtractionResult<Arc<ProcessedDocument>> {
    validate_source_size(bytes)?;
    let hash = content_hash(bytes);

    if let Some(hit) = cache.and_then(|c| c.get(&hash)) {
        tracing::debug!("cache hit for document {}", hash);
        return Ok(hit);
    }

    let source_text = source.extract_text(bytes).map_err(|err| {
        tracing::warn!("text source failed for document {}: {}", hash, err);
        ExtractionError::Source(err)
    })?;

    let processed = Arc::new(ProcessedDocument {
        content_hash: hash,
        page_count: source_text.page_count,
        document: extractor.extract(&source_text.text),
    });
    if let Some(cache) = cache {
        cache.insert(Arc::clone(&processed));
    }
    tracing::info!(
        "processed document {} ({} pages)",
        processed.content_hash,
        processed.page_count
    );
    Ok(processed)
}
