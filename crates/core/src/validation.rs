//! Input validation utilities.
//!
//! Guards applied to uploaded source documents before any collaborator is invoked.

use crate::constants::MAX_SOURCE_BYTES;
use crate::{ExtractionError, ExtractionResult};

/// Validates that an uploaded source document is within the accepted size.
///
/// Empty sources are accepted: the extraction engine is total and simply yields an empty
/// document for them.
///
/// # Errors
///
/// Returns `ExtractionError::InvalidInput` if the source exceeds [`MAX_SOURCE_BYTES`].
pub fn validate_source_size(bytes: &[u8]) -> ExtractionResult<()> {
    validate_source_size_with_limit(bytes, MAX_SOURCE_BYTES)
}

pub(crate) fn validate_source_size_with_limit(bytes: &[u8], limit: usize) -> ExtractionResult<()> {
    if bytes.len() > limit {
        return Err(ExtractionError::InvalidInput(format!(
            "source document is {} bytes, exceeding the maximum of {} bytes",
            bytes.len(),
            limit
        )));
    }
    Ok(())
}

/// Validates the capacity requested for the document cache.
pub fn validate_cache_capacity(capacity: usize) -> ExtractionResult<()> {
    if capacity == 0 {
        return Err(ExtractionError::InvalidInput(
            "cache capacity must be at least 1".into(),
        ));
    }
    Ok(())
}
