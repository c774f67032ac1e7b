//! Constants used throughout the extraction core.
//!
//! Defaults for the runtime configuration and shared placeholder values live here so the
//! binaries and the core agree on them.

/// Number of lines after an anchor scanned for satellite attributes.
pub const DEFAULT_SATELLITE_WINDOW: usize = 5;

/// Timeout applied to external text-generation calls, in seconds.
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 120;

/// Maximum characters of document text sent to a text generator.
pub const DEFAULT_MAX_AI_CHARS: usize = 500_000;

/// Maximum pages accepted from a text source before the rest are dropped.
pub const DEFAULT_MAX_PAGES: usize = 500;

/// Maximum size of an uploaded source document, in bytes (200 MiB).
pub const MAX_SOURCE_BYTES: usize = 200 * 1024 * 1024;

/// Number of processed documents retained by the content-hash cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Quantity assumed when an anchor line carries no explicit count.
pub const DEFAULT_QUANTITY: &str = "1";

/// Placeholder used in summaries for missing patient fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Page separator emitted by plain-text PDF exports.
pub const PAGE_SEPARATOR: char = '\u{c}';
