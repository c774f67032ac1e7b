//! # HC Core
//!
//! Extraction engine for billing audits of free-text clinical records (historias clínicas).
//!
//! This crate contains the pure document operations:
//! - Text normalisation and section location
//! - Pattern-based field extractors with bounded look-ahead windows
//! - Aggregation into one [`AggregatedDocument`] per source, with derived stays
//! - Billing summary, export renderers and the optional AI-assisted paths
//!
//! **No API concerns**: HTTP servers and command-line handling belong in the `hc-run` and
//! `hc-cli` binaries. External services (PDF conversion, generative models) are reached only
//! through the traits in [`collaborators`].

pub mod aggregate;
mod ai;
pub mod cache;
pub mod collaborators;
pub mod config;
pub mod constants;
pub mod dates;
pub mod error;
pub mod export;
pub mod extractors;
pub mod narrative;
pub mod normalize;
mod patterns;
pub mod pipeline;
pub mod records;
pub mod sections;
pub mod summary;
pub mod validation;

pub use aggregate::{compute_stays, DocumentExtractor};
pub use cache::{content_hash, DocumentCache};
pub use collaborators::{
    CollaboratorError, GenerationRequest, PlainTextSource, SourceText, TextGenerator, TextSource,
};
pub use config::{ExtractionConfig, ExtractionMode};
pub use error::{ExtractionError, ExtractionResult};
pub use export::{render, ExportFile, ExportFormat};
pub use narrative::{billing_narrative, Narrative};
pub use normalize::normalize;
pub use pipeline::{process_bytes, ProcessedDocument};
pub use records::*;
pub use sections::{Section, SectionLocator};
pub use summary::BillingSummary;
