//! Wire models for the REST API.
//!
//! Extracted documents travel as JSON objects whose shape is owned by `hc-core`; the schemas
//! here describe the envelopes around them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Result of `POST /extract`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractRes {
    /// Lowercase hex SHA-256 of the uploaded bytes.
    pub content_hash: String,
    pub page_count: usize,
    /// The aggregated document (`paciente`, `servicios`, `diagnosticos`, ...).
    #[schema(value_type = Object)]
    pub document: serde_json::Value,
}

/// Result of `POST /summary`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SummaryRes {
    pub content_hash: String,
    #[schema(value_type = Object)]
    pub summary: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: String,
    pub content: String,
}

/// Result of `POST /export/{format}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExportRes {
    pub content_hash: String,
    pub format: String,
    pub files: Vec<ExportedFile>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
