use crate::collaborators::CollaboratorError;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("source text unavailable: {0}")]
    Source(CollaboratorError),
    #[error("text generation failed: {0}")]
    Generation(CollaboratorError),
    #[error("invalid AI response: {0}")]
    AiResponse(String),
    #[error("failed to serialize document: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to finalise CSV buffer: {0}")]
    CsvBuffer(String),
}

pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;
