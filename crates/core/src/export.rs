//! Export renderers for an extracted document.

use crate::records::AggregatedDocument;
use crate::{ExtractionError, ExtractionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Base name used for single-file exports.
const DOCUMENT_STEM: &str = "historia_clinica";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Yaml,
    /// One file per non-empty section.
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Yaml => "application/yaml",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ExtractionError::InvalidInput(format!(
                "unsupported export format: {other}"
            ))),
        }
    }
}

/// One rendered file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Renders `document` in `format`.
///
/// JSON and YAML produce a single file. CSV produces one file per non-empty section, named
/// after the section key; nested values (surgery participants) are written as JSON text.
pub fn render(document: &AggregatedDocument, format: ExportFormat) -> ExtractionResult<Vec<ExportFile>> {
    let files = match format {
        ExportFormat::Json => vec![ExportFile {
            file_name: format!("{DOCUMENT_STEM}.json"),
            bytes: serde_json::to_vec_pretty(document).map_err(ExtractionError::Serialization)?,
        }],
        ExportFormat::Yaml => vec![ExportFile {
            file_name: format!("{DOCUMENT_STEM}.yaml"),
            bytes: serde_yaml::to_string(document)
                .map_err(ExtractionError::YamlSerialization)?
                .into_bytes(),
        }],
        ExportFormat::Csv => render_csv(document)?,
    };
    tracing::debug!("rendered {} {} file(s)", files.len(), format.extension());
    Ok(files)
}

fn render_csv(document: &AggregatedDocument) -> ExtractionResult<Vec<ExportFile>> {
    let value = serde_json::to_value(document).map_err(ExtractionError::Serialization)?;
    let Value::Object(sections) = value else {
        return Err(ExtractionError::CsvBuffer("document is not an object".into()));
    };

    let mut files = Vec::new();
    for (name, section) in sections {
        let rows: Vec<serde_json::Map<String, Value>> = match section {
            Value::Object(row) if !row.is_empty() => vec![row],
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(row) => Some(row),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        if rows.is_empty() {
            continue;
        }
        files.push(ExportFile {
            file_name: format!("{name}.csv"),
            bytes: csv_table(&rows)?,
        });
    }
    Ok(files)
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn csv_table(rows: &[serde_json::Map<String, Value>]) -> ExtractionResult<Vec<u8>> {
    let headers: Vec<&String> = rows.first().map(|row| row.keys().collect()).unwrap_or_default();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers.iter().map(|h| h.as_str()))?;
    for row in rows {
        writer.write_record(
            headers
                .iter()
                .map(|h| row.get(h.as_str()).map(cell).unwrap_or_default()),
        )?;
    }
    writer
        .into_inner()
        .map_err(|e| ExtractionError::CsvBuffer(e.to_string()))
}
