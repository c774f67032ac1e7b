//! Auditor-facing billing narrative produced by a text generator.

use crate::collaborators::{invoke_with_timeout, CollaboratorError, GenerationRequest, TextGenerator};
use crate::config::ExtractionConfig;
use crate::records::AggregatedDocument;
use crate::summary::BillingSummary;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const NARRATIVE_INSTRUCTIONS: &str = "Actúa como auditor de cuentas médicas. A partir de los datos estructurados de la historia clínica genera un informe de facturación organizado por secciones: datos del afiliado, tipo de atención, diagnósticos (CIE-10), estancias con días, procedimientos realizados, medicamentos aplicados, laboratorios e imágenes realizados, interconsultas y evoluciones. Marca como \"Pendiente\" la información crítica que falte y termina con una tabla resumen.\n\n";

/// Outcome of a narrative request. Generator failures are values, not errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Narrative {
    Available(String),
    Unavailable {
        cause: String,
        retry_after: Option<Duration>,
    },
}

impl Narrative {
    fn unavailable(cause: &CollaboratorError) -> Self {
        Narrative::Unavailable {
            cause: cause.to_string(),
            retry_after: cause.retry_after(),
        }
    }

    /// Suggested wait before asking again, for quota failures.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Narrative::Unavailable { retry_after, .. } => *retry_after,
            Narrative::Available(_) => None,
        }
    }
}

#[derive(Serialize)]
struct NarrativeInput<'a> {
    resumen: BillingSummary,
    datos: &'a AggregatedDocument,
}

/// Asks `generator` for a billing narrative of `document`.
pub fn billing_narrative(
    document: &AggregatedDocument,
    generator: Arc<dyn TextGenerator>,
    config: &ExtractionConfig,
) -> Narrative {
    let input = NarrativeInput {
        resumen: BillingSummary::from_document(document),
        datos: document,
    };
    let data = match serde_json::to_string_pretty(&input) {
        Ok(data) => data,
        Err(err) => {
            return Narrative::unavailable(&CollaboratorError::InvalidResponse(format!(
                "failed to serialise document: {err}"
            )))
        }
    };

    let request = GenerationRequest {
        prompt: format!("{NARRATIVE_INSTRUCTIONS}{data}"),
        timeout: config.ai_timeout(),
    };
    match invoke_with_timeout(generator, request) {
        Ok(text) if !text.trim().is_empty() => Narrative::Available(text),
        Ok(_) => Narrative::unavailable(&CollaboratorError::InvalidResponse(
            "empty narrative".into(),
        )),
        Err(err) => {
            tracing::warn!("billing narrative unavailable: {err}");
            Narrative::unavailable(&err)
        }
    }
}
