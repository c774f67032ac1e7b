//! Document-level aggregation of every extractor.

use crate::ai;
use crate::collaborators::TextGenerator;
use crate::config::{ExtractionConfig, ExtractionMode};
use crate::dates::stay_days;
use crate::extractors;
use crate::normalize::normalize;
use crate::records::{AggregatedDocument, ServiceEncounter, Stay};
use hc_types::NonEmptyText;
use std::sync::Arc;

/// Runs the extraction engine over one document.
///
/// The mode and window come from the [`ExtractionConfig`] the extractor was built with. In
/// AI-assisted mode a configured [`TextGenerator`] is asked first; any failure falls back to the
/// pattern-based extractors, so [`DocumentExtractor::extract`] never fails.
#[derive(Clone)]
pub struct DocumentExtractor {
    config: ExtractionConfig,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl std::fmt::Debug for DocumentExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentExtractor")
            .field("config", &self.config)
            .field("generator", &self.generator.is_some())
            .finish()
    }
}

impl DocumentExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            generator: None,
        }
    }

    /// Attaches the generator used in AI-assisted mode.
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts an [`AggregatedDocument`] from raw document text.
    pub fn extract(&self, raw: &str) -> AggregatedDocument {
        let text = normalize(Some(raw));

        let mut document = match (self.config.mode(), &self.generator) {
            (ExtractionMode::AiAssisted, Some(generator)) => {
                match ai::extract_with_generator(&text, Arc::clone(generator), &self.config) {
                    Ok(document) => document,
                    Err(err) => {
                        tracing::warn!("AI-assisted extraction failed, using patterns: {err}");
                        self.extract_patterns(&text)
                    }
                }
            }
            (ExtractionMode::AiAssisted, None) => {
                tracing::warn!("AI-assisted mode without a text generator, using patterns");
                self.extract_patterns(&text)
            }
            (ExtractionMode::PatternBased, _) => self.extract_patterns(&text),
        };

        document.estancias = compute_stays(&document.servicios);
        tracing::info!(
            "extracted document: {} services, {} diagnoses, {} medications, {} procedures",
            document.servicios.len(),
            document.diagnosticos.len(),
            document.medicamentos.len(),
            document.procedimientos.len()
        );
        document
    }

    /// Runs the pattern-based extractors over already normalised text.
    fn extract_patterns(&self, text: &str) -> AggregatedDocument {
        let window = self.config.satellite_window();
        AggregatedDocument {
            paciente: extractors::extract_patient(text),
            servicios: extractors::extract_services(text),
            diagnosticos: extractors::extract_diagnoses(text),
            medicamentos: extractors::extract_medications(text, window),
            procedimientos: extractors::extract_procedures(text, window),
            cirugias: extractors::extract_surgeries(text),
            laboratorios: extractors::extract_lab_orders(text, window),
            imagenes: extractors::extract_imaging_orders(text, window),
            interconsultas: extractors::extract_interconsultations(text),
            evoluciones: extractors::extract_progress_notes(text),
            altas: extractors::extract_discharge_notes(text),
            estancias: Vec::new(),
        }
    }
}

/// One stay per service encounter; the day count is absent when either date is missing or
/// does not parse.
pub fn compute_stays(services: &[ServiceEncounter]) -> Vec<Stay> {
    services
        .iter()
        .map(|service| Stay {
            servicio: service.tipo_atencion.clone(),
            fecha_ingreso: service.fecha_ingreso.clone(),
            hora_ingreso: service.hora_ingreso.clone(),
            fecha_egreso: service.fecha_egreso.clone(),
            hora_egreso: service.hora_egreso.clone(),
            dias_estancia: stay_days(
                service.fecha_ingreso.as_ref().map(NonEmptyText::as_str),
                service.fecha_egreso.as_ref().map(NonEmptyText::as_str),
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::tests::ScriptedGenerator;
    use crate::collaborators::CollaboratorError;
    use std::time::Duration;

    const DOC: &str = "CC 123456\nDX: A09 GASTROENTERITIS";

    fn ai_config() -> ExtractionConfig {
        ExtractionConfig::new(ExtractionMode::AiAssisted, 5, Duration::from_secs(5)).unwrap()
    }

    fn encounter(admission: Option<&str>, discharge: Option<&str>) -> ServiceEncounter {
        ServiceEncounter {
            sede_codigo: None,
            sede_nombre: None,
            tipo_atencion: NonEmptyText::optional("HOSPITALIZACION"),
            fecha_ingreso: admission.and_then(NonEmptyText::optional),
            hora_ingreso: None,
            fecha_egreso: discharge.and_then(NonEmptyText::optional),
            hora_egreso: None,
        }
    }

    #[test]
    fn stays_are_emitted_even_without_a_count() {
        let stays = compute_stays(&[
            encounter(Some("10/01/2024"), Some("15/01/2024")),
            encounter(Some("10/01/2024"), None),
        ]);
        assert_eq!(stays.len(), 2);
        assert_eq!(stays[0].dias_estancia, Some(5));
        assert_eq!(stays[0].servicio, NonEmptyText::optional("HOSPITALIZACION"));
        assert_eq!(stays[1].dias_estancia, None);
    }

    #[test]
    fn empty_text_yields_empty_document() {
        let doc = DocumentExtractor::new(ExtractionConfig::default()).extract("");
        assert_eq!(doc, AggregatedDocument::default());
    }

    #[test]
    fn generator_failure_falls_back_to_patterns() {
        let generator = Arc::new(ScriptedGenerator::replying(Err(
            CollaboratorError::Unavailable("down".into()),
        )));
        let doc = DocumentExtractor::new(ai_config())
            .with_generator(generator)
            .extract(DOC);
        assert_eq!(doc.diagnosticos.len(), 1);
        assert_eq!(
            doc.paciente.documento.as_ref().map(NonEmptyText::as_str),
            Some("123456")
        );
    }

    #[test]
    fn generator_reply_is_used_when_valid() {
        let reply = r#"```json
{"paciente": {"documento": "999"}, "servicios": [{"tipo_atencion": "URGENCIAS", "fecha_ingreso": "2024-01-10", "fecha_egreso": "2024-01-12"}]}
```"#;
        let generator = Arc::new(ScriptedGenerator::replying(Ok(reply.into())));
        let doc = DocumentExtractor::new(ai_config())
            .with_generator(generator)
            .extract(DOC);

        assert_eq!(
            doc.paciente.documento.as_ref().map(NonEmptyText::as_str),
            Some("999")
        );
        assert!(doc.diagnosticos.is_empty());
        assert_eq!(doc.estancias.len(), 1);
        assert_eq!(doc.estancias[0].dias_estancia, Some(2));
    }

    #[test]
    fn ai_mode_without_generator_uses_patterns() {
        let doc = DocumentExtractor::new(ai_config()).extract(DOC);
        assert_eq!(doc.diagnosticos.len(), 1);
    }
}
