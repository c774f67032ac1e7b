//! AI-assisted extraction through an injected [`TextGenerator`].
//!
//! The generator is asked for the whole [`AggregatedDocument`] as JSON. Replies are parsed
//! leniently (see [`crate::records`]) and any failure is returned to the caller, which falls
//! back to the pattern-based extractors.

use crate::collaborators::{invoke_with_timeout, GenerationRequest, TextGenerator};
use crate::config::ExtractionConfig;
use crate::records::AggregatedDocument;
use crate::{ExtractionError, ExtractionResult};
use std::sync::Arc;

const EXTRACTION_INSTRUCTIONS: &str = r#"Eres un auditor de cuentas médicas. Extrae de la historia clínica la información facturable y responde ÚNICAMENTE con un objeto JSON con estas claves:
"paciente": {"documento", "nombre", "fecha_nacimiento", "edad" (número), "telefono", "direccion", "afiliacion"}
"servicios": [{"sede_codigo", "sede_nombre", "tipo_atencion", "fecha_ingreso", "hora_ingreso", "fecha_egreso", "hora_egreso"}]
"diagnosticos": [{"codigo" (CIE-10), "descripcion", "tipo" ("principal" o "secundario")}]
"medicamentos": [{"cantidad", "descripcion", "dosis", "via", "frecuencia", "estado", "realizado" (booleano), "fecha_aplicacion", "hora_aplicacion"}]
"procedimientos": [{"tipo" ("quirurgico" o "no_quirurgico"), "cantidad", "descripcion", "fecha", "hora", "realizado"}]
"cirugias": [{"diagnostico_pre", "diagnostico_post", "anestesia", "fecha", "hora_inicio", "hora_fin", "descripcion", "tejidos_patologia", "participantes": [{"codigo", "nombre", "tipo", "participo"}], "realizado"}]
"laboratorios" e "imagenes": [{"cantidad", "descripcion", "fecha_orden", "fecha_realizacion", "resultado", "realizado"}]
"interconsultas": [{"especialidad", "fecha_orden", "fecha_realizacion", "realizado"}]
"evoluciones": [{"fecha", "medico", "texto"}]
"altas": [{"fecha", "estado_salida", "resumen"}]
Un ítem está realizado solo si hay fecha de aplicación o ejecución, o un resultado. Fechas en DD/MM/AAAA y horas en HH:MM:SS. Si un campo no aparece usa null o una lista vacía.

Texto de la historia clínica:
"#;

/// Cuts `text` to at most `max_chars` characters, logging when anything is dropped.
pub(crate) fn truncate_for_prompt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            tracing::warn!(
                "document text truncated to {} characters before generation",
                max_chars
            );
            &text[..cut]
        }
        None => text,
    }
}

pub(crate) fn extraction_prompt(text: &str, max_chars: usize) -> String {
    format!(
        "{EXTRACTION_INSTRUCTIONS}{}",
        truncate_for_prompt(text, max_chars)
    )
}

/// Locates the JSON object inside a generator reply: a fenced block first, then the span
/// from the first `{` to the last `}`.
pub(crate) fn json_block(reply: &str) -> Option<&str> {
    let trimmed = reply.trim();

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        let after_fence = after_fence.strip_prefix("json").unwrap_or(after_fence);
        if let Some(end) = after_fence.find("```") {
            let block = after_fence[..end].trim();
            if block.starts_with('{') {
                return Some(block);
            }
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&trimmed[start..=end]),
        _ => None,
    }
}

/// Parses a generator reply, reporting the path of the first field that does not fit.
pub(crate) fn parse_reply(reply: &str) -> ExtractionResult<AggregatedDocument> {
    let json = json_block(reply)
        .ok_or_else(|| ExtractionError::AiResponse("no JSON object in reply".into()))?;
    let mut deserializer = serde_json::Deserializer::from_str(json);

    match serde_path_to_error::deserialize(&mut deserializer) {
        Ok(document) => Ok(document),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(ExtractionError::AiResponse(format!(
                "document mismatch at {path}: {source}"
            )))
        }
    }
}

/// Asks `generator` for the document extracted from normalised `text`.
pub(crate) fn extract_with_generator(
    text: &str,
    generator: Arc<dyn TextGenerator>,
    config: &ExtractionConfig,
) -> ExtractionResult<AggregatedDocument> {
    let request = GenerationRequest {
        prompt: extraction_prompt(text, config.max_ai_chars()),
        timeout: config.ai_timeout(),
    };
    let reply = invoke_with_timeout(generator, request).map_err(ExtractionError::Generation)?;
    let document = parse_reply(&reply)?;
    tracing::info!("AI-assisted extraction succeeded");
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::tests::ScriptedGenerator;
    use crate::config::ExtractionMode;
    use std::time::Duration;

    #[test]
    fn fenced_and_bare_replies() {
        assert_eq!(
            json_block("Aquí está:\n```json\n{\"a\": 1}\n```\nGracias"),
            Some("{\"a\": 1}")
        );
        assert_eq!(json_block("resultado {\"a\": {\"b\": 2}} fin"), Some("{\"a\": {\"b\": 2}}"));
        assert_eq!(json_block("sin datos"), None);
    }

    #[test]
    fn mismatch_reports_the_field_path() {
        let err = parse_reply(r#"{"diagnosticos": [{"descripcion": "X", "tipo": "terciario"}]}"#)
            .expect_err("unknown role");
        match err {
            ExtractionError::AiResponse(msg) => assert!(msg.contains("diagnosticos[0].tipo"), "{msg}"),
            other => panic!("expected AiResponse, got {other:?}"),
        }
    }

    #[test]
    fn prompt_text_is_truncated_on_char_boundaries() {
        assert_eq!(truncate_for_prompt("señal", 3), "señ");
        assert_eq!(truncate_for_prompt("abc", 10), "abc");
    }

    #[test]
    fn truncated_text_reaches_the_generator() {
        let generator = Arc::new(ScriptedGenerator::replying(Ok("{}".into())));
        let config = ExtractionConfig::new(ExtractionMode::AiAssisted, 5, Duration::from_secs(5))
            .unwrap()
            .with_max_ai_chars(4)
            .unwrap();

        let doc = extract_with_generator("ABCDEFGH", generator.clone(), &config).unwrap();
        assert_eq!(doc, AggregatedDocument::default());
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].ends_with("ABCD"));
    }
}
