//! Patient identity fields.
//!
//! Each field is matched independently over the whole document; the first match wins.

use crate::dates::checked_date;
use crate::patterns::{compile, DATE};
use crate::records::PatientIdentity;
use hc_types::NonEmptyText;
use once_cell::sync::Lazy;
use regex::Regex;

static DOCUMENT_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\bC\.?C\.?\s*:?\s*(?P<value>\d+)"));
static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)--\s*(?P<value>[A-ZÁÉÍÓÚÑ\s]+?)\s+Fec(?:ha)?\.?\s*(?:de\s+)?Nacimiento")
});
static LABELLED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?im)^(?:Nombre(?:\s+del\s+paciente)?|Paciente)\s*:[ \t]*(?P<value>[^\n]*\S)")
});
static BIRTH_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)Fec(?:ha)?\.?\s*(?:de\s+)?Nacimiento\s*:?\s*(?P<value>{DATE})"
    ))
});
static AGE_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\bEdad(?:\s*actual)?\s*:\s*(?P<value>\d+)\s*A[ÑN]OS"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\bTel[eé]fono\s*:\s*(?P<value>\d+)"));
static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?im)\bDirecci[oó]n\s*:[ \t]*(?P<value>[^\n]+?)(?:[ \t]+(?:Tel[eé]fono|Barrio|Ciudad|Municipio)\s*:|[ \t]*$)",
    )
});
static PAYER_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?im)\b(?:EPS|ENTIDAD PROMOTORA DE SALUD|ASEGURADORA)\b[: \t]+(?P<value>[^\n]*\S)",
    )
});

fn first_capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.name("value"))
        .map(|m| m.as_str())
}

/// Extracts the patient identity block. Fields not found are left absent.
pub fn extract_patient(text: &str) -> PatientIdentity {
    let nombre = first_capture(&NAME_RE, text)
        .and_then(|name| NonEmptyText::collapsed(name).ok())
        .or_else(|| first_capture(&LABELLED_NAME_RE, text).and_then(NonEmptyText::optional));

    let patient = PatientIdentity {
        documento: first_capture(&DOCUMENT_RE, text).and_then(NonEmptyText::optional),
        nombre,
        fecha_nacimiento: first_capture(&BIRTH_DATE_RE, text).and_then(checked_date),
        edad: first_capture(&AGE_RE, text).and_then(|age| age.parse().ok()),
        telefono: first_capture(&PHONE_RE, text).and_then(NonEmptyText::optional),
        direccion: first_capture(&ADDRESS_RE, text).and_then(NonEmptyText::optional),
        afiliacion: first_capture(&PAYER_RE, text).and_then(NonEmptyText::optional),
    };

    if patient.is_empty() {
        tracing::debug!("no patient identity fields found");
    }
    patient
}
