//! Diagnosis lines with an optional leading ICD-10 code.

use crate::patterns::compile;
use crate::records::{Diagnosis, DiagnosisRole};
use hc_types::NonEmptyText;
use once_cell::sync::Lazy;
use regex::Regex;

static DIAGNOSIS_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?im)\b(?:DIAGN[OÓ]STICOS?|DX)(?:\s+(?:PRINCIPAL|RELACIONADO|SECUNDARIO|DE\s+INGRESO|DE\s+EGRESO)(?:\s*\d+)?)?\s*:[ \t]*(?P<resto>[^\n]*\S)",
    )
});

// Case-sensitive: a lowercase letter followed by digits is not a code.
static ICD10_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?P<codigo>[A-Z]\d{2,3}(?:\.\d{1,2}|X)?)(?:[\s\-:.,;]+|$)")
});

/// Splits a leading ICD-10 token from the rest of a diagnosis text.
fn split_code(rest: &str) -> (Option<NonEmptyText>, &str) {
    let Some(caps) = ICD10_RE.captures(rest) else {
        return (None, rest);
    };
    let (Some(code), Some(whole)) = (caps.name("codigo"), caps.get(0)) else {
        return (None, rest);
    };
    let description = rest[whole.end()..].trim();
    if description.is_empty() {
        // A bare code is its own description.
        return (NonEmptyText::optional(code.as_str()), rest);
    }
    (NonEmptyText::optional(code.as_str()), description)
}

/// Extracts diagnoses in document order. The first one is principal, the rest secondary.
pub fn extract_diagnoses(text: &str) -> Vec<Diagnosis> {
    let mut diagnoses = Vec::new();

    for caps in DIAGNOSIS_LABEL_RE.captures_iter(text) {
        let Some(rest) = caps.name("resto") else {
            continue;
        };
        let (codigo, description) = split_code(rest.as_str().trim());
        let Some(descripcion) = NonEmptyText::optional(description) else {
            continue;
        };
        let tipo = if diagnoses.is_empty() {
            DiagnosisRole::Principal
        } else {
            DiagnosisRole::Secundario
        };
        diagnoses.push(Diagnosis {
            codigo,
            descripcion,
            tipo,
        });
    }

    tracing::debug!("extracted {} diagnoses", diagnoses.len());
    diagnoses
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn code(d: &Diagnosis) -> Option<&str> {
        d.codigo.as_ref().map(NonEmptyText::as_str)
    }

    #[test]
    fn leading_code_is_split_from_description() {
        let diagnoses = extract_diagnoses("DX: A09 GASTROENTERITIS");
        assert_eq!(diagnoses.len(), 1);
        assert_eq!(code(&diagnoses[0]), Some("A09"));
        assert_eq!(diagnoses[0].descripcion.as_str(), "GASTROENTERITIS");
        assert_eq!(diagnoses[0].tipo, DiagnosisRole::Principal);
    }

    #[test]
    fn first_is_principal_regardless_of_codes() {
        let doc = "DIAGNOSTICO PRINCIPAL: R10.4 DOLOR ABDOMINAL\nDiagnóstico relacionado 1: sin código aparente\nDX: K35X - APENDICITIS AGUDA";
        let diagnoses = extract_diagnoses(doc);
        let roles: Vec<_> = diagnoses.iter().map(|d| d.tipo).collect();

        assert_eq!(
            roles,
            vec![
                DiagnosisRole::Principal,
                DiagnosisRole::Secundario,
                DiagnosisRole::Secundario
            ]
        );
        assert_eq!(code(&diagnoses[0]), Some("R10.4"));
        assert_eq!(code(&diagnoses[1]), None);
        assert_eq!(diagnoses[1].descripcion.as_str(), "sin código aparente");
        assert_eq!(code(&diagnoses[2]), Some("K35X"));
        assert_eq!(diagnoses[2].descripcion.as_str(), "APENDICITIS AGUDA");
    }

    #[test]
    fn code_must_be_a_whole_leading_token() {
        let diagnoses = extract_diagnoses("DX: A09B HALLAZGO\nDX: a09 minúscula\nDX: B20");
        assert_eq!(code(&diagnoses[0]), None);
        assert_eq!(diagnoses[0].descripcion.as_str(), "A09B HALLAZGO");
        assert_eq!(code(&diagnoses[1]), None);
        assert_eq!(code(&diagnoses[2]), Some("B20"));
        assert_eq!(diagnoses[2].descripcion.as_str(), "B20");
    }

    #[test]
    fn label_without_text_is_skipped() {
        assert!(extract_diagnoses("DIAGNOSTICOS:\nDX:").is_empty());
        assert!(extract_diagnoses("").is_empty());
    }
}
