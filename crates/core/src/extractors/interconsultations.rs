//! Specialist interconsultation requests.

use crate::dates::checked_date;
use crate::patterns::{compile, DATE};
use crate::records::Interconsultation;
use hc_types::NonEmptyText;
use once_cell::sync::Lazy;
use regex::Regex;

// One request per line: `Especialidad: CIRUGIA GENERAL Fecha Orden: 10/01/2024`.
static INTERCONSULTATION_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?im)\bEspecialidad\s*:\s*(?P<especialidad>[^\n]+?)\s+Fecha\s+(?:de\s+)?Orden\s*:\s*(?P<orden>{DATE})(?:[^\n]*?\bFecha\s+(?:de\s+)?Realizaci[oó]n\s*:\s*(?P<realizacion>{DATE}))?"
    ))
});

pub fn extract_interconsultations(text: &str) -> Vec<Interconsultation> {
    let consults: Vec<Interconsultation> = INTERCONSULTATION_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let especialidad = NonEmptyText::optional(caps.name("especialidad")?.as_str())?;
            let fecha_realizacion = caps
                .name("realizacion")
                .and_then(|m| checked_date(m.as_str()));
            Some(Interconsultation {
                especialidad,
                fecha_orden: caps.name("orden").and_then(|m| checked_date(m.as_str())),
                realizado: fecha_realizacion.is_some(),
                fecha_realizacion,
            })
        })
        .collect();

    tracing::debug!("extracted {} interconsultations", consults.len());
    consults
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> Option<NonEmptyText> {
        NonEmptyText::optional(value)
    }

    #[test]
    fn pending_and_completed_requests() {
        let doc = "INTERCONSULTAS\nEspecialidad: CIRUGIA GENERAL Fecha Orden: 10/01/2024 Fecha Realización: 10/01/2024\nEspecialidad: NUTRICION Fecha de Orden: 12/01/2024";
        let consults = extract_interconsultations(doc);

        assert_eq!(
            consults,
            vec![
                Interconsultation {
                    especialidad: NonEmptyText::new("CIRUGIA GENERAL").unwrap(),
                    fecha_orden: text("10/01/2024"),
                    fecha_realizacion: text("10/01/2024"),
                    realizado: true,
                },
                Interconsultation {
                    especialidad: NonEmptyText::new("NUTRICION").unwrap(),
                    fecha_orden: text("12/01/2024"),
                    fecha_realizacion: None,
                    realizado: false,
                },
            ]
        );
    }

    #[test]
    fn order_date_is_required() {
        assert!(extract_interconsultations("Especialidad: CARDIOLOGIA").is_empty());
    }
}
