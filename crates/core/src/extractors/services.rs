//! Service encounters announced by `SEDE DE ATENCION` header lines.

use crate::dates::{checked_date, checked_time, parse_date};
use crate::patterns::{compile, first_date_time, DATE, TIME};
use crate::records::ServiceEncounter;
use hc_types::NonEmptyText;
use once_cell::sync::Lazy;
use regex::Regex;

// The site name may be wrapped onto a second line by the PDF export.
static SERVICE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)SEDE DE ATENCI[OÓ]N\s+(?P<codigo>\d+)\s+(?P<nombre>[^\n]+?(?:\n[^\n]+?)?)\s+FOLIO\s+\d+\s+FECHA\s*:?\s*(?P<fecha>{DATE})\s+(?P<hora>{TIME})\s+TIPO DE ATENCI[OÓ]N\s*:\s*(?P<tipo>[^\n]+)"
    ))
});

static DISCHARGE_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)\bFecha\s+(?:y\s+hora\s+)?(?:de\s+)?(?:Egreso|Salida)\s*:?\s*(?P<fecha>{DATE})(?:\s+(?P<hora>{TIME}))?"
    ))
});

/// Extracts every service encounter in document order.
///
/// The discharge date and time come from a `Fecha de egreso:` label inside the encounter's own
/// span, which runs to the next service header.
pub fn extract_services(text: &str) -> Vec<ServiceEncounter> {
    let headers: Vec<_> = SERVICE_HEADER_RE.captures_iter(text).collect();

    let services: Vec<ServiceEncounter> = headers
        .iter()
        .enumerate()
        .map(|(i, caps)| {
            let span_start = caps.get(0).map_or(text.len(), |m| m.end());
            let span_end = headers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());
            let discharge = first_date_time(text[span_start..span_end].lines(), &DISCHARGE_RE);
            let (fecha_egreso, hora_egreso) = match discharge {
                Some((date, time)) => (Some(date), time),
                None => (None, None),
            };

            ServiceEncounter {
                sede_codigo: caps
                    .name("codigo")
                    .and_then(|m| NonEmptyText::optional(m.as_str())),
                sede_nombre: caps
                    .name("nombre")
                    .and_then(|m| NonEmptyText::collapsed(m.as_str()).ok()),
                tipo_atencion: caps
                    .name("tipo")
                    .and_then(|m| NonEmptyText::optional(m.as_str())),
                fecha_ingreso: caps.name("fecha").and_then(|m| checked_date(m.as_str())),
                hora_ingreso: caps.name("hora").and_then(|m| checked_time(m.as_str())),
                fecha_egreso,
                hora_egreso,
            }
        })
        .collect();

    for service in services.iter().filter(|s| discharge_precedes_admission(s)) {
        tracing::warn!(
            "service {} discharged ({:?}) before admission ({:?})",
            service.tipo_atencion.as_ref().map_or("?", NonEmptyText::as_str),
            service.fecha_egreso.as_ref().map(NonEmptyText::as_str),
            service.fecha_ingreso.as_ref().map(NonEmptyText::as_str),
        );
    }

    tracing::debug!("extracted {} service encounters", services.len());
    services
}

/// `true` when both dates parse and the discharge date is earlier than admission.
fn discharge_precedes_admission(service: &ServiceEncounter) -> bool {
    let date = |value: &Option<NonEmptyText>| value.as_ref().and_then(|v| parse_date(v.as_str()));
    matches!(
        (date(&service.fecha_ingreso), date(&service.fecha_egreso)),
        (Some(admission), Some(discharge)) if discharge < admission
    )
}
