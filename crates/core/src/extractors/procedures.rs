//! Surgical and non-surgical procedure orders.

use crate::constants::DEFAULT_QUANTITY;
use crate::patterns::{first_date_time, window, APPLICATION_RE, QUANTITY_ANCHOR_RE};
use crate::records::{ProcedureKind, ProcedureRecord};
use crate::sections::SectionLocator;
use hc_types::NonEmptyText;
use once_cell::sync::Lazy;

static SURGICAL: Lazy<SectionLocator> = Lazy::new(|| {
    SectionLocator::new(r"^(?:[OÓ]RDENES\s+DE\s+)?PROCEDIMIENTOS\s+QUIR[UÚ]RGICOS")
});
static NON_SURGICAL: Lazy<SectionLocator> = Lazy::new(|| {
    SectionLocator::new(r"^(?:[OÓ]RDENES\s+DE\s+)?PROCEDIMIENTOS\s+NO\s+QUIR[UÚ]RGICOS")
});

fn is_anchor(line: &str) -> bool {
    QUANTITY_ANCHOR_RE.is_match(line)
}

fn from_sections(
    text: &str,
    locator: &SectionLocator,
    tipo: ProcedureKind,
    satellite_window: usize,
) -> Vec<ProcedureRecord> {
    let mut records = Vec::new();
    for section in locator.locate(text) {
        let lines = section.lines();
        for (index, line) in lines.iter().enumerate() {
            let Some(caps) = QUANTITY_ANCHOR_RE.captures(line) else {
                continue;
            };
            let Some(descripcion) = caps
                .name("descripcion")
                .and_then(|m| NonEmptyText::optional(m.as_str()))
            else {
                continue;
            };
            let Some(cantidad) = caps
                .name("cantidad")
                .and_then(|m| NonEmptyText::optional(m.as_str()))
                .or_else(|| NonEmptyText::optional(DEFAULT_QUANTITY))
            else {
                continue;
            };

            let following = window(&lines, index, satellite_window, is_anchor);
            let (fecha, hora) = match first_date_time(following.iter().copied(), &APPLICATION_RE) {
                Some((date, time)) => (Some(date), time),
                None => (None, None),
            };

            records.push(ProcedureRecord {
                tipo,
                cantidad,
                descripcion,
                realizado: fecha.is_some(),
                fecha,
                hora,
            });
        }
    }
    records
}

/// Looks for each undated procedure's description anywhere in the document and takes the
/// first application label on a mention line or within its look-ahead window.
///
/// The result depends on where else the description appears, so it is the one extractor
/// step that is not section-local.
fn backfill_dates(text: &str, records: &mut [ProcedureRecord], satellite_window: usize) {
    let lines: Vec<&str> = text.lines().collect();

    for record in records.iter_mut().filter(|r| r.fecha.is_none()) {
        let needle = record.descripcion.as_str();
        let found = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(needle))
            .find_map(|(index, line)| {
                let following = window(&lines, index, satellite_window, is_anchor);
                first_date_time(
                    std::iter::once(*line).chain(following.iter().copied()),
                    &APPLICATION_RE,
                )
            });

        if let Some((date, time)) = found {
            tracing::debug!("backfilled date for procedure {}", needle);
            record.fecha = Some(date);
            record.hora = time;
            record.realizado = true;
        }
    }
}

/// Extracts surgical then non-surgical procedures, backfilling missing execution dates.
pub fn extract_procedures(text: &str, satellite_window: usize) -> Vec<ProcedureRecord> {
    let mut procedures = from_sections(text, &SURGICAL, ProcedureKind::Quirurgico, satellite_window);
    procedures.extend(from_sections(
        text,
        &NON_SURGICAL,
        ProcedureKind::NoQuirurgico,
        satellite_window,
    ));
    backfill_dates(text, &mut procedures, satellite_window);

    tracing::debug!("extracted {} procedures", procedures.len());
    procedures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_SATELLITE_WINDOW;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> Option<NonEmptyText> {
        NonEmptyText::optional(value)
    }

    #[test]
    fn both_kinds_are_extracted_in_order() {
        let doc = "PROCEDIMIENTOS QUIRURGICOS\n1 APENDICECTOMIA\nORDENES DE PROCEDIMIENTOS NO QUIRURGICOS\n2 CURACION DE HERIDA\nFecha de Aplicación: 12/01/2024 09:30";
        let procs = extract_procedures(doc, DEFAULT_SATELLITE_WINDOW);

        assert_eq!(procs.len(), 2);
        assert_eq!(procs[0].tipo, ProcedureKind::Quirurgico);
        assert_eq!(procs[0].descripcion.as_str(), "APENDICECTOMIA");
        assert!(!procs[0].realizado);
        assert_eq!(procs[1].tipo, ProcedureKind::NoQuirurgico);
        assert_eq!(procs[1].cantidad.as_str(), "2");
        assert_eq!(procs[1].fecha, text("12/01/2024"));
        assert_eq!(procs[1].hora, text("09:30"));
        assert!(procs[1].realizado);
    }

    #[test]
    fn date_is_backfilled_from_a_later_mention() {
        let doc = "PROCEDIMIENTOS NO QUIRURGICOS\n1 NEBULIZACION\nNOTAS DE ENFERMERIA\nSe realiza NEBULIZACION\nFecha de Aplicación: 11/01/2024 07:00";
        let procs = extract_procedures(doc, DEFAULT_SATELLITE_WINDOW);

        assert_eq!(procs.len(), 1);
        assert_eq!(procs[0].fecha, text("11/01/2024"));
        assert_eq!(procs[0].hora, text("07:00"));
        assert!(procs[0].realizado);
    }

    #[test]
    fn distant_mention_is_not_used() {
        let doc = "PROCEDIMIENTOS NO QUIRURGICOS\n1 NEBULIZACION\nNOTAS DE ENFERMERIA\na\nb\nc\nd\ne\nf\nFecha de Aplicación: 11/01/2024 07:00";
        let procs = extract_procedures(doc, 2);
        assert_eq!(procs[0].fecha, None);
        assert!(!procs[0].realizado);
    }
}
