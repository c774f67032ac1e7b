//! Laboratory and imaging orders with their reported results.

use crate::constants::DEFAULT_QUANTITY;
use crate::dates::checked_date;
use crate::patterns::{compile, record_lines, window, DATE, QUANTITY_ANCHOR_RE};
use crate::records::{ImagingOrder, LabOrder, StudyOrder};
use crate::sections::SectionLocator;
use hc_types::NonEmptyText;
use once_cell::sync::Lazy;
use regex::Regex;

static LABORATORY: Lazy<SectionLocator> = Lazy::new(|| {
    SectionLocator::new(r"^[OÓ]RDENES\s+DE\s+LABORATORIO(?:S|\s+CL[IÍ]NICO)?")
});
static IMAGING: Lazy<SectionLocator> = Lazy::new(|| {
    SectionLocator::new(r"^[OÓ]RDENES\s+DE\s+IM[AÁ]GENES(?:\s+DIAGN[OÓ]STICAS)?")
});

static ORDER_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(r"(?i)\bFecha\s+(?:de\s+)?Orden\s*:?\s*(?P<fecha>{DATE})"))
});
static PERFORMED_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)\bFecha\s+(?:de\s+)?(?:Realizaci[oó]n|Resultado|Aplicaci[oó]n|Toma)\s*:?\s*(?P<fecha>{DATE})"
    ))
});
static RESULT_RE: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^Resultados?\s*:"));

fn is_anchor(line: &str) -> bool {
    QUANTITY_ANCHOR_RE.is_match(line)
}

fn first_date(lines: &[&str], pattern: &Regex) -> Option<NonEmptyText> {
    lines.iter().find_map(|line| {
        let caps = pattern.captures(line)?;
        checked_date(caps.name("fecha")?.as_str())
    })
}

/// Free text opened by `Resultados:`, running to the next anchor or the end of the section.
fn result_text(record: &[&str]) -> Option<NonEmptyText> {
    let (index, m) = record
        .iter()
        .enumerate()
        .find_map(|(i, line)| RESULT_RE.find(line).map(|m| (i, m)))?;

    let mut parts = vec![record[index][m.end()..].trim()];
    parts.extend(record[index + 1..].iter().copied());
    NonEmptyText::optional(
        parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

fn orders(text: &str, locator: &SectionLocator, satellite_window: usize) -> Vec<StudyOrder> {
    let mut orders = Vec::new();
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
            let resultado = result_text(record_lines(&lines, index, is_anchor));

            orders.push(StudyOrder {
                cantidad,
                descripcion,
                fecha_orden: first_date(following, &ORDER_DATE_RE),
                fecha_realizacion: first_date(following, &PERFORMED_DATE_RE),
                realizado: resultado.is_some(),
                resultado,
            });
        }
    }
    orders
}

/// Extracts laboratory orders. An order counts as performed when a result was reported.
pub fn extract_lab_orders(text: &str, satellite_window: usize) -> Vec<LabOrder> {
    let labs = orders(text, &LABORATORY, satellite_window);
    tracing::debug!("extracted {} lab orders", labs.len());
    labs
}

/// Extracts imaging orders. An order counts as performed when a result was reported.
pub fn extract_imaging_orders(text: &str, satellite_window: usize) -> Vec<ImagingOrder> {
    let imaging = orders(text, &IMAGING, satellite_window);
    tracing::debug!("extracted {} imaging orders", imaging.len());
    imaging
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
    fn result_runs_to_next_anchor() {
        let doc = "ORDENES DE LABORATORIO\n1 HEMOGRAMA\nFecha Orden: 10/01/2024\nFecha de Realización: 10/01/2024\nResultados: leucocitos normales\nhemoglobina normal\n1 PROTEINA C REACTIVA\nFecha Orden: 11/01/2024";
        let labs = extract_lab_orders(doc, DEFAULT_SATELLITE_WINDOW);

        assert_eq!(labs.len(), 2);
        assert_eq!(labs[0].descripcion.as_str(), "HEMOGRAMA");
        assert_eq!(labs[0].fecha_orden, text("10/01/2024"));
        assert_eq!(labs[0].fecha_realizacion, text("10/01/2024"));
        assert_eq!(
            labs[0].resultado,
            text("leucocitos normales\nhemoglobina normal")
        );
        assert!(labs[0].realizado);

        assert_eq!(labs[1].fecha_orden, text("11/01/2024"));
        assert_eq!(labs[1].resultado, None);
        assert!(!labs[1].realizado);
    }

    #[test]
    fn imaging_uses_its_own_section() {
        let doc = "ORDENES DE IMAGENES DIAGNOSTICAS\n1 ECOGRAFIA ABDOMINAL\nResultado:\napéndice engrosado\nORDENES DE LABORATORIO\n2 GLICEMIA";
        let imaging = extract_imaging_orders(doc, DEFAULT_SATELLITE_WINDOW);
        let labs = extract_lab_orders(doc, DEFAULT_SATELLITE_WINDOW);

        assert_eq!(imaging.len(), 1);
        assert_eq!(imaging[0].resultado, text("apéndice engrosado"));
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].cantidad.as_str(), "2");
    }
}
