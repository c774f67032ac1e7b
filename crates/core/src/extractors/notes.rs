//! Progress notes and discharge notes.

use crate::dates::checked_date;
use crate::patterns::{compile, labelled_block, labelled_value, DATE, DATE_TIME_RE, TIME};
use crate::records::{DischargeNote, ProgressNote};
use crate::sections::{Section, SectionLocator};
use hc_types::NonEmptyText;
use once_cell::sync::Lazy;
use regex::Regex;

static PROGRESS: Lazy<SectionLocator> = Lazy::new(|| {
    SectionLocator::new(&format!(
        r"^(?:EVOLUCI[OÓ]N(?:\s+M[EÉ]DICA)?|NOTA\s+DE\s+EVOLUCI[OÓ]N)[ \t]*:?(?:[ \t]*(?:{DATE})(?:[ \t]+(?:{TIME}))?)?[ \t]*$"
    ))
});
static DISCHARGE: Lazy<SectionLocator> = Lazy::new(|| {
    SectionLocator::new(&format!(
        r"^(?:EPICRISIS|NOTA\s+DE\s+ALTA|ALTA\s+M[EÉ]DICA|RESUMEN\s+DE\s+EGRESO)[ \t]*:?(?:[ \t]*(?:{DATE})(?:[ \t]+(?:{TIME}))?)?[ \t]*$"
    ))
});

static AUTHOR_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^(?:M[eé]dico|Profesional|Elaborado\s+por|Firmado\s+por)\s*:\s*(?P<value>.*\S)")
});
static DISCHARGE_STATUS_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^Estado\s+(?:de\s+)?(?:salida|egreso)\s*:\s*(?P<value>.*\S)")
});
static SUMMARY_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^Resumen(?:\s+de\s+(?:la\s+)?(?:atenci[oó]n|hospitalizaci[oó]n))?\s*:")
});

/// The first date token of a note: on the header line if present, otherwise in the body.
fn note_date(section: &Section<'_>, lines: &[&str]) -> Option<NonEmptyText> {
    std::iter::once(section.header())
        .chain(lines.iter().copied())
        .find_map(|line| DATE_TIME_RE.captures(line))
        .and_then(|caps| caps.name("fecha").and_then(|m| checked_date(m.as_str())))
}

pub fn extract_progress_notes(text: &str) -> Vec<ProgressNote> {
    let notes: Vec<ProgressNote> = PROGRESS
        .locate(text)
        .map(|section| {
            let lines = section.lines();
            let body: Vec<&str> = lines
                .iter()
                .copied()
                .filter(|line| !AUTHOR_RE.is_match(line))
                .collect();
            ProgressNote {
                fecha: note_date(&section, &lines),
                medico: labelled_value(lines.iter().copied(), &AUTHOR_RE),
                texto: NonEmptyText::optional(body.join("\n")),
            }
        })
        .collect();

    tracing::debug!("extracted {} progress notes", notes.len());
    notes
}

pub fn extract_discharge_notes(text: &str) -> Vec<DischargeNote> {
    let notes: Vec<DischargeNote> = DISCHARGE
        .locate(text)
        .map(|section| {
            let lines = section.lines();
            DischargeNote {
                fecha: note_date(&section, &lines),
                estado_salida: labelled_value(lines.iter().copied(), &DISCHARGE_STATUS_RE),
                resumen: labelled_block(&lines, &SUMMARY_RE, |_| false),
            }
        })
        .collect();

    tracing::debug!("extracted {} discharge notes", notes.len());
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> Option<NonEmptyText> {
        NonEmptyText::optional(value)
    }

    #[test]
    fn progress_note_with_dated_header() {
        let doc = "EVOLUCION MEDICA 11/01/2024 08:30\nPaciente estable, tolera vía oral.\nMédico: DRA. ANA RUIZ\nEVOLUCION\nsin cambios el 12/01/2024";
        let notes = extract_progress_notes(doc);

        assert_eq!(
            notes,
            vec![
                ProgressNote {
                    fecha: text("11/01/2024"),
                    medico: text("DRA. ANA RUIZ"),
                    texto: text("Paciente estable, tolera vía oral."),
                },
                ProgressNote {
                    fecha: text("12/01/2024"),
                    medico: None,
                    texto: text("sin cambios el 12/01/2024"),
                },
            ]
        );
    }

    #[test]
    fn discharge_note_fields() {
        let doc = "EPICRISIS\nFecha: 15/01/2024\nEstado de salida: VIVO, MEJORADO\nResumen: paciente con apendicitis\nevoluciona favorablemente\nMédico: DR. LUIS MORA";
        let notes = extract_discharge_notes(doc);

        assert_eq!(
            notes,
            vec![DischargeNote {
                fecha: text("15/01/2024"),
                estado_salida: text("VIVO, MEJORADO"),
                resumen: text("paciente con apendicitis\nevoluciona favorablemente"),
            }]
        );
    }

    #[test]
    fn consecutive_dated_notes_stay_apart() {
        let doc = "EVOLUCION MEDICA 11/01/2024 08:30\nPaciente estable\nEVOLUCION MEDICA 12/01/2024 09:00\nPaciente con fiebre";
        let notes = extract_progress_notes(doc);

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].texto, text("Paciente estable"));
        assert_eq!(notes[1].fecha, text("12/01/2024"));
        assert_eq!(notes[1].texto, text("Paciente con fiebre"));
    }

    #[test]
    fn discharge_summary_ends_at_a_dated_note() {
        let doc = "EPICRISIS 15/01/2024\nResumen: alta\nEVOLUCION MEDICA 16/01/2024\ncontrol ambulatorio";
        let discharge = extract_discharge_notes(doc);

        assert_eq!(discharge.len(), 1);
        assert_eq!(discharge[0].fecha, text("15/01/2024"));
        assert_eq!(discharge[0].resumen, text("alta"));
    }

    #[test]
    fn inline_mentions_are_not_headers() {
        assert!(extract_progress_notes("se revisa evolucion del paciente").is_empty());
        assert!(extract_discharge_notes("se da alta medica hoy").is_empty());
    }
}
