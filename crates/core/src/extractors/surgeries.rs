//! Surgery descriptions: labelled fields and the participating team.

use crate::dates::{checked_date, checked_time, parse_time};
use crate::patterns::{compile, labelled_block, labelled_value, DATE, TIME};
use crate::records::{Participant, SurgeryRecord};
use crate::sections::SectionLocator;
use hc_types::NonEmptyText;
use once_cell::sync::Lazy;
use regex::Regex;

static SURGERY: Lazy<SectionLocator> = Lazy::new(|| {
    SectionLocator::new(r"^DESCRIPCI[OÓ]N\s+(?:QUIR[UÚ]RGICA|DE\s+LA\s+CIRUG[IÍ]A)\s*$")
});

static PRE_DIAGNOSIS_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^Diagn[oó]stico\s+pre(?:-?operatorio|quir[uú]rgico)?\s*:\s*(?P<value>.*\S)")
});
static POST_DIAGNOSIS_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^Diagn[oó]stico\s+post(?:-?operatorio|quir[uú]rgico)?\s*:\s*(?P<value>.*\S)")
});
static ANESTHESIA_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^(?:Tipo\s+de\s+)?Anestesia\s*:\s*(?P<value>.*\S)")
});
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)^Fecha(?:\s+de\s+(?:la\s+)?(?:cirug[ií]a|procedimiento|intervenci[oó]n))?\s*:\s*(?P<value>{DATE})"
    ))
});
static START_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(r"(?i)\bHora\s+(?:de\s+)?inicio\s*:\s*(?P<value>{TIME})"))
});
static END_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)\bHora\s+(?:de\s+)?(?:fin(?:alizaci[oó]n)?|terminaci[oó]n)\s*:\s*(?P<value>{TIME})"
    ))
});
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^Descripci[oó]n(?:\s+del\s+procedimiento)?\s*:")
});
static PATHOLOGY_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^Tejidos?\s+(?:enviados?\s+)?a\s+patolog[ií]a\s*:\s*(?P<value>.*\S)")
});
static PARTICIPANT_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)C[OÓ]DIGO\s*:?\s*(?P<codigo>\S+)\s+(?:NOMBRE\s*:?\s*)?(?P<nombre>.+?)\s+TIPO\s*:?\s*(?P<tipo>.+?)\s+PARTICIP[OÓ]\s*\??\s*:?\s*(?P<participo>S[IÍ]|NO|S|N)\b",
    )
});

fn participant(line: &str) -> Option<Participant> {
    let caps = PARTICIPANT_RE.captures(line)?;
    let field = |name: &str| {
        caps.name(name)
            .and_then(|m| NonEmptyText::optional(m.as_str()))
    };
    Some(Participant {
        codigo: field("codigo"),
        nombre: field("nombre"),
        tipo: field("tipo"),
        participo: field("participo")
            .and_then(|value| NonEmptyText::optional(value.as_str().to_uppercase())),
    })
}

fn surgery(lines: &[&str]) -> SurgeryRecord {
    let at = |pattern: &Regex| labelled_value(lines.iter().copied(), pattern);

    let fecha = at(&DATE_RE).and_then(|d| checked_date(d.as_str()));
    let hora_inicio = at(&START_TIME_RE).and_then(|t| checked_time(t.as_str()));
    let hora_fin = at(&END_TIME_RE).and_then(|t| checked_time(t.as_str()));

    if let (Some(start), Some(end)) = (
        hora_inicio.as_ref().and_then(|t| parse_time(t.as_str())),
        hora_fin.as_ref().and_then(|t| parse_time(t.as_str())),
    ) {
        if end < start {
            tracing::warn!("surgery ends ({end}) before it starts ({start})");
        }
    }

    SurgeryRecord {
        diagnostico_pre: at(&PRE_DIAGNOSIS_RE),
        diagnostico_post: at(&POST_DIAGNOSIS_RE),
        anestesia: at(&ANESTHESIA_RE),
        realizado: fecha.is_some() || hora_inicio.is_some(),
        fecha,
        hora_inicio,
        hora_fin,
        descripcion: labelled_block(lines, &DESCRIPTION_RE, |line| {
            PARTICIPANT_RE.is_match(line)
        }),
        tejidos_patologia: at(&PATHOLOGY_RE),
        participantes: lines.iter().filter_map(|line| participant(line)).collect(),
    }
}

/// Extracts one record per surgery description section.
pub fn extract_surgeries(text: &str) -> Vec<SurgeryRecord> {
    let surgeries: Vec<SurgeryRecord> = SURGERY
        .locate(text)
        .map(|section| surgery(&section.lines()))
        .collect();

    tracing::debug!("extracted {} surgeries", surgeries.len());
    surgeries
}
