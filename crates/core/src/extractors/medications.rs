//! Medications from the prescription, reconciliation and therapeutic-plan blocks.
//!
//! The three passes are concatenated in that order without deduplication: a drug prescribed
//! and also listed in the plan appears twice, once per mention.

use crate::constants::DEFAULT_QUANTITY;
use crate::patterns::{compile, mentions_dose, window, Satellites, QUANTITY_ANCHOR_RE};
use crate::records::MedicationRecord;
use crate::sections::SectionLocator;
use hc_types::NonEmptyText;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PRESCRIPTION: Lazy<SectionLocator> = Lazy::new(|| {
    SectionLocator::new(
        r"^(?:F[OÓ]RMULA\s+M[EÉ]DICA|[OÓ]RDENES\s+DE\s+MEDICAMENTOS|PRESCRIPCI[OÓ]N\s+DE\s+MEDICAMENTOS)",
    )
});
static RECONCILIATION: Lazy<SectionLocator> =
    Lazy::new(|| SectionLocator::new(r"^CONCILIACI[OÓ]N\s+MEDICAMENTOSA"));
static PLAN: Lazy<SectionLocator> =
    Lazy::new(|| SectionLocator::new(r"^PLAN\s+(?:TERAP[EÉ]UTICO|DE\s+MANEJO)"));

// Uppercase drug line without a label, optionally counted: `LOSARTAN 50 MG TABLETA`.
static RECONCILIATION_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?:(?P<cantidad>\d+(?:[.,]\d+)?)\s+)?(?P<descripcion>[A-ZÁÉÍÓÚÑ][^:]*)$")
});
static PLAN_BULLET_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"^[-•*]\s*(?:(?P<cantidad>\d+(?:[.,]\d+)?)\s+)?(?P<descripcion>\S.*)$")
});

fn is_prescription_anchor(line: &str) -> bool {
    QUANTITY_ANCHOR_RE.is_match(line)
}

fn is_reconciliation_anchor(line: &str) -> bool {
    RECONCILIATION_ANCHOR_RE.is_match(line) && mentions_dose(line)
}

fn is_plan_anchor(line: &str) -> bool {
    PLAN_BULLET_RE
        .captures(line)
        .and_then(|caps| caps.name("descripcion"))
        .is_some_and(|m| mentions_dose(m.as_str()))
}

/// Builds one record from an anchor capture and the lines that follow it.
fn record(caps: &Captures<'_>, following: &[&str]) -> Option<MedicationRecord> {
    let description = caps.name("descripcion")?.as_str().trim();
    let descripcion = NonEmptyText::optional(description)?;
    let cantidad = caps
        .name("cantidad")
        .and_then(|m| NonEmptyText::optional(m.as_str()))
        .or_else(|| NonEmptyText::optional(DEFAULT_QUANTITY))?;

    let mut scanned = Vec::with_capacity(following.len() + 1);
    scanned.push(description);
    scanned.extend_from_slice(following);
    let sats = Satellites::scan(&scanned);

    Some(MedicationRecord {
        cantidad,
        descripcion,
        dosis: sats.dose,
        via: sats.route,
        frecuencia: sats.frequency,
        estado: sats.status,
        realizado: sats.application_date.is_some(),
        fecha_aplicacion: sats.application_date,
        hora_aplicacion: sats.application_time,
    })
}

fn pass(
    text: &str,
    locator: &SectionLocator,
    anchor: &Regex,
    is_anchor: fn(&str) -> bool,
    satellite_window: usize,
) -> Vec<MedicationRecord> {
    let mut records = Vec::new();
    for section in locator.locate(text) {
        let lines = section.lines();
        for (index, line) in lines.iter().enumerate() {
            if !is_anchor(line) {
                continue;
            }
            let Some(caps) = anchor.captures(line) else {
                continue;
            };
            let following = window(&lines, index, satellite_window, is_anchor);
            records.extend(record(&caps, following));
        }
    }
    records
}

/// Extracts medications from all three blocks, in pass order.
pub fn extract_medications(text: &str, satellite_window: usize) -> Vec<MedicationRecord> {
    let mut medications = pass(
        text,
        &PRESCRIPTION,
        &QUANTITY_ANCHOR_RE,
        is_prescription_anchor,
        satellite_window,
    );
    medications.extend(pass(
        text,
        &RECONCILIATION,
        &RECONCILIATION_ANCHOR_RE,
        is_reconciliation_anchor,
        satellite_window,
    ));
    medications.extend(pass(
        text,
        &PLAN,
        &PLAN_BULLET_RE,
        is_plan_anchor,
        satellite_window,
    ));

    tracing::debug!("extracted {} medications", medications.len());
    medications
}
