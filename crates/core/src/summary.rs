//! Quantitative billing summary over an extracted document.

use crate::constants::NOT_AVAILABLE;
use crate::records::{AggregatedDocument, StudyOrder};
use hc_types::NonEmptyText;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientHeadline {
    pub nombre: String,
    pub documento: String,
    pub afiliacion: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayTotals {
    /// Sum of the stays whose length could be computed.
    pub total_dias: i64,
    pub num_estancias: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformedCount {
    pub total: usize,
    pub realizados: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationCount {
    pub total: usize,
    pub aplicados: usize,
}

/// Counts an auditor checks before billing a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSummary {
    pub paciente: PatientHeadline,
    pub estancias: StayTotals,
    pub procedimientos: PerformedCount,
    pub medicamentos: MedicationCount,
    pub laboratorios: PerformedCount,
    pub imagenes: PerformedCount,
    pub diagnosticos: usize,
}

fn or_not_available(value: &Option<NonEmptyText>) -> String {
    value
        .as_ref()
        .map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.as_str().to_string())
}

fn studies(orders: &[StudyOrder]) -> PerformedCount {
    PerformedCount {
        total: orders.len(),
        realizados: orders.iter().filter(|o| o.realizado).count(),
    }
}

impl BillingSummary {
    pub fn from_document(document: &AggregatedDocument) -> Self {
        let paciente = &document.paciente;

        Self {
            paciente: PatientHeadline {
                nombre: or_not_available(&paciente.nombre),
                documento: or_not_available(&paciente.documento),
                afiliacion: or_not_available(&paciente.afiliacion),
            },
            estancias: StayTotals {
                total_dias: document
                    .estancias
                    .iter()
                    .filter_map(|stay| stay.dias_estancia)
                    .sum(),
                num_estancias: document.estancias.len(),
            },
            procedimientos: PerformedCount {
                total: document.procedimientos.len(),
                realizados: document
                    .procedimientos
                    .iter()
                    .filter(|p| p.realizado)
                    .count(),
            },
            medicamentos: MedicationCount {
                total: document.medicamentos.len(),
                aplicados: document.medicamentos.iter().filter(|m| m.realizado).count(),
            },
            laboratorios: studies(&document.laboratorios),
            imagenes: studies(&document.imagenes),
            diagnosticos: document.diagnosticos.len(),
        }
    }
}
