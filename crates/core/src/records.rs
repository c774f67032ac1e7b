//! Extracted record types and the document-level aggregate.
//!
//! Serialised field names are the Spanish names used by the billing exports and must not be
//! renamed. Absent values serialise as `null`, except on [`PatientIdentity`] whose absent
//! fields are omitted so an unidentified patient renders as `{}`.
//!
//! Deserialisation is deliberately lenient (numbers for strings, empty strings for absent
//! values) because the only producer of serialised documents besides this crate is an external
//! text generator.

use hc_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// Patient identity block. Every field may be absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub documento: Option<NonEmptyText>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub nombre: Option<NonEmptyText>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub fecha_nacimiento: Option<NonEmptyText>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::age")]
    pub edad: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub telefono: Option<NonEmptyText>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub direccion: Option<NonEmptyText>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub afiliacion: Option<NonEmptyText>,
}

impl PatientIdentity {
    /// `true` when no identity field was found.
    pub fn is_empty(&self) -> bool {
        self == &PatientIdentity::default()
    }
}

/// One attention episode announced by a site header line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEncounter {
    #[serde(default, deserialize_with = "lenient::text")]
    pub sede_codigo: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub sede_nombre: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub tipo_atencion: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha_ingreso: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hora_ingreso: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha_egreso: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hora_egreso: Option<NonEmptyText>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosisRole {
    Principal,
    #[serde(alias = "secondary")]
    Secundario,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    #[serde(default, deserialize_with = "lenient::text")]
    pub codigo: Option<NonEmptyText>,
    #[serde(deserialize_with = "lenient::required_text")]
    pub descripcion: NonEmptyText,
    pub tipo: DiagnosisRole,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRecord {
    #[serde(default = "lenient::default_quantity", deserialize_with = "lenient::quantity")]
    pub cantidad: NonEmptyText,
    #[serde(deserialize_with = "lenient::required_text")]
    pub descripcion: NonEmptyText,
    #[serde(default, deserialize_with = "lenient::text")]
    pub dosis: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub via: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub frecuencia: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub estado: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub realizado: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha_aplicacion: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hora_aplicacion: Option<NonEmptyText>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureKind {
    Quirurgico,
    NoQuirurgico,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureRecord {
    pub tipo: ProcedureKind,
    #[serde(default = "lenient::default_quantity", deserialize_with = "lenient::quantity")]
    pub cantidad: NonEmptyText,
    #[serde(deserialize_with = "lenient::required_text")]
    pub descripcion: NonEmptyText,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hora: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub realizado: bool,
}

/// A member of the surgical team listed in a surgery description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default, deserialize_with = "lenient::text")]
    pub codigo: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub nombre: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub tipo: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub participo: Option<NonEmptyText>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurgeryRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub diagnostico_pre: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub diagnostico_post: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub anestesia: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hora_inicio: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hora_fin: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub descripcion: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub tejidos_patologia: Option<NonEmptyText>,
    #[serde(default)]
    pub participantes: Vec<Participant>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub realizado: bool,
}

/// A laboratory or imaging order, with its result when one was reported.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyOrder {
    #[serde(default = "lenient::default_quantity", deserialize_with = "lenient::quantity")]
    pub cantidad: NonEmptyText,
    #[serde(deserialize_with = "lenient::required_text")]
    pub descripcion: NonEmptyText,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha_orden: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha_realizacion: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub resultado: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub realizado: bool,
}

pub type LabOrder = StudyOrder;
pub type ImagingOrder = StudyOrder;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interconsultation {
    #[serde(deserialize_with = "lenient::required_text")]
    pub especialidad: NonEmptyText,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha_orden: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha_realizacion: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub realizado: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressNote {
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub medico: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub texto: Option<NonEmptyText>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DischargeNote {
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub estado_salida: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub resumen: Option<NonEmptyText>,
}

/// Stay derived from a service encounter's admission and discharge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    #[serde(default, deserialize_with = "lenient::text")]
    pub servicio: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha_ingreso: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hora_ingreso: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fecha_egreso: Option<NonEmptyText>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hora_egreso: Option<NonEmptyText>,
    #[serde(default)]
    pub dias_estancia: Option<i64>,
}

/// Everything extracted from one document.
///
/// Built once per source document by [`crate::DocumentExtractor`] and handed unchanged to the
/// summariser, the exporters and the narrative prompt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatedDocument {
    pub paciente: PatientIdentity,
    pub servicios: Vec<ServiceEncounter>,
    pub diagnosticos: Vec<Diagnosis>,
    pub medicamentos: Vec<MedicationRecord>,
    pub procedimientos: Vec<ProcedureRecord>,
    pub cirugias: Vec<SurgeryRecord>,
    pub laboratorios: Vec<LabOrder>,
    pub imagenes: Vec<ImagingOrder>,
    pub interconsultas: Vec<Interconsultation>,
    pub evoluciones: Vec<ProgressNote>,
    pub altas: Vec<DischargeNote>,
    pub estancias: Vec<Stay>,
}

mod lenient {
    use crate::constants::DEFAULT_QUANTITY;
    use hc_types::NonEmptyText;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn value_text(value: Value) -> Option<NonEmptyText> {
        match value {
            Value::String(s) => NonEmptyText::optional(s),
            Value::Number(n) => NonEmptyText::optional(n.to_string()),
            Value::Bool(b) => NonEmptyText::optional(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<NonEmptyText>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(value_text))
    }

    pub fn required_text<'de, D>(deserializer: D) -> Result<NonEmptyText, D::Error>
    where
        D: Deserializer<'de>,
    {
        text(deserializer)?.ok_or_else(|| serde::de::Error::custom("value cannot be empty"))
    }

    pub fn default_quantity() -> NonEmptyText {
        NonEmptyText::new(DEFAULT_QUANTITY).expect("default quantity is non-empty")
    }

    pub fn quantity<'de, D>(deserializer: D) -> Result<NonEmptyText, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(text(deserializer)?.unwrap_or_else(default_quantity))
    }

    pub fn age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Some(Value::String(s)) => s
                .split_whitespace()
                .next()
                .and_then(|digits| digits.parse().ok()),
            _ => None,
        })
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => matches!(
                s.trim().to_lowercase().as_str(),
                "true" | "si" | "sí" | "yes" | "1"
            ),
            Some(Value::Number(n)) => n.as_u64().is_some_and(|n| n > 0),
            _ => false,
        })
    }
}
