//! Pattern-based field extractors.
//!
//! Every extractor reads normalised text and is total: a document without the expected
//! sections yields an empty sequence (or an empty [`crate::PatientIdentity`]). Extractors are
//! independent of each other; only the procedure date backfill looks outside its own section.

mod diagnoses;
mod interconsultations;
mod medications;
mod notes;
mod orders;
mod patient;
mod procedures;
mod services;
mod surgeries;

pub use diagnoses::extract_diagnoses;
pub use interconsultations::extract_interconsultations;
pub use medications::extract_medications;
pub use notes::{extract_discharge_notes, extract_progress_notes};
pub use orders::{extract_imaging_orders, extract_lab_orders};
pub use patient::extract_patient;
pub use procedures::extract_procedures;
pub use services::extract_services;
pub use surgeries::extract_surgeries;
