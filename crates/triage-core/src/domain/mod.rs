//! Domain models for the triage pipeline.
//!
//! - `RawPatientRecord` / `PatientPage`: untrusted input from the listing endpoint
//! - `ScoreResult`: per-record rubric outcome
//! - `ClassificationSet`: the three output lists, also the submission payload

pub mod assessment;
pub mod error;
pub mod patient;

pub use assessment::{ClassificationSet, ScoreResult, HIGH_RISK_THRESHOLD};
pub use error::{FetchError, Result, TriageError};
pub use patient::{PatientPage, RawPatientRecord};
