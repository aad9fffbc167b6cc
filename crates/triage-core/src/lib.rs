//! Triage Core Library
//!
//! Collects patient records from the paginated assessment service, scores
//! each one under a fixed clinical rubric, and submits the resulting
//! classification.
//!
//! ## Layers
//!
//! - `scorer` / `coerce`: pure, total scoring of untrusted records
//! - `collector`: page-ordered retrieval with retry on transient failure
//! - `client`: reqwest transport for the listing and submission endpoints
//! - `pipeline`: orchestration of one assessment run

pub mod client;
pub mod coerce;
pub mod collector;
pub mod domain;
pub mod fakes;
pub mod metrics;
pub mod obs;
pub mod pipeline;
pub mod scorer;
pub mod telemetry;

pub use client::{ServiceClient, ServiceConfig, DEFAULT_BASE_URL};
pub use coerce::{coerce_float, coerce_integer, Coerced};
pub use collector::{Collection, Collector, PageSource, RetryPolicy};
pub use domain::{
    ClassificationSet, FetchError, PatientPage, RawPatientRecord, Result, ScoreResult,
    TriageError, HIGH_RISK_THRESHOLD,
};
pub use pipeline::{
    classify, score_all, Assessment, AssessmentReport, AssessmentSubmitter, ScoredPatient,
    SubmissionReceipt,
};
pub use scorer::{score, FEVER_THRESHOLD_F};

pub use metrics::RunMetrics;
pub use obs::{
    assessment_span, emit_assessment_finished, emit_classified, emit_collection_finished,
    emit_fetch_retry, emit_malformed_page, emit_page_fetched, emit_submitted,
};
pub use telemetry::init_tracing;
