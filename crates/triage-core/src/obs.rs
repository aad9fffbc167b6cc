//! Structured observability hooks for the assessment lifecycle.
//!
//! This module provides:
//! - A run-scoped tracing span via `assessment_span`
//! - Emission functions for collection and submission events
//!
//! Events are emitted at `info!` level except retries and decode problems,
//! which are `warn!`. Filtering follows `RUST_LOG`.

use std::time::Duration;

use tracing::{info, warn, Span};

use crate::domain::FetchError;

/// Span tagged with the run id, wrapping one whole assessment.
///
/// # Example
///
/// ```ignore
/// use tracing::Instrument;
/// assessment.execute().instrument(assessment_span(&run_id)).await
/// ```
pub fn assessment_span(run_id: &str) -> Span {
    tracing::info_span!("triage.assessment", run_id = %run_id)
}

/// Emit event: one listing page decoded.
pub fn emit_page_fetched(page: u32, records: usize, has_next: bool) {
    info!(
        event = "collection.page_fetched",
        page = page,
        records = records,
        has_next = has_next,
    );
}

/// Emit event: a transient failure will be retried after `backoff`.
pub fn emit_fetch_retry(page: u32, attempt: u32, backoff: Duration, error: &FetchError) {
    warn!(
        event = "collection.retry",
        page = page,
        attempt = attempt,
        backoff_ms = backoff.as_millis() as u64,
        error = %error,
    );
}

/// Emit event: a page body had decode problems.
pub fn emit_malformed_page(page: u32, decode_issues: usize) {
    warn!(
        event = "collection.malformed_page",
        page = page,
        decode_issues = decode_issues,
    );
}

/// Emit event: collection reached the final page.
pub fn emit_collection_finished(pages: u32, records: usize, retries: u32) {
    info!(
        event = "collection.finished",
        pages = pages,
        records = records,
        retries = retries,
    );
}

/// Emit event: all records scored and bucketed.
pub fn emit_classified(high_risk: usize, fever: usize, data_quality: usize) {
    info!(
        event = "assessment.classified",
        high_risk = high_risk,
        fever = fever,
        data_quality = data_quality,
    );
}

/// Emit event: submission accepted by the service.
pub fn emit_submitted(status: u16) {
    info!(event = "assessment.submitted", status = status);
}

/// Emit event: assessment finished with duration and whether it was submitted.
pub fn emit_assessment_finished(duration_ms: u64, records: usize, submitted: bool) {
    info!(
        event = "assessment.finished",
        duration_ms = duration_ms,
        records = records,
        submitted = submitted,
    );
}
