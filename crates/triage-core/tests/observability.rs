//! Observability tests for the assessment lifecycle.
//!
//! These verify that structured events are emitted through `tracing` during
//! collection and classification.

use std::time::Duration;

use serde_json::json;
use tracing_test::traced_test;
use triage_core::fakes::ScriptedPageSource;
use triage_core::{
    emit_assessment_finished, emit_classified, emit_fetch_retry, emit_submitted, Assessment,
    FetchError, RawPatientRecord, RetryPolicy,
};

#[traced_test]
#[test]
fn test_emit_fetch_retry_logs_page_and_error() {
    let error = FetchError::Status {
        status: 503,
        body: "unavailable".to_string(),
    };
    emit_fetch_retry(4, 2, Duration::from_secs(1), &error);

    assert!(logs_contain("collection.retry"));
    assert!(logs_contain("503"));
}

#[traced_test]
#[test]
fn test_emit_classified_and_finished() {
    emit_classified(3, 2, 1);
    emit_submitted(200);
    emit_assessment_finished(1500, 10, true);

    assert!(logs_contain("assessment.classified"));
    assert!(logs_contain("assessment.submitted"));
    assert!(logs_contain("assessment.finished"));
}

#[traced_test]
#[tokio::test(start_paused = true)]
async fn test_dry_run_emits_collection_events() {
    let source = ScriptedPageSource::from_pages(vec![vec![RawPatientRecord::new(
        "p1",
        json!(40),
        json!(98.6),
        json!("118/76"),
    )]]);
    source.fail_first(1, 1, 500);

    let assessment = Assessment::new(&source, RetryPolicy::default());
    assessment.dry_run().await.unwrap();

    assert!(logs_contain("collection.retry"));
    assert!(logs_contain("collection.page_fetched"));
    assert!(logs_contain("collection.finished"));
    assert!(logs_contain("triage.assessment"));
    assert!(logs_contain("collect_ms"));
    assert!(logs_contain("records_scored=1"));
}
