//! End-to-end assessment runs over the in-memory fakes.

use std::time::Duration;

use serde_json::json;
use triage_core::fakes::{RecordingSubmitter, ScriptedPageSource};
use triage_core::{Assessment, RawPatientRecord, RetryPolicy, TriageError};

fn listing() -> ScriptedPageSource {
    ScriptedPageSource::from_pages(vec![
        vec![
            RawPatientRecord::new("p1", json!(70), json!(101.0), json!("150/95")),
            RawPatientRecord::new("p2", json!("N/A"), json!(98.2), json!("110/70")),
        ],
        vec![
            RawPatientRecord::new("p3", json!(45), json!("99.9"), json!("125/85")),
            RawPatientRecord::new("p4", json!(30), json!(null), json!("INVALID")),
        ],
    ])
}

#[tokio::test(start_paused = true)]
async fn run_submits_all_three_lists() {
    let source = listing();
    source.fail_first(2, 2, 503);
    let submitter = RecordingSubmitter::new();

    let assessment = Assessment::new(&source, RetryPolicy::unbounded(Duration::from_secs(1)));
    let report = assessment.run(&submitter).await.unwrap();

    assert_eq!(report.metrics.records_scored, 4);
    assert_eq!(report.metrics.pages_fetched, 2);
    assert_eq!(report.metrics.fetch_retries, 2);
    assert_eq!(report.metrics.malformed_pages, 0);

    // p3: age 1 + temp 1 + bp max(2, 3) = 5
    assert_eq!(report.classification.high_risk, vec!["p1", "p3"]);
    assert_eq!(report.classification.fever, vec!["p1", "p3"]);
    assert_eq!(report.classification.data_quality, vec!["p2", "p4"]);

    let submissions = submitter.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0], report.classification);

    let receipt = report.receipt.expect("submitted run has a receipt");
    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.body, json!({"success": true}));
}

#[tokio::test(start_paused = true)]
async fn dry_run_does_not_submit() {
    let source = listing();
    let assessment = Assessment::new(&source, RetryPolicy::default());

    let report = assessment.dry_run().await.unwrap();

    assert!(report.receipt.is_none());
    assert_eq!(report.classification.high_risk, vec!["p1", "p3"]);
    assert!(report.finished_at >= report.started_at);
}

#[tokio::test(start_paused = true)]
async fn submission_rejection_is_an_error() {
    let source = listing();
    let submitter = RecordingSubmitter::rejecting(400);

    let assessment = Assessment::new(&source, RetryPolicy::default());
    let err = assessment.run(&submitter).await.unwrap_err();

    assert!(matches!(
        err,
        TriageError::SubmissionRejected { status: 400, .. }
    ));
    assert_eq!(submitter.submissions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn collection_failure_skips_submission() {
    let source = listing();
    source.fail_first(1, 1, 403);
    let submitter = RecordingSubmitter::new();

    let assessment = Assessment::new(&source, RetryPolicy::default());
    let err = assessment.run(&submitter).await.unwrap_err();

    assert!(matches!(err, TriageError::Rejected { page: 1, .. }));
    assert!(submitter.submissions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn report_serializes_with_wire_names() {
    let source = listing();
    let assessment = Assessment::new(&source, RetryPolicy::default());
    let report = assessment.dry_run().await.unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["metrics"]["records_scored"], 4);
    assert_eq!(value["metrics"]["pages_fetched"], 2);
    assert_eq!(
        value["classification"]["data_quality_issues"],
        json!(["p2", "p4"])
    );
    assert!(value["receipt"].is_null());
}
