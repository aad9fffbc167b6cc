//! Assessment pipeline: collect, score, classify, submit.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::collector::{Collector, PageSource, RetryPolicy};
use crate::domain::{ClassificationSet, RawPatientRecord, Result, ScoreResult};
use crate::metrics::RunMetrics;
use crate::obs;
use crate::scorer::score;

/// Destination for the finished classification.
#[async_trait]
pub trait AssessmentSubmitter: Send + Sync {
    async fn submit(&self, classification: &ClassificationSet) -> Result<SubmissionReceipt>;
}

/// What the service answered to a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub status: u16,
    /// Response body; plain text bodies are kept as a JSON string.
    pub body: Value,
}

/// A record's identifier next to its score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredPatient {
    pub patient_id: String,
    #[serde(flatten)]
    pub score: ScoreResult,
}

/// Score every record, keeping input order.
pub fn score_all(records: &[RawPatientRecord]) -> Vec<ScoredPatient> {
    records
        .iter()
        .map(|r| ScoredPatient {
            patient_id: r.patient_id.clone(),
            score: score(r),
        })
        .collect()
}

/// Bucket scored patients into the three output lists.
pub fn classify(scored: &[ScoredPatient]) -> ClassificationSet {
    let mut set = ClassificationSet::new();
    for patient in scored {
        set.record(&patient.patient_id, &patient.score);
    }
    set
}

/// Outcome of one assessment run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub metrics: RunMetrics,
    pub classification: ClassificationSet,
    /// `None` for dry runs.
    pub receipt: Option<SubmissionReceipt>,
}

/// One batch assessment against a page source.
pub struct Assessment<S> {
    collector: Collector<S>,
}

impl<S: PageSource> Assessment<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self {
            collector: Collector::new(source, policy),
        }
    }

    /// Collect, classify and submit.
    pub async fn run(&self, submitter: &dyn AssessmentSubmitter) -> Result<AssessmentReport> {
        self.execute(Some(submitter)).await
    }

    /// Collect and classify without submitting.
    pub async fn dry_run(&self) -> Result<AssessmentReport> {
        self.execute(None).await
    }

    async fn execute(
        &self,
        submitter: Option<&dyn AssessmentSubmitter>,
    ) -> Result<AssessmentReport> {
        let run_id = Uuid::new_v4();
        let span = obs::assessment_span(&run_id.to_string());
        self.execute_in_span(run_id, submitter).instrument(span).await
    }

    async fn execute_in_span(
        &self,
        run_id: Uuid,
        submitter: Option<&dyn AssessmentSubmitter>,
    ) -> Result<AssessmentReport> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let collection = self.collector.collect().await?;
        let mut metrics =
            RunMetrics::from_collection(&collection, clock.elapsed().as_millis() as u64);

        let scored = score_all(&collection.records);
        metrics.records_scored = scored.len();
        let classification = classify(&scored);
        obs::emit_classified(
            classification.high_risk.len(),
            classification.fever.len(),
            classification.data_quality.len(),
        );

        let receipt = match submitter {
            Some(submitter) => {
                let receipt = submitter.submit(&classification).await?;
                obs::emit_submitted(receipt.status);
                Some(receipt)
            }
            None => None,
        };

        metrics.duration_ms = clock.elapsed().as_millis() as u64;
        obs::emit_assessment_finished(
            metrics.duration_ms,
            metrics.records_scored,
            receipt.is_some(),
        );
        metrics.emit();

        Ok(AssessmentReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            metrics,
            classification,
            receipt,
        })
    }
}
