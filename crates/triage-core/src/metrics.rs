//! Per-run counters for one assessment.
//!
//! Filled in as the run progresses, attached to the
//! [`AssessmentReport`](crate::pipeline::AssessmentReport) and emitted once
//! as a single `tracing::info!` event.

use serde::Serialize;

use crate::collector::Collection;

/// Snapshot of what one assessment run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunMetrics {
    pub pages_fetched: u32,
    /// Transient page failures that were retried.
    pub fetch_retries: u32,
    pub malformed_pages: u32,
    pub records_scored: usize,
    /// Wall time spent collecting, retries and backoff included.
    pub collect_ms: u64,
    pub duration_ms: u64,
}

impl RunMetrics {
    pub fn from_collection(collection: &Collection, collect_ms: u64) -> Self {
        Self {
            pages_fetched: collection.pages_fetched,
            fetch_retries: collection.retries,
            malformed_pages: collection.malformed_pages,
            records_scored: 0,
            collect_ms,
            duration_ms: 0,
        }
    }

    /// Emit every counter as one `info!` event.
    pub fn emit(&self) {
        tracing::info!(
            metric = "assessment",
            pages_fetched = self.pages_fetched,
            fetch_retries = self.fetch_retries,
            malformed_pages = self.malformed_pages,
            records_scored = self.records_scored,
            collect_ms = self.collect_ms,
            duration_ms = self.duration_ms,
        );
    }
}
