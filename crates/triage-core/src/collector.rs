//! Paginated collection of patient records.
//!
//! The collector walks the listing one page at a time, starting at page 1,
//! and stops after the first page that does not advertise a successor.
//! Transient failures (network errors, 5xx, 429) are retried on the same
//! page after a fixed backoff; the page counter only advances on success, so
//! the output never skips or repeats a page.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{FetchError, PatientPage, RawPatientRecord, Result, TriageError};
use crate::obs;

/// Source of listing pages.
///
/// Pages are 1-based. Implemented by [`crate::client::ServiceClient`] and by
/// [`crate::fakes::ScriptedPageSource`] in tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> std::result::Result<PatientPage, FetchError>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for &T {
    async fn fetch_page(&self, page: u32) -> std::result::Result<PatientPage, FetchError> {
        (**self).fetch_page(page).await
    }
}

/// Retry behaviour for transient failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between attempts on the same page.
    pub backoff: Duration,
    /// Attempts allowed per page, including the first. `None` retries until
    /// the page succeeds.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Retry forever with the given backoff.
    pub fn unbounded(backoff: Duration) -> Self {
        Self {
            backoff,
            max_attempts: None,
        }
    }

    /// Give up on a page after `max_attempts` attempts (at least one).
    pub fn capped(backoff: Duration, max_attempts: u32) -> Self {
        Self {
            backoff,
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    fn permits(&self, attempts_made: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts_made < max)
    }
}

/// Everything the collector gathered, in page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    pub records: Vec<RawPatientRecord>,
    pub pages_fetched: u32,
    /// Transient failures that were retried.
    pub retries: u32,
    /// Pages whose body had decode problems.
    pub malformed_pages: u32,
}

/// Drives a [`PageSource`] to completion.
pub struct Collector<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S: PageSource> Collector<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// Fetch every page and concatenate the records in request order.
    ///
    /// Errors only with [`TriageError::Rejected`] for a non-transient
    /// status, or [`TriageError::Exhausted`] when a retry cap is configured
    /// and reached.
    pub async fn collect(&self) -> Result<Collection> {
        let mut collection = Collection::default();
        let mut page = 1u32;

        loop {
            let fetched = self.fetch_with_retry(page, &mut collection.retries).await?;

            collection.pages_fetched += 1;
            obs::emit_page_fetched(page, fetched.records.len(), fetched.has_next);

            if fetched.decode_issues > 0 {
                collection.malformed_pages += 1;
                obs::emit_malformed_page(page, fetched.decode_issues);
            }

            collection.records.extend(fetched.records);

            if !fetched.has_next {
                break;
            }
            page += 1;
        }

        obs::emit_collection_finished(
            collection.pages_fetched,
            collection.records.len(),
            collection.retries,
        );
        Ok(collection)
    }

    async fn fetch_with_retry(&self, page: u32, retries: &mut u32) -> Result<PatientPage> {
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let error = match self.source.fetch_page(page).await {
                Ok(fetched) => return Ok(fetched),
                Err(e) if !e.is_transient() => {
                    return Err(TriageError::Rejected { page, source: e });
                }
                Err(e) => e,
            };

            if !self.policy.permits(attempts) {
                return Err(TriageError::Exhausted {
                    page,
                    attempts,
                    last_error: error,
                });
            }

            *retries += 1;
            obs::emit_fetch_retry(page, attempts, self.policy.backoff, &error);
            tokio::time::sleep(self.policy.backoff).await;
        }
    }
}
