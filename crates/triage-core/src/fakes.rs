//! In-memory fakes for the pipeline traits (testing only)
//!
//! Provides `ScriptedPageSource` and `RecordingSubmitter`, which satisfy the
//! trait contracts without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::collector::PageSource;
use crate::domain::{
    ClassificationSet, FetchError, PatientPage, RawPatientRecord, Result, TriageError,
};
use crate::pipeline::{AssessmentSubmitter, SubmissionReceipt};

type PageOutcome = std::result::Result<PatientPage, FetchError>;

// ---------------------------------------------------------------------------
// ScriptedPageSource
// ---------------------------------------------------------------------------

/// Page source that replays a script of outcomes per page number.
///
/// Outcomes for a page are consumed in order; the last one repeats once the
/// script runs out. Unscripted pages answer with a 404.
#[derive(Debug, Default)]
pub struct ScriptedPageSource {
    script: Mutex<HashMap<u32, VecDeque<PageOutcome>>>,
    requests: Mutex<Vec<u32>>,
}

impl ScriptedPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a clean listing from record batches, one batch per page.
    pub fn from_pages(pages: Vec<Vec<RawPatientRecord>>) -> Self {
        let source = Self::new();
        let last = pages.len();
        for (index, records) in pages.into_iter().enumerate() {
            let page = index as u32 + 1;
            source.push(page, Ok(PatientPage::new(records, index + 1 < last)));
        }
        source
    }

    /// Append an outcome to the script for `page`.
    pub fn push(&self, page: u32, outcome: PageOutcome) {
        self.script
            .lock()
            .unwrap()
            .entry(page)
            .or_default()
            .push_back(outcome);
    }

    /// Queue `count` failures with `status` ahead of whatever is scripted for `page`.
    pub fn fail_first(&self, page: u32, count: usize, status: u16) {
        let mut script = self.script.lock().unwrap();
        let queue = script.entry(page).or_default();
        for _ in 0..count {
            queue.push_front(Err(FetchError::Status {
                status,
                body: "scripted failure".to_string(),
            }));
        }
    }

    /// Page numbers requested so far, in order.
    pub fn requests(&self) -> Vec<u32> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for ScriptedPageSource {
    async fn fetch_page(&self, page: u32) -> PageOutcome {
        self.requests.lock().unwrap().push(page);

        let mut script = self.script.lock().unwrap();
        let Some(queue) = script.get_mut(&page) else {
            return Err(FetchError::Status {
                status: 404,
                body: format!("page {page} not scripted"),
            });
        };

        match queue.len() {
            0 => Err(FetchError::Status {
                status: 404,
                body: format!("page {page} not scripted"),
            }),
            1 => queue[0].clone(),
            _ => queue.pop_front().unwrap(),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingSubmitter
// ---------------------------------------------------------------------------

/// Submitter that stores every payload and answers with a canned receipt.
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    submissions: Mutex<Vec<ClassificationSet>>,
    reject_with: Option<u16>,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submitter that rejects every payload with `status`.
    pub fn rejecting(status: u16) -> Self {
        Self {
            submissions: Mutex::default(),
            reject_with: Some(status),
        }
    }

    pub fn submissions(&self) -> Vec<ClassificationSet> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssessmentSubmitter for RecordingSubmitter {
    async fn submit(&self, classification: &ClassificationSet) -> Result<SubmissionReceipt> {
        self.submissions
            .lock()
            .unwrap()
            .push(classification.clone());

        if let Some(status) = self.reject_with {
            return Err(TriageError::SubmissionRejected {
                status,
                body: "scripted rejection".to_string(),
            });
        }

        Ok(SubmissionReceipt {
            status: 200,
            body: json!({"success": true}),
        })
    }
}
