//! HTTP client for the assessment service.
//!
//! Two endpoints are used:
//! - `GET {base_url}/patients?page=N` for the listing
//! - `POST {base_url}/submit-assessment` for the result
//!
//! Every request carries the static `x-api-key` header.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::collector::PageSource;
use crate::domain::{ClassificationSet, FetchError, PatientPage, Result, TriageError};
use crate::pipeline::{AssessmentSubmitter, SubmissionReceipt};

pub const DEFAULT_BASE_URL: &str = "https://assessment.ksensetech.com/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const API_KEY_HEADER: &str = "x-api-key";

/// Connection settings for the assessment service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    /// Static credential sent as `x-api-key`
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ServiceConfig {
    /// Create config for a specific server.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        ServiceConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read `TRIAGE_BASE_URL`, `TRIAGE_API_KEY` and `TRIAGE_TIMEOUT_SECS`.
    ///
    /// Only the API key is mandatory.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("TRIAGE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = lookup("TRIAGE_API_KEY")
            .ok_or_else(|| TriageError::Config("TRIAGE_API_KEY is not set".to_string()))?;

        let mut config = Self::new(&base_url, &api_key);
        if let Some(raw) = lookup("TRIAGE_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| {
                TriageError::Config(format!("TRIAGE_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject configurations that cannot possibly work.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(TriageError::Config("api key must not be empty".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(TriageError::Config(format!(
                "base url must be http(s): {}",
                self.base_url
            )));
        }
        Ok(())
    }

    pub fn patients_url(&self, page: u32) -> String {
        format!("{}/patients?page={}", self.base_url, page)
    }

    pub fn submit_url(&self) -> String {
        format!("{}/submit-assessment", self.base_url)
    }
}

/// reqwest-backed client for both endpoints.
pub struct ServiceClient {
    config: ServiceConfig,
    http_client: reqwest::Client,
}

impl ServiceClient {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("vitals-triage/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(ServiceClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[async_trait]
impl PageSource for ServiceClient {
    async fn fetch_page(&self, page: u32) -> std::result::Result<PatientPage, FetchError> {
        let url = self.config.patients_url(page);
        debug!(page, url = %url, "requesting listing page");

        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(PatientPage::decode(&body))
    }
}

#[async_trait]
impl AssessmentSubmitter for ServiceClient {
    async fn submit(&self, classification: &ClassificationSet) -> Result<SubmissionReceipt> {
        let url = self.config.submit_url();
        debug!(url = %url, "submitting assessment");

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(classification)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            return Err(TriageError::SubmissionRejected { status, body: text });
        }

        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(SubmissionReceipt { status, body })
    }
}
