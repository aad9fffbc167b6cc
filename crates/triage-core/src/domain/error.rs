//! Error taxonomy for the triage pipeline.

/// Failure of a single listing request.
///
/// The collector only needs to know whether a failure is worth retrying;
/// see [`FetchError::is_transient`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

impl FetchError {
    /// Network errors, 5xx responses and 429 rate-limit responses.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => *status == 429 || (500..600).contains(status),
        }
    }
}

/// Triage domain errors.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http client error: {0}")]
    Http(String),

    #[error("page {page} rejected by server: {source}")]
    Rejected {
        page: u32,
        #[source]
        source: FetchError,
    },

    #[error("page {page} still failing after {attempts} attempts: {last_error}")]
    Exhausted {
        page: u32,
        attempts: u32,
        last_error: FetchError,
    },

    #[error("submission rejected with status {status}: {body}")]
    SubmissionRejected { status: u16, body: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for TriageError {
    fn from(err: reqwest::Error) -> Self {
        TriageError::Http(err.to_string())
    }
}

/// Result type for triage operations.
pub type Result<T> = std::result::Result<T, TriageError>;
