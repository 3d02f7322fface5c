use thiserror::Error;

use crate::models::job::JobId;
use crate::store::state::Phase;

#[derive(Debug, Error)]
pub enum VulnrecError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Analysis job already exists: {job_id}")]
    SubmissionConflict { job_id: JobId },

    #[error("Submission failed: {0}")]
    SubmissionFailure(String),

    #[error("Polling failed: {0}")]
    PollingFailure(String),

    #[error("Fetching results failed: {0}")]
    FetchFailure(String),

    #[error("Intent '{intent}' is not accepted while {phase}")]
    InvalidTransition { intent: &'static str, phase: Phase },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("A polling loop is already active for job {job_id}")]
    PollingAlreadyActive { job_id: JobId },

    /// A failure the session recorded in its state, surfaced to a view.
    /// `kind` is the classification of the underlying cause.
    #[error("{message}")]
    Session { kind: &'static str, message: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VulnrecError {
    /// Map a transport failure from reqwest onto the crate taxonomy.
    pub fn from_transport(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VulnrecError::Timeout(format!("{}: {}", context, err))
        } else if err.is_decode() {
            VulnrecError::Internal(format!("{}: undecodable response: {}", context, err))
        } else {
            VulnrecError::Network(format!("{}: {}", context, err))
        }
    }
}
