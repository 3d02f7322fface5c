use super::types::VulnrecError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl VulnrecError {
    /// Classify this error to determine its type and whether the gateway may retry it.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Transport failures are worth another attempt
            VulnrecError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                retryable: true,
            },
            VulnrecError::Timeout(_) => ErrorClassification {
                error_type: "TimeoutError",
                retryable: true,
            },
            VulnrecError::Http { status, .. } if *status == 429 => ErrorClassification {
                error_type: "RateLimitError",
                retryable: true,
            },
            VulnrecError::Http { status, .. } if *status >= 500 => ErrorClassification {
                error_type: "ServerError",
                retryable: true,
            },
            VulnrecError::Http { .. } => ErrorClassification {
                error_type: "ClientError",
                retryable: false,
            },

            // Domain outcomes are final
            VulnrecError::SubmissionConflict { .. } => ErrorClassification {
                error_type: "SubmissionConflict",
                retryable: false,
            },
            VulnrecError::SubmissionFailure(_) => ErrorClassification {
                error_type: "SubmissionFailure",
                retryable: false,
            },
            VulnrecError::PollingFailure(_) => ErrorClassification {
                error_type: "PollingFailure",
                retryable: false,
            },
            VulnrecError::FetchFailure(_) => ErrorClassification {
                error_type: "FetchFailure",
                retryable: false,
            },
            VulnrecError::InvalidTransition { .. } => ErrorClassification {
                error_type: "InvalidTransition",
                retryable: false,
            },
            VulnrecError::InvalidFilter(_) => ErrorClassification {
                error_type: "InvalidFilter",
                retryable: false,
            },
            VulnrecError::PollingAlreadyActive { .. } => ErrorClassification {
                error_type: "PollingAlreadyActive",
                retryable: false,
            },
            VulnrecError::Session { kind, .. } => ErrorClassification {
                error_type: *kind,
                retryable: false,
            },
            VulnrecError::InvalidDocument(_) => ErrorClassification {
                error_type: "InvalidDocument",
                retryable: false,
            },
            VulnrecError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            VulnrecError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: false,
            },
            VulnrecError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            VulnrecError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },
            VulnrecError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: false,
            },
        }
    }
}
