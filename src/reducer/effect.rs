use serde_json::Value;

use crate::models::{FindingFilter, JobId, ResultQuery, UploadOptions};
use super::intent::FetchPurpose;

/// Side effects requested by a transition. The session driver performs
/// them and feeds the outcome back as an [`Event`](super::Event).
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Submit {
        epoch: u64,
        document: Value,
        filter: FindingFilter,
        options: UploadOptions,
    },
    StartPolling {
        epoch: u64,
        job_id: JobId,
    },
    StopPolling,
    CheckStatus {
        epoch: u64,
        job_id: JobId,
    },
    FetchResults {
        epoch: u64,
        job_id: JobId,
        query: ResultQuery,
        purpose: FetchPurpose,
    },
    FetchExample {
        epoch: u64,
        name: String,
    },
}
