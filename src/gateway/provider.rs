use async_trait::async_trait;
use serde_json::Value;

use crate::errors::VulnrecError;
use crate::models::{FindingFilter, JobId, JobStatus, ResultQuery, ResultSet, UploadOptions};

/// Boundary to the analysis service. Every call is independent; the
/// session never holds a lock across one.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Submit a findings document. An equivalent job that already exists
    /// comes back as `SubmissionConflict` carrying its id.
    async fn submit(
        &self,
        document: &Value,
        filter: &FindingFilter,
        options: &UploadOptions,
    ) -> Result<JobId, VulnrecError>;

    async fn check_status(&self, job_id: &JobId) -> Result<JobStatus, VulnrecError>;

    /// Results of a completed job, filtered server-side.
    async fn fetch_results(
        &self,
        job_id: &JobId,
        query: &ResultQuery,
    ) -> Result<ResultSet, VulnrecError>;

    /// A bundled precomputed result set, unfiltered.
    async fn fetch_example(&self, name: &str) -> Result<ResultSet, VulnrecError>;

    /// Gateway name for logging
    fn gateway_name(&self) -> &str;
}
