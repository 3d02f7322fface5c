//! In-memory gateway that replays queued responses and records calls.
//! Used by the test suites; public so integration tests can drive a
//! session without a server.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::errors::VulnrecError;
use crate::models::{FindingFilter, JobId, JobStatus, ResultQuery, ResultSet, UploadOptions};
use super::fixtures::FixtureCatalog;
use super::provider::RemoteGateway;

/// One recorded gateway invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Submit { document: Value, filter: FindingFilter, options: UploadOptions },
    CheckStatus { job_id: JobId },
    FetchResults { job_id: JobId, query: ResultQuery },
    FetchExample { name: String },
}

#[derive(Default)]
struct Script {
    submits: VecDeque<Result<JobId, VulnrecError>>,
    statuses: VecDeque<Result<JobStatus, VulnrecError>>,
    results: VecDeque<Result<ResultSet, VulnrecError>>,
    examples: VecDeque<Result<ResultSet, VulnrecError>>,
}

#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<Script>,
    calls: Mutex<Vec<GatewayCall>>,
    status_delay: Option<Duration>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every status check takes `delay` before answering.
    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    pub async fn push_submit(&self, response: Result<JobId, VulnrecError>) {
        self.script.lock().await.submits.push_back(response);
    }

    pub async fn push_status(&self, response: Result<JobStatus, VulnrecError>) {
        self.script.lock().await.statuses.push_back(response);
    }

    pub async fn push_results(&self, response: Result<ResultSet, VulnrecError>) {
        self.script.lock().await.results.push_back(response);
    }

    /// Override the bundled fixture for the next example fetch.
    pub async fn push_example(&self, response: Result<ResultSet, VulnrecError>) {
        self.script.lock().await.examples.push_back(response);
    }

    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().await.clone()
    }

    pub async fn status_calls(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| matches!(c, GatewayCall::CheckStatus { .. }))
            .count()
    }

    pub async fn fetch_calls(&self) -> Vec<ResultQuery> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                GatewayCall::FetchResults { query, .. } => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, call: GatewayCall) {
        self.calls.lock().await.push(call);
    }
}

fn exhausted(operation: &str) -> VulnrecError {
    VulnrecError::Internal(format!("no scripted response left for {}", operation))
}

#[async_trait]
impl RemoteGateway for ScriptedGateway {
    async fn submit(
        &self,
        document: &Value,
        filter: &FindingFilter,
        options: &UploadOptions,
    ) -> Result<JobId, VulnrecError> {
        self.record(GatewayCall::Submit {
            document: document.clone(),
            filter: filter.clone(),
            options: *options,
        })
        .await;
        let next = self.script.lock().await.submits.pop_front();
        next.unwrap_or_else(|| Err(exhausted("submit")))
    }

    async fn check_status(&self, job_id: &JobId) -> Result<JobStatus, VulnrecError> {
        self.record(GatewayCall::CheckStatus { job_id: job_id.clone() }).await;
        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().await.statuses.pop_front();
        next.unwrap_or_else(|| Err(exhausted("check_status")))
    }

    async fn fetch_results(&self, job_id: &JobId, query: &ResultQuery) -> Result<ResultSet, VulnrecError> {
        self.record(GatewayCall::FetchResults { job_id: job_id.clone(), query: query.clone() }).await;
        let next = self.script.lock().await.results.pop_front();
        next.unwrap_or_else(|| Err(exhausted("fetch_results")))
    }

    async fn fetch_example(&self, name: &str) -> Result<ResultSet, VulnrecError> {
        self.record(GatewayCall::FetchExample { name: name.to_string() }).await;
        let next = self.script.lock().await.examples.pop_front();
        match next {
            Some(response) => response,
            None => FixtureCatalog.load(name),
        }
    }

    fn gateway_name(&self) -> &str {
        "scripted"
    }
}
