use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::errors::{with_retry, RetryConfig, VulnrecError};
use crate::models::{
    AggregatedSolution, Finding, FindingFilter, JobId, JobStatus, Pagination, ResultQuery,
    ResultSet, UploadOptions,
};
use super::fixtures::FixtureCatalog;
use super::provider::RemoteGateway;

/// Gateway speaking the analysis service's v1 JSON API.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    user_id: u64,
    retry: RetryConfig,
    catalog: FixtureCatalog,
}

#[derive(Deserialize)]
struct SubmitResponse {
    task_id: JobId,
}

#[derive(Deserialize)]
struct TaskEntry {
    id: JobId,
    #[serde(default)]
    created_at: Option<String>,
}

/// Outcome of one upload attempt. A duplicate without an id in the body
/// is resolved against the task list after the retry loop.
enum Submission {
    Accepted(Value),
    Duplicate(String),
}

#[derive(Deserialize)]
struct StatusResponse {
    status: JobStatus,
}

#[derive(Deserialize)]
struct RecommendationsResponse {
    #[serde(default)]
    items: Vec<Finding>,
    #[serde(default)]
    aggregated_solutions: Option<Vec<AggregatedSolution>>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct AggregatedResponse {
    #[serde(default)]
    items: Vec<AggregatedSolution>,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, VulnrecError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| VulnrecError::Config(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            user_id: config.api.user_id,
            retry: config.retry_config(),
            catalog: FixtureCatalog,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<(StatusCode, Value), VulnrecError> {
        let resp = request
            .send()
            .await
            .map_err(|e| VulnrecError::from_transport(context, e))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| VulnrecError::from_transport(context, e))?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        debug!(context, status = status.as_u16(), "Gateway response");
        Ok((status, body))
    }

    async fn submit_once(&self, body: &Value) -> Result<Submission, VulnrecError> {
        let (status, payload) = self
            .send(self.client.post(self.url("upload/")).json(body), "submit")
            .await?;

        if status.is_success() {
            return Ok(Submission::Accepted(payload));
        }
        let message = error_detail(&payload);
        let conflict = status == StatusCode::CONFLICT
            || (status == StatusCode::BAD_REQUEST && message.contains("already exists"));
        if conflict {
            return match existing_job_id(&payload) {
                Some(job_id) => Err(VulnrecError::SubmissionConflict { job_id }),
                None => Ok(Submission::Duplicate(message)),
            };
        }
        Err(VulnrecError::Http { status: status.as_u16(), message })
    }

    /// The service refuses a second upload on the same day without naming
    /// the task it already has; that task is the newest one created today.
    async fn resolve_duplicate(&self, message: String) -> VulnrecError {
        let result = with_retry("list_tasks", &self.retry, || async {
            let (status, payload) = self.send(self.client.get(self.url("tasks/")), "list_tasks").await?;
            if status.is_success() {
                Ok(payload)
            } else {
                Err(VulnrecError::Http { status: status.as_u16(), message: error_detail(&payload) })
            }
        })
        .await;

        let parsed = result.and_then(|payload| Ok(serde_json::from_value::<Vec<TaskEntry>>(payload)?));
        let tasks = match parsed {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "Could not list tasks to resolve duplicate submission");
                return VulnrecError::SubmissionFailure(message);
            }
        };
        match todays_task(tasks, Local::now().date_naive()) {
            Some(job_id) => {
                info!(job_id = %job_id, "Reusing analysis job already created today");
                VulnrecError::SubmissionConflict { job_id }
            }
            None => VulnrecError::SubmissionFailure(message),
        }
    }

    async fn status_once(&self, job_id: &JobId) -> Result<Value, VulnrecError> {
        let url = self.url(&format!("tasks/{}/status", job_id));
        let (status, payload) = self.send(self.client.get(url), "check_status").await?;
        if status.is_success() {
            Ok(payload)
        } else {
            Err(VulnrecError::Http { status: status.as_u16(), message: error_detail(&payload) })
        }
    }

    async fn post_once(&self, path: &str, body: &Value, context: &str) -> Result<Option<Value>, VulnrecError> {
        let (status, payload) = self
            .send(self.client.post(self.url(path)).json(body), context)
            .await?;
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status.is_success() {
            Ok(Some(payload))
        } else {
            Err(VulnrecError::Http { status: status.as_u16(), message: error_detail(&payload) })
        }
    }

    /// Aggregated solutions live behind their own endpoint when the
    /// recommendations response does not inline them.
    async fn fetch_aggregated(
        &self,
        job_id: &JobId,
        filter: &FindingFilter,
    ) -> Result<Vec<AggregatedSolution>, VulnrecError> {
        let body = json!({
            "user_id": self.user_id,
            "filter": { "task_id": job_id },
        });
        let result = with_retry("fetch_aggregated", &self.retry, || {
            self.post_once("recommendations/aggregated/", &body, "fetch_aggregated")
        })
        .await;

        let payload = match result {
            Ok(Some(payload)) => payload,
            Ok(None) => return Ok(Vec::new()),
            Err(VulnrecError::Http { status: 404, .. }) => {
                debug!(job_id = %job_id, "No aggregated solutions for job");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        let response: AggregatedResponse = serde_json::from_value(payload)?;

        // Groups come back unfiltered; keep only findings the query allows
        let pruned = ResultSet {
            aggregated_solutions: response.items,
            ..Default::default()
        }
        .filtered(filter);
        Ok(pruned.aggregated_solutions)
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn submit(
        &self,
        document: &Value,
        filter: &FindingFilter,
        options: &UploadOptions,
    ) -> Result<JobId, VulnrecError> {
        let mut body = json!({
            "user_id": self.user_id,
            "data": document,
            "force_update": options.force_update,
            "preferences": options.preferences,
        });
        let filter = filter.normalized();
        if !filter.is_empty() {
            body["filter"] = serde_json::to_value(&filter)?;
        }

        let payload = match with_retry("submit", &self.retry, || self.submit_once(&body)).await? {
            Submission::Accepted(payload) => payload,
            Submission::Duplicate(message) => return Err(self.resolve_duplicate(message).await),
        };
        let response: SubmitResponse = serde_json::from_value(payload)?;
        info!(job_id = %response.task_id, "Findings submitted for analysis");
        Ok(response.task_id)
    }

    async fn check_status(&self, job_id: &JobId) -> Result<JobStatus, VulnrecError> {
        let payload = with_retry("check_status", &self.retry, || self.status_once(job_id)).await?;
        let response: StatusResponse = serde_json::from_value(payload)?;
        debug!(job_id = %job_id, status = ?response.status, "Job status");
        Ok(response.status)
    }

    async fn fetch_results(&self, job_id: &JobId, query: &ResultQuery) -> Result<ResultSet, VulnrecError> {
        let mut filter = serde_json::to_value(query.filter.normalized())?;
        filter["task_id"] = serde_json::to_value(job_id)?;
        let body = json!({
            "user_id": self.user_id,
            "filter": filter,
            "pagination": query.pagination,
        });

        let payload = with_retry("fetch_results", &self.retry, || {
            self.post_once("recommendations/", &body, "fetch_results")
        })
        .await?;

        let Some(payload) = payload else {
            debug!(job_id = %job_id, "No findings match");
            return Ok(ResultSet::default());
        };
        let response: RecommendationsResponse = serde_json::from_value(payload)?;

        let aggregated_solutions = match response.aggregated_solutions {
            Some(inline) => inline,
            None => self.fetch_aggregated(job_id, &query.filter).await?,
        };
        info!(
            job_id = %job_id,
            findings = response.items.len(),
            aggregated = aggregated_solutions.len(),
            "Results fetched"
        );
        Ok(ResultSet {
            findings: response.items,
            aggregated_solutions,
            pagination: response.pagination,
        })
    }

    async fn fetch_example(&self, name: &str) -> Result<ResultSet, VulnrecError> {
        self.catalog.load(name)
    }

    fn gateway_name(&self) -> &str {
        "http"
    }
}

/// Human-readable message from an error body: `{"detail": "..."}`,
/// `{"detail": {"message": "..."}}` or raw text.
fn error_detail(body: &Value) -> String {
    match body {
        Value::Null => "empty response".to_string(),
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("detail") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Object(detail)) => detail
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(detail.clone()).to_string()),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        other => other.to_string(),
    }
}

fn existing_job_id(body: &Value) -> Option<JobId> {
    let raw = body
        .get("task_id")
        .or_else(|| body.get("detail").and_then(|d| d.get("task_id")))?;
    match serde_json::from_value(raw.clone()) {
        Ok(job_id) => Some(job_id),
        Err(e) => {
            warn!(error = %e, "Conflict response carried an unusable task id");
            None
        }
    }
}

fn todays_task(tasks: Vec<TaskEntry>, today: NaiveDate) -> Option<JobId> {
    tasks
        .into_iter()
        .filter_map(|task| {
            let created = task.created_at.as_deref().and_then(parse_timestamp)?;
            (created.date() == today).then_some((created, task.id))
        })
        .max_by_key(|(created, _)| *created)
        .map(|(_, id)| id)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}
