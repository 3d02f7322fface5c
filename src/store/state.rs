use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{sort_aggregated, AggregatedSolution, Finding, JobId, Pagination, ResultSet};

/// Where the displayed results come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Empty,
    /// Precomputed fixture; never re-fetched from the gateway.
    Example,
    /// Backed by a live remote job.
    Remote,
}

/// Position of the session in the acquisition lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Empty,
    Submitting,
    LoadingExample,
    Polling,
    /// Job completed, final results in transit.
    Fetching,
    Ready,
    Filtering,
    Failed,
}

impl Phase {
    /// No request of the session's own is outstanding.
    pub fn is_at_rest(&self) -> bool {
        matches!(self, Phase::Empty | Phase::Ready | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Empty => "empty",
            Phase::Submitting => "submitting",
            Phase::LoadingExample => "loading example",
            Phase::Polling => "polling",
            Phase::Fetching => "fetching results",
            Phase::Ready => "ready",
            Phase::Filtering => "filtering",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Everything a view may observe about the session's results.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultState {
    pub mode: Mode,
    pub source_name: Option<String>,
    pub job_id: Option<JobId>,
    pub is_loading: bool,
    pub has_error: bool,
    pub last_error: Option<String>,
    /// Classification of the underlying cause, e.g. `NetworkError`.
    pub error_kind: Option<&'static str>,
    pub findings: Vec<Finding>,
    /// Always sorted by descending finding count.
    pub aggregated_solutions: Vec<AggregatedSolution>,
    pub pagination: Option<Pagination>,
}

impl ResultState {
    /// Replace the held results, restoring the aggregated-solution order.
    pub(crate) fn install(&mut self, results: ResultSet) {
        self.findings = results.findings;
        self.aggregated_solutions = results.aggregated_solutions;
        sort_aggregated(&mut self.aggregated_solutions);
        self.pagination = results.pagination;
    }

    pub(crate) fn record_error(&mut self, message: String, kind: &'static str) {
        self.is_loading = false;
        self.has_error = true;
        self.last_error = Some(message);
        self.error_kind = Some(kind);
    }

    pub(crate) fn clear_error(&mut self) {
        self.has_error = false;
        self.last_error = None;
        self.error_kind = None;
    }
}

/// Point-in-time copy published to observers.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub phase: Phase,
    #[serde(flatten)]
    pub state: ResultState,
    pub updated_at: DateTime<Utc>,
}

impl StateSnapshot {
    pub fn new(phase: Phase, state: ResultState) -> Self {
        Self { phase, state, updated_at: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_empty() {
        let state = ResultState::default();
        assert_eq!(state.mode, Mode::Empty);
        assert!(state.job_id.is_none());
        assert!(state.findings.is_empty());
        assert!(!state.is_loading);
        assert!(!state.has_error);
    }

    #[test]
    fn test_record_error_clears_loading() {
        let mut state = ResultState { is_loading: true, ..Default::default() };
        state.record_error("boom".into(), "NetworkError");
        assert!(state.has_error);
        assert_eq!(state.error_kind, Some("NetworkError"));
        assert!(!state.is_loading);
        assert_eq!(state.last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_snapshot_serializes_flat() {
        let snapshot = StateSnapshot::new(Phase::Ready, ResultState::default());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "ready");
        assert_eq!(json["mode"], "empty");
        assert_eq!(json["is_loading"], false);
    }
}
