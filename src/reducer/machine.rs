//! The result-acquisition state machine.
//!
//! `Reducer::dispatch` handles intents from view adapters and may reject
//! them; `Reducer::apply` handles loop ticks and gateway responses and
//! never fails. Both mutate the owned state and return the effects the
//! caller must perform. No I/O happens here.

use tracing::debug;

use crate::errors::VulnrecError;
use crate::models::{FindingFilter, JobId, JobStatus, PaginationInput, ResultQuery, ResultSet, ScoreRange};
use crate::store::{Mode, Phase, ResultState, StateSnapshot};
use super::effect::Effect;
use super::intent::{Event, FetchPurpose, Intent};

#[derive(Debug, Clone)]
pub struct Reducer {
    phase: Phase,
    state: ResultState,
    /// Active criteria; `Filter` only replaces the severity part.
    filter: FindingFilter,
    /// Criteria of an outstanding remote re-filter, committed on success.
    pending_filter: Option<FindingFilter>,
    /// Untouched example fixture, re-filtered client-side.
    fixture: Option<ResultSet>,
    example_name: Option<String>,
    /// A READY result set is held and survives a failed re-filter.
    has_snapshot: bool,
    /// Bumped whenever in-flight responses must be ignored.
    epoch: u64,
    loop_active: bool,
    status_in_flight: bool,
    page: PaginationInput,
}

impl Reducer {
    pub fn new(page: PaginationInput) -> Self {
        Self {
            phase: Phase::Empty,
            state: ResultState::default(),
            filter: FindingFilter::default(),
            pending_filter: None,
            fixture: None,
            example_name: None,
            has_snapshot: false,
            epoch: 0,
            loop_active: false,
            status_in_flight: false,
            page,
        }
    }

    /// A reducer attached to an already submitted job. Polling starts on
    /// the next `Load`.
    pub fn resume(page: PaginationInput, job_id: JobId, filter: FindingFilter) -> Self {
        let mut reducer = Self::new(page);
        reducer.phase = Phase::Polling;
        reducer.filter = filter;
        reducer.state.mode = Mode::Remote;
        reducer.state.job_id = Some(job_id);
        reducer.state.is_loading = true;
        reducer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &ResultState {
        &self.state
    }

    pub fn filter(&self) -> &FindingFilter {
        &self.filter
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn loop_active(&self) -> bool {
        self.loop_active
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(self.phase, self.state.clone())
    }

    /// Handle an intent. Rejections leave the reducer untouched.
    pub fn dispatch(&mut self, intent: Intent) -> Result<Vec<Effect>, VulnrecError> {
        match intent {
            Intent::Upload { document, source_name, filter, options } => {
                self.expect(&[Phase::Empty, Phase::Ready], "upload")?;
                let mut effects = self.reset();
                self.filter = filter.unwrap_or_default();
                self.state.source_name = Some(source_name);
                self.state.is_loading = true;
                self.phase = Phase::Submitting;
                effects.push(Effect::Submit {
                    epoch: self.epoch,
                    document,
                    filter: self.filter.normalized(),
                    options,
                });
                Ok(effects)
            }

            Intent::LoadExample { which, filter } => {
                self.expect(&[Phase::Empty], "load_example")?;
                let mut effects = self.reset();
                self.filter = filter.unwrap_or_default();
                self.state.is_loading = true;
                self.phase = Phase::LoadingExample;
                self.example_name = Some(which.clone());
                effects.push(Effect::FetchExample { epoch: self.epoch, name: which });
                Ok(effects)
            }

            Intent::Filter { severity_min, severity_max } => {
                self.expect(&[Phase::Ready], "filter")?;
                let range = ScoreRange::new(severity_min, severity_max)?;
                match self.state.mode {
                    Mode::Example => {
                        self.filter.set_severity(range);
                        let subset = self
                            .fixture
                            .as_ref()
                            .map(|fixture| fixture.filtered(&self.filter))
                            .unwrap_or_default();
                        self.state.install(subset);
                        self.state.clear_error();
                        Ok(Vec::new())
                    }
                    Mode::Remote => {
                        let job_id = self.job_id()?;
                        let mut candidate = self.filter.clone();
                        candidate.set_severity(range);
                        let query = self.query(&candidate);
                        self.pending_filter = Some(candidate);
                        self.phase = Phase::Filtering;
                        self.state.is_loading = true;
                        Ok(vec![Effect::FetchResults {
                            epoch: self.epoch,
                            job_id,
                            query,
                            purpose: FetchPurpose::Filter,
                        }])
                    }
                    Mode::Empty => Err(VulnrecError::InvalidTransition {
                        intent: "filter",
                        phase: self.phase,
                    }),
                }
            }

            Intent::Clear => Ok(self.reset()),

            Intent::Load => {
                if self.phase != Phase::Polling || self.loop_active {
                    return Ok(Vec::new());
                }
                let job_id = self.job_id()?;
                self.loop_active = true;
                self.status_in_flight = false;
                Ok(vec![Effect::StartPolling { epoch: self.epoch, job_id }])
            }

            Intent::Acknowledge => {
                self.expect(&[Phase::Failed], "acknowledge")?;
                if self.has_snapshot {
                    self.phase = Phase::Ready;
                } else {
                    // The loop is already stopped in FAILED
                    let error = self.state.last_error.take();
                    let kind = self.state.error_kind.take();
                    self.reset();
                    self.state.has_error = true;
                    self.state.last_error = error;
                    self.state.error_kind = kind;
                }
                Ok(Vec::new())
            }
        }
    }

    /// Handle a tick or gateway response. Responses from an older epoch,
    /// or arriving in a phase that no longer waits for them, are dropped.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        if event.epoch() != self.epoch {
            debug!(event = event.name(), epoch = event.epoch(), current = self.epoch, "Discarding stale event");
            return Vec::new();
        }

        match event {
            Event::Submitted { result, .. } if self.phase == Phase::Submitting => match result {
                Ok(job_id) | Err(VulnrecError::SubmissionConflict { job_id }) => {
                    self.state.mode = Mode::Remote;
                    self.state.job_id = Some(job_id.clone());
                    self.state.clear_error();
                    self.phase = Phase::Polling;
                    self.loop_active = true;
                    self.status_in_flight = false;
                    vec![Effect::StartPolling { epoch: self.epoch, job_id }]
                }
                Err(e @ VulnrecError::SubmissionFailure(_)) => {
                    self.fail_to_empty(&e, &e);
                    Vec::new()
                }
                Err(e) => {
                    self.fail_to_empty(&VulnrecError::SubmissionFailure(e.to_string()), &e);
                    Vec::new()
                }
            },

            Event::PollTick { .. } if self.phase == Phase::Polling && self.loop_active => {
                if self.status_in_flight {
                    debug!("Status check outstanding, skipping tick");
                    return Vec::new();
                }
                match self.state.job_id.clone() {
                    Some(job_id) => {
                        self.status_in_flight = true;
                        vec![Effect::CheckStatus { epoch: self.epoch, job_id }]
                    }
                    None => Vec::new(),
                }
            }

            Event::StatusChecked { result, .. } if self.phase == Phase::Polling => {
                self.status_in_flight = false;
                match result {
                    Ok(JobStatus::Pending) => Vec::new(),
                    Ok(JobStatus::Completed) => {
                        let Some(job_id) = self.state.job_id.clone() else {
                            return Vec::new();
                        };
                        self.loop_active = false;
                        self.phase = Phase::Fetching;
                        vec![
                            Effect::StopPolling,
                            Effect::FetchResults {
                                epoch: self.epoch,
                                job_id,
                                query: self.query(&self.filter),
                                purpose: FetchPurpose::Completion,
                            },
                        ]
                    }
                    Ok(JobStatus::Failed) => {
                        let error = VulnrecError::PollingFailure("analysis job failed".into());
                        self.fail_polling(&error, &error)
                    }
                    Err(e) => self.fail_polling(&VulnrecError::PollingFailure(e.to_string()), &e),
                }
            }

            Event::ResultsFetched { purpose, result, .. } if self.awaits_fetch(purpose) => {
                match result {
                    Ok(results) => {
                        if let Some(filter) = self.pending_filter.take() {
                            self.filter = filter;
                        }
                        self.state.install(results);
                        self.state.is_loading = false;
                        self.state.clear_error();
                        self.phase = Phase::Ready;
                        self.has_snapshot = true;
                    }
                    Err(e) => {
                        self.pending_filter = None;
                        let error = VulnrecError::FetchFailure(e.to_string());
                        match purpose {
                            // Keep the last good results on screen
                            FetchPurpose::Filter => {
                                self.state.record_error(error.to_string(), e.classify().error_type);
                                self.phase = Phase::Failed;
                            }
                            FetchPurpose::Completion => self.fail_to_empty(&error, &e),
                        }
                    }
                }
                Vec::new()
            }

            Event::ExampleFetched { result, .. } if self.phase == Phase::LoadingExample => {
                match result {
                    Ok(fixture) => {
                        let which = self.example_name.clone().unwrap_or_default();
                        self.state.mode = Mode::Example;
                        self.state.source_name = Some(format!("{}.json", which));
                        self.state.install(fixture.filtered(&self.filter));
                        self.state.is_loading = false;
                        self.state.clear_error();
                        self.fixture = Some(fixture);
                        self.phase = Phase::Ready;
                        self.has_snapshot = true;
                    }
                    Err(e) => self.fail_to_empty(&VulnrecError::FetchFailure(e.to_string()), &e),
                }
                Vec::new()
            }

            other => {
                debug!(event = other.name(), phase = %self.phase, "Event not expected in this phase, ignoring");
                Vec::new()
            }
        }
    }

    fn expect(&self, accepted: &[Phase], intent: &'static str) -> Result<(), VulnrecError> {
        if accepted.contains(&self.phase) {
            Ok(())
        } else {
            Err(VulnrecError::InvalidTransition { intent, phase: self.phase })
        }
    }

    fn awaits_fetch(&self, purpose: FetchPurpose) -> bool {
        match purpose {
            FetchPurpose::Completion => self.phase == Phase::Fetching,
            FetchPurpose::Filter => self.phase == Phase::Filtering,
        }
    }

    fn job_id(&self) -> Result<JobId, VulnrecError> {
        self.state
            .job_id
            .clone()
            .ok_or_else(|| VulnrecError::Internal(format!("no job id while {}", self.phase)))
    }

    fn query(&self, filter: &FindingFilter) -> ResultQuery {
        ResultQuery {
            filter: filter.normalized(),
            pagination: self.page,
        }
    }

    /// Return to EMPTY defaults and invalidate in-flight responses.
    fn reset(&mut self) -> Vec<Effect> {
        let effects = if self.loop_active { vec![Effect::StopPolling] } else { Vec::new() };
        self.epoch += 1;
        self.phase = Phase::Empty;
        self.state = ResultState::default();
        self.filter = FindingFilter::default();
        self.pending_filter = None;
        self.fixture = None;
        self.example_name = None;
        self.has_snapshot = false;
        self.loop_active = false;
        self.status_in_flight = false;
        effects
    }

    fn fail_to_empty(&mut self, error: &VulnrecError, cause: &VulnrecError) {
        self.reset();
        self.state.record_error(error.to_string(), cause.classify().error_type);
    }

    fn fail_polling(&mut self, error: &VulnrecError, cause: &VulnrecError) -> Vec<Effect> {
        self.loop_active = false;
        self.phase = Phase::Failed;
        self.state.record_error(error.to_string(), cause.classify().error_type);
        vec![Effect::StopPolling]
    }
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new(PaginationInput::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AggregatedSolution, Finding, FindingKind, Pagination, Solution};
    use serde_json::json;

    fn finding(severity: u8) -> Finding {
        Finding {
            title: vec![format!("finding {}", severity)],
            source: vec!["Trivy".into()],
            description: vec![],
            cwe_ids: vec![],
            cve_ids: vec![],
            severity,
            priority: severity,
            category: FindingKind::System,
            solution: Solution::default(),
        }
    }

    fn results(severities: &[u8]) -> ResultSet {
        let findings: Vec<Finding> = severities.iter().map(|s| finding(*s)).collect();
        ResultSet {
            aggregated_solutions: vec![
                AggregatedSolution {
                    findings: findings[..1].to_vec(),
                    solution: "single".into(),
                    metadata: serde_json::Value::Null,
                },
                AggregatedSolution {
                    findings: findings.clone(),
                    solution: "all".into(),
                    metadata: serde_json::Value::Null,
                },
            ],
            findings,
            pagination: Some(Pagination { offset: 0, limit: 100, total: 3, count: 3 }),
        }
    }

    fn assert_invariants(reducer: &Reducer) {
        let state = reducer.state();
        assert_eq!(state.job_id.is_some(), state.mode == Mode::Remote, "job id iff remote");
        if reducer.phase().is_at_rest() {
            assert!(!(state.is_loading && state.has_error), "loading and error at rest");
        }
        let counts: Vec<usize> = state.aggregated_solutions.iter().map(|a| a.findings.len()).collect();
        let mut sorted = counts.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(counts, sorted, "aggregated solutions sorted");
    }

    /// Upload -> submitted(42) -> polling with an active loop.
    fn polling_reducer() -> Reducer {
        let mut reducer = Reducer::default();
        reducer.dispatch(Intent::upload(json!({"findings": []}), "report.json")).unwrap();
        let epoch = reducer.epoch();
        let effects = reducer.apply(Event::Submitted { epoch, result: Ok(JobId::from(42)) });
        assert_eq!(effects, vec![Effect::StartPolling { epoch, job_id: JobId::from(42) }]);
        reducer
    }

    fn ready_remote_reducer() -> Reducer {
        let mut reducer = polling_reducer();
        let epoch = reducer.epoch();
        reducer.apply(Event::PollTick { epoch });
        reducer.apply(Event::StatusChecked { epoch, result: Ok(JobStatus::Completed) });
        reducer.apply(Event::ResultsFetched {
            epoch,
            purpose: FetchPurpose::Completion,
            result: Ok(results(&[10, 60, 90])),
        });
        assert_eq!(reducer.phase(), Phase::Ready);
        reducer
    }

    fn ready_example_reducer() -> Reducer {
        let mut reducer = Reducer::default();
        reducer.dispatch(Intent::load_example("llama3")).unwrap();
        let epoch = reducer.epoch();
        reducer.apply(Event::ExampleFetched { epoch, result: Ok(results(&[10, 60, 90])) });
        reducer
    }

    #[test]
    fn test_upload_enters_submitting() {
        let mut reducer = Reducer::default();
        let effects = reducer.dispatch(Intent::upload(json!({"a": 1}), "report.json")).unwrap();

        assert_eq!(reducer.phase(), Phase::Submitting);
        assert!(reducer.state().is_loading);
        assert_eq!(reducer.state().source_name.as_deref(), Some("report.json"));
        assert!(reducer.state().job_id.is_none());
        assert!(matches!(effects.as_slice(), [Effect::Submit { .. }]));
        assert_invariants(&reducer);
    }

    #[test]
    fn test_upload_sends_normalized_filter() {
        let mut reducer = Reducer::default();
        let filter = FindingFilter { severity: Some(ScoreRange::FULL), ..Default::default() };
        let effects = reducer
            .dispatch(Intent::Upload {
                document: json!({}),
                source_name: "r.json".into(),
                filter: Some(filter),
                options: Default::default(),
            })
            .unwrap();
        match &effects[0] {
            Effect::Submit { filter, .. } => assert!(filter.severity.is_none()),
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[test]
    fn test_submit_success_starts_polling() {
        let reducer = polling_reducer();
        assert_eq!(reducer.phase(), Phase::Polling);
        assert_eq!(reducer.state().mode, Mode::Remote);
        assert_eq!(reducer.state().job_id, Some(JobId::from(42)));
        assert!(reducer.state().is_loading);
        assert!(reducer.loop_active());
        assert_invariants(&reducer);
    }

    #[test]
    fn test_submission_conflict_reuses_existing_job() {
        let mut reducer = Reducer::default();
        reducer.dispatch(Intent::upload(json!({}), "report.json")).unwrap();
        let epoch = reducer.epoch();
        let effects = reducer.apply(Event::Submitted {
            epoch,
            result: Err(VulnrecError::SubmissionConflict { job_id: JobId::from(7) }),
        });

        assert_eq!(effects, vec![Effect::StartPolling { epoch, job_id: JobId::from(7) }]);
        assert_eq!(reducer.state().mode, Mode::Remote);
        assert_eq!(reducer.state().job_id, Some(JobId::from(7)));
        assert!(!reducer.state().has_error);
    }

    #[test]
    fn test_submission_failure_returns_to_empty_with_error() {
        let mut reducer = Reducer::default();
        reducer.dispatch(Intent::upload(json!({}), "report.json")).unwrap();
        let epoch = reducer.epoch();
        let effects = reducer.apply(Event::Submitted {
            epoch,
            result: Err(VulnrecError::Http { status: 422, message: "bad document".into() }),
        });

        assert!(effects.is_empty());
        assert_eq!(reducer.phase(), Phase::Empty);
        assert!(reducer.state().has_error);
        assert!(!reducer.state().is_loading);
        assert_eq!(reducer.state().mode, Mode::Empty);
        assert!(reducer.state().job_id.is_none());
        assert!(reducer.state().last_error.as_deref().unwrap().contains("bad document"));
        assert_invariants(&reducer);
    }

    #[test]
    fn test_upload_rejected_while_submitting_or_polling() {
        let mut reducer = Reducer::default();
        reducer.dispatch(Intent::upload(json!({}), "a.json")).unwrap();
        let before = reducer.state().clone();
        let err = reducer.dispatch(Intent::upload(json!({}), "b.json")).unwrap_err();
        assert!(matches!(err, VulnrecError::InvalidTransition { intent: "upload", phase: Phase::Submitting }));
        assert_eq!(reducer.state(), &before);

        let mut reducer = polling_reducer();
        let before = reducer.state().clone();
        let epoch = reducer.epoch();
        assert!(reducer.dispatch(Intent::upload(json!({}), "b.json")).is_err());
        assert_eq!(reducer.state(), &before);
        assert_eq!(reducer.epoch(), epoch);
    }

    #[test]
    fn test_poll_tick_checks_status_once_in_flight() {
        let mut reducer = polling_reducer();
        let epoch = reducer.epoch();

        let first = reducer.apply(Event::PollTick { epoch });
        assert_eq!(first, vec![Effect::CheckStatus { epoch, job_id: JobId::from(42) }]);

        // Check outstanding: next tick is skipped, not queued
        assert!(reducer.apply(Event::PollTick { epoch }).is_empty());

        assert!(reducer.apply(Event::StatusChecked { epoch, result: Ok(JobStatus::Pending) }).is_empty());
        assert_eq!(reducer.phase(), Phase::Polling);
        assert_eq!(reducer.apply(Event::PollTick { epoch }).len(), 1);
    }

    #[test]
    fn test_completed_status_stops_loop_and_fetches() {
        let mut reducer = polling_reducer();
        let epoch = reducer.epoch();
        reducer.apply(Event::PollTick { epoch });
        let effects = reducer.apply(Event::StatusChecked { epoch, result: Ok(JobStatus::Completed) });

        assert_eq!(effects[0], Effect::StopPolling);
        match &effects[1] {
            Effect::FetchResults { job_id, purpose, query, .. } => {
                assert_eq!(job_id, &JobId::from(42));
                assert_eq!(*purpose, FetchPurpose::Completion);
                assert!(query.filter.severity.is_none());
            }
            other => panic!("unexpected effect {:?}", other),
        }
        assert_eq!(reducer.phase(), Phase::Fetching);
        assert!(!reducer.loop_active());
        assert!(reducer.apply(Event::PollTick { epoch }).is_empty());
    }

    #[test]
    fn test_results_install_sorted_and_ready() {
        let reducer = ready_remote_reducer();
        let state = reducer.state();
        assert_eq!(state.findings.len(), 3);
        assert!(!state.is_loading);
        assert_eq!(state.aggregated_solutions[0].solution, "all");
        assert_eq!(state.pagination.as_ref().map(|p| p.total), Some(3));
        assert_invariants(&reducer);
    }

    #[test]
    fn test_failed_status_stops_loop_and_fails() {
        let mut reducer = polling_reducer();
        let epoch = reducer.epoch();
        reducer.apply(Event::PollTick { epoch });
        let effects = reducer.apply(Event::StatusChecked { epoch, result: Ok(JobStatus::Failed) });

        assert_eq!(effects, vec![Effect::StopPolling]);
        assert_eq!(reducer.phase(), Phase::Failed);
        assert!(reducer.state().has_error);
        assert!(!reducer.state().is_loading);
        assert!(reducer.state().findings.is_empty());
        assert!(reducer.apply(Event::PollTick { epoch }).is_empty());
        assert_invariants(&reducer);
    }

    #[test]
    fn test_status_transport_error_is_polling_failure() {
        let mut reducer = polling_reducer();
        let epoch = reducer.epoch();
        reducer.apply(Event::PollTick { epoch });
        reducer.apply(Event::StatusChecked { epoch, result: Err(VulnrecError::Network("reset".into())) });
        assert_eq!(reducer.phase(), Phase::Failed);
        assert!(reducer.state().last_error.as_deref().unwrap().starts_with("Polling failed"));
        assert_eq!(reducer.state().error_kind, Some("NetworkError"));
    }

    #[test]
    fn test_acknowledge_polling_failure_returns_to_empty() {
        let mut reducer = polling_reducer();
        let epoch = reducer.epoch();
        reducer.apply(Event::PollTick { epoch });
        reducer.apply(Event::StatusChecked { epoch, result: Ok(JobStatus::Failed) });

        reducer.dispatch(Intent::Acknowledge).unwrap();
        assert_eq!(reducer.phase(), Phase::Empty);
        assert_eq!(reducer.state().mode, Mode::Empty);
        assert!(reducer.state().job_id.is_none());
        assert!(reducer.state().has_error);
        assert_invariants(&reducer);
    }

    #[test]
    fn test_completion_fetch_failure_returns_to_empty() {
        let mut reducer = polling_reducer();
        let epoch = reducer.epoch();
        reducer.apply(Event::PollTick { epoch });
        reducer.apply(Event::StatusChecked { epoch, result: Ok(JobStatus::Completed) });
        reducer.apply(Event::ResultsFetched {
            epoch,
            purpose: FetchPurpose::Completion,
            result: Err(VulnrecError::Http { status: 500, message: "db down".into() }),
        });
        assert_eq!(reducer.phase(), Phase::Empty);
        assert!(reducer.state().has_error);
        assert!(reducer.state().findings.is_empty());
    }

    #[test]
    fn test_remote_filter_issues_one_fetch() {
        let mut reducer = ready_remote_reducer();
        let epoch = reducer.epoch();
        let effects = reducer.dispatch(Intent::filter(0, 50)).unwrap();

        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::FetchResults { query, purpose, .. } => {
                assert_eq!(*purpose, FetchPurpose::Filter);
                assert_eq!(query.filter.severity, Some(ScoreRange::new(0, 50).unwrap()));
            }
            other => panic!("unexpected effect {:?}", other),
        }
        assert_eq!(reducer.phase(), Phase::Filtering);
        assert!(reducer.state().is_loading);

        // Server result replaces findings unmodified
        let server = results(&[90, 10]);
        reducer.apply(Event::ResultsFetched { epoch, purpose: FetchPurpose::Filter, result: Ok(server.clone()) });
        assert_eq!(reducer.phase(), Phase::Ready);
        assert_eq!(reducer.state().findings, server.findings);
        assert_eq!(reducer.filter().severity, Some(ScoreRange::new(0, 50).unwrap()));
        assert_invariants(&reducer);
    }

    #[test]
    fn test_full_range_remote_filter_still_fetches_without_bounds() {
        let mut reducer = ready_remote_reducer();
        let effects = reducer.dispatch(Intent::filter(0, 100)).unwrap();
        match &effects[..] {
            [Effect::FetchResults { query, .. }] => assert!(query.filter.severity.is_none()),
            other => panic!("unexpected effects {:?}", other),
        }
    }

    #[test]
    fn test_remote_filter_failure_keeps_previous_results() {
        let mut reducer = ready_remote_reducer();
        let epoch = reducer.epoch();
        let before = reducer.state().findings.clone();
        let criteria = reducer.filter().clone();
        reducer.dispatch(Intent::filter(50, 100)).unwrap();
        assert_eq!(reducer.filter(), &criteria);
        reducer.apply(Event::ResultsFetched {
            epoch,
            purpose: FetchPurpose::Filter,
            result: Err(VulnrecError::Timeout("slow".into())),
        });

        assert_eq!(reducer.phase(), Phase::Failed);
        assert!(reducer.state().has_error);
        assert!(!reducer.state().is_loading);
        assert_eq!(reducer.state().findings, before);

        reducer.dispatch(Intent::Acknowledge).unwrap();
        assert_eq!(reducer.phase(), Phase::Ready);
        assert_eq!(reducer.state().findings, before);
        // The shown findings still answer the earlier criteria
        assert_eq!(reducer.filter(), &criteria);
        assert_invariants(&reducer);
    }

    #[test]
    fn test_example_load_and_client_side_filter() {
        let mut reducer = ready_example_reducer();
        assert_eq!(reducer.phase(), Phase::Ready);
        assert_eq!(reducer.state().mode, Mode::Example);
        assert_eq!(reducer.state().source_name.as_deref(), Some("llama3.json"));
        assert!(reducer.state().job_id.is_none());

        let effects = reducer.dispatch(Intent::filter(0, 50)).unwrap();
        assert!(effects.is_empty());
        let severities: Vec<u8> = reducer.state().findings.iter().map(|f| f.severity).collect();
        assert_eq!(severities, vec![10]);

        // Widening again re-derives from the untouched fixture
        reducer.dispatch(Intent::filter(0, 100)).unwrap();
        assert_eq!(reducer.state().findings.len(), 3);
        assert_invariants(&reducer);
    }

    #[test]
    fn test_example_filter_to_nothing_is_valid() {
        let mut reducer = ready_example_reducer();
        reducer.dispatch(Intent::filter(95, 100)).unwrap();
        assert!(reducer.state().findings.is_empty());
        assert!(reducer.state().aggregated_solutions.is_empty());
        assert!(!reducer.state().has_error);
        assert_eq!(reducer.phase(), Phase::Ready);
    }

    #[test]
    fn test_example_only_from_empty() {
        let mut reducer = ready_example_reducer();
        let err = reducer.dispatch(Intent::load_example("gpt4o")).unwrap_err();
        assert!(matches!(err, VulnrecError::InvalidTransition { intent: "load_example", .. }));
    }

    #[test]
    fn test_example_fetch_failure_returns_to_empty() {
        let mut reducer = Reducer::default();
        reducer.dispatch(Intent::load_example("llama3")).unwrap();
        let epoch = reducer.epoch();
        reducer.apply(Event::ExampleFetched { epoch, result: Err(VulnrecError::Internal("corrupt".into())) });
        assert_eq!(reducer.phase(), Phase::Empty);
        assert!(reducer.state().has_error);
    }

    #[test]
    fn test_invalid_filter_rejected_without_change() {
        let mut reducer = ready_example_reducer();
        let before = reducer.state().clone();
        assert!(matches!(reducer.dispatch(Intent::filter(70, 20)), Err(VulnrecError::InvalidFilter(_))));
        assert!(matches!(reducer.dispatch(Intent::filter(0, 101)), Err(VulnrecError::InvalidFilter(_))));
        assert_eq!(reducer.state(), &before);
    }

    #[test]
    fn test_filter_rejected_outside_ready() {
        let mut reducer = polling_reducer();
        assert!(matches!(
            reducer.dispatch(Intent::filter(0, 50)),
            Err(VulnrecError::InvalidTransition { intent: "filter", phase: Phase::Polling })
        ));
        assert!(Reducer::default().dispatch(Intent::filter(0, 50)).is_err());
    }

    #[test]
    fn test_clear_from_every_phase_yields_defaults() {
        let mut submitting = Reducer::default();
        submitting.dispatch(Intent::upload(json!({}), "a.json")).unwrap();
        let mut failed = polling_reducer();
        let epoch = failed.epoch();
        failed.apply(Event::PollTick { epoch });
        failed.apply(Event::StatusChecked { epoch, result: Ok(JobStatus::Failed) });
        let mut filtering = ready_remote_reducer();
        filtering.dispatch(Intent::filter(0, 10)).unwrap();
        let mut fetching = polling_reducer();
        let epoch = fetching.epoch();
        fetching.apply(Event::PollTick { epoch });
        fetching.apply(Event::StatusChecked { epoch, result: Ok(JobStatus::Completed) });
        let mut loading_example = Reducer::default();
        loading_example.dispatch(Intent::load_example("gpt4o")).unwrap();

        let reducers = vec![
            Reducer::default(),
            submitting,
            polling_reducer(),
            fetching,
            ready_remote_reducer(),
            loading_example,
            ready_example_reducer(),
            filtering,
            failed,
        ];
        let phases: Vec<Phase> = reducers.iter().map(Reducer::phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Empty,
                Phase::Submitting,
                Phase::Polling,
                Phase::Fetching,
                Phase::Ready,
                Phase::LoadingExample,
                Phase::Ready,
                Phase::Filtering,
                Phase::Failed,
            ]
        );
        for mut reducer in reducers {
            let had_loop = reducer.loop_active();
            let effects = reducer.dispatch(Intent::Clear).unwrap();
            assert_eq!(effects.contains(&Effect::StopPolling), had_loop);
            assert_eq!(reducer.phase(), Phase::Empty);
            assert_eq!(reducer.state(), &ResultState::default());
            assert_eq!(reducer.filter(), &FindingFilter::default());
            assert!(!reducer.loop_active());
        }
    }

    #[test]
    fn test_stale_responses_after_clear_are_ignored() {
        let mut reducer = polling_reducer();
        let old_epoch = reducer.epoch();
        reducer.apply(Event::PollTick { epoch: old_epoch });
        reducer.dispatch(Intent::Clear).unwrap();

        let effects = reducer.apply(Event::StatusChecked { epoch: old_epoch, result: Ok(JobStatus::Completed) });
        assert!(effects.is_empty());
        assert_eq!(reducer.state(), &ResultState::default());
        assert!(reducer.apply(Event::PollTick { epoch: old_epoch }).is_empty());
    }

    #[test]
    fn test_load_resumes_polling_once() {
        let mut reducer = Reducer::resume(PaginationInput::default(), JobId::from(9), FindingFilter::default());
        assert_eq!(reducer.phase(), Phase::Polling);
        assert!(!reducer.loop_active());

        let effects = reducer.dispatch(Intent::Load).unwrap();
        assert_eq!(effects, vec![Effect::StartPolling { epoch: reducer.epoch(), job_id: JobId::from(9) }]);
        assert!(reducer.dispatch(Intent::Load).unwrap().is_empty());
        assert_invariants(&reducer);
    }

    #[test]
    fn test_load_is_noop_elsewhere() {
        let mut reducer = Reducer::default();
        assert!(reducer.dispatch(Intent::Load).unwrap().is_empty());
        let mut ready = ready_example_reducer();
        assert!(ready.dispatch(Intent::Load).unwrap().is_empty());
        assert_eq!(ready.phase(), Phase::Ready);
    }

    #[test]
    fn test_upload_from_ready_replaces_results() {
        let mut reducer = ready_example_reducer();
        let effects = reducer.dispatch(Intent::upload(json!({}), "next.json")).unwrap();
        assert!(matches!(effects.as_slice(), [Effect::Submit { .. }]));
        assert_eq!(reducer.state().mode, Mode::Empty);
        assert!(reducer.state().findings.is_empty());
        assert_eq!(reducer.state().source_name.as_deref(), Some("next.json"));
    }

    #[test]
    fn test_acknowledge_only_from_failed() {
        let mut reducer = Reducer::default();
        assert!(matches!(
            reducer.dispatch(Intent::Acknowledge),
            Err(VulnrecError::InvalidTransition { intent: "acknowledge", .. })
        ));
    }
}
