use serde_json::Value;

use crate::errors::VulnrecError;
use crate::models::{FindingFilter, JobId, JobStatus, ResultSet, UploadOptions};

/// Requests a view adapter may issue against a session.
#[derive(Debug, Clone)]
pub enum Intent {
    /// Submit a findings document for remote analysis.
    Upload {
        document: Value,
        source_name: String,
        filter: Option<FindingFilter>,
        options: UploadOptions,
    },
    /// Show a bundled precomputed result set.
    LoadExample {
        which: String,
        filter: Option<FindingFilter>,
    },
    /// Narrow the displayed findings by severity (inclusive bounds).
    Filter { severity_min: u8, severity_max: u8 },
    /// Drop everything and return to the empty state.
    Clear,
    /// Resume polling for a known job when no loop is running.
    Load,
    /// Dismiss a failure.
    Acknowledge,
}

impl Intent {
    pub fn upload(document: Value, source_name: impl Into<String>) -> Self {
        Intent::Upload {
            document,
            source_name: source_name.into(),
            filter: None,
            options: UploadOptions::default(),
        }
    }

    pub fn load_example(which: impl Into<String>) -> Self {
        Intent::LoadExample { which: which.into(), filter: None }
    }

    pub fn filter(severity_min: u8, severity_max: u8) -> Self {
        Intent::Filter { severity_min, severity_max }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intent::Upload { .. } => "upload",
            Intent::LoadExample { .. } => "load_example",
            Intent::Filter { .. } => "filter",
            Intent::Clear => "clear",
            Intent::Load => "load",
            Intent::Acknowledge => "acknowledge",
        }
    }
}

/// Why a result fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPurpose {
    /// The job just completed.
    Completion,
    /// The user changed the severity filter.
    Filter,
}

/// Internal events: loop ticks and gateway responses. Each carries the
/// epoch of the request that produced it.
#[derive(Debug)]
pub enum Event {
    PollTick {
        epoch: u64,
    },
    Submitted {
        epoch: u64,
        result: Result<JobId, VulnrecError>,
    },
    StatusChecked {
        epoch: u64,
        result: Result<JobStatus, VulnrecError>,
    },
    ResultsFetched {
        epoch: u64,
        purpose: FetchPurpose,
        result: Result<ResultSet, VulnrecError>,
    },
    ExampleFetched {
        epoch: u64,
        result: Result<ResultSet, VulnrecError>,
    },
}

impl Event {
    pub fn epoch(&self) -> u64 {
        match self {
            Event::PollTick { epoch }
            | Event::Submitted { epoch, .. }
            | Event::StatusChecked { epoch, .. }
            | Event::ResultsFetched { epoch, .. }
            | Event::ExampleFetched { epoch, .. } => *epoch,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::PollTick { .. } => "poll_tick",
            Event::Submitted { .. } => "submitted",
            Event::StatusChecked { .. } => "status_checked",
            Event::ResultsFetched { .. } => "results_fetched",
            Event::ExampleFetched { .. } => "example_fetched",
        }
    }
}
