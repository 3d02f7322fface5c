use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::store::{Phase, StateSnapshot};

/// Spinner that follows a session's published state until it comes to rest.
pub struct SessionProgress {
    bar: ProgressBar,
    task: JoinHandle<()>,
}

impl SessionProgress {
    pub fn attach(mut updates: watch::Receiver<StateSnapshot>, enabled: bool) -> Self {
        let bar = if enabled { ProgressBar::new_spinner() } else { ProgressBar::hidden() };
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_message(describe(&updates.borrow_and_update()));

        let tracker = bar.clone();
        let task = tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                tracker.set_message(describe(&snapshot));
            }
        });
        Self { bar, task }
    }

    pub fn finish(self, snapshot: &StateSnapshot) {
        self.task.abort();
        let line = match snapshot.phase {
            Phase::Ready => format!("{} {}", style("✓").green(), describe(snapshot)),
            _ if snapshot.state.has_error => format!("{} {}", style("✗").red(), describe(snapshot)),
            _ => describe(snapshot),
        };
        self.bar.finish_with_message(line);
    }
}

fn describe(snapshot: &StateSnapshot) -> String {
    let state = &snapshot.state;
    let job = state
        .job_id
        .as_ref()
        .map(|id| format!(" (job {})", id))
        .unwrap_or_default();
    match snapshot.phase {
        Phase::Empty if state.has_error => "Stopped with an error".to_string(),
        Phase::Empty => "Idle".to_string(),
        Phase::Submitting => format!(
            "Submitting {}",
            state.source_name.as_deref().unwrap_or("findings")
        ),
        Phase::LoadingExample => "Loading example".to_string(),
        Phase::Polling => format!("Waiting for analysis{}", job),
        Phase::Fetching => format!("Fetching results{}", job),
        Phase::Filtering => "Applying filter".to_string(),
        Phase::Ready => format!("{} findings ready{}", state.findings.len(), job),
        Phase::Failed => format!("Failed{}", job),
    }
}
