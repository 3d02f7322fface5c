//! Fixed-interval tick source for job status checks.
//!
//! The loop only emits `PollTick` events; whether a tick turns into a
//! status check is the reducer's call. At most one loop runs per session.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::VulnrecError;
use crate::models::JobId;
use crate::reducer::Event;

struct ActiveLoop {
    job_id: JobId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct PollingLoop {
    interval: Duration,
    active: Option<ActiveLoop>,
}

impl PollingLoop {
    pub fn new(interval: Duration) -> Self {
        Self { interval, active: None }
    }

    pub fn is_active(&self) -> bool {
        self.active.as_ref().is_some_and(|a| !a.handle.is_finished())
    }

    /// Start ticking for `job_id`. The first tick fires one interval from
    /// now; ticks missed while the receiver is slow are dropped.
    pub fn start(
        &mut self,
        epoch: u64,
        job_id: JobId,
        events: UnboundedSender<Event>,
    ) -> Result<(), VulnrecError> {
        if let Some(active) = &self.active {
            if !active.handle.is_finished() {
                return Err(VulnrecError::PollingAlreadyActive { job_id: active.job_id.clone() });
            }
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let period = self.interval;
        let loop_job = job_id.clone();
        let first = Instant::now() + period;

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        debug!(job_id = %loop_job, epoch, "Poll tick");
                        if events.send(Event::PollTick { epoch }).is_err() {
                            // Session gone
                            break;
                        }
                    }
                }
            }
            debug!(job_id = %loop_job, "Polling loop exited");
        });

        info!(job_id = %job_id, interval_secs = period.as_secs_f64(), "Polling started");
        self.active = Some(ActiveLoop { job_id, cancel, handle });
        Ok(())
    }

    /// Cancel the running loop, if any. No tick is delivered afterwards
    /// that the reducer would act on, since it has left the polling phase.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            info!(job_id = %active.job_id, "Polling stopped");
        }
    }
}

impl Drop for PollingLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
