use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::errors::VulnrecError;
use crate::gateway::RemoteGateway;
use crate::models::{FindingFilter, JobId, PaginationInput};
use crate::polling::PollingLoop;
use crate::reducer::{Effect, Event, Intent, Reducer};
use crate::store::{Phase, ResultState, StateSnapshot};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub poll_interval: Duration,
    pub page: PaginationInput,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(crate::config::DEFAULT_POLL_INTERVAL_SECS),
            page: PaginationInput::default(),
        }
    }
}

impl From<&ClientConfig> for SessionConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            page: config.page(),
        }
    }
}

/// One result-acquisition session: the reducer plus the machinery that
/// performs its effects. Gateway calls run as spawned tasks and report
/// back through the event channel; nothing is applied until `step`.
pub struct Session {
    id: Uuid,
    reducer: Reducer,
    gateway: Arc<dyn RemoteGateway>,
    poller: PollingLoop,
    events_tx: UnboundedSender<Event>,
    events_rx: UnboundedReceiver<Event>,
    state_tx: watch::Sender<StateSnapshot>,
    calls: Vec<JoinHandle<()>>,
}

impl Session {
    pub fn new(gateway: Arc<dyn RemoteGateway>, config: SessionConfig) -> Self {
        let reducer = Reducer::new(config.page);
        Self::with_reducer(gateway, config, reducer)
    }

    /// Attach to a job submitted earlier. Polling starts on `Load`.
    pub fn resume(
        gateway: Arc<dyn RemoteGateway>,
        config: SessionConfig,
        job_id: JobId,
        filter: FindingFilter,
    ) -> Self {
        let reducer = Reducer::resume(config.page, job_id, filter);
        Self::with_reducer(gateway, config, reducer)
    }

    fn with_reducer(gateway: Arc<dyn RemoteGateway>, config: SessionConfig, reducer: Reducer) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        let (state_tx, _) = watch::channel(reducer.snapshot());
        let id = Uuid::new_v4();
        debug!(session_id = %id, gateway = gateway.gateway_name(), phase = %reducer.phase(), "Session created");
        Self {
            id,
            reducer,
            gateway,
            poller: PollingLoop::new(config.poll_interval),
            events_tx,
            events_rx,
            state_tx,
            calls: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.reducer.phase()
    }

    pub fn state(&self) -> &ResultState {
        self.reducer.state()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.reducer.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.state_tx.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// Apply an intent. Rejected intents change nothing and are reported
    /// to the caller only.
    pub fn dispatch(&mut self, intent: Intent) -> Result<(), VulnrecError> {
        let name = intent.name();
        match self.reducer.dispatch(intent) {
            Ok(effects) => {
                debug!(session_id = %self.id, intent = name, phase = %self.reducer.phase(), effects = effects.len(), "Intent accepted");
                self.perform(effects);
                self.publish();
                Ok(())
            }
            Err(e) => {
                warn!(session_id = %self.id, intent = name, error = %e, "Intent rejected");
                Err(e)
            }
        }
    }

    /// Wait for the next tick or gateway response and apply it.
    pub async fn step(&mut self) -> Phase {
        if let Some(event) = self.events_rx.recv().await {
            self.handle_event(event);
        }
        self.reducer.phase()
    }

    /// Process events until no request of the session's own is pending.
    /// Returns at once for a resumed session whose loop is not started.
    pub async fn settle(&mut self) -> StateSnapshot {
        while !self.reducer.phase().is_at_rest() {
            if self.reducer.phase() == Phase::Polling && !self.reducer.loop_active() {
                break;
            }
            self.step().await;
        }
        self.snapshot()
    }

    pub(crate) async fn next_event(&mut self) -> Option<Event> {
        self.events_rx.recv().await
    }

    pub(crate) fn handle_event(&mut self, event: Event) {
        let name = event.name();
        let before = self.reducer.phase();
        let effects = self.reducer.apply(event);
        let after = self.reducer.phase();
        if before != after {
            info!(session_id = %self.id, event = name, from = %before, to = %after, "Phase changed");
        }
        if after == Phase::Failed {
            if let Some(message) = &self.reducer.state().last_error {
                error!(session_id = %self.id, error = %message, "Session failed");
            }
        }
        self.perform(effects);
        self.publish();
    }

    /// Stop polling and abandon in-flight calls.
    pub fn teardown(&mut self) {
        self.poller.stop();
        for call in self.calls.drain(..) {
            call.abort();
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.reducer.snapshot());
    }

    fn perform(&mut self, effects: Vec<Effect>) {
        self.calls.retain(|call| !call.is_finished());
        for effect in effects {
            match effect {
                Effect::StartPolling { epoch, job_id } => {
                    if let Err(e) = self.poller.start(epoch, job_id, self.events_tx.clone()) {
                        error!(session_id = %self.id, error = %e, "Could not start polling");
                    }
                }
                Effect::StopPolling => self.poller.stop(),
                Effect::Submit { epoch, document, filter, options } => {
                    let gateway = self.gateway.clone();
                    self.spawn_call(async move {
                        let result = gateway.submit(&document, &filter, &options).await;
                        Event::Submitted { epoch, result }
                    });
                }
                Effect::CheckStatus { epoch, job_id } => {
                    let gateway = self.gateway.clone();
                    self.spawn_call(async move {
                        let result = gateway.check_status(&job_id).await;
                        Event::StatusChecked { epoch, result }
                    });
                }
                Effect::FetchResults { epoch, job_id, query, purpose } => {
                    let gateway = self.gateway.clone();
                    self.spawn_call(async move {
                        let result = gateway.fetch_results(&job_id, &query).await;
                        Event::ResultsFetched { epoch, purpose, result }
                    });
                }
                Effect::FetchExample { epoch, name } => {
                    let gateway = self.gateway.clone();
                    self.spawn_call(async move {
                        let result = gateway.fetch_example(&name).await;
                        Event::ExampleFetched { epoch, result }
                    });
                }
            }
        }
    }

    fn spawn_call<F>(&mut self, call: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let events = self.events_tx.clone();
        self.calls.push(tokio::spawn(async move {
            // The receiver lives as long as the session
            let _ = events.send(call.await);
        }));
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}
