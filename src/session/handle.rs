use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info_span, Instrument};

use crate::errors::VulnrecError;
use crate::reducer::{Event, Intent};
use crate::store::StateSnapshot;
use super::driver::Session;

enum Command {
    Dispatch {
        intent: Intent,
        reply: oneshot::Sender<Result<(), VulnrecError>>,
    },
    Shutdown,
}

enum Wake {
    Command(Option<Command>),
    Event(Option<Event>),
}

/// Cloneable front door to a session running on its own task. Views send
/// intents through it and observe state through `subscribe`.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<StateSnapshot>,
}

impl SessionHandle {
    pub async fn dispatch(&self, intent: Intent) -> Result<(), VulnrecError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Dispatch { intent, reply })
            .await
            .map_err(|_| VulnrecError::Internal("session has shut down".into()))?;
        response
            .await
            .map_err(|_| VulnrecError::Internal("session dropped the intent".into()))?
    }

    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.borrow().clone()
    }

    /// Wait until the session has no request of its own outstanding.
    pub async fn settled(&self) -> Result<StateSnapshot, VulnrecError> {
        let mut rx = self.state.clone();
        let snapshot = rx
            .wait_for(|s| s.phase.is_at_rest())
            .await
            .map_err(|_| VulnrecError::Internal("session has shut down".into()))?;
        Ok(snapshot.clone())
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}

impl Session {
    /// Move the session onto its own task.
    pub fn spawn(self) -> (SessionHandle, JoinHandle<()>) {
        let (commands, mut inbox) = mpsc::channel(32);
        let handle = SessionHandle { commands, state: self.subscribe() };
        let span = info_span!("session", session_id = %self.id());

        let mut session = self;
        let task = tokio::spawn(
            async move {
                loop {
                    let wake = tokio::select! {
                        command = inbox.recv() => Wake::Command(command),
                        event = session.next_event() => Wake::Event(event),
                    };
                    match wake {
                        Wake::Command(Some(Command::Dispatch { intent, reply })) => {
                            let _ = reply.send(session.dispatch(intent));
                        }
                        Wake::Command(Some(Command::Shutdown)) | Wake::Command(None) => break,
                        Wake::Event(Some(event)) => session.handle_event(event),
                        Wake::Event(None) => break,
                    }
                }
                session.teardown();
                debug!("Session task finished");
            }
            .instrument(span),
        );
        (handle, task)
    }
}
