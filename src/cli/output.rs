use tracing::debug;

use crate::errors::VulnrecError;
use crate::reducer::Intent;
use crate::reporting::format_report;
use crate::session::SessionHandle;
use crate::store::{Phase, StateSnapshot};
use crate::models::ScoreRange;
use super::progress::SessionProgress;

/// Wait for the session to come to rest behind a spinner.
pub async fn wait_at_rest(handle: &SessionHandle, spinner: bool) -> Result<StateSnapshot, VulnrecError> {
    let progress = SessionProgress::attach(handle.subscribe(), spinner);
    let snapshot = handle.settled().await;
    match &snapshot {
        Ok(s) => progress.finish(s),
        Err(_) => progress.finish(&handle.snapshot()),
    }
    snapshot
}

/// Turn a recorded session failure into an error for the exit code.
pub fn outcome(snapshot: StateSnapshot) -> Result<StateSnapshot, VulnrecError> {
    if !snapshot.state.has_error {
        return Ok(snapshot);
    }
    let message = snapshot
        .state
        .last_error
        .clone()
        .unwrap_or_else(|| format!("session stopped while {}", snapshot.phase));
    Err(VulnrecError::Session {
        kind: snapshot.state.error_kind.unwrap_or("InternalError"),
        message,
    })
}

/// Narrow a READY result set by severity through the session.
pub async fn refine(
    handle: &SessionHandle,
    snapshot: StateSnapshot,
    range: Option<ScoreRange>,
    spinner: bool,
) -> Result<StateSnapshot, VulnrecError> {
    let Some(range) = range else {
        return Ok(snapshot);
    };
    if snapshot.phase != Phase::Ready {
        return Ok(snapshot);
    }
    debug!(min = range.min(), max = range.max(), "Applying severity filter");
    handle.dispatch(Intent::filter(range.min(), range.max())).await?;
    outcome(wait_at_rest(handle, spinner).await?)
}

pub fn print(snapshot: &StateSnapshot, json: bool) -> Result<(), VulnrecError> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        print!("{}", format_report(snapshot));
    }
    Ok(())
}
