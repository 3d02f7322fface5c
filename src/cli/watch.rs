use std::sync::Arc;

use tracing::info;

use crate::cli::commands::WatchArgs;
use crate::config::ClientConfig;
use crate::errors::VulnrecError;
use crate::gateway::HttpGateway;
use crate::models::{FindingFilter, JobId};
use crate::reducer::Intent;
use crate::session::{Session, SessionConfig};
use super::output::{outcome, print, wait_at_rest};

pub async fn handle_watch(args: WatchArgs, config: ClientConfig, spinner: bool) -> Result<(), VulnrecError> {
    let mut filter = FindingFilter::default();
    if let Some(range) = args.severity.range()? {
        filter = filter.with_severity(range);
    }
    let job_id = JobId::new(args.job_id.trim());
    if job_id.as_str().is_empty() {
        return Err(VulnrecError::InvalidDocument("job id must not be empty".into()));
    }

    info!(job_id = %job_id, "Resuming job");
    let gateway = Arc::new(HttpGateway::new(&config)?);
    let session = Session::resume(gateway, SessionConfig::from(&config), job_id, filter);
    let (handle, task) = session.spawn();

    let result = async {
        handle.dispatch(Intent::Load).await?;
        outcome(wait_at_rest(&handle, spinner && !args.json).await?)
    }
    .await;

    handle.shutdown().await;
    let _ = task.await;
    print(&result?, args.json)
}
