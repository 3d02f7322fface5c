use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::cli::commands::UploadArgs;
use crate::config::ClientConfig;
use crate::errors::VulnrecError;
use crate::gateway::HttpGateway;
use crate::reducer::Intent;
use crate::session::{Session, SessionConfig};
use super::output::{outcome, print, wait_at_rest};

pub async fn handle_upload(args: UploadArgs, config: ClientConfig, spinner: bool) -> Result<(), VulnrecError> {
    let filter = args.filter()?;
    let document = read_document(&args).await?;
    let source_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());

    let mut options = config.upload_options();
    options.force_update |= args.force;

    info!(file = %args.file.display(), base_url = %config.api.base_url, "Uploading findings");
    let gateway = Arc::new(HttpGateway::new(&config)?);
    let (handle, task) = Session::new(gateway, SessionConfig::from(&config)).spawn();

    let result = async {
        handle
            .dispatch(Intent::Upload {
                document,
                source_name,
                filter: Some(filter),
                options,
            })
            .await?;
        outcome(wait_at_rest(&handle, spinner && !args.json).await?)
    }
    .await;

    handle.shutdown().await;
    let _ = task.await;
    print(&result?, args.json)
}

async fn read_document(args: &UploadArgs) -> Result<Value, VulnrecError> {
    let raw = tokio::fs::read_to_string(&args.file).await.map_err(|e| {
        VulnrecError::InvalidDocument(format!("cannot read {}: {}", args.file.display(), e))
    })?;
    let document: Value = serde_json::from_str(&raw).map_err(|e| {
        VulnrecError::InvalidDocument(format!("{} is not valid JSON: {}", args.file.display(), e))
    })?;
    if !document.is_object() && !document.is_array() {
        return Err(VulnrecError::InvalidDocument(format!(
            "{} must contain a JSON object or array",
            args.file.display()
        )));
    }
    Ok(document)
}
