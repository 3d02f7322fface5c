use std::sync::Arc;

use tracing::warn;

use crate::cli::commands::ExampleArgs;
use crate::config::ClientConfig;
use crate::errors::VulnrecError;
use crate::gateway::{FixtureCatalog, HttpGateway};
use crate::reducer::Intent;
use crate::session::{Session, SessionConfig};
use super::output::{outcome, print, refine, wait_at_rest};

pub async fn handle_example(args: ExampleArgs, config: ClientConfig, spinner: bool) -> Result<(), VulnrecError> {
    let range = args.severity.range()?;
    if !FixtureCatalog.contains(&args.name) {
        warn!(
            name = %args.name,
            available = ?FixtureCatalog.names(),
            "Unknown example, the default will be shown"
        );
    }

    let gateway = Arc::new(HttpGateway::new(&config)?);
    let (handle, task) = Session::new(gateway, SessionConfig::from(&config)).spawn();
    let spinner = spinner && !args.json;

    let result = async {
        handle.dispatch(Intent::load_example(args.name.clone())).await?;
        let ready = outcome(wait_at_rest(&handle, spinner).await?)?;
        refine(&handle, ready, range, spinner).await
    }
    .await;

    handle.shutdown().await;
    let _ = task.await;
    print(&result?, args.json)
}
