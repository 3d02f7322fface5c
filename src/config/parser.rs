use std::path::Path;
use crate::errors::VulnrecError;
use super::types::ClientConfig;
use super::schema::CONFIG_SCHEMA;
use tracing::{debug, warn};

pub const ENV_API_URL: &str = "VULNREC_API_URL";
pub const ENV_POLL_INTERVAL: &str = "VULNREC_POLL_INTERVAL";

const MAX_CONFIG_BYTES: u64 = 1_048_576;

pub async fn parse_config(path: &Path) -> Result<ClientConfig, VulnrecError> {
    if !path.exists() {
        return Err(VulnrecError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(VulnrecError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    // An empty file is a valid, all-defaults config
    if content.trim().is_empty() {
        return Ok(ClientConfig::default());
    }
    let yaml: serde_yaml::Value = serde_yaml::from_str(&content)?;

    validate_schema(&yaml)?;

    let config: ClientConfig = serde_yaml::from_value(yaml)
        .map_err(|e| VulnrecError::Config(format!("{}: {}", path.display(), e)))?;

    validate_semantics(&config)?;

    Ok(config)
}

/// Resolve the effective configuration: file (when given), then
/// environment overrides, then semantic validation of the result.
pub async fn load_config(path: Option<&Path>) -> Result<ClientConfig, VulnrecError> {
    let mut config = match path {
        Some(path) => parse_config(path).await?,
        None => ClientConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_semantics(&config)?;
    Ok(config)
}

/// Apply `VULNREC_*` overrides. `lookup` is the environment.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<(), VulnrecError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        debug!(base_url = %url, "API URL overridden from environment");
        config.api.base_url = url.trim().to_string();
    }
    if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
        let secs: u64 = raw.trim().parse().map_err(|_| {
            VulnrecError::Config(format!("{} must be a whole number of seconds, got '{}'", ENV_POLL_INTERVAL, raw))
        })?;
        config.polling.interval_secs = secs;
    }
    Ok(())
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), VulnrecError> {
    let json_value: serde_json::Value = serde_json::to_value(yaml)
        .map_err(|e| VulnrecError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| VulnrecError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        // Advisory only; typed parsing and semantic checks decide
        for e in errors {
            warn!(validation_error = %e, path = %e.instance_path, "Config schema warning");
        }
    }

    Ok(())
}

/// Reject values that parse but cannot drive a session.
pub fn validate_semantics(config: &ClientConfig) -> Result<(), VulnrecError> {
    let base_url = &config.api.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(VulnrecError::Config(format!(
            "api.base_url must start with http:// or https://, got '{}'",
            base_url
        )));
    }
    if config.polling.interval_secs == 0 {
        return Err(VulnrecError::Config("polling.interval_secs must be positive".into()));
    }
    if config.pagination.limit == 0 {
        return Err(VulnrecError::Config("pagination.limit must be positive".into()));
    }
    if config.api.request_timeout_secs == 0 {
        return Err(VulnrecError::Config("api.request_timeout_secs must be positive".into()));
    }
    if config.api.request_timeout_secs > config.polling.interval_secs * 10 {
        warn!(
            timeout_secs = config.api.request_timeout_secs,
            interval_secs = config.polling.interval_secs,
            "Request timeout is much longer than the poll interval; ticks will be skipped while a check hangs"
        );
    }

    Ok(())
}
