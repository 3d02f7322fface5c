use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::RetryConfig;
use crate::models::{PaginationInput, UploadOptions, UploadPreferences};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub retry: RetrySettings,
    pub pagination: PaginationConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Sent with every request; the analysis service has no auth beyond it.
    pub user_id: u64,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_id: 1,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: DEFAULT_POLL_INTERVAL_SECS }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_retries: RetryConfig::default().max_retries }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { limit: PaginationInput::default().limit }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UploadConfig {
    pub force_update: bool,
    pub preferences: UploadPreferences,
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig { max_retries: self.retry.max_retries }
    }

    pub fn page(&self) -> PaginationInput {
        PaginationInput { offset: 0, limit: self.pagination.limit }
    }

    pub fn upload_options(&self) -> UploadOptions {
        UploadOptions {
            preferences: self.upload.preferences,
            force_update: self.upload.force_update,
        }
    }
}
