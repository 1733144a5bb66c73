//! Workflow settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::ServerType;

/// Client-side bound on every backend call.
const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 30;
/// 连通性测试超时（秒）
const DEFAULT_CONNECTIVITY_TIMEOUT_SECS: u64 = 5;
/// How long a finished progress bar stays visible.
const DEFAULT_PROGRESS_CLEAR_DELAY_SECS: u64 = 3;
/// 自动刷新间隔（秒）
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
/// TTL of the default records sent with setup.
const DEFAULT_TTL: u32 = 3600;

/// Settings for one [`ProvisioningWorkflow`](crate::ProvisioningWorkflow).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Tenant application the domain is bound to.
    pub application_id: String,
    pub operation_timeout: Duration,
    pub connectivity_timeout: Duration,
    /// Port probed by the connectivity test.
    pub connectivity_port: u16,
    pub progress_clear_delay: Duration,
    /// Auto-refresh interval; `None` disables polling.
    pub poll_interval: Option<Duration>,
    pub default_ttl: u32,
    pub server_type: ServerType,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            operation_timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
            connectivity_timeout: Duration::from_secs(DEFAULT_CONNECTIVITY_TIMEOUT_SECS),
            connectivity_port: 80,
            progress_clear_delay: Duration::from_secs(DEFAULT_PROGRESS_CLEAR_DELAY_SECS),
            poll_interval: Some(Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)),
            default_ttl: DEFAULT_TTL,
            server_type: ServerType::Nginx,
        }
    }
}

impl WorkflowConfig {
    /// Default settings for `application_id`.
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            ..Self::default()
        }
    }

    /// Set (or disable) the auto-refresh interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Option<Duration>) -> Self {
        self.poll_interval = interval.filter(|d| !d.is_zero());
        self
    }

    /// Application port: 443 behind TLS, 80 otherwise.
    pub fn app_port(ssl_enabled: bool) -> u16 {
        if ssl_enabled { 443 } else { 80 }
    }
}
