//! Backend connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
///
/// Kept under a third of the workflow's 30s operation bound so both read
/// retries can still run before the workflow gives up.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 9;
/// Retries applied to idempotent reads.
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Where and how to reach the provisioning backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// API root, e.g. `https://administration.ga/api`.
    pub base_url: String,
    /// Bearer token sent with every request, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub request_timeout: Duration,
    /// Retries for idempotent reads (`0` disables retrying).
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            api_token: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl BackendConfig {
    /// Default settings pointed at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into()).filter(|t: &String| !t.is_empty());
        self
    }

    /// `base_url` without trailing slashes.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_http_client_constants() {
        let cfg = BackendConfig::default();
        assert_eq!(cfg.connect_timeout, Duration::from_secs(10));
        assert_eq!(cfg.request_timeout, Duration::from_secs(9));
        assert_eq!(cfg.max_retries, 2);
        assert!(cfg.api_token.is_none());
    }

    #[test]
    fn trailing_slashes_are_ignored() {
        let cfg = BackendConfig::new("https://administration.ga/api//");
        assert_eq!(cfg.normalized_base_url(), "https://administration.ga/api");
    }

    #[test]
    fn empty_token_is_dropped() {
        let cfg = BackendConfig::new("http://x").with_api_token("");
        assert!(cfg.api_token.is_none());
    }
}
