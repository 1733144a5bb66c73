//! REST implementation of the provisioning backend and DNS record store

mod backend;
pub(crate) mod envelope;
mod error;
mod http;

use reqwest::Client;

use crate::config::BackendConfig;
use crate::error::{BackendError, Result};
use crate::utils::log_sanitizer::redact_token;

/// REST client for the ADMINISTRATION.GA provisioning API.
///
/// Implements both [`ProvisioningBackend`](crate::ProvisioningBackend) and
/// [`DnsRecordStore`](crate::DnsRecordStore); the two share one connection pool.
pub struct RestBackend {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_token: Option<String>,
    pub(crate) max_retries: u32,
}

impl RestBackend {
    /// Build a client from `config`.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = create_http_client(config)?;
        log::debug!(
            "[backend] base_url={} token={}",
            config.normalized_base_url(),
            config
                .api_token
                .as_deref()
                .map_or_else(|| "<none>".to_string(), redact_token)
        );
        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
            api_token: config.api_token.clone(),
            max_retries: config.max_retries,
        })
    }
}

/// 创建带超时配置的 HTTP Client
fn create_http_client(config: &BackendConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| BackendError::NetworkError {
            operation: "build_client".to_string(),
            detail: e.to_string(),
        })
}
