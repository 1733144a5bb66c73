//! Backend factory functions.

use std::sync::Arc;

use crate::config::BackendConfig;
use crate::error::Result;
use crate::rest::RestBackend;

/// Creates the REST backend described by `config`.
///
/// The returned client implements both [`ProvisioningBackend`](crate::ProvisioningBackend)
/// and [`DnsRecordStore`](crate::DnsRecordStore), so one `Arc` can be handed to
/// both slots of a service context.
///
/// # Examples
///
/// ```rust,no_run
/// use ga_domains_backend::{BackendConfig, create_backend};
///
/// let backend = create_backend(
///     &BackendConfig::new("https://administration.ga/api").with_api_token("token"),
/// ).unwrap();
/// ```
pub fn create_backend(config: &BackendConfig) -> Result<Arc<RestBackend>> {
    Ok(Arc::new(RestBackend::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let backend = create_backend(&BackendConfig::new("http://localhost:3000/api/")).unwrap();
        assert_eq!(backend.url("/domains"), "http://localhost:3000/api/domains");
    }
}
