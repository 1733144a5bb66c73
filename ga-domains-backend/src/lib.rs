//! # ga-domains-backend
//!
//! Client contracts for the ADMINISTRATION.GA domain provisioning backend and
//! DNS record store, plus a REST implementation of both.
//!
//! ## Contracts
//!
//! | Trait | Responsibility |
//! |-------|----------------|
//! | [`ProvisioningBackend`] | setup (upsert by domain), DNS verification, SSL issuance, deployment, listing |
//! | [`DnsRecordStore`] | raw record list/add/update/delete, independent of the provisioning lifecycle |
//!
//! ## TLS Backend
//!
//! - **`native-tls`** *(default)* — Use the platform's native TLS implementation.
//! - **`rustls`** — Use rustls.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ga_domains_backend::{BackendConfig, ProvisioningBackend, create_backend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BackendConfig::new("https://administration.ga/api").with_api_token("token");
//!     let backend = create_backend(&config)?;
//!
//!     for record in backend.list_domains().await? {
//!         println!("{} ({})", record.domain, record.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every call returns [`Result<T, BackendError>`](BackendError):
//!
//! - [`BackendError::Rejected`] — the backend answered `success: false`; its message is kept verbatim
//! - [`BackendError::Unauthorized`] — HTTP 401/403
//! - [`BackendError::NotFound`] — HTTP 404
//! - [`BackendError::RateLimited`] / [`BackendError::NetworkError`] — transient (retried on reads)
//!
//! Writes are never retried.

mod config;
mod error;
mod factory;
mod http_client;
mod rest;
mod traits;
mod types;
mod utils;

pub use config::BackendConfig;
pub use error::{BackendError, GENERIC_FAILURE_MESSAGE, Result};
pub use factory::create_backend;
pub use rest::RestBackend;
pub use traits::{DnsRecordStore, ProvisioningBackend};
pub use types::{
    BatchDeleteFailure, BatchDeleteResult, DeploymentConfig, DnsRecord, DnsRecordInput,
    DnsRecordRef, DnsRecordType, DnsVerification, DomainRecord, DomainStatus, ServerType,
    SetupDomainRequest, SslCertificate, StoreAck, normalize_domain_name,
};

pub use utils::datetime;
pub use utils::log_sanitizer;
