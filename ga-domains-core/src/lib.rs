//! GA Domains Core Library
//!
//! Business logic for provisioning a tenant domain on the hosting platform:
//! - The provisioning workflow (`config → dns → ssl → deploy → complete`)
//! - Input validation and the deployment descriptor
//! - Server connectivity probe
//! - DNS record management (DNS Record Service)
//! - Background refresh of the domain list
//!
//! All remote work goes through the `ga-domains-backend` traits, so any
//! frontend (CLI, web, tests) can drive the same workflow.

pub mod config;
pub mod connectivity;
pub mod error;
pub mod progress;
pub mod services;
pub mod types;
pub mod validation;
pub mod workflow;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::WorkflowConfig;
pub use connectivity::{ConnectivityProbe, ConnectivityReport, TcpConnectivityProbe};
pub use error::{CoreError, CoreResult};
pub use progress::{CollectingReporter, LogReporter, NoopReporter, Progress, ProgressReporter};
pub use services::{DnsMutation, DnsRecordService, DomainPoller, PollerHandle, ServiceContext};
pub use workflow::{ProvisioningWorkflow, WorkflowSnapshot};
