//! 业务逻辑服务层

mod dns_record_service;
mod poller;

pub use dns_record_service::{DnsMutation, DnsRecordService};
pub use poller::{DomainPoller, PollerHandle};

use std::sync::Arc;

use ga_domains_backend::{DnsRecordStore, ProvisioningBackend};

use crate::connectivity::{ConnectivityProbe, TcpConnectivityProbe};
use crate::progress::{NoopReporter, ProgressReporter};

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入具体的 backend / store 实现。
pub struct ServiceContext {
    /// 域名开通后端
    pub backend: Arc<dyn ProvisioningBackend>,
    /// DNS 记录存储
    pub dns_store: Arc<dyn DnsRecordStore>,
    /// 连通性探测
    pub probe: Arc<dyn ConnectivityProbe>,
    /// 进度上报
    pub reporter: Arc<dyn ProgressReporter>,
}

impl ServiceContext {
    /// 创建服务上下文（TCP 探测，不上报进度）
    #[must_use]
    pub fn new(
        backend: Arc<dyn ProvisioningBackend>,
        dns_store: Arc<dyn DnsRecordStore>,
    ) -> Self {
        Self {
            backend,
            dns_store,
            probe: Arc::new(TcpConnectivityProbe),
            reporter: Arc::new(NoopReporter),
        }
    }

    /// Replace the connectivity probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn ConnectivityProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Replace the progress reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }
}
