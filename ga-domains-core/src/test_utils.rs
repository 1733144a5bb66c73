//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ga_domains_backend::{
    BackendError, DeploymentConfig, DnsRecord, DnsRecordInput, DnsRecordStore, DnsRecordType,
    DnsVerification, DomainRecord, DomainStatus, ProvisioningBackend, Result as BackendResult,
    SetupDomainRequest, StoreAck,
};
use tokio::sync::RwLock;

use crate::config::WorkflowConfig;
use crate::connectivity::{ConnectivityProbe, ConnectivityReport};
use crate::progress::CollectingReporter;
use crate::services::ServiceContext;
use crate::types::DomainConfigInput;
use crate::workflow::ProvisioningWorkflow;

// ===== MockBackend =====

pub struct MockBackend {
    domains: RwLock<Vec<DomainRecord>>,
    verified: RwLock<bool>,
    /// 按操作名注入的错误（持续生效直到清除）
    failures: RwLock<HashMap<&'static str, BackendError>>,
    delay: RwLock<Option<Duration>>,
    calls: RwLock<Vec<&'static str>>,
    last_deployment: RwLock<Option<DeploymentConfig>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            domains: RwLock::new(Vec::new()),
            verified: RwLock::new(true),
            failures: RwLock::new(HashMap::new()),
            delay: RwLock::new(None),
            calls: RwLock::new(Vec::new()),
            last_deployment: RwLock::new(None),
        }
    }

    pub async fn set_verified(&self, verified: bool) {
        *self.verified.write().await = verified;
    }

    pub async fn fail(&self, operation: &'static str, error: BackendError) {
        self.failures.write().await.insert(operation, error);
    }

    pub async fn reject(&self, operation: &'static str, message: &str) {
        self.fail(
            operation,
            BackendError::Rejected {
                operation: operation.to_string(),
                status: None,
                message: message.to_string(),
            },
        )
        .await;
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Every call sleeps this long before answering.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    pub async fn calls(&self) -> Vec<&'static str> {
        self.calls.read().await.clone()
    }

    pub async fn last_deployment(&self) -> Option<DeploymentConfig> {
        self.last_deployment.read().await.clone()
    }

    /// Overwrite the backend-side status (simulates an asynchronous change or a stale poll).
    pub async fn set_status(&self, domain: &str, status: DomainStatus, error: Option<&str>) {
        let mut domains = self.domains.write().await;
        if let Some(record) = domains.iter_mut().find(|d| d.matches_domain(domain)) {
            record.status = status;
            record.error_message = error.map(ToString::to_string);
        }
    }

    pub async fn clear_deployment_config(&self, domain: &str) {
        let mut domains = self.domains.write().await;
        if let Some(record) = domains.iter_mut().find(|d| d.matches_domain(domain)) {
            record.deployment_config = None;
        }
    }

    pub async fn domain_count(&self) -> usize {
        self.domains.read().await.len()
    }

    pub async fn insert_domain(&self, record: DomainRecord) {
        self.domains.write().await.push(record);
    }

    async fn enter(&self, operation: &'static str) -> BackendResult<()> {
        self.calls.write().await.push(operation);
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.failures.read().await.get(operation) {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn update_status(&self, domain: &str, status: DomainStatus) {
        self.set_status(domain, status, None).await;
    }
}

#[async_trait]
impl ProvisioningBackend for MockBackend {
    async fn setup_domain(&self, request: &SetupDomainRequest) -> BackendResult<DomainRecord> {
        self.enter("setup_domain").await?;
        let mut domains = self.domains.write().await;
        if let Some(existing) = domains.iter_mut().find(|d| d.matches_domain(&request.domain)) {
            existing.status = DomainStatus::Pending;
            existing.deployment_config = Some(request.deployment_config.clone());
            return Ok(existing.clone());
        }
        let mut record = sample_domain_record(
            &format!("dom-{}", domains.len() + 1),
            &request.domain,
            DomainStatus::Pending,
        );
        record.dns_records = request.dns_records.clone();
        record.deployment_config = Some(request.deployment_config.clone());
        domains.push(record.clone());
        Ok(record)
    }

    async fn verify_dns(&self, domain: &str, expected_ip: &str) -> BackendResult<DnsVerification> {
        self.enter("verify_dns").await?;
        let verified = *self.verified.read().await;
        if verified {
            self.update_status(domain, DomainStatus::DnsConfigured).await;
        }
        Ok(DnsVerification {
            verified,
            resolved_ips: if verified {
                vec![expected_ip.to_string()]
            } else {
                Vec::new()
            },
        })
    }

    async fn provision_ssl(&self, domain: &str, deployment: &DeploymentConfig) -> BackendResult<()> {
        self.enter("provision_ssl").await?;
        *self.last_deployment.write().await = Some(deployment.clone());
        self.update_status(domain, DomainStatus::SslPending).await;
        Ok(())
    }

    async fn deploy_application(
        &self,
        record_id: &str,
        deployment: &DeploymentConfig,
    ) -> BackendResult<()> {
        self.enter("deploy_application").await?;
        *self.last_deployment.write().await = Some(deployment.clone());
        let mut domains = self.domains.write().await;
        match domains.iter_mut().find(|d| d.id == record_id) {
            Some(record) => {
                record.status = DomainStatus::Active;
                Ok(())
            }
            None => Err(BackendError::NotFound {
                operation: "deploy_application".to_string(),
                resource: record_id.to_string(),
                raw_message: None,
            }),
        }
    }

    async fn list_domains(&self) -> BackendResult<Vec<DomainRecord>> {
        self.enter("list_domains").await?;
        Ok(self.domains.read().await.clone())
    }
}

// ===== MockDnsStore =====

pub struct MockDnsStore {
    records: RwLock<HashMap<String, Vec<DnsRecord>>>,
    ack_message: RwLock<Option<String>>,
    calls: RwLock<usize>,
}

impl MockDnsStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ack_message: RwLock::new(None),
            calls: RwLock::new(0),
        }
    }

    pub async fn insert(&self, domain: &str, record: DnsRecord) {
        self.records
            .write()
            .await
            .entry(domain.to_string())
            .or_default()
            .push(record);
    }

    pub async fn set_ack_message(&self, message: Option<String>) {
        *self.ack_message.write().await = message;
    }

    pub async fn call_count(&self) -> usize {
        *self.calls.read().await
    }

    async fn ack(&self, record: Option<DnsRecord>) -> StoreAck {
        StoreAck {
            message: self.ack_message.read().await.clone(),
            record,
        }
    }

    async fn count(&self) {
        *self.calls.write().await += 1;
    }
}

fn record_not_found(operation: &str, record_id: &str) -> BackendError {
    BackendError::NotFound {
        operation: operation.to_string(),
        resource: record_id.to_string(),
        raw_message: Some("record not found".to_string()),
    }
}

#[async_trait]
impl DnsRecordStore for MockDnsStore {
    async fn list_records(&self, domain: &str) -> BackendResult<Vec<DnsRecord>> {
        self.count().await;
        Ok(self
            .records
            .read()
            .await
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_record(&self, domain: &str, input: &DnsRecordInput) -> BackendResult<StoreAck> {
        self.count().await;
        let record = {
            let mut records = self.records.write().await;
            let list = records.entry(domain.to_string()).or_default();
            let record = DnsRecord {
                id: format!("rec-{}", list.len() + 1),
                record_type: input.record_type,
                name: input.name.clone(),
                value: input.value.clone(),
                ttl: input.ttl,
                priority: input.priority,
                created_at: None,
                updated_at: None,
            };
            list.push(record.clone());
            record
        };
        Ok(self.ack(Some(record)).await)
    }

    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        input: &DnsRecordInput,
    ) -> BackendResult<StoreAck> {
        self.count().await;
        let updated = {
            let mut records = self.records.write().await;
            let Some(record) = records
                .get_mut(domain)
                .and_then(|list| list.iter_mut().find(|r| r.id == record_id))
            else {
                return Err(record_not_found("update_record", record_id));
            };
            record.record_type = input.record_type;
            record.name = input.name.clone();
            record.value = input.value.clone();
            record.ttl = input.ttl;
            record.priority = input.priority;
            record.clone()
        };
        Ok(self.ack(Some(updated)).await)
    }

    async fn delete_record(&self, domain: &str, record_id: &str) -> BackendResult<StoreAck> {
        self.count().await;
        {
            let mut records = self.records.write().await;
            let list = records.entry(domain.to_string()).or_default();
            let before = list.len();
            list.retain(|r| r.id != record_id);
            if list.len() == before {
                return Err(record_not_found("delete_record", record_id));
            }
        }
        Ok(self.ack(None).await)
    }
}

// ===== MockProbe =====

pub struct MockProbe {
    reachable: RwLock<bool>,
    calls: RwLock<usize>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self {
            reachable: RwLock::new(true),
            calls: RwLock::new(0),
        }
    }

    pub async fn set_reachable(&self, reachable: bool) {
        *self.reachable.write().await = reachable;
    }

    pub async fn call_count(&self) -> usize {
        *self.calls.read().await
    }
}

#[async_trait]
impl ConnectivityProbe for MockProbe {
    async fn probe(&self, server_ip: &str, port: u16, _limit: Duration) -> ConnectivityReport {
        *self.calls.write().await += 1;
        let target = format!("{server_ip}:{port}");
        if *self.reachable.read().await {
            ConnectivityReport {
                target,
                reachable: true,
                http_responding: true,
                latency_ms: Some(5),
                error: None,
            }
        } else {
            ConnectivityReport::failed(target, "connection timed out")
        }
    }
}

// ===== 工厂方法 =====

pub struct TestMocks {
    pub ctx: Arc<ServiceContext>,
    pub backend: Arc<MockBackend>,
    pub dns_store: Arc<MockDnsStore>,
    pub probe: Arc<MockProbe>,
    pub reporter: Arc<CollectingReporter>,
}

/// 创建测试用 `ServiceContext`
pub fn create_test_context() -> TestMocks {
    let backend = Arc::new(MockBackend::new());
    let dns_store = Arc::new(MockDnsStore::new());
    let probe = Arc::new(MockProbe::new());
    let reporter = Arc::new(CollectingReporter::new());

    let ctx = Arc::new(
        ServiceContext::new(backend.clone(), dns_store.clone())
            .with_probe(probe.clone())
            .with_reporter(reporter.clone()),
    );

    TestMocks {
        ctx,
        backend,
        dns_store,
        probe,
        reporter,
    }
}

/// 创建测试用工作流，输入为 `demarche.ga` → `41.158.1.10`
pub async fn create_test_workflow() -> (Arc<ProvisioningWorkflow>, TestMocks) {
    let mocks = create_test_context();
    let workflow = Arc::new(ProvisioningWorkflow::new(
        mocks.ctx.clone(),
        WorkflowConfig::new("app-demarche"),
    ));
    let _ = workflow.set_input(demarche_input()).await;
    (workflow, mocks)
}

pub fn demarche_input() -> DomainConfigInput {
    DomainConfigInput::new("demarche.ga", "41.158.1.10")
}

pub fn sample_domain_record(id: &str, domain: &str, status: DomainStatus) -> DomainRecord {
    DomainRecord {
        id: id.to_string(),
        domain: domain.to_string(),
        status,
        dns_records: Vec::new(),
        deployment_config: None,
        ssl_certificate: None,
        error_message: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn sample_dns_record(id: &str, value: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        record_type: DnsRecordType::A,
        name: "@".to_string(),
        value: value.to_string(),
        ttl: 3600,
        priority: None,
        created_at: None,
        updated_at: None,
    }
}
