use async_trait::async_trait;

use crate::error::{BackendError, Result};
use crate::types::{
    BatchDeleteFailure, BatchDeleteResult, DeploymentConfig, DnsRecord, DnsRecordInput,
    DnsVerification, DomainRecord, SetupDomainRequest, StoreAck,
};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// HTTP status code, when the failure came from a response.
    pub status: Option<u16>,
    /// Message extracted from the response body, or the body itself.
    pub message: String,
    /// `message` came from the backend's `{ success: false, error }` envelope.
    pub from_envelope: bool,
}

impl RawApiError {
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            from_envelope: false,
        }
    }

    pub fn from_envelope(status: u16, message: impl Into<String>) -> Self {
        Self {
            from_envelope: true,
            ..Self::with_status(status, message)
        }
    }
}

/// Context attached when mapping a raw error (internal use).
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Domain name or record id the request addressed.
    pub resource: Option<String>,
}

impl ErrorContext {
    pub fn resource(resource: impl Into<String>) -> Self {
        Self {
            resource: Some(resource.into()),
        }
    }
}

/// 错误映射 Trait（内部使用）
pub(crate) trait BackendErrorMapper {
    /// Map a raw HTTP failure to the unified error type.
    fn map_error(&self, operation: &str, raw: RawApiError, context: ErrorContext)
    -> BackendError;

    /// 快捷方法：解析错误
    fn parse_error(&self, operation: &str, detail: impl ToString) -> BackendError {
        BackendError::ParseError {
            operation: operation.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// External domain provisioning backend.
///
/// Performs DNS verification, certificate issuance and application deployment
/// for tenant custom domains. Implementations translate `success: false`
/// answers into [`BackendError::Rejected`] carrying the backend message.
#[async_trait]
pub trait ProvisioningBackend: Send + Sync {
    /// Upsert a domain by name and return the backend record.
    async fn setup_domain(&self, request: &SetupDomainRequest) -> Result<DomainRecord>;

    /// Check whether `domain` resolves to `expected_ip`.
    async fn verify_dns(&self, domain: &str, expected_ip: &str) -> Result<DnsVerification>;

    /// Request certificate issuance for `domain`.
    async fn provision_ssl(&self, domain: &str, deployment: &DeploymentConfig) -> Result<()>;

    /// Deploy the application behind the domain record `record_id`.
    async fn deploy_application(&self, record_id: &str, deployment: &DeploymentConfig)
    -> Result<()>;

    /// List every domain record known to the backend.
    async fn list_domains(&self) -> Result<Vec<DomainRecord>>;
}

/// External DNS record store (raw resource records, independent lifecycle).
#[async_trait]
pub trait DnsRecordStore: Send + Sync {
    /// List the records of `domain`.
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>>;

    /// Add a record to `domain`.
    async fn add_record(&self, domain: &str, record: &DnsRecordInput) -> Result<StoreAck>;

    /// Replace the record `record_id` of `domain`.
    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        record: &DnsRecordInput,
    ) -> Result<StoreAck>;

    /// Delete the record `record_id` of `domain`.
    async fn delete_record(&self, domain: &str, record_id: &str) -> Result<StoreAck>;

    /// 批量删除 DNS 记录
    ///
    /// 默认实现并发调用 `delete_record()`，收集成功/失败结果。
    async fn delete_records(&self, domain: &str, record_ids: &[String]) -> Result<BatchDeleteResult> {
        let futures: Vec<_> = record_ids
            .iter()
            .map(|id| self.delete_record(domain, id))
            .collect();
        let results = futures::future::join_all(futures).await;

        let mut success_count = 0;
        let mut failures = Vec::new();

        for (record_id, result) in record_ids.iter().zip(results) {
            match result {
                Ok(_) => success_count += 1,
                Err(e) => failures.push(BatchDeleteFailure {
                    record_id: record_id.clone(),
                    reason: e.operator_message(),
                }),
            }
        }

        Ok(BatchDeleteResult {
            success_count,
            failed_count: failures.len(),
            failures,
        })
    }
}
