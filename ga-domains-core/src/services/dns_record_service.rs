//! DNS 记录管理服务

use std::sync::Arc;

use ga_domains_backend::{BatchDeleteResult, normalize_domain_name};

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{DnsRecord, DnsRecordInput, Notice, StoreAck};
use crate::validation::validate_record_input;

/// Result of a record mutation: the store's message as a notice, plus the
/// echoed record when the store returns one.
#[derive(Debug, Clone)]
pub struct DnsMutation {
    pub notice: Notice,
    pub record: Option<DnsRecord>,
}

impl DnsMutation {
    fn from_ack(ack: StoreAck, fallback: &str) -> Self {
        let message = ack
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Self {
            notice: Notice::success(message),
            record: ack.record,
        }
    }
}

/// DNS 记录管理服务
///
/// Raw record CRUD, independent of the provisioning workflow.
pub struct DnsRecordService {
    ctx: Arc<ServiceContext>,
}

impl DnsRecordService {
    /// 创建 DNS 服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 列出域名下的所有 DNS 记录
    pub async fn list_records(&self, domain: &str) -> CoreResult<Vec<DnsRecord>> {
        let domain = normalize_domain_name(domain);
        let records = self
            .ctx
            .dns_store
            .list_records(&domain)
            .await
            .map_err(|e| log_failure("list", &domain, e.into()))?;
        log::debug!("[dns] {} records for {domain}", records.len());
        Ok(records)
    }

    /// 创建 DNS 记录
    pub async fn add_record(&self, domain: &str, input: &DnsRecordInput) -> CoreResult<DnsMutation> {
        check_input(input)?;
        let domain = normalize_domain_name(domain);
        let ack = self
            .ctx
            .dns_store
            .add_record(&domain, input)
            .await
            .map_err(|e| log_failure("add", &domain, e.into()))?;
        log::info!(
            "[dns] Added {} {} on {domain}",
            input.record_type,
            input.name
        );
        Ok(DnsMutation::from_ack(ack, "Record added"))
    }

    /// 更新 DNS 记录
    pub async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        input: &DnsRecordInput,
    ) -> CoreResult<DnsMutation> {
        check_input(input)?;
        let domain = normalize_domain_name(domain);
        let ack = self
            .ctx
            .dns_store
            .update_record(&domain, record_id, input)
            .await
            .map_err(|e| log_failure("update", &domain, e.into()))?;
        log::info!("[dns] Updated record {record_id} on {domain}");
        Ok(DnsMutation::from_ack(ack, "Record updated"))
    }

    /// 删除 DNS 记录
    pub async fn delete_record(&self, domain: &str, record_id: &str) -> CoreResult<DnsMutation> {
        let domain = normalize_domain_name(domain);
        let ack = self
            .ctx
            .dns_store
            .delete_record(&domain, record_id)
            .await
            .map_err(|e| log_failure("delete", &domain, e.into()))?;
        log::info!("[dns] Deleted record {record_id} on {domain}");
        Ok(DnsMutation::from_ack(ack, "Record deleted"))
    }

    /// 批量删除 DNS 记录（并发执行，逐条收集失败原因）
    pub async fn delete_records(
        &self,
        domain: &str,
        record_ids: &[String],
    ) -> CoreResult<BatchDeleteResult> {
        if record_ids.is_empty() {
            return Ok(BatchDeleteResult {
                success_count: 0,
                failed_count: 0,
                failures: Vec::new(),
            });
        }
        let domain = normalize_domain_name(domain);
        let result = self
            .ctx
            .dns_store
            .delete_records(&domain, record_ids)
            .await
            .map_err(|e| log_failure("batch delete", &domain, e.into()))?;
        if result.failed_count > 0 {
            log::warn!(
                "[dns] Batch delete on {domain}: {} deleted, {} failed",
                result.success_count,
                result.failed_count
            );
        }
        Ok(result)
    }
}

fn check_input(input: &DnsRecordInput) -> CoreResult<()> {
    validate_record_input(input).map_err(|msg| {
        log::warn!("[dns] Rejected record input: {msg}");
        CoreError::InvalidRecord(msg)
    })
}

fn log_failure(action: &str, domain: &str, err: CoreError) -> CoreError {
    if err.is_expected() {
        log::warn!("[dns] {action} on {domain} failed: {err}");
    } else {
        log::error!("[dns] {action} on {domain} failed: {err}");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_context, sample_dns_record};
    use crate::types::{DnsRecordType, NoticeLevel};

    fn a_record(value: &str) -> DnsRecordInput {
        DnsRecordInput {
            record_type: DnsRecordType::A,
            name: "@".to_string(),
            value: value.to_string(),
            ttl: 3600,
            priority: None,
        }
    }

    #[tokio::test]
    async fn list_normalizes_domain() {
        let mocks = create_test_context();
        mocks
            .dns_store
            .insert("demarche.ga", sample_dns_record("r1", "41.158.1.10"))
            .await;
        let service = DnsRecordService::new(mocks.ctx.clone());

        let records = service.list_records("demarche.ga.").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "r1");
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_store() {
        let mocks = create_test_context();
        let service = DnsRecordService::new(mocks.ctx.clone());

        let result = service.add_record("demarche.ga", &a_record("not-an-ip")).await;
        assert!(matches!(result, Err(CoreError::InvalidRecord(_))));
        assert_eq!(mocks.dns_store.call_count().await, 0);
    }

    #[tokio::test]
    async fn store_message_becomes_success_notice() {
        let mocks = create_test_context();
        mocks
            .dns_store
            .set_ack_message(Some("Record queued for propagation".into()))
            .await;
        let service = DnsRecordService::new(mocks.ctx.clone());

        let outcome = service
            .add_record("demarche.ga", &a_record("41.158.1.10"))
            .await
            .unwrap();
        assert_eq!(outcome.notice.level, NoticeLevel::Success);
        assert_eq!(outcome.notice.message, "Record queued for propagation");
        assert_eq!(service.list_records("demarche.ga").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_message_uses_fallback() {
        let mocks = create_test_context();
        mocks
            .dns_store
            .insert("demarche.ga", sample_dns_record("r1", "41.158.1.10"))
            .await;
        let service = DnsRecordService::new(mocks.ctx.clone());

        let outcome = service.delete_record("demarche.ga", "r1").await.unwrap();
        assert_eq!(outcome.notice.message, "Record deleted");
        assert!(service.list_records("demarche.ga").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_unknown_record_surfaces_store_error() {
        let mocks = create_test_context();
        let service = DnsRecordService::new(mocks.ctx.clone());

        let result = service
            .update_record("demarche.ga", "missing", &a_record("41.158.1.11"))
            .await;
        assert!(matches!(result, Err(CoreError::Backend(_))));
    }

    #[tokio::test]
    async fn batch_delete_reports_per_item_failures() {
        let mocks = create_test_context();
        mocks
            .dns_store
            .insert("demarche.ga", sample_dns_record("r1", "41.158.1.10"))
            .await;
        mocks
            .dns_store
            .insert("demarche.ga", sample_dns_record("r2", "41.158.1.11"))
            .await;
        let service = DnsRecordService::new(mocks.ctx.clone());

        let ids = vec!["r1".to_string(), "ghost".to_string(), "r2".to_string()];
        let result = service.delete_records("demarche.ga", &ids).await.unwrap();
        assert_eq!(result.success_count, 2);
        assert_eq!(result.failed_count, 1);
        assert_eq!(result.failures[0].record_id, "ghost");
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let mocks = create_test_context();
        let service = DnsRecordService::new(mocks.ctx.clone());
        let result = service.delete_records("demarche.ga", &[]).await.unwrap();
        assert_eq!(result.success_count, 0);
        assert_eq!(mocks.dns_store.call_count().await, 0);
    }
}
