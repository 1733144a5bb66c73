//! `ProvisioningBackend` / `DnsRecordStore` 实现

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use crate::error::Result;
use crate::traits::{BackendErrorMapper, DnsRecordStore, ErrorContext, ProvisioningBackend};
use crate::types::{
    DeploymentConfig, DnsRecord, DnsRecordInput, DnsVerification, DomainRecord,
    SetupDomainRequest, StoreAck,
};

use super::RestBackend;
use super::envelope::{
    ApiEnvelope, DomainsResponse, NoPayload, RecordPayload, RecordsResponse, SetupPayload,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyDnsBody<'a> {
    domain: &'a str,
    expected_ip: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProvisionSslBody<'a> {
    domain: &'a str,
    deployment_config: &'a DeploymentConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeployBody<'a> {
    deployment_config: &'a DeploymentConfig,
}

fn records_path(domain: &str) -> String {
    format!("/dns/{}/records", urlencoding::encode(domain))
}

fn record_path(domain: &str, record_id: &str) -> String {
    format!(
        "{}/{}",
        records_path(domain),
        urlencoding::encode(record_id)
    )
}

impl RestBackend {
    async fn mutate_record<B: Serialize>(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
        context: ErrorContext,
    ) -> Result<StoreAck> {
        let envelope: ApiEnvelope<RecordPayload> =
            self.send(operation, method, path, body, context).await?;
        let envelope = self.unwrap_envelope(operation, envelope)?;
        Ok(StoreAck {
            message: envelope.message,
            record: envelope.payload.record,
        })
    }
}

#[async_trait]
impl ProvisioningBackend for RestBackend {
    async fn setup_domain(&self, request: &SetupDomainRequest) -> Result<DomainRecord> {
        const OP: &str = "setup_domain";
        let envelope: ApiEnvelope<SetupPayload> = self
            .send(
                OP,
                Method::POST,
                "/domains/setup",
                Some(request),
                ErrorContext::resource(&request.domain),
            )
            .await?;
        let envelope = self.unwrap_envelope(OP, envelope)?;

        if let Some(record) = envelope.payload.record {
            log::info!("[backend] Domain {} set up as {}", record.domain, record.id);
            return Ok(record);
        }

        // 部分后端只返回 success，需要回查列表
        log::debug!("[backend] Setup answer carried no record, looking it up");
        self.list_domains()
            .await?
            .into_iter()
            .find(|r| r.matches_domain(&request.domain))
            .ok_or_else(|| self.parse_error(OP, "setup succeeded but no record was returned"))
    }

    async fn verify_dns(&self, domain: &str, expected_ip: &str) -> Result<DnsVerification> {
        const OP: &str = "verify_dns";
        let body = VerifyDnsBody {
            domain,
            expected_ip,
        };
        let envelope: ApiEnvelope<DnsVerification> = self
            .send(
                OP,
                Method::POST,
                "/domains/verify-dns",
                Some(&body),
                ErrorContext::resource(domain),
            )
            .await?;
        let envelope = self.unwrap_envelope(OP, envelope)?;
        log::debug!(
            "[backend] DNS for {domain}: verified={} resolved={:?}",
            envelope.payload.verified,
            envelope.payload.resolved_ips
        );
        Ok(envelope.payload)
    }

    async fn provision_ssl(&self, domain: &str, deployment: &DeploymentConfig) -> Result<()> {
        const OP: &str = "provision_ssl";
        let body = ProvisionSslBody {
            domain,
            deployment_config: deployment,
        };
        let envelope: ApiEnvelope<NoPayload> = self
            .send(
                OP,
                Method::POST,
                "/domains/ssl",
                Some(&body),
                ErrorContext::resource(domain),
            )
            .await?;
        self.unwrap_envelope(OP, envelope)?;
        Ok(())
    }

    async fn deploy_application(
        &self,
        record_id: &str,
        deployment: &DeploymentConfig,
    ) -> Result<()> {
        const OP: &str = "deploy_application";
        let path = format!("/domains/{}/deploy", urlencoding::encode(record_id));
        let body = DeployBody {
            deployment_config: deployment,
        };
        let envelope: ApiEnvelope<NoPayload> = self
            .send(
                OP,
                Method::POST,
                &path,
                Some(&body),
                ErrorContext::resource(record_id),
            )
            .await?;
        self.unwrap_envelope(OP, envelope)?;
        Ok(())
    }

    async fn list_domains(&self) -> Result<Vec<DomainRecord>> {
        const OP: &str = "list_domains";
        let response: DomainsResponse = self.get(OP, "/domains", ErrorContext::default()).await?;
        match response {
            DomainsResponse::Bare(domains) => Ok(domains),
            DomainsResponse::Wrapped(envelope) => {
                Ok(self.unwrap_envelope(OP, envelope)?.payload.domains)
            }
        }
    }
}

#[async_trait]
impl DnsRecordStore for RestBackend {
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        const OP: &str = "list_records";
        let response: RecordsResponse = self
            .get(OP, &records_path(domain), ErrorContext::resource(domain))
            .await?;
        match response {
            RecordsResponse::Bare(records) => Ok(records),
            RecordsResponse::Wrapped(envelope) => {
                Ok(self.unwrap_envelope(OP, envelope)?.payload.records)
            }
        }
    }

    async fn add_record(&self, domain: &str, record: &DnsRecordInput) -> Result<StoreAck> {
        self.mutate_record(
            "add_record",
            Method::POST,
            &records_path(domain),
            Some(record),
            ErrorContext::resource(domain),
        )
        .await
    }

    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        record: &DnsRecordInput,
    ) -> Result<StoreAck> {
        self.mutate_record(
            "update_record",
            Method::PUT,
            &record_path(domain, record_id),
            Some(record),
            ErrorContext::resource(record_id),
        )
        .await
    }

    async fn delete_record(&self, domain: &str, record_id: &str) -> Result<StoreAck> {
        self.mutate_record::<()>(
            "delete_record",
            Method::DELETE,
            &record_path(domain, record_id),
            None,
            ErrorContext::resource(record_id),
        )
        .await
    }
}
