//! REST 响应信封类型定义

use serde::Deserialize;

use crate::types::{DnsRecord, DomainRecord};

/// Common `{ success, error?, message?, ...payload }` response shape.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> ApiEnvelope<T> {
    /// The backend's failure text, preferring `error` over `message`.
    pub fn failure_message(&self) -> Option<String> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ToString::to_string)
    }
}

/// Failure text of a non-2xx body, when the body is an envelope at all.
pub fn envelope_failure(body: &str) -> Option<String> {
    serde_json::from_str::<ApiEnvelope<NoPayload>>(body)
        .ok()
        .filter(|env| !env.success)
        .and_then(|env| env.failure_message())
}

/// Payload-less answers (`{ success, error? }`).
#[derive(Debug, Deserialize, Default)]
pub struct NoPayload {}

#[derive(Debug, Deserialize, Default)]
pub struct SetupPayload {
    #[serde(default)]
    pub record: Option<DomainRecord>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DomainsPayload {
    #[serde(default, alias = "data")]
    pub domains: Vec<DomainRecord>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RecordsPayload {
    #[serde(default, alias = "data")]
    pub records: Vec<DnsRecord>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RecordPayload {
    #[serde(default)]
    pub record: Option<DnsRecord>,
}

/// `GET /domains` answers either a bare array or an envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DomainsResponse {
    Bare(Vec<DomainRecord>),
    Wrapped(ApiEnvelope<DomainsPayload>),
}

/// `GET /dns/{domain}/records` answers either a bare array or an envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecordsResponse {
    Bare(Vec<DnsRecord>),
    Wrapped(ApiEnvelope<RecordsPayload>),
}
