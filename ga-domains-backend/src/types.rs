use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Domain Records ============

/// Provisioning status of a custom domain, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    /// Domain saved, DNS not yet verified.
    Pending,
    /// DNS resolves to the configured server.
    DnsConfigured,
    /// Certificate issuance requested or in progress.
    SslPending,
    /// Domain is live.
    Active,
    /// Provisioning failed on the backend side.
    Error,
}

impl DomainStatus {
    /// Short label for the status badge.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::DnsConfigured => "DNS configured",
            Self::SslPending => "SSL pending",
            Self::Active => "Active",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Web server flavour the application is deployed behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    /// nginx reverse proxy (default).
    #[default]
    Nginx,
    /// Apache httpd.
    Apache,
    /// Caddy.
    Caddy,
    /// Any server type this client does not know about.
    #[serde(other)]
    Other,
}

/// Deployment descriptor sent along with setup, SSL and deploy requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    /// Backend identifier of the target server.
    pub server_id: String,
    /// Web server flavour.
    pub server_type: ServerType,
    /// IPv4 address of the target server.
    pub ip_address: String,
    /// Port the application is exposed on.
    pub port: u16,
    /// Rendered web server configuration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nginx_config: Option<String>,
}

/// TLS certificate attached to a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslCertificate {
    /// Expiry instant.
    #[serde(with = "crate::utils::datetime::required")]
    pub valid_to: DateTime<Utc>,
    /// Start of validity, if reported.
    #[serde(default, with = "crate::utils::datetime")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    /// Issuing authority, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl SslCertificate {
    /// Whole days left before expiry; negative once expired.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.valid_to - now).num_days()
    }

    /// Whether the certificate has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_to <= now
    }
}

/// The backend's authoritative record for a tenant's custom domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    /// Backend identifier.
    pub id: String,
    /// Fully-qualified domain name.
    pub domain: String,
    /// Current provisioning status.
    pub status: DomainStatus,
    /// DNS records the backend manages for this domain.
    #[serde(default)]
    pub dns_records: Vec<DnsRecordRef>,
    /// Deployment target, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_config: Option<DeploymentConfig>,
    /// Issued certificate, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_certificate: Option<SslCertificate>,
    /// Last backend-side failure, when `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// When the record was created, if known.
    #[serde(default, with = "crate::utils::datetime")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last updated, if known.
    #[serde(default, with = "crate::utils::datetime")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DomainRecord {
    /// Case-insensitive comparison against a domain name, ignoring a trailing dot.
    pub fn matches_domain(&self, domain: &str) -> bool {
        normalize_domain_name(&self.domain).eq_ignore_ascii_case(&normalize_domain_name(domain))
    }
}

/// 去掉域名末尾的点
pub fn normalize_domain_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_string()
}

// ============ Provisioning Requests ============

/// Body of the setup (upsert-by-domain) request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupDomainRequest {
    /// Fully-qualified domain name.
    pub domain: String,
    /// Tenant application the domain is bound to.
    pub application_id: String,
    /// Records the backend should create.
    pub dns_records: Vec<DnsRecordRef>,
    /// Deployment target.
    pub deployment_config: DeploymentConfig,
}

/// Outcome of a DNS verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DnsVerification {
    /// Whether the domain resolves to the expected address.
    #[serde(default)]
    pub verified: bool,
    /// Addresses the backend resolved, if reported.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolved_ips: Vec<String>,
}

// ============ DNS Record Types ============

/// DNS record type identifier.
///
/// Serialized as uppercase strings (`"A"`, `"AAAA"`, `"CNAME"`, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name (alias) record.
    Cname,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Name server record.
    Ns,
    /// Service locator record.
    Srv,
    /// Certificate Authority Authorization record.
    Caa,
}

impl DnsRecordType {
    /// Uppercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Ns => "NS",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
        }
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DnsRecordType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(Self::A),
            "AAAA" => Ok(Self::Aaaa),
            "CNAME" => Ok(Self::Cname),
            "MX" => Ok(Self::Mx),
            "TXT" => Ok(Self::Txt),
            "NS" => Ok(Self::Ns),
            "SRV" => Ok(Self::Srv),
            "CAA" => Ok(Self::Caa),
            other => Err(format!("unsupported record type: {other}")),
        }
    }
}

/// A DNS record as referenced from a [`DomainRecord`] or a setup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecordRef {
    /// Store identifier, once the record exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record name (`"@"` for apex).
    pub name: String,
    /// Record value.
    pub value: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// MX/SRV priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

/// A raw DNS resource record held by the DNS record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    /// Store identifier.
    pub id: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record name (`"@"` for apex).
    pub name: String,
    /// Record value.
    pub value: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// MX/SRV priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// When the record was created, if known.
    #[serde(default, with = "crate::utils::datetime")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last updated, if known.
    #[serde(default, with = "crate::utils::datetime")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of add/update record requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecordInput {
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record name (`"@"` for apex).
    pub name: String,
    /// Record value.
    pub value: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// MX/SRV priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

/// Acknowledgement returned by record store mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoreAck {
    /// Informational message from the store, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The created or updated record, if the store echoes it back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<DnsRecord>,
}

// ============ Batch Operation Types ============

/// Result of a batch delete operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteResult {
    /// Number of records successfully deleted.
    pub success_count: usize,
    /// Number of records that failed to delete.
    pub failed_count: usize,
    /// Details of each failed deletion.
    pub failures: Vec<BatchDeleteFailure>,
}

/// Details of a single failed record deletion within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteFailure {
    /// ID of the record that failed to delete.
    pub record_id: String,
    /// Human-readable failure reason.
    pub reason: String,
}
