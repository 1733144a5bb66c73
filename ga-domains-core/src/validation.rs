//! 输入校验
//!
//! Shape checks only: `999.1.1.1` is accepted as a server address. Value
//! ranges are left to the backend, which may legitimately target internal
//! addresses.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{ConfigField, DnsRecordInput, DnsRecordType, DomainConfigInput, ValidationErrors};

static DOMAIN_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

static IPV4_SHAPE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3}\.){3}\d{1,3}$").ok());

static HOSTNAME_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(\*\.)?([a-zA-Z0-9_]([a-zA-Z0-9_-]*[a-zA-Z0-9])?\.)*[a-zA-Z0-9_]([a-zA-Z0-9_-]*[a-zA-Z0-9])?\.?$").ok()
});

/// Smallest TTL the record store accepts.
pub const MIN_RECORD_TTL: u32 = 60;

fn is_match(re: &LazyLock<Option<Regex>>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

/// Check the domain field; `None` when valid.
pub fn validate_domain(domain: &str) -> Option<String> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Some("Domain is required".to_string());
    }
    if domain.len() < 3 || !is_match(&DOMAIN_RE, domain) {
        return Some("Invalid domain format".to_string());
    }
    None
}

/// Check the server address field; `None` when valid.
pub fn validate_server_ip(server_ip: &str) -> Option<String> {
    let server_ip = server_ip.trim();
    if server_ip.is_empty() {
        return Some("Server IP is required".to_string());
    }
    if !is_match(&IPV4_SHAPE_RE, server_ip) {
        return Some("Invalid IP address format".to_string());
    }
    None
}

/// Validate the whole input. Pure: the caller decides where to store the result.
pub fn validate_config(input: &DomainConfigInput) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if let Some(message) = validate_domain(&input.domain) {
        errors.insert(ConfigField::Domain, message);
    }
    if let Some(message) = validate_server_ip(&input.server_ip) {
        errors.insert(ConfigField::ServerIp, message);
    }
    errors
}

/// Local checks run before a record reaches the DNS store.
pub fn validate_record_input(record: &DnsRecordInput) -> Result<(), String> {
    if record.name.trim().is_empty() {
        return Err("record name is required".to_string());
    }
    if record.ttl < MIN_RECORD_TTL {
        return Err(format!("TTL must be at least {MIN_RECORD_TTL} seconds"));
    }
    let value = record.value.trim();
    if value.is_empty() {
        return Err("record value is required".to_string());
    }

    match record.record_type {
        DnsRecordType::A if !is_match(&IPV4_SHAPE_RE, value) => {
            Err(format!("A record value must be an IPv4 address, got '{value}'"))
        }
        DnsRecordType::Aaaa if !value.contains(':') => {
            Err(format!("AAAA record value must be an IPv6 address, got '{value}'"))
        }
        DnsRecordType::Cname | DnsRecordType::Ns | DnsRecordType::Mx
            if !is_match(&HOSTNAME_RE, value) =>
        {
            Err(format!(
                "{} record value must be a hostname, got '{value}'",
                record.record_type
            ))
        }
        DnsRecordType::Mx if record.priority.is_none() => {
            Err("MX record requires a priority".to_string())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(record_type: DnsRecordType, value: &str) -> DnsRecordInput {
        DnsRecordInput {
            record_type,
            name: "www".to_string(),
            value: value.to_string(),
            ttl: 3600,
            priority: None,
        }
    }

    #[test]
    fn short_domain_fails_while_ip_passes() {
        let errors = validate_config(&DomainConfigInput::new("ga", "1.2.3.4"));
        assert!(errors.contains(ConfigField::Domain));
        assert!(!errors.contains(ConfigField::ServerIp));
    }

    #[test]
    fn out_of_range_octets_pass_shape_check() {
        let errors = validate_config(&DomainConfigInput::new("administration.ga", "999.1.1.1"));
        assert!(errors.is_empty());
        assert!(validate_server_ip("999.999.999.999").is_none());
    }

    #[test]
    fn empty_fields_are_required() {
        let errors = validate_config(&DomainConfigInput::default());
        assert_eq!(errors.get(ConfigField::Domain), Some("Domain is required"));
        assert_eq!(errors.get(ConfigField::ServerIp), Some("Server IP is required"));
    }

    #[test]
    fn domain_needs_alphabetic_tld() {
        assert!(validate_domain("demarche.ga").is_none());
        assert!(validate_domain("sub.demarche.ga").is_none());
        assert!(validate_domain("demarche.1").is_some());
        assert!(validate_domain("demarche").is_some());
        assert!(validate_domain("bad domain.ga").is_some());
    }

    #[test]
    fn ip_shape() {
        assert!(validate_server_ip("41.158.1.10").is_none());
        assert!(validate_server_ip("41.158.1").is_some());
        assert!(validate_server_ip("41.158.1.1000").is_some());
        assert!(validate_server_ip("::1").is_some());
    }

    #[test]
    fn record_checks() {
        assert!(validate_record_input(&record(DnsRecordType::A, "41.158.1.10")).is_ok());
        assert!(validate_record_input(&record(DnsRecordType::A, "demarche.ga")).is_err());
        assert!(validate_record_input(&record(DnsRecordType::Aaaa, "2001:db8::1")).is_ok());
        assert!(validate_record_input(&record(DnsRecordType::Aaaa, "41.158.1.10")).is_err());
        assert!(validate_record_input(&record(DnsRecordType::Cname, "demarche.ga.")).is_ok());
        assert!(validate_record_input(&record(DnsRecordType::Cname, "not a host")).is_err());
        assert!(validate_record_input(&record(DnsRecordType::Txt, "v=spf1 -all")).is_ok());
    }

    #[test]
    fn mx_requires_priority() {
        let mut mx = record(DnsRecordType::Mx, "mail.demarche.ga");
        assert!(validate_record_input(&mx).is_err());
        mx.priority = Some(10);
        assert!(validate_record_input(&mx).is_ok());
    }

    #[test]
    fn ttl_floor() {
        let mut r = record(DnsRecordType::A, "41.158.1.10");
        r.ttl = 30;
        assert!(validate_record_input(&r).is_err());
        r.ttl = MIN_RECORD_TTL;
        assert!(validate_record_input(&r).is_ok());
    }
}
