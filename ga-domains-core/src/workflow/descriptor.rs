//! Request bodies synthesized from operator input.

use std::fmt::Write as _;

use ga_domains_backend::{DeploymentConfig, DnsRecordRef, DnsRecordType, SetupDomainRequest};

use crate::config::WorkflowConfig;
use crate::types::DomainConfigInput;

/// Where nginx forwards traffic on the target server.
const APP_UPSTREAM: &str = "http://127.0.0.1:3000";

/// Backend server id for an address: `41.158.1.10` → `server-41-158-1-10`.
pub fn server_id_for(server_ip: &str) -> String {
    format!("server-{}", server_ip.trim().replace('.', "-"))
}

/// nginx server block for `domain` (and `www.`), TLS-terminated when `ssl_enabled`.
pub fn nginx_server_block(domain: &str, ssl_enabled: bool) -> String {
    let names = format!("{domain} www.{domain}");
    let mut conf = String::new();

    if ssl_enabled {
        let _ = writeln!(conf, "server {{");
        let _ = writeln!(conf, "    listen 80;");
        let _ = writeln!(conf, "    server_name {names};");
        let _ = writeln!(conf, "    return 301 https://$host$request_uri;");
        let _ = writeln!(conf, "}}");
        let _ = writeln!(conf);
        let _ = writeln!(conf, "server {{");
        let _ = writeln!(conf, "    listen 443 ssl http2;");
        let _ = writeln!(conf, "    server_name {names};");
        let _ = writeln!(
            conf,
            "    ssl_certificate /etc/letsencrypt/live/{domain}/fullchain.pem;"
        );
        let _ = writeln!(
            conf,
            "    ssl_certificate_key /etc/letsencrypt/live/{domain}/privkey.pem;"
        );
    } else {
        let _ = writeln!(conf, "server {{");
        let _ = writeln!(conf, "    listen 80;");
        let _ = writeln!(conf, "    server_name {names};");
    }

    let _ = writeln!(conf);
    let _ = writeln!(conf, "    location / {{");
    let _ = writeln!(conf, "        proxy_pass {APP_UPSTREAM};");
    let _ = writeln!(conf, "        proxy_set_header Host $host;");
    let _ = writeln!(conf, "        proxy_set_header X-Real-IP $remote_addr;");
    let _ = writeln!(
        conf,
        "        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;"
    );
    let _ = writeln!(conf, "        proxy_set_header X-Forwarded-Proto $scheme;");
    let _ = writeln!(conf, "    }}");
    let _ = writeln!(conf, "}}");
    conf
}

/// Deployment descriptor for the current input.
pub fn deployment_config(input: &DomainConfigInput, config: &WorkflowConfig) -> DeploymentConfig {
    let domain = input.domain.trim();
    DeploymentConfig {
        server_id: server_id_for(&input.server_ip),
        server_type: config.server_type,
        ip_address: input.server_ip.trim().to_string(),
        port: WorkflowConfig::app_port(input.ssl_enabled),
        nginx_config: Some(nginx_server_block(domain, input.ssl_enabled)),
    }
}

/// `A @ → server_ip` and `CNAME www → domain`.
pub fn default_dns_records(input: &DomainConfigInput, ttl: u32) -> Vec<DnsRecordRef> {
    vec![
        DnsRecordRef {
            id: None,
            record_type: DnsRecordType::A,
            name: "@".to_string(),
            value: input.server_ip.trim().to_string(),
            ttl,
            priority: None,
        },
        DnsRecordRef {
            id: None,
            record_type: DnsRecordType::Cname,
            name: "www".to_string(),
            value: input.domain.trim().to_string(),
            ttl,
            priority: None,
        },
    ]
}

/// Full setup (upsert-by-domain) request.
pub fn setup_request(input: &DomainConfigInput, config: &WorkflowConfig) -> SetupDomainRequest {
    SetupDomainRequest {
        domain: input.domain.trim().to_string(),
        application_id: config.application_id.clone(),
        dns_records: default_dns_records(input, config.default_ttl),
        deployment_config: deployment_config(input, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(ssl: bool) -> DomainConfigInput {
        DomainConfigInput {
            ssl_enabled: ssl,
            ..DomainConfigInput::new("demarche.ga", "41.158.1.10")
        }
    }

    #[test]
    fn server_id_is_derived_from_address() {
        assert_eq!(server_id_for("41.158.1.10"), "server-41-158-1-10");
    }

    #[test]
    fn port_follows_ssl_flag() {
        let cfg = WorkflowConfig::new("app-1");
        assert_eq!(deployment_config(&input(true), &cfg).port, 443);
        assert_eq!(deployment_config(&input(false), &cfg).port, 80);
    }

    #[test]
    fn nginx_block_terminates_tls_only_when_enabled() {
        let tls = nginx_server_block("demarche.ga", true);
        assert!(tls.contains("listen 443 ssl"));
        assert!(tls.contains("/etc/letsencrypt/live/demarche.ga/fullchain.pem"));
        assert!(tls.contains("server_name demarche.ga www.demarche.ga;"));

        let plain = nginx_server_block("demarche.ga", false);
        assert!(!plain.contains("443"));
        assert!(plain.contains("proxy_pass"));
    }

    #[test]
    fn setup_request_carries_default_records() {
        let req = setup_request(&input(true), &WorkflowConfig::new("app-1"));
        assert_eq!(req.application_id, "app-1");
        assert_eq!(req.dns_records.len(), 2);
        assert_eq!(req.dns_records[0].record_type, DnsRecordType::A);
        assert_eq!(req.dns_records[0].value, "41.158.1.10");
        assert_eq!(req.dns_records[1].name, "www");
        assert_eq!(req.dns_records[1].value, "demarche.ga");
        assert_eq!(req.dns_records[1].ttl, 3600);
    }
}
