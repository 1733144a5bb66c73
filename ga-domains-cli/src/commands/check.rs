use std::sync::Arc;

use anyhow::bail;
use ga_domains_core::validation::validate_server_ip;
use ga_domains_core::{ServiceContext, WorkflowConfig};

use super::OutputFormat;
use crate::output;

pub async fn handle(
    ctx: Arc<ServiceContext>,
    server_ip: &str,
    port: u16,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if let Some(message) = validate_server_ip(server_ip) {
        bail!("{message}");
    }

    let limit = WorkflowConfig::default().connectivity_timeout;
    let report = ctx.probe.probe(server_ip.trim(), port, limit).await;
    match format {
        OutputFormat::Json => println!("{}", output::json(&report)?),
        OutputFormat::Text => print!("{}", output::connectivity(&report)),
    }

    if !report.reachable {
        bail!("{} is unreachable", report.target);
    }
    Ok(())
}
