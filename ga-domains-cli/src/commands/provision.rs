use std::sync::Arc;

use anyhow::bail;
use ga_domains_core::types::{DomainConfigInput, SetupStep};
use ga_domains_core::{CoreResult, ProvisioningWorkflow, ServiceContext, WorkflowConfig};
use tokio::time::Instant;

use super::OutputFormat;
use crate::cli::ProvisionArgs;
use crate::output;

pub async fn handle(
    ctx: Arc<ServiceContext>,
    args: ProvisionArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    // 单次运行不需要后台轮询
    let config = WorkflowConfig::new(&args.application_id).with_poll_interval(None);
    let workflow = ProvisioningWorkflow::new(ctx, config);

    let mut input = DomainConfigInput::new(&args.domain, &args.server_ip);
    input.ssl_enabled = !args.no_ssl;
    input.auto_setup = !args.no_auto_setup;
    let errors = workflow.set_input(input).await?;
    if !errors.is_empty() {
        bail!("Invalid input: {errors}");
    }

    let result = drive(&workflow, &args, format).await;
    format.emit_notices(&workflow.drain_notices().await);

    let snapshot = workflow.snapshot().await;
    match format {
        OutputFormat::Json => println!("{}", output::json(&snapshot)?),
        OutputFormat::Text => print!("{}", output::stage_tracker(&snapshot.stages)),
    }

    result?;
    if snapshot.stage != SetupStep::Complete {
        bail!(
            "Provisioning of {} stopped at the {} stage; run the command again once DNS has propagated",
            args.domain,
            snapshot.stage
        );
    }
    Ok(())
}

async fn drive(
    workflow: &ProvisioningWorkflow,
    args: &ProvisionArgs,
    format: OutputFormat,
) -> CoreResult<()> {
    workflow.setup_domain().await?;
    format.emit_notices(&workflow.drain_notices().await);

    if !wait_for_dns(workflow, args, format).await? {
        return Ok(());
    }

    workflow.provision_ssl().await?;
    format.emit_notices(&workflow.drain_notices().await);

    workflow.deploy_application().await
}

/// Verify DNS, re-checking until it resolves or `--wait-dns` runs out.
async fn wait_for_dns(
    workflow: &ProvisioningWorkflow,
    args: &ProvisionArgs,
    format: OutputFormat,
) -> CoreResult<bool> {
    let deadline = Instant::now() + args.dns_wait();
    let every = args.dns_retry_interval();
    loop {
        let verification = workflow.verify_dns().await?;
        format.emit_notices(&workflow.drain_notices().await);
        if verification.verified {
            return Ok(true);
        }
        if Instant::now() + every > deadline {
            return Ok(false);
        }
        log::info!("[cli] DNS not ready, checking again in {}s", every.as_secs());
        tokio::time::sleep(every).await;
    }
}
