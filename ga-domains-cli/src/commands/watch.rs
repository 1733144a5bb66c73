use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use ga_domains_backend::DomainStatus;
use ga_domains_core::{DomainPoller, ProvisioningWorkflow, ServiceContext, WorkflowConfig};

use super::OutputFormat;
use crate::output;

/// How often the poller's cached list is checked for changes.
const RENDER_INTERVAL: Duration = Duration::from_secs(1);

pub async fn handle(
    ctx: Arc<ServiceContext>,
    interval_secs: u64,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let config =
        WorkflowConfig::default().with_poll_interval(Some(Duration::from_secs(interval_secs)));
    let workflow = Arc::new(ProvisioningWorkflow::new(ctx, config));

    workflow.refresh().await?;
    let Some(poller) = DomainPoller::from_config(workflow.clone()) else {
        bail!("--interval must be at least one second");
    };
    tracing::info!("Watching domains every {interval_secs}s, Ctrl-C to stop");

    let mut last: Option<Vec<(String, DomainStatus)>> = None;
    let mut ticker = tokio::time::interval(RENDER_INTERVAL);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                let domains = workflow.domains().await;
                let seen: Vec<_> = domains.iter().map(|d| (d.id.clone(), d.status)).collect();
                if last.as_ref() != Some(&seen) {
                    match format {
                        OutputFormat::Json => println!("{}", output::json(&domains)?),
                        OutputFormat::Text => print!("{}", output::domains(&domains)),
                    }
                    last = Some(seen);
                }
                if let Some(error) = workflow.error().await {
                    eprintln!("[error] {error}");
                    workflow.dismiss_error().await;
                }
            }
        }
    }

    poller.stop();
    Ok(())
}
