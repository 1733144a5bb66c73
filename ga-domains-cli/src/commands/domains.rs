use std::sync::Arc;

use ga_domains_core::{ProvisioningWorkflow, ServiceContext, WorkflowConfig};

use super::OutputFormat;
use crate::output;

pub async fn handle(ctx: Arc<ServiceContext>, format: OutputFormat) -> anyhow::Result<()> {
    let workflow = ProvisioningWorkflow::new(ctx, WorkflowConfig::default());
    let domains = workflow.refresh().await?;
    match format {
        OutputFormat::Json => println!("{}", output::json(&domains)?),
        OutputFormat::Text => print!("{}", output::domains(&domains)),
    }
    Ok(())
}
