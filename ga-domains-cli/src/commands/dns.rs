use std::sync::Arc;

use ga_domains_core::types::{DnsRecordInput, Notice};
use ga_domains_core::{DnsRecordService, ServiceContext};

use super::OutputFormat;
use crate::cli::DnsCommands;
use crate::output;

pub async fn handle(
    ctx: Arc<ServiceContext>,
    cmd: DnsCommands,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let service = DnsRecordService::new(ctx);

    match cmd {
        DnsCommands::List { domain } => {
            let records = service.list_records(&domain).await?;
            match format {
                OutputFormat::Json => println!("{}", output::json(&records)?),
                OutputFormat::Text => print!("{}", output::records(&records)),
            }
        }
        DnsCommands::Add { domain, record } => {
            let mutation = service
                .add_record(&domain, &DnsRecordInput::from(record))
                .await?;
            format.emit_notices(std::slice::from_ref(&mutation.notice));
            if format == OutputFormat::Json {
                println!("{}", output::json(&mutation.record)?);
            }
        }
        DnsCommands::Update {
            domain,
            record_id,
            record,
        } => {
            let mutation = service
                .update_record(&domain, &record_id, &DnsRecordInput::from(record))
                .await?;
            format.emit_notices(std::slice::from_ref(&mutation.notice));
            if format == OutputFormat::Json {
                println!("{}", output::json(&mutation.record)?);
            }
        }
        DnsCommands::Delete { domain, record_ids } => {
            if let [record_id] = record_ids.as_slice() {
                let mutation = service.delete_record(&domain, record_id).await?;
                format.emit_notices(std::slice::from_ref(&mutation.notice));
                return Ok(());
            }

            let result = service.delete_records(&domain, &record_ids).await?;
            match format {
                OutputFormat::Json => println!("{}", output::json(&result)?),
                OutputFormat::Text => print!("{}", output::batch_delete(&result)),
            }
            if result.failed_count > 0 {
                format.emit_notices(&[Notice::warning(format!(
                    "{} of {} records could not be deleted",
                    result.failed_count,
                    record_ids.len()
                ))]);
                anyhow::bail!("batch delete incomplete");
            }
        }
    }
    Ok(())
}
