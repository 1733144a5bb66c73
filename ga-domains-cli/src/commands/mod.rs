//! Subcommand handlers.

mod check;
mod dns;
mod domains;
mod provision;
mod watch;

use std::sync::Arc;

use ga_domains_backend::create_backend;
use ga_domains_core::ServiceContext;
use ga_domains_core::types::Notice;

use crate::cli::{Cli, Commands};
use crate::output::{self, TerminalReporter};

/// How results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json { Self::Json } else { Self::Text }
    }

    /// Notices go to stdout in text mode; stderr keeps JSON output parseable.
    pub fn emit_notices(self, notices: &[Notice]) {
        for notice in notices {
            let line = output::notice(notice);
            match self {
                Self::Text => println!("{line}"),
                Self::Json => eprintln!("{line}"),
            }
        }
    }
}

/// Build the service context for the configured backend.
fn build_context(cli: &Cli, format: OutputFormat) -> anyhow::Result<Arc<ServiceContext>> {
    let backend = create_backend(&cli.backend_config())?;
    let mut ctx = ServiceContext::new(backend.clone(), backend);
    if format == OutputFormat::Text {
        ctx = ctx.with_reporter(Arc::new(TerminalReporter));
    }
    Ok(Arc::new(ctx))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = OutputFormat::from_cli(&cli);
    let ctx = build_context(&cli, format)?;
    log::debug!("[cli] Backend at {}", cli.backend_url);

    match cli.command {
        Commands::Provision(args) => provision::handle(ctx, args, format).await,
        Commands::Domains => domains::handle(ctx, format).await,
        Commands::Watch { interval } => watch::handle(ctx, interval, format).await,
        Commands::Check { server_ip, port } => check::handle(ctx, &server_ip, port, format).await,
        Commands::Dns { cmd } => dns::handle(ctx, cmd, format).await,
    }
}
