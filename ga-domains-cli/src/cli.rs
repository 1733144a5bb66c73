//! Command-line arguments.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use ga_domains_backend::{BackendConfig, DnsRecordInput, DnsRecordType};

#[derive(Debug, Parser)]
#[command(name = "ga-domains")]
#[command(about = "Provision and manage custom domains on ADMINISTRATION.GA")]
#[command(version)]
pub struct Cli {
    /// API root of the provisioning backend.
    #[arg(
        long,
        global = true,
        env = "GA_BACKEND_URL",
        default_value = "http://localhost:3000/api"
    )]
    pub backend_url: String,

    /// Bearer token for the backend.
    #[arg(long, global = true, env = "GA_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn backend_config(&self) -> BackendConfig {
        let config = BackendConfig::new(&self.backend_url);
        match &self.api_token {
            Some(token) => config.with_api_token(token),
            None => config,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a domain through config → dns → ssl → deploy.
    Provision(ProvisionArgs),

    /// List custom domains known to the backend.
    Domains,

    /// Print domain statuses whenever they change, until Ctrl-C.
    Watch {
        /// Refresh interval in seconds.
        #[arg(long, env = "GA_POLL_INTERVAL_SECS", default_value_t = 30)]
        interval: u64,
    },

    /// Test whether a server accepts connections.
    Check {
        /// Server IPv4 address.
        server_ip: String,
        #[arg(long, default_value_t = 80)]
        port: u16,
    },

    /// DNS record management.
    Dns {
        #[command(subcommand)]
        cmd: DnsCommands,
    },
}

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Domain to provision, e.g. `demarche.ga`.
    #[arg(long)]
    pub domain: String,

    /// IPv4 address of the server hosting the application.
    #[arg(long = "server-ip")]
    pub server_ip: String,

    /// Application the domain is bound to.
    #[arg(long, env = "GA_APPLICATION_ID")]
    pub application_id: String,

    /// Serve plain HTTP; skip the certificate step.
    #[arg(long)]
    pub no_ssl: bool,

    /// Skip the connectivity test before setup.
    #[arg(long)]
    pub no_auto_setup: bool,

    /// Keep re-checking DNS for up to this many seconds before giving up.
    #[arg(long, value_name = "SECS", default_value_t = 0)]
    pub wait_dns: u64,

    /// Seconds between DNS checks while waiting.
    #[arg(long, value_name = "SECS", default_value_t = 15)]
    pub dns_retry_every: u64,
}

impl ProvisionArgs {
    pub fn dns_wait(&self) -> Duration {
        Duration::from_secs(self.wait_dns)
    }

    pub fn dns_retry_interval(&self) -> Duration {
        Duration::from_secs(self.dns_retry_every.max(1))
    }
}

#[derive(Debug, Subcommand)]
pub enum DnsCommands {
    /// List records of a domain.
    List { domain: String },

    /// Add a record.
    Add {
        domain: String,
        #[command(flatten)]
        record: RecordArgs,
    },

    /// Replace a record.
    Update {
        domain: String,
        record_id: String,
        #[command(flatten)]
        record: RecordArgs,
    },

    /// Delete one or more records.
    Delete {
        domain: String,
        #[arg(required = true)]
        record_ids: Vec<String>,
    },
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Record type (A, AAAA, CNAME, MX, TXT, NS, SRV, CAA).
    #[arg(long = "type", value_name = "TYPE")]
    pub record_type: DnsRecordType,

    /// Host name, `@` for the apex.
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub value: String,

    #[arg(long, default_value_t = 3600)]
    pub ttl: u32,

    /// MX / SRV priority.
    #[arg(long)]
    pub priority: Option<u16>,
}

impl From<RecordArgs> for DnsRecordInput {
    fn from(args: RecordArgs) -> Self {
        Self {
            record_type: args.record_type,
            name: args.name,
            value: args.value,
            ttl: args.ttl,
            priority: args.priority,
        }
    }
}
