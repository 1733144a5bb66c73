//! 工作流类型定义

mod input;
mod notice;
mod operation;
mod stage;

pub use input::{ConfigField, DomainConfigInput, ValidationErrors};
pub use notice::{Notice, NoticeLevel};
pub use operation::Operation;
pub use stage::{SetupStep, StageState, StageView};

// Re-export backend wire types used across the workflow API
pub use ga_domains_backend::{
    DeploymentConfig, DnsRecord, DnsRecordInput, DnsRecordRef, DnsRecordType, DnsVerification,
    DomainRecord, DomainStatus, ServerType, StoreAck,
};
