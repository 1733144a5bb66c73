//! Text rendering for terminal output.

use std::fmt::Write as _;

use ga_domains_backend::{BatchDeleteResult, DnsRecord, DomainRecord};
use ga_domains_core::types::{Notice, NoticeLevel, StageState, StageView};
use ga_domains_core::{ConnectivityReport, Progress, ProgressReporter};
use serde::Serialize;

/// Pretty JSON for `--json` output.
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warn",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.message)
}

/// One line per stage: `[x]` done, `[>]` current, `[ ]` pending.
pub fn stage_tracker(stages: &[StageView]) -> String {
    let mut out = String::new();
    for (i, view) in stages.iter().enumerate() {
        let mark = match view.state {
            StageState::Completed => "x",
            StageState::Current => ">",
            StageState::Pending => " ",
        };
        let _ = writeln!(out, "  [{mark}] {}. {}", i + 1, view.step.title());
    }
    out
}

pub fn domains(domains: &[DomainRecord]) -> String {
    if domains.is_empty() {
        return "No custom domains.\n".to_string();
    }
    let width = domains.iter().map(|d| d.domain.len()).max().unwrap_or(0);
    let mut out = String::new();
    for d in domains {
        let _ = write!(out, "{:<width$}  {:<14}  {}", d.domain, d.status.label(), d.id);
        if let Some(cert) = &d.ssl_certificate {
            let _ = write!(out, "  cert until {}", cert.valid_to.format("%Y-%m-%d"));
        }
        if let Some(err) = &d.error_message {
            let _ = write!(out, "  ({err})");
        }
        out.push('\n');
    }
    out
}

pub fn records(records: &[DnsRecord]) -> String {
    if records.is_empty() {
        return "No records.\n".to_string();
    }
    let mut out = String::new();
    for r in records {
        let _ = write!(
            out,
            "{:<10} {:<6} {:<24} {:<6} {}",
            r.id,
            r.record_type.as_str(),
            r.name,
            r.ttl,
            r.value
        );
        if let Some(priority) = r.priority {
            let _ = write!(out, " (priority {priority})");
        }
        out.push('\n');
    }
    out
}

pub fn batch_delete(result: &BatchDeleteResult) -> String {
    let mut out = format!(
        "{} deleted, {} failed\n",
        result.success_count, result.failed_count
    );
    for failure in &result.failures {
        let _ = writeln!(out, "  {}: {}", failure.record_id, failure.reason);
    }
    out
}

pub fn connectivity(report: &ConnectivityReport) -> String {
    format!("{}\n", report.summary())
}

/// 进度输出到 stderr，stdout 只留结果
pub struct TerminalReporter;

impl ProgressReporter for TerminalReporter {
    fn report(&self, progress: &Progress) {
        eprintln!("[{:>3}%] {}", progress.percentage, progress.label);
    }
}
