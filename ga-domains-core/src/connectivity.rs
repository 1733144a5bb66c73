//! 服务器连通性测试
//!
//! Diagnostic only: failures are reported, never raised, and never gate the
//! workflow. The server may legitimately be unreachable from the operator's
//! network before DNS and TLS are live.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Outcome of a connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityReport {
    pub target: String,
    /// TCP connection established.
    pub reachable: bool,
    /// Server answered `HEAD /` with an HTTP status line.
    pub http_responding: bool,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
}

impl ConnectivityReport {
    /// Unreachable report with a reason.
    pub fn failed(target: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            reachable: false,
            http_responding: false,
            latency_ms: None,
            error: Some(error.into()),
        }
    }

    /// One-line summary for notices.
    pub fn summary(&self) -> String {
        match (&self.error, self.reachable) {
            (Some(e), _) => format!("{} is not reachable: {e}", self.target),
            (None, true) if self.http_responding => format!(
                "{} is reachable and serving HTTP ({} ms)",
                self.target,
                self.latency_ms.unwrap_or_default()
            ),
            (None, true) => format!("{} is reachable but did not answer HTTP", self.target),
            (None, false) => format!("{} is not reachable", self.target),
        }
    }
}

/// Reachability check against the deployment target.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Probe `server_ip:port` within `limit`. Never fails: problems go in the report.
    async fn probe(&self, server_ip: &str, port: u16, limit: Duration) -> ConnectivityReport;
}

/// TCP connect followed by a bare `HEAD /`.
#[derive(Debug, Default, Clone)]
pub struct TcpConnectivityProbe;

#[async_trait]
impl ConnectivityProbe for TcpConnectivityProbe {
    async fn probe(&self, server_ip: &str, port: u16, limit: Duration) -> ConnectivityReport {
        let target = format!("{server_ip}:{port}");
        debug!("[connectivity] Probing {target}");
        let start = Instant::now();

        let mut stream = match timeout(limit, TcpStream::connect(&target)).await {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => {
                warn!("[connectivity] TCP connection to {target} failed: {e}");
                return ConnectivityReport::failed(target, format!("connection failed: {e}"));
            }
            Err(_) => {
                warn!(
                    "[connectivity] TCP connection to {target} timed out ({}s)",
                    limit.as_secs()
                );
                return ConnectivityReport::failed(target, "connection timed out");
            }
        };
        let latency_ms = u64::try_from(start.elapsed().as_millis()).ok();

        // 发送 HTTP HEAD 请求
        let http_responding = timeout(limit, async {
            let request =
                format!("HEAD / HTTP/1.1\r\nHost: {server_ip}\r\nConnection: close\r\n\r\n");
            stream.write_all(request.as_bytes()).await.ok()?;
            let mut response = vec![0u8; 128];
            let n = stream.read(&mut response).await.ok()?;
            Some(response[..n].starts_with(b"HTTP/"))
        })
        .await
        .ok()
        .flatten()
        .unwrap_or(false);

        debug!("[connectivity] {target} reachable, http={http_responding}");
        ConnectivityReport {
            target,
            reachable: true,
            http_responding,
            latency_ms,
            error: None,
        }
    }
}
