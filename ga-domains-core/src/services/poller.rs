//! 域名列表自动刷新
//!
//! Nothing polls unless a poller is spawned explicitly.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::workflow::ProvisioningWorkflow;

/// Periodic background refresh of a workflow's domain list.
pub struct DomainPoller;

impl DomainPoller {
    /// Refresh `workflow` every `interval`, starting immediately.
    ///
    /// Ticks that land while an operation is running are skipped. Refresh
    /// failures surface on the workflow's banner as usual; the poller keeps
    /// going.
    pub fn spawn(workflow: Arc<ProvisioningWorkflow>, interval: Duration) -> PollerHandle {
        log::debug!("[poller] Refreshing every {}s", interval.as_secs());
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match workflow.refresh_if_idle().await {
                    Ok(true) => log::trace!("[poller] Refreshed"),
                    Ok(false) => log::debug!("[poller] Skipped tick, operation in flight"),
                    Err(e) => log::warn!("[poller] Refresh failed: {e}"),
                }
            }
        });
        PollerHandle { task: Some(task) }
    }

    /// Spawn with the workflow's configured interval; `None` when polling is disabled.
    pub fn from_config(workflow: Arc<ProvisioningWorkflow>) -> Option<PollerHandle> {
        let interval = workflow.config().poll_interval?;
        Some(Self::spawn(workflow, interval))
    }
}

/// Stops the poller on [`stop`](Self::stop) or drop.
pub struct PollerHandle {
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn stop(mut self) {
        self.abort();
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("[poller] Stopped");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
