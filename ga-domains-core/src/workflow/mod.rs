//! 域名开通工作流
//!
//! Drives one tenant domain through `config → dns → ssl → deploy → complete`.
//! All real work is delegated to the [`ProvisioningBackend`]; this module owns
//! stage ordering, input validation, the single in-flight operation token,
//! progress, notices and the error banner.
//!
//! Every operation is atomic with respect to the stage: a failure leaves the
//! stage exactly where it was, and nothing is retried automatically.
//!
//! [`ProvisioningBackend`]: ga_domains_backend::ProvisioningBackend

mod descriptor;
mod reducer;
mod state;


pub use descriptor::{
    default_dns_records, deployment_config, nginx_server_block, server_id_for, setup_request,
};
pub use reducer::{advance, project_status, reconcile_stage};
pub use state::WorkflowSnapshot;

use std::future::Future;
use std::sync::Arc;

use ga_domains_backend::BackendError;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::config::WorkflowConfig;
use crate::connectivity::ConnectivityReport;
use crate::error::{CoreError, CoreResult};
use crate::progress::Progress;
use crate::services::ServiceContext;
use crate::types::{
    DeploymentConfig, DnsVerification, DomainConfigInput, DomainRecord, DomainStatus, Notice,
    Operation, SetupStep, StageView, ValidationErrors,
};
use crate::validation::{validate_config, validate_server_ip};

use state::{ActiveProgress, WorkflowState};

/// Proof that an operation holds the in-flight token.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    operation: Operation,
    epoch: u64,
}

/// What an operation captured when it started.
struct Started {
    ticket: Ticket,
    input: DomainConfigInput,
    record: Option<DomainRecord>,
}

/// 域名开通工作流
pub struct ProvisioningWorkflow {
    ctx: Arc<ServiceContext>,
    config: WorkflowConfig,
    state: RwLock<WorkflowState>,
}

impl ProvisioningWorkflow {
    /// 创建工作流实例（初始阶段 `config`，输入为默认值）
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, config: WorkflowConfig) -> Self {
        Self {
            ctx,
            config,
            state: RwLock::new(WorkflowState::default()),
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    // ===== 读取 =====

    pub async fn stage(&self) -> SetupStep {
        self.state.read().await.stage
    }

    pub async fn input(&self) -> DomainConfigInput {
        self.state.read().await.input.clone()
    }

    pub async fn validation_errors(&self) -> ValidationErrors {
        self.state.read().await.validation_errors.clone()
    }

    /// Record tracked since setup.
    pub async fn record(&self) -> Option<DomainRecord> {
        self.state.read().await.record.clone()
    }

    /// Last domain list loaded from the backend.
    pub async fn domains(&self) -> Vec<DomainRecord> {
        self.state.read().await.domains.clone()
    }

    pub async fn in_flight(&self) -> Option<Operation> {
        self.state.read().await.in_flight
    }

    /// Whether `operation` is running.
    pub async fn loading(&self, operation: Operation) -> bool {
        self.in_flight().await == Some(operation)
    }

    pub async fn is_locally_completed(&self) -> bool {
        self.state.read().await.locally_completed
    }

    /// Current error banner.
    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Progress bar contents; gone `progress_clear_delay` after reaching 100 %.
    pub async fn progress(&self) -> Option<Progress> {
        self.state
            .read()
            .await
            .visible_progress(Instant::now(), self.config.progress_clear_delay)
    }

    /// Completed / current / pending, per stage.
    pub async fn stage_tracker(&self) -> Vec<StageView> {
        StageView::tracker(self.stage().await)
    }

    /// Whether the control for `operation` should be enabled.
    pub async fn can_run(&self, operation: Operation) -> bool {
        let state = self.state.read().await;
        check_guard(&state, operation).is_ok()
            && (operation != Operation::Setup || validate_config(&state.input).is_empty())
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        let state = self.state.read().await;
        let progress = state.visible_progress(Instant::now(), self.config.progress_clear_delay);
        WorkflowSnapshot::capture(&state, progress)
    }

    /// Take queued notices, oldest first.
    pub async fn drain_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.state.write().await.notices)
    }

    // ===== 输入编辑 =====

    /// Replace the whole input and re-validate it.
    pub async fn set_input(&self, input: DomainConfigInput) -> CoreResult<ValidationErrors> {
        self.edit_input(|current| *current = input).await
    }

    pub async fn set_domain(&self, domain: impl Into<String>) -> CoreResult<ValidationErrors> {
        let domain = domain.into();
        self.edit_input(|input| input.domain = domain).await
    }

    pub async fn set_server_ip(&self, server_ip: impl Into<String>) -> CoreResult<ValidationErrors> {
        let server_ip = server_ip.into();
        self.edit_input(|input| input.server_ip = server_ip).await
    }

    pub async fn set_ssl_enabled(&self, enabled: bool) -> CoreResult<()> {
        self.edit_input(|input| input.ssl_enabled = enabled)
            .await
            .map(|_| ())
    }

    pub async fn set_auto_setup(&self, enabled: bool) -> CoreResult<()> {
        self.edit_input(|input| input.auto_setup = enabled)
            .await
            .map(|_| ())
    }

    async fn edit_input(
        &self,
        edit: impl FnOnce(&mut DomainConfigInput),
    ) -> CoreResult<ValidationErrors> {
        let mut state = self.state.write().await;
        if state.stage != SetupStep::Config {
            return Err(CoreError::InputFrozen(state.stage));
        }
        if state.in_flight == Some(Operation::Setup) {
            return Err(CoreError::Busy(Operation::Setup));
        }
        edit(&mut state.input);
        state.validation_errors = validate_config(&state.input);
        Ok(state.validation_errors.clone())
    }

    // ===== 操作 =====

    /// Validate the current input and store the result. Never touches the stage.
    pub async fn validate_config(&self) -> ValidationErrors {
        let mut state = self.state.write().await;
        state.validation_errors = validate_config(&state.input);
        state.validation_errors.clone()
    }

    /// Probe the configured server. Diagnostic only: an unreachable server
    /// yields a warning notice and still returns `Ok`.
    pub async fn test_connectivity(&self) -> CoreResult<ConnectivityReport> {
        let started = self.begin(Operation::Test).await?;
        let ticket = started.ticket;
        let port = self.config.connectivity_port;

        self.set_progress(
            ticket,
            20,
            format!("Connecting to {}:{port}...", started.input.server_ip.trim()),
        )
        .await;
        let report = self
            .ctx
            .probe
            .probe(
                started.input.server_ip.trim(),
                port,
                self.config.connectivity_timeout,
            )
            .await;

        let notice = probe_notice(&report);
        self.finish(ticket, "Connectivity test finished", |state| {
            state.notices.push(notice);
        })
        .await;
        Ok(report)
    }

    /// Submit the configuration; `config → dns` on success.
    pub async fn setup_domain(&self) -> CoreResult<DomainRecord> {
        let started = self.begin(Operation::Setup).await?;
        let ticket = started.ticket;
        let input = started.input;

        if input.auto_setup {
            self.set_progress(ticket, 15, "Testing server connectivity...")
                .await;
            let report = self
                .ctx
                .probe
                .probe(
                    input.server_ip.trim(),
                    self.config.connectivity_port,
                    self.config.connectivity_timeout,
                )
                .await;
            // 连通性失败不阻塞开通
            self.push_notice(probe_notice(&report)).await;
        }

        self.set_progress(ticket, 40, "Submitting domain configuration...")
            .await;
        let request = setup_request(&input, &self.config);
        log::info!(
            "[workflow] Setting up {} -> {}",
            request.domain,
            input.server_ip.trim()
        );

        match self
            .call(Operation::Setup, self.ctx.backend.setup_domain(&request))
            .await
        {
            Ok(record) => {
                let applied = record.clone();
                self.finish(ticket, "Domain configured", move |state| {
                    state.upsert_domain(&applied);
                    state.notices.push(Notice::success(format!(
                        "Domain {} configured; point its DNS at {}",
                        applied.domain, input.server_ip
                    )));
                    state.record = Some(applied);
                    state.stage = SetupStep::Dns;
                    state.locally_completed = false;
                    state.error = None;
                })
                .await;
                Ok(record)
            }
            Err(e) => Err(self.fail(ticket, e).await),
        }
    }

    /// Ask the backend whether DNS resolves to the server; `dns → ssl` when it does.
    ///
    /// An unverified answer is a warning, not a failure: propagation takes time
    /// and the operator retries.
    pub async fn verify_dns(&self) -> CoreResult<DnsVerification> {
        let started = self.begin(Operation::Verify).await?;
        let ticket = started.ticket;
        let record = self.take_record(ticket, started.record).await?;
        let expected_ip = started.input.server_ip.trim().to_string();

        self.set_progress(ticket, 30, "Checking DNS resolution...")
            .await;
        match self
            .call(
                Operation::Verify,
                self.ctx.backend.verify_dns(&record.domain, &expected_ip),
            )
            .await
        {
            Ok(verification) => {
                let verified = verification.verified;
                let label = if verified {
                    "DNS verified"
                } else {
                    "DNS not propagated yet"
                };
                self.finish(ticket, label, |state| {
                    state.error = None;
                    if verified {
                        state.stage = advance(state.stage, SetupStep::Ssl);
                        state
                            .notices
                            .push(Notice::success(format!("DNS verified for {}", record.domain)));
                    } else {
                        state.notices.push(Notice::warning(format!(
                            "{} does not resolve to {expected_ip} yet; DNS propagation can take a while, retry later",
                            record.domain
                        )));
                    }
                })
                .await;
                if !verified {
                    log::warn!("[workflow] DNS for {} not verified yet", record.domain);
                }
                Ok(verification)
            }
            Err(e) => Err(self.fail(ticket, e).await),
        }
    }

    /// Request the certificate; moves to `deploy` on success.
    ///
    /// With SSL disabled in the input the backend is not called and the stage
    /// moves on directly.
    pub async fn provision_ssl(&self) -> CoreResult<()> {
        let started = self.begin(Operation::Ssl).await?;
        let ticket = started.ticket;
        let record = self.take_record(ticket, started.record).await?;

        if !started.input.ssl_enabled {
            self.finish(ticket, "SSL skipped", |state| {
                state.stage = advance(state.stage, SetupStep::Deploy);
                state
                    .notices
                    .push(Notice::info("SSL is disabled for this domain; skipping certificate"));
            })
            .await;
            return Ok(());
        }

        let deployment = self.deployment_for(&record, &started.input);
        self.set_progress(ticket, 30, "Requesting SSL certificate...")
            .await;
        match self
            .call(
                Operation::Ssl,
                self.ctx.backend.provision_ssl(&record.domain, &deployment),
            )
            .await
        {
            Ok(()) => {
                self.finish(ticket, "SSL certificate requested", |state| {
                    state.stage = advance(state.stage, SetupStep::Deploy);
                    state.error = None;
                    state.notices.push(Notice::success(format!(
                        "SSL certificate requested for {}",
                        record.domain
                    )));
                })
                .await;
                Ok(())
            }
            Err(e) => Err(self.fail(ticket, e).await),
        }
    }

    /// Deploy the application; moves to `complete` and sets sticky completion.
    pub async fn deploy_application(&self) -> CoreResult<()> {
        let started = self.begin(Operation::Deploy).await?;
        let ticket = started.ticket;
        let record = self.take_record(ticket, started.record).await?;
        let deployment = self.deployment_for(&record, &started.input);

        self.set_progress(ticket, 30, "Deploying application...")
            .await;
        match self
            .call(
                Operation::Deploy,
                self.ctx
                    .backend
                    .deploy_application(&record.id, &deployment),
            )
            .await
        {
            Ok(()) => {
                self.finish(ticket, "Application deployed", |state| {
                    state.stage = SetupStep::Complete;
                    state.locally_completed = true;
                    state.error = None;
                    state.notices.push(Notice::success(format!(
                        "{} is deployed on {}:{}",
                        record.domain, deployment.ip_address, deployment.port
                    )));
                })
                .await;
                log::info!("[workflow] {} provisioning complete", record.domain);
                Ok(())
            }
            Err(e) => Err(self.fail(ticket, e).await),
        }
    }

    /// Reload the domain list and reconcile the tracked record.
    pub async fn refresh(&self) -> CoreResult<Vec<DomainRecord>> {
        let started = self.begin(Operation::Refresh).await?;
        let ticket = started.ticket;

        self.set_progress(ticket, 30, "Loading domains...").await;
        match self
            .call(Operation::Refresh, self.ctx.backend.list_domains())
            .await
        {
            Ok(domains) => {
                let loaded = domains.clone();
                let applied = self
                    .finish(ticket, "Domains loaded", move |state| {
                        apply_domain_list(state, loaded);
                    })
                    .await;
                if !applied {
                    log::debug!("[workflow] Discarded refresh result started before reset");
                }
                Ok(domains)
            }
            Err(e) => Err(self.fail(ticket, e).await),
        }
    }

    /// Refresh unless another operation is running. Returns whether it ran.
    pub async fn refresh_if_idle(&self) -> CoreResult<bool> {
        if self.in_flight().await.is_some() {
            return Ok(false);
        }
        match self.refresh().await {
            Ok(_) => Ok(true),
            Err(CoreError::Busy(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Back to `config`, dropping the tracked record, sticky flag, validation
    /// errors, banner and progress. Backend state is untouched.
    ///
    /// Returns `false` (and changes nothing) when already at `config`.
    pub async fn reset(&self) -> CoreResult<bool> {
        let mut state = self.state.write().await;
        if let Some(op) = state.in_flight.filter(|op| op.mutates_stage()) {
            return Err(CoreError::Busy(op));
        }
        if state.stage == SetupStep::Config {
            return Ok(false);
        }
        if let Some(op) = state.in_flight {
            log::debug!("[workflow] Reset abandons in-flight {op}");
        }
        log::info!("[workflow] Reset from {} stage", state.stage);
        state.clear_tracking();
        Ok(true)
    }

    /// Clear the error banner.
    pub async fn dismiss_error(&self) {
        self.state.write().await.error = None;
    }

    // ===== 内部 =====

    /// Take the in-flight token after checking the operation's guard.
    async fn begin(&self, operation: Operation) -> CoreResult<Started> {
        let mut state = self.state.write().await;

        if let Err(e) = check_guard(&state, operation) {
            match &e {
                CoreError::Busy(current) => {
                    log::debug!("[workflow] {operation} ignored while {current} is running");
                }
                other => {
                    log::warn!("[workflow] {operation} rejected: {other}");
                    state.notices.push(Notice::warning(other.to_string()));
                }
            }
            return Err(e);
        }

        if operation == Operation::Setup {
            let errors = validate_config(&state.input);
            state.validation_errors = errors.clone();
            if !errors.is_empty() {
                log::warn!("[workflow] Setup blocked by invalid input: {errors}");
                return Err(CoreError::Validation(errors));
            }
        }

        state.in_flight = Some(operation);
        let progress = Progress::new(operation, 0, format!("{operation} starting..."));
        state.progress = Some(ActiveProgress {
            progress: progress.clone(),
            finished_at: None,
        });
        let started = Started {
            ticket: Ticket {
                operation,
                epoch: state.epoch,
            },
            input: state.input.clone(),
            record: state.record.clone(),
        };
        drop(state);

        log::debug!("[workflow] {operation} started");
        self.ctx.reporter.report(&progress);
        Ok(started)
    }

    /// Raise the progress of the running operation. Never lowers it.
    async fn set_progress(&self, ticket: Ticket, percentage: u8, label: impl Into<String>) {
        let mut state = self.state.write().await;
        if state.epoch != ticket.epoch {
            return;
        }
        let Some(active) = state
            .progress
            .as_mut()
            .filter(|a| a.progress.operation == ticket.operation && a.finished_at.is_none())
        else {
            return;
        };
        let percentage = percentage.min(99).max(active.progress.percentage);
        active.progress = Progress::new(ticket.operation, percentage, label);
        let progress = active.progress.clone();
        drop(state);

        self.ctx.reporter.report(&progress);
    }

    /// Release the token, apply `apply` and complete the progress bar.
    ///
    /// Returns `false` without touching state when a reset happened since the
    /// operation started.
    async fn finish(
        &self,
        ticket: Ticket,
        label: impl Into<String>,
        apply: impl FnOnce(&mut WorkflowState),
    ) -> bool {
        let mut state = self.state.write().await;
        if state.epoch != ticket.epoch {
            return false;
        }
        state.in_flight = None;
        apply(&mut state);
        let progress = Progress::new(ticket.operation, 100, label);
        state.progress = Some(ActiveProgress {
            progress: progress.clone(),
            finished_at: Some(Instant::now()),
        });
        drop(state);

        self.ctx.reporter.report(&progress);
        true
    }

    /// Surface `err` on the banner and as a notice; the stage is untouched.
    async fn fail(&self, ticket: Ticket, err: CoreError) -> CoreError {
        let operation = ticket.operation;
        if err.is_expected() {
            log::warn!("[workflow] {operation} failed: {err}");
        } else {
            log::error!("[workflow] {operation} failed: {err}");
        }
        let message = err.operator_message();
        self.finish(ticket, format!("{operation} failed"), |state| {
            state.notices.push(Notice::error(message.clone()));
            state.error = Some(message);
        })
        .await;
        err
    }

    /// The tracked record captured by `begin`; releases the token if it is missing.
    async fn take_record(
        &self,
        ticket: Ticket,
        record: Option<DomainRecord>,
    ) -> CoreResult<DomainRecord> {
        match record {
            Some(record) => Ok(record),
            None => {
                let operation = ticket.operation;
                self.finish(ticket, format!("{operation} cancelled"), |_| {})
                    .await;
                Err(CoreError::Guard(format!(
                    "{operation} needs a configured domain; run setup first"
                )))
            }
        }
    }

    async fn push_notice(&self, notice: Notice) {
        self.state.write().await.notices.push(notice);
    }

    /// Bound a backend call by `operation_timeout`.
    async fn call<T>(
        &self,
        operation: Operation,
        fut: impl Future<Output = Result<T, BackendError>>,
    ) -> CoreResult<T> {
        let after = self.config.operation_timeout;
        match tokio::time::timeout(after, fut).await {
            Ok(result) => result.map_err(CoreError::from),
            Err(_) => Err(CoreError::Timeout { operation, after }),
        }
    }

    /// The record's own descriptor, or one synthesized from the input.
    fn deployment_for(&self, record: &DomainRecord, input: &DomainConfigInput) -> DeploymentConfig {
        record
            .deployment_config
            .clone()
            .unwrap_or_else(|| deployment_config(input, &self.config))
    }
}

/// Local precondition for `operation`; no backend call is made when it fails.
fn check_guard(state: &WorkflowState, operation: Operation) -> CoreResult<()> {
    if let Some(current) = state.in_flight {
        return Err(CoreError::Busy(current));
    }
    match operation {
        Operation::Setup if state.stage != SetupStep::Config => Err(CoreError::Guard(format!(
            "Domain is already configured (stage: {}); reset to start over",
            state.stage
        ))),
        Operation::Verify | Operation::Ssl | Operation::Deploy if state.record.is_none() => Err(
            CoreError::Guard(format!("{operation} needs a configured domain; run setup first")),
        ),
        // 部署不能越过 DNS 与证书阶段
        Operation::Deploy if state.stage < SetupStep::Deploy => Err(CoreError::Guard(format!(
            "Deploy is not available yet (stage: {}); verify DNS and provision SSL first",
            state.stage
        ))),
        Operation::Test => match validate_server_ip(&state.input.server_ip) {
            Some(message) => Err(CoreError::Guard(message)),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

fn probe_notice(report: &ConnectivityReport) -> Notice {
    if report.reachable {
        Notice::info(report.summary())
    } else {
        Notice::warning(format!(
            "{}. Continuing anyway: the server may not be reachable from here until DNS is live",
            report.summary()
        ))
    }
}

/// Store the list and fold the tracked record's status into the stage.
fn apply_domain_list(state: &mut WorkflowState, domains: Vec<DomainRecord>) {
    let latest = state.record.as_ref().and_then(|tracked| {
        domains
            .iter()
            .find(|d| d.id == tracked.id)
            .or_else(|| domains.iter().find(|d| d.matches_domain(&tracked.domain)))
            .cloned()
    });
    state.domains = domains;

    let Some(latest) = latest else {
        return;
    };
    let next = reconcile_stage(state.stage, state.locally_completed, latest.status);
    if next != state.stage {
        log::info!(
            "[workflow] {} is {} on the backend; stage {} -> {next}",
            latest.domain,
            latest.status,
            state.stage
        );
        state.stage = next;
    }
    if latest.status == DomainStatus::Error {
        state.error = Some(
            latest
                .error_message
                .clone()
                .unwrap_or_else(|| format!("Provisioning of {} failed on the backend", latest.domain)),
        );
    }
    state.record = Some(latest);
}
