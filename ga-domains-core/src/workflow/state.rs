//! Mutable workflow state and its read-only snapshot.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::progress::Progress;
use crate::types::{
    DomainConfigInput, DomainRecord, Notice, Operation, SetupStep, StageView, ValidationErrors,
};

/// Progress of the current (or last) operation run.
#[derive(Debug, Clone)]
pub(crate) struct ActiveProgress {
    pub progress: Progress,
    /// Set when the run reached 100 %.
    pub finished_at: Option<Instant>,
}

#[derive(Debug, Default)]
pub(crate) struct WorkflowState {
    pub stage: SetupStep,
    pub input: DomainConfigInput,
    pub validation_errors: ValidationErrors,
    /// Record tracked by this workflow (set by setup).
    pub record: Option<DomainRecord>,
    /// Last domain list from the backend.
    pub domains: Vec<DomainRecord>,
    pub locally_completed: bool,
    pub in_flight: Option<Operation>,
    pub progress: Option<ActiveProgress>,
    /// 全局错误横幅
    pub error: Option<String>,
    pub notices: Vec<Notice>,
    /// Bumped by reset; results of runs started under an older epoch are dropped.
    pub epoch: u64,
}

impl WorkflowState {
    /// Progress still on screen at `now`.
    pub fn visible_progress(&self, now: Instant, clear_delay: Duration) -> Option<Progress> {
        let active = self.progress.as_ref()?;
        match active.finished_at {
            Some(at) if now.saturating_duration_since(at) >= clear_delay => None,
            _ => Some(active.progress.clone()),
        }
    }

    /// Replace or append `record` in the cached list.
    pub fn upsert_domain(&mut self, record: &DomainRecord) {
        match self.domains.iter_mut().find(|d| d.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => self.domains.push(record.clone()),
        }
    }

    /// Back to `config`, dropping everything tied to the tracked domain.
    pub fn clear_tracking(&mut self) {
        self.epoch += 1;
        self.stage = SetupStep::Config;
        self.record = None;
        self.locally_completed = false;
        self.validation_errors = ValidationErrors::default();
        self.error = None;
        self.progress = None;
        self.in_flight = None;
    }
}

/// Owned view of the whole workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub stage: SetupStep,
    pub stages: Vec<StageView>,
    pub input: DomainConfigInput,
    pub validation_errors: ValidationErrors,
    pub record: Option<DomainRecord>,
    pub domains: Vec<DomainRecord>,
    pub locally_completed: bool,
    pub in_flight: Option<Operation>,
    pub progress: Option<Progress>,
    pub error: Option<String>,
}

impl WorkflowSnapshot {
    pub(crate) fn capture(state: &WorkflowState, progress: Option<Progress>) -> Self {
        Self {
            stage: state.stage,
            stages: StageView::tracker(state.stage),
            input: state.input.clone(),
            validation_errors: state.validation_errors.clone(),
            record: state.record.clone(),
            domains: state.domains.clone(),
            locally_completed: state.locally_completed,
            in_flight: state.in_flight,
            progress,
            error: state.error.clone(),
        }
    }

    /// Whether `operation` is running (the old per-operation loading flag).
    pub fn loading(&self, operation: Operation) -> bool {
        self.in_flight == Some(operation)
    }
}
