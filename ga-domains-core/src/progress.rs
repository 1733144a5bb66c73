//! Progress reporting for workflow operations
//!
//! Every operation reports a non-decreasing percentage with a phase label. The
//! workflow keeps the latest value for polling consumers and forwards each
//! update to a [`ProgressReporter`].

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::types::Operation;

/// Progress update from an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub operation: Operation,
    /// 0-100
    pub percentage: u8,
    /// Human-readable phase label
    pub label: String,
}

impl Progress {
    /// Create a new progress update (percentage capped at 100)
    pub fn new(operation: Operation, percentage: u8, label: impl Into<String>) -> Self {
        Self {
            operation,
            percentage: percentage.min(100),
            label: label.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.percentage >= 100
    }
}

/// Receives every progress update as it happens
pub trait ProgressReporter: Send + Sync {
    fn report(&self, progress: &Progress);
}

/// Drops updates.
#[derive(Debug, Default, Clone)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _progress: &Progress) {}
}

/// Writes updates to the `log` facade at debug level.
#[derive(Debug, Default, Clone)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&self, progress: &Progress) {
        log::debug!(
            "[workflow] {} {:>3}% {}",
            progress.operation,
            progress.percentage,
            progress.label
        );
    }
}

/// A progress reporter that collects all updates
#[derive(Debug, Default)]
pub struct CollectingReporter {
    updates: Mutex<Vec<Progress>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<Progress> {
        self.updates
            .lock()
            .map(|u| u.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Updates for one operation, in arrival order.
    pub fn updates_for(&self, operation: Operation) -> Vec<Progress> {
        self.updates()
            .into_iter()
            .filter(|p| p.operation == operation)
            .collect()
    }
}

impl ProgressReporter for CollectingReporter {
    fn report(&self, progress: &Progress) {
        match self.updates.lock() {
            Ok(mut updates) => updates.push(progress.clone()),
            Err(poisoned) => poisoned.into_inner().push(progress.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_capped() {
        let p = Progress::new(Operation::Setup, 150, "Test");
        assert_eq!(p.percentage, 100);
        assert!(p.is_complete());
    }

    #[test]
    fn collecting_reporter_filters_by_operation() {
        let reporter = CollectingReporter::new();
        reporter.report(&Progress::new(Operation::Setup, 10, "Validating"));
        reporter.report(&Progress::new(Operation::Refresh, 50, "Loading"));
        reporter.report(&Progress::new(Operation::Setup, 100, "Done"));

        assert_eq!(reporter.updates().len(), 3);
        let setup: Vec<u8> = reporter
            .updates_for(Operation::Setup)
            .iter()
            .map(|p| p.percentage)
            .collect();
        assert_eq!(setup, vec![10, 100]);
    }
}
