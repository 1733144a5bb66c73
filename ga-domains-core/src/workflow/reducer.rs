//! Stage reconciliation against the backend status.

use crate::types::{DomainStatus, SetupStep};

/// Stage implied by a backend status; `None` for `error`, which implies nothing.
pub fn project_status(status: DomainStatus) -> Option<SetupStep> {
    match status {
        DomainStatus::Pending => Some(SetupStep::Dns),
        DomainStatus::DnsConfigured => Some(SetupStep::Ssl),
        DomainStatus::SslPending => Some(SetupStep::Deploy),
        DomainStatus::Active => Some(SetupStep::Complete),
        DomainStatus::Error => None,
    }
}

/// Move forward to `target`, never back.
pub fn advance(current: SetupStep, target: SetupStep) -> SetupStep {
    current.max(target)
}

/// Fold a polled backend status into the local stage.
///
/// Local completion is sticky: once deploy succeeded here, no polled status
/// moves the stage back until an explicit reset. Otherwise the projected
/// stage is applied only when it is ahead of `current`.
pub fn reconcile_stage(
    current: SetupStep,
    locally_completed: bool,
    status: DomainStatus,
) -> SetupStep {
    if locally_completed {
        return SetupStep::Complete;
    }
    project_status(status).map_or(current, |projected| advance(current, projected))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUSES: [DomainStatus; 5] = [
        DomainStatus::Pending,
        DomainStatus::DnsConfigured,
        DomainStatus::SslPending,
        DomainStatus::Active,
        DomainStatus::Error,
    ];

    #[test]
    fn sticky_completion_wins_over_any_status() {
        for status in STATUSES {
            assert_eq!(
                reconcile_stage(SetupStep::Complete, true, status),
                SetupStep::Complete
            );
        }
    }

    #[test]
    fn stale_status_never_regresses() {
        assert_eq!(
            reconcile_stage(SetupStep::Deploy, false, DomainStatus::Pending),
            SetupStep::Deploy
        );
    }

    #[test]
    fn backend_progress_moves_stage_forward() {
        assert_eq!(
            reconcile_stage(SetupStep::Dns, false, DomainStatus::DnsConfigured),
            SetupStep::Ssl
        );
        assert_eq!(
            reconcile_stage(SetupStep::Ssl, false, DomainStatus::Active),
            SetupStep::Complete
        );
    }

    #[test]
    fn error_status_keeps_current_stage() {
        assert_eq!(
            reconcile_stage(SetupStep::Ssl, false, DomainStatus::Error),
            SetupStep::Ssl
        );
    }

    #[test]
    fn result_is_never_behind_current() {
        for current in SetupStep::ALL {
            for status in STATUSES {
                for sticky in [false, true] {
                    assert!(reconcile_stage(current, sticky, status) >= current);
                }
            }
        }
    }
}
