use serde::{Deserialize, Serialize};

/// The five ordered provisioning stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SetupStep {
    /// Operator is editing the domain configuration.
    #[default]
    Config,
    /// Configuration submitted; waiting for DNS to point at the server.
    Dns,
    /// DNS verified; certificate not yet requested.
    Ssl,
    /// Certificate requested; application not yet deployed.
    Deploy,
    /// Deployed. Sticky until reset.
    Complete,
}

impl SetupStep {
    /// All stages in order.
    pub const ALL: [Self; 5] = [
        Self::Config,
        Self::Dns,
        Self::Ssl,
        Self::Deploy,
        Self::Complete,
    ];

    /// Position in the pipeline (`config = 0` … `complete = 4`).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Title shown in the stage tracker.
    pub fn title(self) -> &'static str {
        match self {
            Self::Config => "Configuration",
            Self::Dns => "DNS",
            Self::Ssl => "SSL",
            Self::Deploy => "Deployment",
            Self::Complete => "Complete",
        }
    }
}

impl std::fmt::Display for SetupStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// How a stage is drawn in the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageState {
    Completed,
    Current,
    Pending,
}

/// One row of the stage tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageView {
    pub step: SetupStep,
    pub state: StageState,
}

impl StageView {
    /// Tracker rows for a workflow sitting at `current`.
    ///
    /// `complete` is terminal, so at that stage every row reads `Completed`.
    pub fn tracker(current: SetupStep) -> Vec<Self> {
        SetupStep::ALL
            .into_iter()
            .map(|step| {
                let state = if step < current || current == SetupStep::Complete {
                    StageState::Completed
                } else if step == current {
                    StageState::Current
                } else {
                    StageState::Pending
                };
                Self { step, state }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_pipeline_order() {
        let indices: Vec<usize> = SetupStep::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert!(SetupStep::Dns < SetupStep::Deploy);
    }

    #[test]
    fn tracker_marks_current_stage() {
        let rows = StageView::tracker(SetupStep::Ssl);
        let states: Vec<StageState> = rows.iter().map(|r| r.state).collect();
        assert_eq!(
            states,
            vec![
                StageState::Completed,
                StageState::Completed,
                StageState::Current,
                StageState::Pending,
                StageState::Pending,
            ]
        );
    }

    #[test]
    fn tracker_is_all_completed_at_the_end() {
        assert!(
            StageView::tracker(SetupStep::Complete)
                .iter()
                .all(|r| r.state == StageState::Completed)
        );
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SetupStep::Dns).unwrap(), "\"dns\"");
    }
}
