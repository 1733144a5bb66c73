use serde::{Deserialize, Serialize};

/// A long-running workflow operation.
///
/// The workflow holds at most one of these in flight at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Setup,
    Verify,
    Ssl,
    Deploy,
    Test,
    Refresh,
}

impl Operation {
    /// Whether the operation can move the stage.
    ///
    /// `reset` must wait for these; `test` and `refresh` are abandoned instead.
    pub fn mutates_stage(self) -> bool {
        matches!(self, Self::Setup | Self::Verify | Self::Ssl | Self::Deploy)
    }

    /// Verb used in progress labels and notices.
    pub fn label(self) -> &'static str {
        match self {
            Self::Setup => "Domain setup",
            Self::Verify => "DNS verification",
            Self::Ssl => "SSL provisioning",
            Self::Deploy => "Deployment",
            Self::Test => "Connectivity test",
            Self::Refresh => "Refresh",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
