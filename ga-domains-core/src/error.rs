//! Unified error type definition

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::types::{Operation, SetupStep, ValidationErrors};

// Re-export library error type
pub use ga_domains_backend::BackendError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Field-scoped input errors; never sent to the backend
    #[error("Invalid configuration: {0}")]
    Validation(ValidationErrors),

    /// The action's precondition does not hold (checked locally)
    #[error("{0}")]
    Guard(String),

    /// Another operation is in flight
    #[error("{0} is already in progress")]
    Busy(Operation),

    /// Input can no longer be edited
    #[error("Configuration is locked at the {0} stage; reset to edit it")]
    InputFrozen(SetupStep),

    /// Backend call exceeded the client-side bound
    #[error("{operation} timed out after {}s", after.as_secs())]
    Timeout { operation: Operation, after: Duration },

    /// DNS record input rejected before reaching the store
    #[error("Invalid DNS record: {0}")]
    InvalidRecord(String),

    /// Backend error (converting from library)
    #[error("{0}")]
    Backend(#[from] BackendError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, precondition, backend refusal), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Validation(_)
            | Self::Guard(_)
            | Self::Busy(_)
            | Self::InputFrozen(_)
            | Self::InvalidRecord(_) => true,
            Self::Backend(e) => e.is_expected(),
            Self::Timeout { .. } => false,
        }
    }

    /// Text for the error banner: backend messages verbatim, generic fallback for transport failures.
    pub fn operator_message(&self) -> String {
        match self {
            Self::Backend(e) => e.operator_message(),
            other => other.to_string(),
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
