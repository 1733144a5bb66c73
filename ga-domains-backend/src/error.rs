use serde::{Deserialize, Serialize};

/// Fallback text shown to operators when the backend gave no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "The provisioning service could not complete the request";

/// Unified error type for all backend and DNS record store operations.
///
/// Each variant carries the `operation` that produced it (e.g. `"setup_domain"`),
/// plus variant-specific context. All variants are serializable for structured
/// error reporting.
///
/// # Retryable Errors
///
/// The following variants represent transient failures:
/// - [`NetworkError`](Self::NetworkError) — network connectivity issues
/// - [`Timeout`](Self::Timeout) — request timed out
/// - [`RateLimited`](Self::RateLimited) — rate limit exceeded
///
/// The built-in HTTP client retries these for idempotent reads only.
/// Writes (setup, SSL, deploy, record mutations) are never retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum BackendError {
    /// A network-level error occurred (connection refused, DNS failure, 5xx gateway errors).
    NetworkError {
        /// Operation that produced the error.
        operation: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Operation that produced the error.
        operation: String,
        /// Error details.
        detail: String,
    },

    /// The backend rate limit has been exceeded (HTTP 429).
    RateLimited {
        /// Operation that produced the error.
        operation: String,
        /// Suggested wait time in seconds, if provided.
        retry_after: Option<u64>,
        /// Original message from the backend, if available.
        raw_message: Option<String>,
    },

    /// The API token was missing, invalid, or lacks the required role (HTTP 401/403).
    Unauthorized {
        /// Operation that produced the error.
        operation: String,
        /// Original message from the backend, if available.
        raw_message: Option<String>,
    },

    /// The addressed domain or record does not exist (HTTP 404).
    NotFound {
        /// Operation that produced the error.
        operation: String,
        /// Domain name or record id that was not found.
        resource: String,
        /// Original message from the backend, if available.
        raw_message: Option<String>,
    },

    /// The backend answered `success: false` with its own message, whatever
    /// the HTTP status.
    Rejected {
        /// Operation that produced the error.
        operation: String,
        /// HTTP status of the answer; `None` for a 2xx `success: false`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        /// Backend-supplied error message.
        message: String,
    },

    /// A request parameter is invalid.
    InvalidParameter {
        /// Operation that produced the error.
        operation: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// Failed to parse the backend response.
    ParseError {
        /// Operation that produced the error.
        operation: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body or to build the HTTP client.
    SerializationError {
        /// Operation that produced the error.
        operation: String,
        /// Details about the failure.
        detail: String,
    },

    /// An unmapped HTTP failure.
    Unknown {
        /// Operation that produced the error.
        operation: String,
        /// HTTP status code, if any.
        status: Option<u16>,
        /// Raw response body or message.
        raw_message: String,
    },
}

impl BackendError {
    /// 是否为预期行为（用户输入、资源不存在、后端拒绝等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            // 5xx 带消息仍是后端故障
            Self::Rejected { status, .. } => status.is_none_or(|s| s < 500),
            Self::Unauthorized { .. } | Self::NotFound { .. } | Self::InvalidParameter { .. } => {
                true
            }
            _ => false,
        }
    }

    /// Whether the failure is transient and a read may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. }
                | Self::Timeout { .. }
                | Self::RateLimited { .. }
                | Self::Rejected {
                    status: Some(502..=504),
                    ..
                }
        )
    }

    /// Operation name carried by every variant.
    #[must_use]
    pub fn operation(&self) -> &str {
        match self {
            Self::NetworkError { operation, .. }
            | Self::Timeout { operation, .. }
            | Self::RateLimited { operation, .. }
            | Self::Unauthorized { operation, .. }
            | Self::NotFound { operation, .. }
            | Self::Rejected { operation, .. }
            | Self::InvalidParameter { operation, .. }
            | Self::ParseError { operation, .. }
            | Self::SerializationError { operation, .. }
            | Self::Unknown { operation, .. } => operation,
        }
    }

    /// Message suitable for the operator-facing error banner.
    ///
    /// Backend-supplied text is reported verbatim; transport failures get a
    /// short description or the generic fallback.
    #[must_use]
    pub fn operator_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::Unauthorized {
                raw_message: Some(msg),
                ..
            }
            | Self::NotFound {
                raw_message: Some(msg),
                ..
            }
            | Self::RateLimited {
                raw_message: Some(msg),
                ..
            } if !msg.trim().is_empty() => msg.clone(),
            Self::Unauthorized { .. } => "Not authorized to manage this domain".to_string(),
            Self::NotFound { resource, .. } => format!("'{resource}' was not found"),
            Self::RateLimited { .. } => "Too many requests, try again shortly".to_string(),
            Self::Timeout { .. } => "The provisioning service did not respond in time".to_string(),
            Self::NetworkError { .. } => "The provisioning service is unreachable".to_string(),
            Self::InvalidParameter { param, detail, .. } => format!("{param}: {detail}"),
            Self::ParseError { .. } | Self::SerializationError { .. } | Self::Unknown { .. } => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { operation, detail } => {
                write!(f, "[{operation}] Network error: {detail}")
            }
            Self::Timeout { operation, detail } => {
                write!(f, "[{operation}] Request timeout: {detail}")
            }
            Self::RateLimited {
                operation,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{operation}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{operation}] Rate limited")
                }
            }
            Self::Unauthorized {
                operation,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{operation}] Unauthorized: {msg}")
                } else {
                    write!(f, "[{operation}] Unauthorized")
                }
            }
            Self::NotFound {
                operation,
                resource,
                ..
            } => {
                write!(f, "[{operation}] '{resource}' not found")
            }
            Self::Rejected {
                operation,
                status: Some(status),
                message,
            } => {
                write!(f, "[{operation}] Rejected (HTTP {status}): {message}")
            }
            Self::Rejected {
                operation, message, ..
            } => {
                write!(f, "[{operation}] Rejected: {message}")
            }
            Self::InvalidParameter {
                operation,
                param,
                detail,
            } => {
                write!(f, "[{operation}] Invalid parameter '{param}': {detail}")
            }
            Self::ParseError { operation, detail } => {
                write!(f, "[{operation}] Parse error: {detail}")
            }
            Self::SerializationError { operation, detail } => {
                write!(f, "[{operation}] Serialization error: {detail}")
            }
            Self::Unknown {
                operation,
                status,
                raw_message,
            } => match status {
                Some(code) => write!(f, "[{operation}] HTTP {code}: {raw_message}"),
                None => write!(f, "[{operation}] {raw_message}"),
            },
        }
    }
}

impl std::error::Error for BackendError {}

/// Convenience type alias for `Result<T, BackendError>`.
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_network_error() {
        let e = BackendError::NetworkError {
            operation: "list_domains".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(e.to_string(), "[list_domains] Network error: connection refused");
    }

    #[test]
    fn display_rate_limited_with_retry() {
        let e = BackendError::RateLimited {
            operation: "list_domains".to_string(),
            retry_after: Some(30),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[list_domains] Rate limited (retry after 30s)");
    }

    #[test]
    fn display_unknown_with_status() {
        let e = BackendError::Unknown {
            operation: "deploy_application".to_string(),
            status: Some(500),
            raw_message: "boom".to_string(),
        };
        assert_eq!(e.to_string(), "[deploy_application] HTTP 500: boom");
    }

    #[test]
    fn rejected_message_is_reported_verbatim() {
        let e = BackendError::Rejected {
            operation: "provision_ssl".to_string(),
            status: None,
            message: "cert authority unreachable".to_string(),
        };
        assert_eq!(e.operator_message(), "cert authority unreachable");
        assert!(e.is_expected());
        assert!(!e.is_retryable());
    }

    #[test]
    fn server_side_rejection_is_not_expected() {
        let e = BackendError::Rejected {
            operation: "provision_ssl".to_string(),
            status: Some(502),
            message: "cert authority unreachable".to_string(),
        };
        assert_eq!(e.operator_message(), "cert authority unreachable");
        assert!(!e.is_expected());
        assert_eq!(
            e.to_string(),
            "[provision_ssl] Rejected (HTTP 502): cert authority unreachable"
        );
    }

    #[test]
    fn transport_failures_use_fallback_text() {
        let e = BackendError::ParseError {
            operation: "setup_domain".to_string(),
            detail: "expected value at line 1".to_string(),
        };
        assert_eq!(e.operator_message(), GENERIC_FAILURE_MESSAGE);
        assert!(!e.is_expected());
    }

    #[test]
    fn blank_raw_message_falls_back() {
        let e = BackendError::Unauthorized {
            operation: "setup_domain".to_string(),
            raw_message: Some("  ".to_string()),
        };
        assert_eq!(e.operator_message(), "Not authorized to manage this domain");
    }

    #[test]
    fn retryable_variants() {
        assert!(
            BackendError::Timeout {
                operation: "t".into(),
                detail: "x".into(),
            }
            .is_retryable()
        );
        assert!(
            !BackendError::NotFound {
                operation: "t".into(),
                resource: "demarche.ga".into(),
                raw_message: None,
            }
            .is_retryable()
        );
    }

    #[test]
    fn serializes_with_code_tag() {
        let e = BackendError::Rejected {
            operation: "setup_domain".to_string(),
            status: Some(409),
            message: "domain already bound".to_string(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"code\":\"Rejected\""));
        let back: BackendError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.operation(), "setup_domain");
    }
}
