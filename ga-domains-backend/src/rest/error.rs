//! HTTP 状态码到 `BackendError` 的映射

use crate::error::BackendError;
use crate::traits::{BackendErrorMapper, ErrorContext, RawApiError};

use super::RestBackend;

impl BackendErrorMapper for RestBackend {
    fn map_error(
        &self,
        operation: &str,
        raw: RawApiError,
        context: ErrorContext,
    ) -> BackendError {
        map_status(operation, raw, context)
    }
}

fn map_status(operation: &str, raw: RawApiError, context: ErrorContext) -> BackendError {
    let raw_message = Some(raw.message.clone()).filter(|m| !m.trim().is_empty());
    match raw.status {
        Some(401 | 403) => BackendError::Unauthorized {
            operation: operation.to_string(),
            raw_message,
        },
        Some(404) => BackendError::NotFound {
            operation: operation.to_string(),
            resource: context.resource.unwrap_or_default(),
            raw_message,
        },
        // 后端带回了可展示的消息，保留状态码供 is_expected 判断
        status if raw_message.is_some() && (raw.from_envelope || is_validation(status)) => {
            BackendError::Rejected {
                operation: operation.to_string(),
                status,
                message: raw.message.trim().to_string(),
            }
        }
        status => BackendError::Unknown {
            operation: operation.to_string(),
            status,
            raw_message: raw.message,
        },
    }
}

fn is_validation(status: Option<u16>) -> bool {
    matches!(status, Some(400 | 409 | 422) | None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_FAILURE_MESSAGE;

    fn ctx() -> ErrorContext {
        ErrorContext::resource("demarche.ga")
    }

    #[test]
    fn auth_statuses_map_to_unauthorized() {
        for status in [401, 403] {
            let e = map_status("setup_domain", RawApiError::with_status(status, ""), ctx());
            assert!(matches!(e, BackendError::Unauthorized { raw_message: None, .. }));
        }
    }

    #[test]
    fn not_found_keeps_resource() {
        let e = map_status("verify_dns", RawApiError::with_status(404, "no such domain"), ctx());
        assert!(matches!(
            e,
            BackendError::NotFound { ref resource, .. } if resource == "demarche.ga"
        ));
    }

    #[test]
    fn validation_statuses_with_message_are_rejections() {
        let e = map_status(
            "setup_domain",
            RawApiError::with_status(422, "domain already bound to another tenant"),
            ctx(),
        );
        assert_eq!(e.operator_message(), "domain already bound to another tenant");
    }

    #[test]
    fn server_errors_without_envelope_are_unknown() {
        let e = map_status(
            "deploy_application",
            RawApiError::with_status(500, "<html>Internal Server Error</html>"),
            ctx(),
        );
        assert!(matches!(e, BackendError::Unknown { status: Some(500), .. }));
        assert_eq!(e.operator_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn server_error_envelope_message_reaches_the_operator() {
        let e = map_status(
            "provision_ssl",
            RawApiError::from_envelope(500, "cert authority unreachable"),
            ctx(),
        );
        assert!(matches!(e, BackendError::Rejected { status: Some(500), .. }));
        assert_eq!(e.operator_message(), "cert authority unreachable");
        assert!(!e.is_expected());
    }

    #[test]
    fn auth_and_not_found_win_over_envelope_message() {
        let e = map_status(
            "verify_dns",
            RawApiError::from_envelope(404, "Domain not found"),
            ctx(),
        );
        assert!(matches!(e, BackendError::NotFound { .. }));
        assert_eq!(e.operator_message(), "Domain not found");
    }
}
