//! Generic HTTP request helpers
//!
//! Sending, logging and reading responses is shared by every backend call;
//! each call builds its own `RequestBuilder` and interprets the body itself.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::BackendError;
use crate::rest::envelope::envelope_failure;
use crate::utils::log_sanitizer::truncate_for_log;

/// Upper bound for a server-requested `Retry-After`.
const MAX_RETRY_AFTER_SECS: u64 = 30;
/// Upper bound for exponential backoff.
const MAX_BACKOFF_MS: u64 = 10_000;

/// HTTP helper functions
pub struct HttpUtils;

impl HttpUtils {
    /// Send a request and return `(status, body)`.
    ///
    /// Transport failures become `NetworkError`/`Timeout`; HTTP 429 becomes
    /// `RateLimited`; HTTP 502–504 become `NetworkError`, or `Rejected` when the
    /// body is a failure envelope. Every other status is returned to the caller
    /// for interpretation.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        operation: &str,
        method_name: &str,
        url: &str,
    ) -> Result<(u16, String), BackendError> {
        log::debug!("[backend] {operation}: {method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout {
                    operation: operation.to_string(),
                    detail: e.to_string(),
                }
            } else {
                BackendError::NetworkError {
                    operation: operation.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[backend] {operation}: response status {status_code}");

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!(
                "[backend] {operation}: rate limited (HTTP 429), retry_after={retry_after:?}"
            );
            return Err(BackendError::RateLimited {
                operation: operation.to_string(),
                retry_after,
                raw_message: Some(body).filter(|b| !b.is_empty()),
            });
        }

        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[backend] {operation}: gateway error (HTTP {status_code})");
            return Err(gateway_error(operation, status_code, &body));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| BackendError::NetworkError {
                operation: operation.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[backend] {operation}: response body {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Parse a JSON body into `T`.
    pub fn parse_json<T>(response_text: &str, operation: &str) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[backend] {operation}: JSON parse failed: {e}");
            log::error!(
                "[backend] {operation}: raw response {}",
                truncate_for_log(response_text)
            );
            BackendError::ParseError {
                operation: operation.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Same as [`execute_request`](Self::execute_request), retrying transient failures.
    ///
    /// Only for idempotent reads. Backoff is 100ms, 200ms, 400ms, ... capped at
    /// 10s, or the server's `Retry-After` (capped at 30s) when rate limited.
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        operation: &str,
        method_name: &str,
        url: &str,
        max_retries: u32,
    ) -> Result<(u16, String), BackendError> {
        if max_retries == 0 {
            return Self::execute_request(request_builder, operation, method_name, url).await;
        }

        let mut last_error = None;

        for attempt in 0..=max_retries {
            let Some(req) = request_builder.try_clone() else {
                log::warn!("[backend] {operation}: cannot clone request, disabling retry");
                return Self::execute_request(request_builder, operation, method_name, url).await;
            };

            match Self::execute_request(req, operation, method_name, url).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[backend] {}: request failed (attempt {}/{}), retrying in {:.1}s: {}",
                        operation,
                        attempt + 1,
                        max_retries,
                        delay.as_secs_f32(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| BackendError::NetworkError {
            operation: operation.to_string(),
            detail: "All retries exhausted with no error captured".to_string(),
        }))
    }
}

/// 网关错误：信封里有消息就原样交给操作员
fn gateway_error(operation: &str, status_code: u16, body: &str) -> BackendError {
    match envelope_failure(body) {
        Some(message) => BackendError::Rejected {
            operation: operation.to_string(),
            status: Some(status_code),
            message,
        },
        None => BackendError::NetworkError {
            operation: operation.to_string(),
            detail: format!("HTTP {status_code}: {}", truncate_for_log(body)),
        },
    }
}

fn retry_delay(error: &BackendError, attempt: u32) -> Duration {
    if let BackendError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS))
    } else {
        backoff_delay(attempt)
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20);
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    Duration::from_millis(delay_ms.min(MAX_BACKOFF_MS))
}
