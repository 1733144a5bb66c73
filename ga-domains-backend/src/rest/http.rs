//! REST HTTP 请求方法

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{BackendError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{BackendErrorMapper, ErrorContext, RawApiError};

use super::RestBackend;
use super::envelope::{ApiEnvelope, envelope_failure};

/// Returned when a failed envelope carries no text.
const UNKNOWN_ERROR: &str = "Unknown error";

impl RestBackend {
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("X-Request-Id", uuid::Uuid::new_v4().to_string());
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GET and decode the whole body as `T` (retried on transient failures).
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        context: ErrorContext,
    ) -> Result<T> {
        let url = self.url(path);
        let builder = self.request(Method::GET, &url);
        let (status, text) =
            HttpUtils::execute_request_with_retry(builder, operation, "GET", &url, self.max_retries)
                .await?;
        self.decode(operation, status, &text, context)
    }

    /// Send a JSON body (never retried) and decode the whole body as `T`.
    pub(crate) async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
        context: ErrorContext,
    ) -> Result<T> {
        let url = self.url(path);
        let method_name = method.to_string();
        let mut builder = self.request(method, &url);
        if let Some(body) = body {
            let json = serde_json::to_vec(body).map_err(|e| BackendError::SerializationError {
                operation: operation.to_string(),
                detail: e.to_string(),
            })?;
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(json);
        }
        let (status, text) =
            HttpUtils::execute_request(builder, operation, &method_name, &url).await?;
        self.decode(operation, status, &text, context)
    }

    /// Unwrap `{ success, error? }`: `success: false` becomes `Rejected`.
    pub(crate) fn unwrap_envelope<T>(
        &self,
        operation: &str,
        envelope: ApiEnvelope<T>,
    ) -> Result<ApiEnvelope<T>> {
        if envelope.success {
            return Ok(envelope);
        }
        let message = envelope
            .failure_message()
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        log::warn!("[backend] {operation}: rejected: {message}");
        Err(BackendError::Rejected {
            operation: operation.to_string(),
            status: None,
            message,
        })
    }

    fn decode<T: DeserializeOwned>(
        &self,
        operation: &str,
        status: u16,
        text: &str,
        context: ErrorContext,
    ) -> Result<T> {
        if (200..300).contains(&status) {
            return HttpUtils::parse_json(text, operation);
        }

        // 非 2xx：尽量从信封里取出后端给的错误消息
        let raw = match envelope_failure(text) {
            Some(message) => RawApiError::from_envelope(status, message),
            None => RawApiError::with_status(status, text.trim()),
        };
        log::error!("[backend] {operation}: HTTP {status}: {}", raw.message);
        Err(self.map_error(operation, raw, context))
    }
}
