//! Shared HTTP plumbing for the pricing fetcher and the provider adapter

use crate::error::{LlmError, LlmResult};
use crate::logging::log_error;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

/// Seconds to wait on a 429 without a usable `Retry-After` header
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// JSON headers, plus bearer auth when a key is configured
pub(crate) fn build_headers(api_key: Option<&str>) -> LlmResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(api_key) = api_key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                LlmError::configuration_error(format!("Invalid API key format: {e}"))
            })?,
        );
    }

    Ok(headers)
}

/// Map a transport failure to a retryable error
pub(crate) fn transport_error(url: &str, error: reqwest::Error) -> LlmError {
    log_error!(url = %url, error = %error, "HTTP request failed");
    LlmError::request_failed(error.to_string(), Some(Box::new(error)))
}

/// Check the status and decode a JSON body
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> LlmResult<T> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let raw_body = response.text().await.map_err(|e| {
        LlmError::response_parsing_error(format!("Failed to read response: {e}"))
    })?;

    serde_json::from_str(&raw_body).map_err(|e| {
        log_error!(error = %e, raw_body = %raw_body, "Failed to parse response");
        LlmError::response_parsing_error(format!("Invalid response: {e}"))
    })
}

/// Translate a non-success response into the matching error variant
async fn error_from_response(response: reqwest::Response) -> LlmError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok());
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    log_error!(status = %status, error_text = %error_text, "API error response");

    match status.as_u16() {
        401 | 403 => LlmError::authentication_failed(format!("{status}: {error_text}")),
        429 => LlmError::rate_limit_exceeded(retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS)),
        code if status.is_server_error() || code == 408 => {
            LlmError::request_failed(format!("API error {status}: {error_text}"), None)
        }
        code => LlmError::request_rejected(code, error_text),
    }
}
