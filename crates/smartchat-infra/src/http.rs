//! Shared `reqwest` plumbing for the upstream clients.

use std::time::Duration;

use smartchat_types::error::RelayError;

/// Longest error body kept in an [`RelayError::UpstreamError`] message.
const MAX_ERROR_BODY: usize = 300;

/// Connect timeout applied to every upstream client.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a client with a connect timeout. Request timeouts are set per call.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, RelayError> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(user_agent)
        .build()
        .map_err(|e| RelayError::UpstreamUnavailable(format!("failed to create HTTP client: {e}")))
}

/// Map a transport-level failure (connect, timeout, body read) to
/// [`RelayError::UpstreamUnavailable`].
pub fn map_transport_error(err: reqwest::Error) -> RelayError {
    RelayError::UpstreamUnavailable(transport_detail(&err))
}

/// Short description of a transport failure.
pub fn transport_detail(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "operation timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

/// Turn a non-success response into [`RelayError::UpstreamError`].
pub async fn status_error(response: reqwest::Response) -> RelayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    RelayError::UpstreamError {
        status,
        message: error_message(&body),
    }
}

/// Pull a readable message out of an error body.
///
/// Both upstreams answer errors with JSON carrying `message` or `error`;
/// anything else is kept verbatim, truncated.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    match from_json {
        Some(message) => message,
        None => body.trim().chars().take(MAX_ERROR_BODY).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"message":"Not Found"}"#), "Not Found");
        assert_eq!(error_message(r#"{"error":"model 'x' not found"}"#), "model 'x' not found");
    }

    #[test]
    fn error_message_truncates_plain_bodies() {
        let body = "x".repeat(1000);
        assert_eq!(error_message(&body).len(), MAX_ERROR_BODY);
        assert_eq!(error_message("  bad gateway \n"), "bad gateway");
    }
}
