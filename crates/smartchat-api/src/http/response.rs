//! Envelope response format for the plain HTTP endpoints.
//!
//! ```json
//! { "success": true, "data": "...", "timestamp": "2024-01-01T00:00:00+00:00" }
//! { "success": false, "error": "Mensaje requerido", "timestamp": "..." }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// RFC 3339 timestamp of the response.
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Render with an explicit status code.
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Body(self)).into_response()
    }
}

/// JSON body of an envelope, without a status.
struct Body<T: Serialize>(ApiResponse<T>);

impl<T: Serialize> IntoResponse for Body<T> {
    fn into_response(self) -> Response {
        let body = serde_json::to_string(&self.0).unwrap_or_else(|_| {
            r#"{"success":false,"error":"Failed to serialize response"}"#.to_string()
        });
        (
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Body(self)).into_response()
    }
}
