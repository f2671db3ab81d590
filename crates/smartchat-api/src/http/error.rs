//! Application error type mapping to HTTP status codes and the failure
//! envelope.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use smartchat_types::error::RelayError;

use crate::http::response::ApiResponse;

/// Message for a chat request without a usable `message` field.
pub const MESSAGE_REQUIRED: &str = "Mensaje requerido";

#[derive(Debug)]
pub enum AppError {
    /// Inference or code-hosting failure.
    Relay(RelayError),
    /// Bad request body.
    Validation(String),
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        AppError::Relay(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        tracing::debug!(error = %e, "Rejected request body");
        AppError::Validation(MESSAGE_REQUIRED.to_string())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Relay(e) => match e {
                RelayError::MessageTooLong { .. } | RelayError::InvalidRepositoryUrl(_) => {
                    StatusCode::BAD_REQUEST
                }
                RelayError::UpstreamUnavailable(_)
                | RelayError::NoModelsAvailable
                | RelayError::RepositoryNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                RelayError::UpstreamError { .. } | RelayError::Decode(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Relay(e) => {
                if status.is_server_error() {
                    tracing::warn!(error = %e, status = status.as_u16(), "Request failed upstream");
                }
                e.user_message()
            }
        };
        ApiResponse::failure(message).with_status(status)
    }
}
