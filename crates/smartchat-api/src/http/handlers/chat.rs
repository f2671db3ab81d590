//! Plain HTTP chat endpoints.
//!
//! `POST /api/chat` answers from the canned reply table without touching
//! any upstream; `POST /api/chat/ollama` runs the full prompt pipeline
//! through a blocking generate call.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;

use smartchat_core::replies::canned_reply;
use smartchat_types::error::RelayError;

use crate::http::error::{AppError, MESSAGE_REQUIRED};
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Trimmed message, or a validation error when it is empty or too long.
fn extract_message(
    state: &AppState,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<String, AppError> {
    let Json(request) = body?;
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation(MESSAGE_REQUIRED.to_string()));
    }
    let chat = state.relay.chat();
    if !chat.accepts(message) {
        return Err(RelayError::MessageTooLong {
            limit: chat.max_message_length(),
        }
        .into());
    }
    Ok(message.to_string())
}

/// POST /api/chat
pub async fn canned_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<ApiResponse<String>, AppError> {
    let message = extract_message(&state, body)?;
    Ok(ApiResponse::success(canned_reply(&message)))
}

/// POST /api/chat/ollama
pub async fn ollama_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<ApiResponse<String>, AppError> {
    let message = extract_message(&state, body)?;
    let reply = state.relay.chat().reply(&message).await?;
    tracing::info!(length = reply.len(), "Blocking chat reply generated");
    Ok(ApiResponse::success(reply))
}
