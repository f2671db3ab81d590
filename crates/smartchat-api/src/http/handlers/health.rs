//! Health endpoint.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use smartchat_core::codehost::CodeHost;

use crate::state::AppState;

pub const OLLAMA_UP: &str = "✅ Conectado";
pub const OLLAMA_DOWN: &str = "❌ Desconectado";
pub const GITHUB_UP: &str = "✅ Conectado";
pub const GITHUB_OFF: &str = "❌ No configurado";

/// GET /api/health
///
/// Always 200. The Ollama check uses the short listing timeout; GitHub only
/// reports whether a token is configured.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let ollama = if state.ollama.ping().await {
        OLLAMA_UP
    } else {
        OLLAMA_DOWN
    };
    let github = if state.github.is_configured() {
        GITHUB_UP
    } else {
        GITHUB_OFF
    };

    Json(json!({
        "status": "healthy",
        "ollama": ollama,
        "github": github,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
