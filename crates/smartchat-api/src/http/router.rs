//! Axum router configuration with middleware.
//!
//! Routes:
//! - `GET /` embedded client page
//! - `GET /ws` websocket relay
//! - `GET /api/health`
//! - `POST /api/chat` canned replies
//! - `POST /api/chat/ollama` blocking Ollama reply
//!
//! Middleware: CORS (from `cors_origins`), tracing.

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/chat", post(handlers::chat::canned_chat))
        .route("/chat/ollama", post(handlers::chat::ollama_chat));

    Router::new()
        .route("/", get(handlers::page::index))
        .route("/ws", get(handlers::ws::ws_handler))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `["*"]` (or an empty list) allows any origin; otherwise only the listed
/// origins. Unparsable entries are skipped with a warning.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin: {err}");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
