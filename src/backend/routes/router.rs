//! Router Assembly
//!
//! Builds the axum router:
//!
//! - `GET /team-chat` - authenticated WebSocket upgrade into the chat
//!   session protocol
//! - `GET /api/health` - liveness probe
//!
//! The frontend is served from another origin, so a permissive CORS layer is
//! applied, and every request is traced.

use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::backend::server::state::AppState;
use crate::backend::session::team_chat_handler;

/// Create the axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    Router::new()
        .route("/team-chat", get(team_chat_handler))
        .route("/api/health", get(health))
        .fallback(|| async { "404 Not Found" })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Handle `GET /api/health`
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
