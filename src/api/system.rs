//! System endpoints: health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::app_state::AppState;
use crate::eventsub::SessionState;

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    version: &'static str,
    listeners: usize,
    session: SessionState,
}

/// `GET /health` — Relay status, listener count and EventSub session state.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.borrow().clone();
    let status = match session {
        SessionState::Subscribed(_) => "healthy",
        _ => "degraded",
    };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status,
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            listeners: state.relay.listener_count().await,
            session,
        }),
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
