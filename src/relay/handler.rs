//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_listener;
use crate::app_state::AppState;

/// `GET /` — Upgrade the HTTP connection to a relay listener socket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let relay = state.relay;
    ws.on_upgrade(move |socket| run_listener(socket, relay))
}
