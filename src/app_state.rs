//! Shared application state injected into all Axum handlers.

use tokio::sync::watch;

use crate::eventsub::SessionState;
use crate::relay::Relay;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Listener set and broadcast primitive.
    pub relay: Relay,
    /// Latest EventSub session state, as published by the client.
    pub session: watch::Receiver<SessionState>,
}
