//! Per-listener connection loop.
//!
//! Registers the listener on connect, forwards queued broadcasts to the
//! socket, logs anything the listener sends, and removes the listener on
//! close or error.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use super::listeners::Relay;

/// Runs the read/write loop for a single listener connection.
///
/// - Forwards every message queued by [`Relay::broadcast`] as a text frame.
/// - Logs text sent by the listener; it is never acted upon.
/// - A failed send marks the listener closed so broadcasts skip it.
/// - On close, read error or failed send the listener is removed. Other
///   listeners are unaffected.
pub async fn run_listener(socket: WebSocket, relay: Relay) {
    let (id, mut outbound) = relay.register().await;
    let (mut ws_tx, mut ws_rx) = socket.split();
    tracing::info!(listener = %id, "listener connected");

    loop {
        tokio::select! {
            // Incoming frame from the listener
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::info!(listener = %id, message = %text.as_str(), "message from listener");
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!(listener = %id, error = %e, "listener socket error");
                        break;
                    }
                    _ => {}
                }
            }
            // Broadcast queued for this listener
            queued = outbound.recv() => {
                let Some(text) = queued else { break };
                if let Err(e) = ws_tx.send(Message::text(text)).await {
                    tracing::warn!(listener = %id, error = %e, "send to listener failed");
                    relay.mark_closed(id).await;
                    break;
                }
            }
        }
    }

    relay.remove(id).await;
    tracing::info!(listener = %id, "listener disconnected");
}
