//! Local relay layer: listener set, broadcast, and the WebSocket endpoint
//! browser extensions connect to.
//!
//! Listeners connect to `/` with no handshake payload and receive one text
//! frame per live event.

pub mod connection;
pub mod handler;
pub mod listeners;

pub use listeners::{ListenerHandle, ListenerSet, ListenerState, Relay};
