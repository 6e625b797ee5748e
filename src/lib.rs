//! # live-relay
//!
//! Relays Twitch EventSub `stream.online` notifications to local WebSocket
//! listeners (browser extensions).
//!
//! The service keeps a single EventSub WebSocket session open, makes sure
//! it carries a `stream.online` subscription for one broadcaster, and fans
//! every "went live" event out to all listeners connected at that moment.
//!
//! ## Architecture
//!
//! ```text
//! Twitch EventSub (wss)          Twitch Helix (https)
//!     │                               ▲
//!     ├── EventSubClient (eventsub/)  │
//!     │     session state machine     │
//!     │     reconnect timer           │
//!     │                               │
//!     ├── Dispatcher ─── welcome ─────┴── SubscriptionManager (helix/)
//!     │        │
//!     │        └── notification ──▶ Relay (relay/)
//!     │                               │
//!     └── axum router (api/) ─────────┴── Listeners (ws://host:8080/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod eventsub;
pub mod helix;
pub mod relay;
