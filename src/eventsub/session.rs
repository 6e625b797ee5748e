//! EventSub session state machine.
//!
//! ```text
//! Disconnected ─connect─▶ Connecting ─welcome─▶ Welcomed ─subscribed─▶ Subscribed
//!      ▲                      │                    │                      │
//!      └──────────────────────┴──── closed / error ┴──────────────────────┘
//! ```
//!
//! Transitions are total functions on [`SessionState`]; a [`Session`] pairs
//! the state with the live WebSocket stream and is replaced wholesale on
//! every reconnect.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::domain::SessionId;

/// Outbound EventSub WebSocket stream.
pub type EventSubStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Lifecycle state of the EventSub session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "session_id", rename_all = "snake_case")]
pub enum SessionState {
    /// No connection. Initial state and the state after close or error.
    #[default]
    Disconnected,
    /// Connection being opened.
    Connecting,
    /// Welcome received; the session id is known, no subscription yet.
    Welcomed(SessionId),
    /// The `stream.online` subscription is bound to this session.
    Subscribed(SessionId),
}

impl SessionState {
    /// An outbound connection attempt starts.
    #[must_use]
    pub fn connecting(self) -> Self {
        Self::Connecting
    }

    /// A `session_welcome` arrived carrying `session_id`.
    ///
    /// The new id always replaces any previous one.
    #[must_use]
    pub fn welcomed(self, session_id: SessionId) -> Self {
        Self::Welcomed(session_id)
    }

    /// The subscription for `session_id` is in place.
    ///
    /// Only applies when `session_id` is the current one; a late result for
    /// an older session leaves the state untouched.
    #[must_use]
    pub fn subscribed(self, session_id: &SessionId) -> Self {
        match self {
            Self::Welcomed(current) | Self::Subscribed(current) if current == *session_id => {
                Self::Subscribed(current)
            }
            other => other,
        }
    }

    /// The connection closed or failed.
    #[must_use]
    pub fn closed(self) -> Self {
        Self::Disconnected
    }

    /// Session id assigned by the server, once welcomed.
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::Welcomed(id) | Self::Subscribed(id) => Some(id),
            Self::Disconnected | Self::Connecting => None,
        }
    }

    /// Returns `true` while a connection exists.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !matches!(self, Self::Disconnected)
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Welcomed(_) => "welcomed",
            Self::Subscribed(_) => "subscribed",
        }
    }
}

/// One EventSub connection instance.
///
/// Owned exclusively by the client's run loop. A reconnect builds a new
/// `Session`; nothing outside the loop holds on to the stream.
pub struct Session {
    stream: EventSubStream,
    state: SessionState,
    opened_at: DateTime<Utc>,
    keepalive_timeout_secs: Option<u64>,
}

impl Session {
    /// Wraps a freshly opened stream. No subscription is active yet.
    #[must_use]
    pub fn open(stream: EventSubStream) -> Self {
        Self {
            stream,
            state: SessionState::default().connecting(),
            opened_at: Utc::now(),
            keepalive_timeout_secs: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Applies a transition function to the current state.
    pub fn transition(&mut self, f: impl FnOnce(SessionState) -> SessionState) {
        let previous = std::mem::take(&mut self.state);
        self.state = f(previous);
    }

    /// Records the keepalive window announced on welcome.
    pub fn set_keepalive_timeout(&mut self, secs: Option<u64>) {
        self.keepalive_timeout_secs = secs;
    }

    /// Keepalive window announced on welcome, if any.
    #[must_use]
    pub const fn keepalive_timeout_secs(&self) -> Option<u64> {
        self.keepalive_timeout_secs
    }

    /// When the connection was opened.
    #[must_use]
    pub const fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Mutable access to the underlying stream.
    pub fn stream_mut(&mut self) -> &mut EventSubStream {
        &mut self.stream
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("opened_at", &self.opened_at)
            .field("keepalive_timeout_secs", &self.keepalive_timeout_secs)
            .finish_non_exhaustive()
    }
}
