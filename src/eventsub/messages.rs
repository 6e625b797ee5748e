//! EventSub frame types.
//!
//! Inbound frames are JSON envelopes of the form
//! `{ "metadata": { "message_type": ... }, "payload": { ... } }`.
//! [`parse_frame`] maps the wire JSON into the closed [`EventSubMessage`]
//! enum at the boundary; everything downstream matches on it exhaustively.

use serde::Deserialize;

use crate::domain::{LiveNotice, SessionId};
use crate::error::{RelayError, RelayResult};

/// A classified EventSub frame.
#[derive(Debug, Clone, PartialEq)]
pub enum EventSubMessage {
    /// `session_welcome`: the server assigned a session id.
    SessionWelcome {
        /// Newly assigned session id.
        session_id: SessionId,
        /// Maximum silence (seconds) before the session should be
        /// considered dead, when the server announces one.
        keepalive_timeout_secs: Option<u64>,
    },
    /// `notification`: a subscribed event fired.
    Notification(LiveNotice),
    /// `revocation`: the server withdrew a subscription.
    Revocation {
        /// Raw subscription object, kept for logging.
        subscription: serde_json::Value,
    },
    /// `session_keepalive`: liveness signal.
    SessionKeepalive,
    /// Any other or missing `message_type`.
    Unrecognized {
        /// The message type as received, empty when absent.
        message_type: String,
    },
}

impl EventSubMessage {
    /// Wire name of the message type.
    #[must_use]
    pub fn message_type(&self) -> &str {
        match self {
            Self::SessionWelcome { .. } => "session_welcome",
            Self::Notification(_) => "notification",
            Self::Revocation { .. } => "revocation",
            Self::SessionKeepalive => "session_keepalive",
            Self::Unrecognized { message_type } => message_type,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    metadata: Option<Metadata>,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    #[serde(default)]
    message_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WelcomePayload {
    session: WelcomeSession,
}

#[derive(Debug, Deserialize)]
struct WelcomeSession {
    id: String,
    #[serde(default)]
    keepalive_timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct NotificationPayload {
    event: LiveNotice,
}

#[derive(Debug, Deserialize)]
struct RevocationPayload {
    #[serde(default)]
    subscription: serde_json::Value,
}

/// Parses one text frame into an [`EventSubMessage`].
///
/// # Errors
///
/// Returns [`RelayError::MalformedFrame`] if the frame is not JSON, or if a
/// recognized message type lacks the fields it requires (a welcome without
/// `session.id`, a notification without `event.broadcaster_user_name`).
pub fn parse_frame(text: &str) -> RelayResult<EventSubMessage> {
    let envelope: Envelope =
        serde_json::from_str(text).map_err(|e| RelayError::MalformedFrame(e.to_string()))?;

    let message_type = envelope
        .metadata
        .and_then(|m| m.message_type)
        .unwrap_or_default();

    let message = match message_type.as_str() {
        "session_welcome" => {
            let payload: WelcomePayload = decode_payload(envelope.payload, &message_type)?;
            EventSubMessage::SessionWelcome {
                session_id: SessionId::new(payload.session.id),
                keepalive_timeout_secs: payload.session.keepalive_timeout_seconds,
            }
        }
        "notification" => {
            let payload: NotificationPayload = decode_payload(envelope.payload, &message_type)?;
            EventSubMessage::Notification(payload.event)
        }
        "revocation" => {
            let payload: RevocationPayload = decode_payload(envelope.payload, &message_type)?;
            EventSubMessage::Revocation {
                subscription: payload.subscription,
            }
        }
        "session_keepalive" => EventSubMessage::SessionKeepalive,
        _ => EventSubMessage::Unrecognized { message_type },
    };

    Ok(message)
}

fn decode_payload<T: serde::de::DeserializeOwned>(
    payload: serde_json::Value,
    message_type: &str,
) -> RelayResult<T> {
    serde_json::from_value(payload)
        .map_err(|e| RelayError::MalformedFrame(format!("{message_type} payload: {e}")))
}
