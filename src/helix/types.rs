//! Helix request and response bodies.
//!
//! Only the fields the relay reads are modelled; unknown fields are
//! ignored on deserialization.

use serde::{Deserialize, Serialize};

/// EventSub subscription type relayed by this service.
pub const STREAM_ONLINE: &str = "stream.online";

/// Version of the `stream.online` subscription type.
pub const STREAM_ONLINE_VERSION: &str = "1";

/// Standard Helix `{ "data": [...] }` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    /// Result items.
    pub data: Vec<T>,
    /// Cursor for the next page, on paginated endpoints.
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination object of list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    /// Cursor to pass as `after` for the next page.
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Entry of `GET /users`.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixUser {
    /// Numeric user id.
    pub id: String,
    /// Login name.
    #[serde(default)]
    pub login: String,
    /// Display name.
    #[serde(default)]
    pub display_name: String,
}

/// Subscription condition. Only the broadcaster id is relevant here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Broadcaster the subscription is scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcaster_user_id: Option<String>,
}

/// Subscription transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transport {
    /// `websocket`, `webhook` or `conduit`.
    #[serde(default)]
    pub method: String,
    /// Session the subscription is bound to, for the `websocket` method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Entry of `GET /eventsub/subscriptions` and of the create response.
#[derive(Debug, Clone, Deserialize)]
pub struct EventSubSubscription {
    /// Subscription id.
    pub id: String,
    /// Subscription type, e.g. `stream.online`.
    #[serde(rename = "type")]
    pub sub_type: String,
    /// Status, e.g. `enabled` or `websocket_disconnected`.
    #[serde(default)]
    pub status: Option<String>,
    /// Condition the subscription filters on.
    #[serde(default)]
    pub condition: Condition,
    /// Delivery transport.
    #[serde(default)]
    pub transport: Transport,
}

impl EventSubSubscription {
    /// Returns `true` if this subscription delivers `stream.online` events
    /// for `broadcaster_user_id` over the session `session_id`.
    #[must_use]
    pub fn is_stream_online_for(&self, broadcaster_user_id: &str, session_id: &str) -> bool {
        self.sub_type == STREAM_ONLINE
            && self.condition.broadcaster_user_id.as_deref() == Some(broadcaster_user_id)
            && self.transport.session_id.as_deref() == Some(session_id)
    }
}

/// Body of `POST /eventsub/subscriptions`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSubscriptionRequest<'a> {
    /// Subscription type.
    #[serde(rename = "type")]
    pub sub_type: &'a str,
    /// Subscription type version.
    pub version: &'a str,
    /// Condition.
    pub condition: Condition,
    /// Transport.
    pub transport: Transport,
}

impl<'a> CreateSubscriptionRequest<'a> {
    /// `stream.online` for `broadcaster_user_id`, delivered over the
    /// WebSocket session `session_id`.
    #[must_use]
    pub fn stream_online(broadcaster_user_id: &str, session_id: &str) -> Self {
        Self {
            sub_type: STREAM_ONLINE,
            version: STREAM_ONLINE_VERSION,
            condition: Condition {
                broadcaster_user_id: Some(broadcaster_user_id.to_string()),
            },
            transport: Transport {
                method: "websocket".to_string(),
                session_id: Some(session_id.to_string()),
            },
        }
    }
}

/// Response of the OAuth validation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenValidation {
    /// Client id the token was issued to.
    pub client_id: String,
    /// Login of the token owner; absent for app tokens.
    #[serde(default)]
    pub login: Option<String>,
    /// User id of the token owner; absent for app tokens.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Granted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Seconds until expiry.
    #[serde(default)]
    pub expires_in: u64,
}
