//! Normalized `stream.online` notification.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A broadcaster went live.
///
/// Deserialized from the `payload.event` object of an EventSub
/// `notification` frame. Only `broadcaster_user_name` is required; the
/// other fields are kept for logging when Twitch sends them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LiveNotice {
    /// Display name of the broadcaster.
    pub broadcaster_user_name: String,
    /// Login of the broadcaster.
    #[serde(default)]
    pub broadcaster_user_login: Option<String>,
    /// Numeric user id of the broadcaster.
    #[serde(default)]
    pub broadcaster_user_id: Option<String>,
    /// Stream start time.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl LiveNotice {
    /// Builds a notice carrying only the display name.
    #[must_use]
    pub fn new(broadcaster_user_name: impl Into<String>) -> Self {
        Self {
            broadcaster_user_name: broadcaster_user_name.into(),
            broadcaster_user_login: None,
            broadcaster_user_id: None,
            started_at: None,
        }
    }

    /// Text pushed to every relay listener, one per live event.
    #[must_use]
    pub fn relay_text(&self) -> String {
        format!("🔴 {} est en live !", self.broadcaster_user_name)
    }
}
