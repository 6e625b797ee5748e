//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The three Twitch credentials are
//! required; everything else falls back to a default.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{RelayError, RelayResult};

/// Default EventSub WebSocket endpoint.
pub const DEFAULT_EVENTSUB_WS_URL: &str = "wss://eventsub.wss.twitch.tv/ws";

/// Default Helix REST API base URL.
pub const DEFAULT_HELIX_BASE_URL: &str = "https://api.twitch.tv/helix";

/// Default OAuth token validation endpoint.
pub const DEFAULT_OAUTH_VALIDATE_URL: &str = "https://id.twitch.tv/oauth2/validate";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Clone)]
pub struct RelayConfig {
    /// Socket address the local relay binds to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Twitch application client id, sent as `Client-Id`.
    pub client_id: String,

    /// Login of the broadcaster whose `stream.online` events are relayed.
    pub broadcaster_login: String,

    /// User access token, sent as `Authorization: Bearer ...`.
    pub access_token: String,

    /// EventSub WebSocket URL.
    pub eventsub_ws_url: String,

    /// Helix REST API base URL, without trailing slash.
    pub helix_base_url: String,

    /// OAuth validation endpoint.
    pub oauth_validate_url: String,

    /// Fixed delay before reconnecting to EventSub.
    pub reconnect_delay_secs: u64,

    /// Upper bound on opening the EventSub connection.
    pub connect_timeout_secs: u64,

    /// Extra silence tolerated on top of the server keepalive timeout.
    pub keepalive_grace_secs: u64,

    /// Timeout applied to every Helix request.
    pub http_timeout_secs: u64,

    /// Outbound message queue size per listener.
    pub listener_queue_capacity: usize,

    /// Log output format.
    pub log_format: LogFormat,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MissingConfig`] if `TWITCH_CLIENT_ID`,
    /// `BROADCASTER_USERNAME` or `TWITCH_OAUTH_TOKEN` is unset or empty, and
    /// [`RelayError::InvalidConfig`] if `LISTEN_ADDR` cannot be parsed.
    pub fn from_env() -> RelayResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`RelayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> RelayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(RelayError::MissingConfig(key))
        };

        let client_id = required("TWITCH_CLIENT_ID")?;
        let broadcaster_login = required("BROADCASTER_USERNAME")?;
        let access_token = required("TWITCH_OAUTH_TOKEN")?;

        let listen_addr: SocketAddr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| RelayError::InvalidConfig {
                key: "LISTEN_ADDR",
                message: e.to_string(),
            })?;

        let eventsub_ws_url =
            lookup("EVENTSUB_WS_URL").unwrap_or_else(|| DEFAULT_EVENTSUB_WS_URL.to_string());
        let helix_base_url = lookup("HELIX_BASE_URL")
            .unwrap_or_else(|| DEFAULT_HELIX_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let oauth_validate_url = lookup("OAUTH_VALIDATE_URL")
            .unwrap_or_else(|| DEFAULT_OAUTH_VALIDATE_URL.to_string());

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            client_id,
            broadcaster_login,
            access_token,
            eventsub_ws_url,
            helix_base_url,
            oauth_validate_url,
            reconnect_delay_secs: parse_or(&lookup, "RECONNECT_DELAY_SECS", 5),
            connect_timeout_secs: parse_or(&lookup, "CONNECT_TIMEOUT_SECS", 15),
            keepalive_grace_secs: parse_or(&lookup, "KEEPALIVE_GRACE_SECS", 5),
            http_timeout_secs: parse_or(&lookup, "HTTP_TIMEOUT_SECS", 10),
            listener_queue_capacity: parse_or(&lookup, "LISTENER_QUEUE_CAPACITY", 64).max(1),
            log_format,
        })
    }

    /// Delay between a lost EventSub session and the next attempt.
    #[must_use]
    pub const fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("listen_addr", &self.listen_addr)
            .field("client_id", &self.client_id)
            .field("broadcaster_login", &self.broadcaster_login)
            .field("access_token", &"<redacted>")
            .field("eventsub_ws_url", &self.eventsub_ws_url)
            .field("helix_base_url", &self.helix_base_url)
            .field("oauth_validate_url", &self.oauth_validate_url)
            .field("reconnect_delay_secs", &self.reconnect_delay_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("keepalive_grace_secs", &self.keepalive_grace_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("listener_queue_capacity", &self.listener_queue_capacity)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// Parses a value as `T`, returning `default` on missing or invalid values.
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
