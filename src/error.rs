//! Relay error types.
//!
//! [`RelayError`] is the central error type for the relay. Remote-facing
//! variants carry enough context (status code, response body, endpoint) to
//! diagnose a failure from the logs alone.

use reqwest::StatusCode;

/// Convenience alias used throughout the crate.
pub type RelayResult<T> = Result<T, RelayError>;

/// Error enum shared by every component of the relay.
///
/// | Category       | Variants                                              | Handling                  |
/// |----------------|-------------------------------------------------------|---------------------------|
/// | Configuration  | `MissingConfig`, `InvalidConfig`                      | fatal at startup          |
/// | Helix API      | `Http`, `Api`, `UserNotFound`, `EmptyResponse`        | logged, session unsubscribed |
/// | EventSub frame | `MalformedFrame`                                      | frame skipped             |
/// | EventSub link  | `WebSocket`, `ConnectTimeout`, `KeepaliveTimeout`     | reconnect after delay     |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A required configuration key is not set.
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// A configuration key is set but cannot be parsed.
    #[error("invalid configuration for {key}: {message}")]
    InvalidConfig {
        /// Environment variable name.
        key: &'static str,
        /// Parser error message.
        message: String,
    },

    /// Transport-level HTTP failure (DNS, TLS, timeout, body decoding).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Helix API answered with a non-success status.
    #[error("helix api returned {status}: {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: StatusCode,
        /// Response body, as returned by the API.
        message: String,
    },

    /// No account matches the configured broadcaster login.
    #[error("no twitch user found for login {0}")]
    UserNotFound(String),

    /// The API returned a success status with an empty `data` array.
    #[error("empty response from {0}")]
    EmptyResponse(&'static str),

    /// An inbound EventSub frame could not be decoded.
    #[error("malformed eventsub frame: {0}")]
    MalformedFrame(String),

    /// WebSocket protocol or I/O error on the EventSub connection.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The EventSub connection could not be opened in time.
    #[error("eventsub connect timed out after {0}s")]
    ConnectTimeout(u64),

    /// No frame arrived within the keepalive window announced on welcome.
    #[error("no eventsub frame received within {0}s")]
    KeepaliveTimeout(u64),
}

impl RelayError {
    /// Returns `true` for failures that may succeed on a later attempt:
    /// transport errors, rate limiting and server-side errors.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_)
            | Self::WebSocket(_)
            | Self::ConnectTimeout(_)
            | Self::KeepaliveTimeout(_) => true,
            Self::Api { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::MissingConfig(_)
            | Self::InvalidConfig { .. }
            | Self::UserNotFound(_)
            | Self::EmptyResponse(_)
            | Self::MalformedFrame(_) => false,
        }
    }
}
