//! Type-safe EventSub session identifier.
//!
//! [`SessionId`] wraps the opaque id Twitch assigns in `session_welcome`.
//! It is never reused across reconnects: every new connection receives a
//! fresh one, and subscriptions are bound to it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one EventSub WebSocket session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a server-assigned session id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl PartialEq<str> for SessionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_against_raw_transport_id() {
        let id = SessionId::new("AQoQexAWVYKSTIu4ec_2VAxyuhAB");
        assert!(id == *"AQoQexAWVYKSTIu4ec_2VAxyuhAB");
        assert!(id != *"AQoQILE98gtqShGmLD7AM6yJThAB");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = SessionId::from("abc");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"abc\""));
        assert_eq!(id.to_string(), "abc");
    }
}
