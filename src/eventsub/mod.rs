//! EventSub layer: frame parsing, session state machine, reconnect timer
//! and the WebSocket client that ties them together.

pub mod client;
pub mod messages;
pub mod reconnect;
pub mod session;

pub use client::{EventSubClient, SessionEnd};
pub use messages::{EventSubMessage, parse_frame};
pub use reconnect::ReconnectTimer;
pub use session::{Session, SessionState};
