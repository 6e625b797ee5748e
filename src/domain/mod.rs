//! Domain layer: identifiers and the normalized live-event type.
//!
//! These types are shared by the EventSub client, the Helix subscription
//! manager and the local relay.

pub mod listener_id;
pub mod live_notice;
pub mod session_id;

pub use listener_id::ListenerId;
pub use live_notice::LiveNotice;
pub use session_id::SessionId;
