//! Helix REST API layer: the HTTP client, its wire types and the
//! `stream.online` subscription manager built on top of them.

pub mod client;
pub mod subscription;
pub mod types;

pub use client::HelixClient;
pub use subscription::{SubscriptionManager, SubscriptionOutcome};
