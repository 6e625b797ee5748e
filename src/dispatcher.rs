//! Routes classified EventSub messages to the subscription manager or the
//! relay.
//!
//! The dispatcher holds no state of its own. Subscription failures are
//! logged and converted into [`DispatchOutcome::SubscriptionFailed`] here,
//! so they never reach the socket loop.

use crate::eventsub::EventSubMessage;
use crate::helix::{SubscriptionManager, SubscriptionOutcome};
use crate::relay::Relay;

/// What the dispatcher did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The session carries the `stream.online` subscription.
    Subscribed(SubscriptionOutcome),
    /// Subscription setup failed; the session stays unsubscribed.
    SubscriptionFailed,
    /// A live notice was broadcast to this many listeners.
    Broadcast {
        /// Listeners the message was queued for.
        delivered: usize,
    },
    /// Logged only.
    Logged,
}

/// Glue between the EventSub session, the subscription manager and the
/// relay.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    subscriptions: SubscriptionManager,
    relay: Relay,
}

impl Dispatcher {
    /// Creates a dispatcher over the given collaborators.
    #[must_use]
    pub fn new(subscriptions: SubscriptionManager, relay: Relay) -> Self {
        Self {
            subscriptions,
            relay,
        }
    }

    /// Relay the dispatcher broadcasts to.
    #[must_use]
    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    /// Handles one message. Exactly one of subscription setup, broadcast or
    /// logging happens.
    pub async fn dispatch(&self, message: &EventSubMessage) -> DispatchOutcome {
        match message {
            EventSubMessage::SessionWelcome { session_id, .. } => {
                match self
                    .subscriptions
                    .ensure_stream_online_subscription(session_id)
                    .await
                {
                    Ok(outcome) => DispatchOutcome::Subscribed(outcome),
                    Err(e) => {
                        tracing::error!(
                            %session_id,
                            login = %self.subscriptions.broadcaster_login(),
                            retryable = e.is_retryable(),
                            error = %e,
                            "stream.online subscription failed; session stays unsubscribed"
                        );
                        DispatchOutcome::SubscriptionFailed
                    }
                }
            }
            EventSubMessage::Notification(notice) => {
                let text = notice.relay_text();
                let delivered = self.relay.broadcast(&text).await;
                tracing::info!(
                    broadcaster = %notice.broadcaster_user_name,
                    delivered,
                    "live notification relayed"
                );
                DispatchOutcome::Broadcast { delivered }
            }
            EventSubMessage::Revocation { subscription } => {
                tracing::warn!(%subscription, "subscription revoked");
                DispatchOutcome::Logged
            }
            EventSubMessage::SessionKeepalive => {
                tracing::debug!("keepalive received");
                DispatchOutcome::Logged
            }
            EventSubMessage::Unrecognized { message_type } => {
                tracing::debug!(%message_type, "ignoring unrecognized eventsub message");
                DispatchOutcome::Logged
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::domain::{LiveNotice, SessionId};
    use crate::helix::client::tests::test_client;
    use crate::helix::subscription::tests::{mount_stateful_subscriptions, mount_user};

    fn dispatcher(server: &MockServer, relay: &Relay) -> Dispatcher {
        Dispatcher::new(
            SubscriptionManager::new(test_client(server), "foo"),
            relay.clone(),
        )
    }

    fn welcome(id: &str) -> EventSubMessage {
        EventSubMessage::SessionWelcome {
            session_id: SessionId::from(id),
            keepalive_timeout_secs: Some(10),
        }
    }

    #[tokio::test]
    async fn welcome_then_notification_reaches_listener() {
        let server = MockServer::start().await;
        mount_user(&server).await;
        mount_stateful_subscriptions(&server, 1).await;
        let relay = Relay::default();
        let (_id, mut rx) = relay.register().await;
        let dispatcher = dispatcher(&server, &relay);

        let subscribed = dispatcher.dispatch(&welcome("abc")).await;
        assert!(matches!(
            subscribed,
            DispatchOutcome::Subscribed(SubscriptionOutcome::Created { .. })
        ));

        let outcome = dispatcher
            .dispatch(&EventSubMessage::Notification(LiveNotice::new("Foo")))
            .await;
        assert_eq!(outcome, DispatchOutcome::Broadcast { delivered: 1 });
        assert_eq!(rx.recv().await.as_deref(), Some("🔴 Foo est en live !"));
    }

    #[tokio::test]
    async fn subscription_error_is_contained() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/helix/users"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;
        let relay = Relay::default();
        let dispatcher = dispatcher(&server, &relay);

        let outcome = dispatcher.dispatch(&welcome("abc")).await;
        assert_eq!(outcome, DispatchOutcome::SubscriptionFailed);

        let (_id, mut rx) = relay.register().await;
        let outcome = dispatcher
            .dispatch(&EventSubMessage::Notification(LiveNotice::new("Foo")))
            .await;
        assert_eq!(outcome, DispatchOutcome::Broadcast { delivered: 1 });
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn revocation_keepalive_and_unknown_only_log() {
        let server = MockServer::start().await;
        let relay = Relay::default();
        let (_id, mut rx) = relay.register().await;
        let dispatcher = dispatcher(&server, &relay);

        let messages = [
            EventSubMessage::Revocation {
                subscription: serde_json::json!({ "id": "sub", "status": "authorization_revoked" }),
            },
            EventSubMessage::SessionKeepalive,
            EventSubMessage::Unrecognized {
                message_type: "session_reconnect".to_string(),
            },
        ];
        for message in &messages {
            assert_eq!(dispatcher.dispatch(message).await, DispatchOutcome::Logged);
        }
        assert!(rx.try_recv().is_err());
        let received = server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty());
    }
}
