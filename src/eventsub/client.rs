//! EventSub WebSocket client.
//!
//! [`EventSubClient::run`] keeps one session alive for the lifetime of the
//! process: connect, read frames in arrival order, hand each one to the
//! [`Dispatcher`], and after any close or error wait the fixed reconnect
//! delay before opening a brand new session.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;

use super::messages::{EventSubMessage, parse_frame};
use super::reconnect::ReconnectTimer;
use super::session::{Session, SessionState};
use crate::config::RelayConfig;
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::{RelayError, RelayResult};

/// Why a session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// The server closed the connection or the stream ended.
    Closed,
    /// Connecting, reading or the keepalive watchdog failed.
    Failed(RelayError),
}

/// Owns the single outbound EventSub connection.
#[derive(Debug)]
pub struct EventSubClient {
    ws_url: String,
    connect_timeout: Duration,
    keepalive_grace: Duration,
    reconnect_delay: Duration,
    dispatcher: Dispatcher,
    status: watch::Sender<SessionState>,
}

impl EventSubClient {
    /// Creates a client and the receiver on which it publishes every
    /// session state transition.
    #[must_use]
    pub fn new(config: &RelayConfig, dispatcher: Dispatcher) -> (Self, watch::Receiver<SessionState>) {
        let (status, status_rx) = watch::channel(SessionState::Disconnected);
        let client = Self {
            ws_url: config.eventsub_ws_url.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            keepalive_grace: Duration::from_secs(config.keepalive_grace_secs),
            reconnect_delay: config.reconnect_delay(),
            dispatcher,
            status,
        };
        (client, status_rx)
    }

    /// Runs sessions back to back, forever. Each lost session schedules one
    /// retry after the reconnect delay.
    pub async fn run(self) {
        let mut timer = ReconnectTimer::new();
        loop {
            match self.run_session().await {
                SessionEnd::Closed => tracing::info!("eventsub session closed"),
                SessionEnd::Failed(e) => tracing::warn!(error = %e, "eventsub session failed"),
            }

            if timer.schedule(self.reconnect_delay) {
                tracing::info!(
                    delay_secs = self.reconnect_delay.as_secs(),
                    "reconnecting to eventsub"
                );
            }
            timer.fired().await;
        }
    }

    /// Opens one session and drives it until it closes or fails.
    pub async fn run_session(&self) -> SessionEnd {
        let mut session = match self.connect().await {
            Ok(session) => session,
            Err(e) => {
                self.publish(&SessionState::Disconnected);
                return SessionEnd::Failed(e);
            }
        };

        let end = self.drive(&mut session).await;

        session.transition(SessionState::closed);
        self.publish(session.state());
        tracing::debug!(
            opened_at = %session.opened_at(),
            "eventsub session ended"
        );
        end
    }

    /// Opens the outbound connection. No subscription is active yet.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConnectTimeout`] if the handshake does not
    /// complete within the connect timeout, or [`RelayError::WebSocket`] if
    /// it fails.
    pub async fn connect(&self) -> RelayResult<Session> {
        self.publish(&SessionState::Connecting);
        tracing::info!(url = %self.ws_url, "connecting to eventsub");

        let handshake = tokio_tungstenite::connect_async(self.ws_url.as_str());
        let (stream, _response) = tokio::time::timeout(self.connect_timeout, handshake)
            .await
            .map_err(|_| RelayError::ConnectTimeout(self.connect_timeout.as_secs()))??;

        tracing::info!("connected to eventsub");
        Ok(Session::open(stream))
    }

    async fn drive(&self, session: &mut Session) -> SessionEnd {
        loop {
            let next = match self.silence_limit(session) {
                Some(limit) => {
                    match tokio::time::timeout(limit, session.stream_mut().next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            return SessionEnd::Failed(RelayError::KeepaliveTimeout(
                                limit.as_secs(),
                            ));
                        }
                    }
                }
                None => session.stream_mut().next().await,
            };

            match next {
                Some(Ok(Message::Text(text))) => self.handle_frame(session, text.as_str()).await,
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "eventsub sent close frame");
                    return SessionEnd::Closed;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return SessionEnd::Failed(e.into()),
                None => return SessionEnd::Closed,
            }
        }
    }

    async fn handle_frame(&self, session: &mut Session, text: &str) {
        let message = match parse_frame(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed eventsub frame");
                return;
            }
        };

        // The session id must be captured before the subscription call.
        if let EventSubMessage::SessionWelcome {
            session_id,
            keepalive_timeout_secs,
        } = &message
        {
            tracing::info!(%session_id, ?keepalive_timeout_secs, "eventsub session welcomed");
            session.set_keepalive_timeout(*keepalive_timeout_secs);
            session.transition(|state| state.welcomed(session_id.clone()));
            self.publish(session.state());
        }

        let outcome = self.dispatcher.dispatch(&message).await;

        if let (
            DispatchOutcome::Subscribed(subscription),
            EventSubMessage::SessionWelcome { session_id, .. },
        ) = (&outcome, &message)
        {
            tracing::debug!(
                %session_id,
                subscription_id = subscription.subscription_id(),
                "session subscribed"
            );
            session.transition(|state| state.subscribed(session_id));
            self.publish(session.state());
        }
    }

    fn silence_limit(&self, session: &Session) -> Option<Duration> {
        session
            .keepalive_timeout_secs()
            .map(|secs| Duration::from_secs(secs) + self.keepalive_grace)
    }

    fn publish(&self, state: &SessionState) {
        tracing::debug!(state = state.as_str(), "eventsub session state");
        self.status.send_replace(state.clone());
    }
}
