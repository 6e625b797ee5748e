//! `stream.online` subscription management.
//!
//! [`SubscriptionManager`] makes sure the current EventSub session carries
//! exactly one `stream.online` subscription for the configured broadcaster.
//! It reads before it writes: existing subscriptions are listed first and a
//! new one is only created when none is bound to the *current* session id.
//! Subscriptions left over from a previous session never count, so every
//! reconnect re-subscribes.

use super::client::HelixClient;
use super::types::CreateSubscriptionRequest;
use crate::domain::SessionId;
use crate::error::RelayResult;

/// Result of [`SubscriptionManager::ensure_stream_online_subscription`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionOutcome {
    /// A matching subscription already existed for this session.
    AlreadyActive {
        /// Id of the existing subscription.
        subscription_id: String,
    },
    /// A new subscription was created.
    Created {
        /// Id of the new subscription.
        subscription_id: String,
    },
}

impl SubscriptionOutcome {
    /// Id of the subscription bound to the session.
    #[must_use]
    pub fn subscription_id(&self) -> &str {
        match self {
            Self::AlreadyActive { subscription_id } | Self::Created { subscription_id } => {
                subscription_id
            }
        }
    }
}

/// Ensures the broadcaster's `stream.online` subscription exists.
#[derive(Debug, Clone)]
pub struct SubscriptionManager {
    helix: HelixClient,
    broadcaster_login: String,
}

impl SubscriptionManager {
    /// Creates a manager for `broadcaster_login`.
    #[must_use]
    pub fn new(helix: HelixClient, broadcaster_login: impl Into<String>) -> Self {
        Self {
            helix,
            broadcaster_login: broadcaster_login.into(),
        }
    }

    /// Login of the broadcaster being watched.
    #[must_use]
    pub fn broadcaster_login(&self) -> &str {
        &self.broadcaster_login
    }

    /// Resolves the broadcaster id, lists existing subscriptions and
    /// creates the `stream.online` subscription for `session_id` unless
    /// one bound to that session already exists.
    ///
    /// # Errors
    ///
    /// Propagates any Helix failure (user lookup, listing or creation).
    /// Nothing is retried here; the next session gets a fresh attempt.
    pub async fn ensure_stream_online_subscription(
        &self,
        session_id: &SessionId,
    ) -> RelayResult<SubscriptionOutcome> {
        let user = self.helix.get_user_by_login(&self.broadcaster_login).await?;
        tracing::debug!(
            login = %self.broadcaster_login,
            broadcaster_user_id = %user.id,
            "resolved broadcaster"
        );

        let existing = self.helix.list_subscriptions().await?;
        if let Some(active) = existing
            .iter()
            .find(|sub| sub.is_stream_online_for(&user.id, session_id.as_str()))
        {
            tracing::info!(
                subscription_id = %active.id,
                %session_id,
                "stream.online subscription already active for this session"
            );
            return Ok(SubscriptionOutcome::AlreadyActive {
                subscription_id: active.id.clone(),
            });
        }

        let request = CreateSubscriptionRequest::stream_online(&user.id, session_id.as_str());
        let created = self.helix.create_subscription(&request).await?;
        tracing::info!(
            subscription_id = %created.id,
            broadcaster_user_id = %user.id,
            %session_id,
            "stream.online subscription created"
        );

        Ok(SubscriptionOutcome::Created {
            subscription_id: created.id,
        })
    }
}
