//! Thin Helix REST client.
//!
//! Every request carries the `Client-Id` header and the bearer token. A
//! non-success status becomes [`RelayError::Api`] with the status code and
//! the response body, so callers can log the reason verbatim.

use std::fmt;
use std::time::Duration;

use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;

use super::types::{
    CreateSubscriptionRequest, DataEnvelope, EventSubSubscription, HelixUser, TokenValidation,
};
use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};

/// Authenticated client for the Helix endpoints the relay uses.
#[derive(Clone)]
pub struct HelixClient {
    http: reqwest::Client,
    base_url: String,
    validate_url: String,
    client_id: String,
    access_token: String,
}

impl HelixClient {
    /// Builds a client from the relay configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Http`] if the underlying HTTP client cannot be
    /// constructed (e.g. TLS backend initialisation failure).
    pub fn new(config: &RelayConfig) -> RelayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.helix_base_url.clone(),
            validate_url: config.oauth_validate_url.clone(),
            client_id: config.client_id.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// `GET /users?login=<login>`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UserNotFound`] if no account has this login,
    /// or any transport / API error.
    pub async fn get_user_by_login(&self, login: &str) -> RelayResult<HelixUser> {
        let mut url = self.endpoint("users")?;
        url.query_pairs_mut().append_pair("login", login);

        let envelope: DataEnvelope<HelixUser> = self.send(self.http.get(url)).await?;
        envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::UserNotFound(login.to_string()))
    }

    /// `GET /eventsub/subscriptions`, following the pagination cursor until
    /// every page has been read.
    ///
    /// # Errors
    ///
    /// Returns any transport or API error from any page.
    pub async fn list_subscriptions(&self) -> RelayResult<Vec<EventSubSubscription>> {
        let mut subscriptions = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut url = self.endpoint("eventsub/subscriptions")?;
            if let Some(after) = cursor.as_deref() {
                url.query_pairs_mut().append_pair("after", after);
            }

            let page: DataEnvelope<EventSubSubscription> = self.send(self.http.get(url)).await?;
            subscriptions.extend(page.data);

            cursor = page
                .pagination
                .and_then(|p| p.cursor)
                .filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        tracing::debug!(count = subscriptions.len(), "listed eventsub subscriptions");
        Ok(subscriptions)
    }

    /// `POST /eventsub/subscriptions`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::EmptyResponse`] if the API accepts the request
    /// without returning the created subscription, or any transport / API
    /// error (409 when an identical subscription already exists).
    pub async fn create_subscription(
        &self,
        body: &CreateSubscriptionRequest<'_>,
    ) -> RelayResult<EventSubSubscription> {
        let url = self.endpoint("eventsub/subscriptions")?;
        let envelope: DataEnvelope<EventSubSubscription> =
            self.send(self.http.post(url).json(body)).await?;
        envelope
            .data
            .into_iter()
            .next()
            .ok_or(RelayError::EmptyResponse("POST /eventsub/subscriptions"))
    }

    /// Checks the access token against the OAuth validation endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Api`] with status 401 for an invalid or
    /// expired token, or any transport error.
    pub async fn validate_token(&self) -> RelayResult<TokenValidation> {
        let request = self
            .http
            .get(&self.validate_url)
            .bearer_auth(&self.access_token);
        Self::decode(request.send().await?).await
    }

    fn endpoint(&self, path: &str) -> RelayResult<Url> {
        Url::parse(&format!("{}/{path}", self.base_url)).map_err(|e| RelayError::InvalidConfig {
            key: "HELIX_BASE_URL",
            message: e.to_string(),
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> RelayResult<T> {
        let response = request
            .header("Client-Id", &self.client_id)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> RelayResult<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RelayError::Api { status, message });
        }
        Ok(response.json::<T>().await?)
    }
}

impl fmt::Debug for HelixClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelixClient")
            .field("base_url", &self.base_url)
            .field("validate_url", &self.validate_url)
            .field("client_id", &self.client_id)
            .field("access_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}
