//! live-relay entry point.
//!
//! Loads configuration, starts the EventSub client and serves the local
//! relay endpoint.

use tracing_subscriber::EnvFilter;

use live_relay::api;
use live_relay::app_state::AppState;
use live_relay::config::{LogFormat, RelayConfig};
use live_relay::dispatcher::Dispatcher;
use live_relay::eventsub::EventSubClient;
use live_relay::helix::{HelixClient, SubscriptionManager};
use live_relay::relay::Relay;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = RelayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(
        addr = %config.listen_addr,
        broadcaster = %config.broadcaster_login,
        "starting live-relay"
    );

    let helix = HelixClient::new(&config)?;
    match helix.validate_token().await {
        Ok(validation) => tracing::info!(
            login = validation.login.as_deref().unwrap_or("<app token>"),
            expires_in = validation.expires_in,
            "access token valid"
        ),
        Err(e) => tracing::warn!(error = %e, "access token validation failed"),
    }

    // Build components
    let relay = Relay::new(config.listener_queue_capacity);
    let subscriptions = SubscriptionManager::new(helix, config.broadcaster_login.clone());
    let dispatcher = Dispatcher::new(subscriptions, relay.clone());
    let (eventsub, session) = EventSubClient::new(&config, dispatcher);

    tokio::spawn(eventsub.run());

    // Start relay server
    let app = api::build_router(AppState { relay, session });
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "relay listening");

    axum::serve(listener, app).await?;

    Ok(())
}
