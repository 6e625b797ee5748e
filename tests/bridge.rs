//! End-to-end tests: a fake EventSub server over real WebSockets, a
//! wiremock Helix API, and real listener sockets against the relay router.
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use live_relay::api;
use live_relay::app_state::AppState;
use live_relay::config::RelayConfig;
use live_relay::dispatcher::Dispatcher;
use live_relay::error::RelayError;
use live_relay::eventsub::{EventSubClient, SessionEnd, SessionState};
use live_relay::helix::{HelixClient, SubscriptionManager};
use live_relay::relay::Relay;

const TIMEOUT: Duration = Duration::from_secs(5);

fn welcome(session_id: &str, keepalive: u64) -> Message {
    Message::text(
        serde_json::json!({
            "metadata": { "message_type": "session_welcome" },
            "payload": { "session": { "id": session_id, "status": "connected", "keepalive_timeout_seconds": keepalive } }
        })
        .to_string(),
    )
}

fn notification(name: &str) -> Message {
    Message::text(
        serde_json::json!({
            "metadata": { "message_type": "notification", "subscription_type": "stream.online" },
            "payload": {
                "subscription": { "id": "sub", "type": "stream.online" },
                "event": { "broadcaster_user_id": "1337", "broadcaster_user_login": "foo", "broadcaster_user_name": name }
            }
        })
        .to_string(),
    )
}

/// Accepts one connection per entry of `sessions`, sends its frames, then
/// either closes or (when `hold_open`) keeps the socket idle.
async fn fake_eventsub(sessions: Vec<Vec<Message>>, hold_open: bool) -> (String, JoinHandle<()>) {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind fake eventsub");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("fake eventsub addr");
    };
    let handle = tokio::spawn(async move {
        for frames in sessions {
            let Ok((tcp, _)) = listener.accept().await else {
                return;
            };
            let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await else {
                return;
            };
            for frame in frames {
                if ws.send(frame).await.is_err() {
                    return;
                }
            }
            if hold_open {
                tokio::time::sleep(Duration::from_secs(60)).await;
                return;
            }
            let _ = ws.close(None).await;
            while let Some(Ok(_)) = ws.next().await {}
        }
        // Keep the port bound so later reconnects wait instead of failing.
        tokio::time::sleep(Duration::from_secs(60)).await;
    });
    (format!("ws://{addr}"), handle)
}

async fn mock_helix(expected_creates: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/helix/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "id": "1337", "login": "foo", "display_name": "Foo" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/helix/eventsub/subscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/helix/eventsub/subscriptions"))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
            "data": [{ "id": "created", "type": "stream.online" }]
        })))
        .expect(expected_creates)
        .mount(&server)
        .await;
    server
}

fn config(helix: &MockServer, ws_url: &str, extra: &[(&str, &str)]) -> RelayConfig {
    let mut values: HashMap<String, String> = HashMap::from([
        ("TWITCH_CLIENT_ID".to_string(), "client-id".to_string()),
        ("BROADCASTER_USERNAME".to_string(), "foo".to_string()),
        ("TWITCH_OAUTH_TOKEN".to_string(), "token".to_string()),
        ("HELIX_BASE_URL".to_string(), format!("{}/helix", helix.uri())),
        ("EVENTSUB_WS_URL".to_string(), ws_url.to_string()),
    ]);
    for (k, v) in extra {
        values.insert((*k).to_string(), (*v).to_string());
    }
    let Ok(config) = RelayConfig::from_lookup(move |key| values.get(key).cloned()) else {
        panic!("config must load");
    };
    config
}

fn build_client(config: &RelayConfig, relay: &Relay) -> (EventSubClient, tokio::sync::watch::Receiver<SessionState>) {
    let Ok(helix) = HelixClient::new(config) else {
        panic!("helix client must build");
    };
    let subscriptions = SubscriptionManager::new(helix, config.broadcaster_login.clone());
    EventSubClient::new(config, Dispatcher::new(subscriptions, relay.clone()))
}

async fn created_session_ids(helix: &MockServer) -> Vec<String> {
    helix
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .filter_map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).ok())
        .filter_map(|body| body["transport"]["session_id"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn welcome_malformed_then_notification_reaches_listener() {
    let helix = mock_helix(1).await;
    let (ws_url, _server) = fake_eventsub(
        vec![vec![
            welcome("abc", 10),
            Message::text("this is not json".to_string()),
            notification("Foo"),
        ]],
        false,
    )
    .await;
    let relay = Relay::default();
    let (_id, mut listener) = relay.register().await;
    let (client, status) = build_client(&config(&helix, &ws_url, &[]), &relay);

    let Ok(end) = timeout(TIMEOUT, client.run_session()).await else {
        panic!("session did not finish");
    };

    assert!(matches!(end, SessionEnd::Closed));
    assert_eq!(listener.recv().await.as_deref(), Some("🔴 Foo est en live !"));
    assert!(listener.try_recv().is_err());
    assert_eq!(*status.borrow(), SessionState::Disconnected);
    assert_eq!(created_session_ids(&helix).await, ["abc"]);
}

#[tokio::test]
async fn every_reconnect_subscribes_the_new_session() {
    let helix = mock_helix(2).await;
    let (ws_url, _server) = fake_eventsub(
        vec![vec![welcome("first", 10)], vec![welcome("second", 10)]],
        false,
    )
    .await;
    let relay = Relay::default();
    let (client, _status) = build_client(
        &config(&helix, &ws_url, &[("RECONNECT_DELAY_SECS", "1")]),
        &relay,
    );

    let task = tokio::spawn(client.run());
    let waited = timeout(TIMEOUT, async {
        while created_session_ids(&helix).await.len() < 2 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    task.abort();

    assert!(waited.is_ok(), "second session was never subscribed");
    assert_eq!(created_session_ids(&helix).await, ["first", "second"]);
}

#[tokio::test]
async fn silent_session_trips_keepalive_watchdog() {
    let helix = mock_helix(1).await;
    let (ws_url, _server) = fake_eventsub(vec![vec![welcome("quiet", 1)]], true).await;
    let relay = Relay::default();
    let (client, status) = build_client(
        &config(&helix, &ws_url, &[("KEEPALIVE_GRACE_SECS", "0")]),
        &relay,
    );

    let Ok(end) = timeout(TIMEOUT, client.run_session()).await else {
        panic!("watchdog did not fire");
    };

    assert!(matches!(
        end,
        SessionEnd::Failed(RelayError::KeepaliveTimeout(1))
    ));
    assert_eq!(*status.borrow(), SessionState::Disconnected);
}

#[tokio::test]
async fn unreachable_endpoint_fails_without_panicking() {
    let helix = mock_helix(0).await;
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("addr");
    };
    drop(listener);
    let relay = Relay::default();
    let (client, _status) = build_client(&config(&helix, &format!("ws://{addr}"), &[]), &relay);

    let Ok(end) = timeout(TIMEOUT, client.run_session()).await else {
        panic!("connect did not fail");
    };
    let SessionEnd::Failed(err) = end else {
        panic!("expected connection failure");
    };
    assert!(err.is_retryable());
}

#[tokio::test]
async fn relay_endpoint_tracks_listeners_and_delivers_broadcasts() {
    let relay = Relay::default();
    let (_tx, session) = tokio::sync::watch::channel(SessionState::Disconnected);
    let app = api::build_router(AppState {
        relay: relay.clone(),
        session,
    });
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind relay");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("relay addr");
    };
    let _server = tokio::spawn(async move { axum::serve(listener, app).await });

    let Ok(Ok((mut ws, _))) =
        timeout(TIMEOUT, tokio_tungstenite::connect_async(format!("ws://{addr}/"))).await
    else {
        panic!("listener could not connect");
    };

    let registered = timeout(TIMEOUT, async {
        while relay.listener_count().await == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(registered.is_ok());

    assert!(ws.send(Message::text("hello from extension".to_string())).await.is_ok());
    assert_eq!(relay.broadcast("🔴 Foo est en live !").await, 1);

    let Ok(Some(Ok(Message::Text(text)))) = timeout(TIMEOUT, ws.next()).await else {
        panic!("listener did not receive broadcast");
    };
    assert_eq!(text.as_str(), "🔴 Foo est en live !");

    assert!(ws.close(None).await.is_ok());
    let removed = timeout(TIMEOUT, async {
        while relay.listener_count().await > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(removed.is_ok());
}
