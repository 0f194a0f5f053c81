// Test utilities: fixtures and an in-memory realtime transport

use async_trait::async_trait;
use futures::channel::mpsc as fmpsc;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::RealtimeConfig;
use crate::error::ClientError;
use crate::models::{AuthResponse, User};
use crate::navigation::{Route, Router};
use crate::realtime::frame::{parse_frames, Frame};
use crate::realtime::transport::{Connector, FrameSink, FrameStream};
use crate::session::SessionStore;
use crate::storage::MemoryStorage;

pub fn sample_user() -> User {
    User {
        id: 11,
        email: "ada@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Turing".to_string(),
        avatar_url: None,
        bio: None,
        is_active: true,
        last_login_at: None,
        created_at: None,
    }
}

pub fn auth_response(access: &str, refresh: &str) -> AuthResponse {
    AuthResponse {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 86_400_000,
        user: sample_user(),
    }
}

/// Session backed by memory storage, optionally already signed in
pub fn memory_session(signed_in: bool) -> (Arc<SessionStore>, Arc<Router>) {
    let router = Arc::new(Router::new(Route::Dashboard));
    let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new()), router.clone()));
    if signed_in {
        session
            .store_auth(&auth_response("a1", "r1"))
            .expect("memory storage never fails");
    }
    (session, router)
}

pub fn fast_realtime_config() -> RealtimeConfig {
    RealtimeConfig {
        ws_url: "ws://broker.test/ws".to_string(),
        reconnect_delay_ms: 20,
        heartbeat_incoming_ms: 0,
        heartbeat_outgoing_ms: 0,
        event_buffer: 16,
    }
}

/// Broker end of one in-memory connection
pub struct BrokerSide {
    from_client: fmpsc::UnboundedReceiver<String>,
    to_client: fmpsc::UnboundedSender<String>,
}

impl BrokerSide {
    /// Next non-heartbeat frame the client sent
    pub async fn next_frame(&mut self) -> Frame {
        loop {
            let text = tokio::time::timeout(Duration::from_secs(2), self.from_client.next())
                .await
                .expect("timed out waiting for a client frame")
                .expect("client hung up");
            let mut frames = parse_frames(&text).expect("client sent a bad frame");
            if !frames.is_empty() {
                return frames.remove(0);
            }
        }
    }

    /// Assert nothing but heartbeats arrives for a short while
    pub async fn expect_silence(&mut self) {
        let quiet = tokio::time::timeout(Duration::from_millis(100), async {
            loop {
                match self.from_client.next().await {
                    Some(text) if parse_frames(&text).map(|f| f.is_empty()).unwrap_or(false) => continue,
                    other => return other,
                }
            }
        })
        .await;
        if let Ok(Some(text)) = quiet {
            panic!("unexpected client frame: {:?}", text);
        }
    }

    /// Read CONNECT and answer CONNECTED with heartbeats disabled
    pub async fn accept(&mut self) -> Frame {
        let connect = self.next_frame().await;
        assert_eq!(connect.command, "CONNECT");
        self.push(
            Frame::new("CONNECTED")
                .header("version", "1.2")
                .header("heart-beat", "0,0"),
        );
        connect
    }

    pub fn push(&self, frame: Frame) {
        self.push_raw(frame.encode());
    }

    pub fn push_raw(&self, text: String) {
        let _ = self.to_client.unbounded_send(text);
    }

    /// Deliver a MESSAGE on a subscription
    pub fn message(&self, subscription: &str, destination: &str, body: &str) {
        self.push(
            Frame::new("MESSAGE")
                .header("subscription", subscription)
                .header("destination", destination)
                .header("message-id", "m-1")
                .body(body),
        );
    }
}

/// Connector whose connections are handed to the test as `BrokerSide`s
pub struct MemoryConnector {
    connections: mpsc::UnboundedSender<BrokerSide>,
}

impl MemoryConnector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BrokerSide>) {
        let (connections, rx) = mpsc::unbounded_channel();
        (Self { connections }, rx)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, _url: &str) -> Result<(FrameSink, FrameStream), ClientError> {
        let (client_tx, from_client) = fmpsc::unbounded::<String>();
        let (to_client, client_rx) = fmpsc::unbounded::<String>();

        self.connections
            .send(BrokerSide {
                from_client,
                to_client,
            })
            .map_err(|_| ClientError::realtime("test broker gone"))?;

        let sink = client_tx.sink_map_err(|e| ClientError::realtime(e.to_string()));
        let stream = client_rx.map(Ok);
        Ok((Box::pin(sink), Box::pin(stream)))
    }
}

pub async fn next_connection(rx: &mut mpsc::UnboundedReceiver<BrokerSide>) -> BrokerSide {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a connection")
        .expect("connector dropped")
}
