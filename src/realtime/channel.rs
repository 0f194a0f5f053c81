use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, timeout, Instant, Interval, MissedTickBehavior};

use crate::config::RealtimeConfig;
use crate::error::ClientError;
use crate::resources::UnreadCounter;
use crate::session::SessionStore;

use super::event::BoardEvent;
use super::frame::{negotiate_heartbeat, parse_frames, Frame, HEARTBEAT};
use super::state::ConnectionState;
use super::transport::{Connector, FrameSink, FrameStream};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub fn board_topic(board_id: i64) -> String {
    format!("/topic/board/{}", board_id)
}

pub fn notification_topic(user_id: i64) -> String {
    format!("/topic/notifications/{}", user_id)
}

pub fn board_destination(board_id: i64, action: &str) -> String {
    format!("/app/board/{}/{}", board_id, action)
}

enum Command {
    Subscribe(i64),
    Unsubscribe(i64),
    Publish { destination: String, body: String },
    ActiveBoards(oneshot::Sender<Vec<i64>>),
    Shutdown(oneshot::Sender<()>),
}

struct DriverHandle {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

/// The single realtime connection of a session.
///
/// A background driver task owns the socket and the board subscription map;
/// this handle only sends it commands. Board events fan out on a broadcast
/// channel, connection state on a watch channel.
pub struct RealtimeChannel {
    config: RealtimeConfig,
    host: String,
    connector: Arc<dyn Connector>,
    session: Arc<SessionStore>,
    unread: UnreadCounter,
    state: Arc<watch::Sender<ConnectionState>>,
    events: broadcast::Sender<BoardEvent>,
    driver: Mutex<Option<DriverHandle>>,
}

impl RealtimeChannel {
    pub fn new(
        config: RealtimeConfig,
        connector: Arc<dyn Connector>,
        session: Arc<SessionStore>,
        unread: UnreadCounter,
    ) -> Result<Self, ClientError> {
        let url = url::Url::parse(&config.ws_url)?;
        let host = url.host_str().unwrap_or("localhost").to_string();
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (events, _) = broadcast::channel(config.event_buffer.max(1));

        Ok(Self {
            config,
            host,
            connector,
            session,
            unread,
            state: Arc::new(state),
            events,
            driver: Mutex::new(None),
        })
    }

    /// Start the connection with auto-reconnect. No-op while a connection is active.
    /// Must be called from within a Tokio runtime.
    pub fn connect(&self) {
        let mut driver = self.driver.lock().unwrap_or_else(PoisonError::into_inner);
        if driver.as_ref().is_some_and(|d| !d.task.is_finished()) {
            return;
        }

        let (commands, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(
            Driver {
                url: self.config.ws_url.clone(),
                host: self.host.clone(),
                heartbeat: (self.config.heartbeat_outgoing_ms, self.config.heartbeat_incoming_ms),
                reconnect_delay: self.config.reconnect_delay(),
                connector: self.connector.clone(),
                session: self.session.clone(),
                unread: self.unread.clone(),
                state: self.state.clone(),
                events: self.events.clone(),
                boards: HashMap::new(),
                routes: HashMap::new(),
                next_sub: 0,
            }
            .run(rx),
        );

        *driver = Some(DriverHandle { commands, task });
    }

    /// Unsubscribe every board, close the connection and stop reconnecting.
    /// Safe to call when never connected.
    pub async fn disconnect(&self) {
        let handle = self
            .driver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            let (ack, done) = oneshot::channel();
            if handle.commands.send(Command::Shutdown(ack)).is_ok()
                && timeout(SHUTDOWN_TIMEOUT, done).await.is_err()
            {
                tracing::warn!("Realtime driver did not shut down in time");
            }
            handle.task.abort();
        }

        self.state.send_replace(ConnectionState::Disconnected);
    }

    /// Subscribe to a board topic. Ignored unless connected, and ignored for a
    /// board that already has a subscription.
    pub fn subscribe_to_board(&self, board_id: i64) {
        if !self.is_connected() {
            tracing::debug!("Not connected, skipping subscribe to board {}", board_id);
            return;
        }
        self.command(Command::Subscribe(board_id));
    }

    pub fn unsubscribe_from_board(&self, board_id: i64) {
        self.command(Command::Unsubscribe(board_id));
    }

    pub fn send_task_moved<P: Serialize + ?Sized>(&self, board_id: i64, payload: &P) {
        self.publish(board_destination(board_id, "task-moved"), payload);
    }

    pub fn send_task_created<P: Serialize + ?Sized>(&self, board_id: i64, payload: &P) {
        self.publish(board_destination(board_id, "task-created"), payload);
    }

    pub fn send_task_updated<P: Serialize + ?Sized>(&self, board_id: i64, payload: &P) {
        self.publish(board_destination(board_id, "task-updated"), payload);
    }

    pub fn send_task_deleted<P: Serialize + ?Sized>(&self, board_id: i64, payload: &P) {
        self.publish(board_destination(board_id, "task-deleted"), payload);
    }

    /// Fire-and-forget; silently dropped when not connected
    fn publish<P: Serialize + ?Sized>(&self, destination: String, payload: &P) {
        if !self.is_connected() {
            return;
        }
        match serde_json::to_string(payload) {
            Ok(body) => self.command(Command::Publish { destination, body }),
            Err(e) => tracing::warn!("Dropping unserializable payload for {}: {}", destination, e),
        }
    }

    fn command(&self, command: Command) {
        let driver = self.driver.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = driver.as_ref() {
            // A closed channel means the driver already stopped
            let _ = handle.commands.send(command);
        }
    }

    /// Board ids with a live or pending subscription
    pub async fn active_boards(&self) -> Vec<i64> {
        let (tx, rx) = oneshot::channel();
        self.command(Command::ActiveBoards(tx));
        rx.await.unwrap_or_default()
    }

    pub fn events(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Wait until the channel reports `Connected`
    pub async fn wait_connected(&self, within: Duration) -> Result<(), ClientError> {
        let mut rx = self.watch_state();
        timeout(within, rx.wait_for(|s| *s == ConnectionState::Connected))
            .await
            .map_err(|_| ClientError::realtime("timed out waiting for connection"))?
            .map_err(|_| ClientError::realtime("realtime channel dropped"))?;
        Ok(())
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        if let Some(handle) = self
            .driver
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.task.abort();
        }
    }
}

impl std::fmt::Debug for RealtimeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeChannel")
            .field("url", &self.config.ws_url)
            .field("state", &self.state())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Board(i64),
    Notifications,
}

enum Exit {
    Shutdown,
    Lost(ClientError),
}

struct Driver {
    url: String,
    host: String,
    heartbeat: (u64, u64),
    reconnect_delay: Duration,
    connector: Arc<dyn Connector>,
    session: Arc<SessionStore>,
    unread: UnreadCounter,
    state: Arc<watch::Sender<ConnectionState>>,
    events: broadcast::Sender<BoardEvent>,
    /// board id → subscription id on the current connection (empty while disconnected)
    boards: HashMap<i64, String>,
    /// subscription id → topic
    routes: HashMap<String, Topic>,
    next_sub: u64,
}

impl Driver {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            self.state.send_replace(ConnectionState::Connecting);

            match self.connection(&mut commands).await {
                Exit::Shutdown => break,
                Exit::Lost(e) => {
                    tracing::warn!("Realtime connection lost: {}", e);
                    self.routes.clear();
                    for sub in self.boards.values_mut() {
                        sub.clear();
                    }
                    self.state.send_replace(ConnectionState::Disconnected);
                }
            }

            if !self.wait_reconnect(&mut commands).await {
                break;
            }
        }

        self.state.send_replace(ConnectionState::Disconnected);
        tracing::debug!("Realtime driver stopped");
    }

    /// Sleep out the reconnect delay while still answering commands.
    /// Returns false when asked to shut down.
    async fn wait_reconnect(&mut self, commands: &mut mpsc::UnboundedReceiver<Command>) -> bool {
        let delay = sleep(self.reconnect_delay);
        tokio::pin!(delay);

        loop {
            tokio::select! {
                _ = &mut delay => return true,
                command = commands.recv() => match command {
                    None => return false,
                    Some(Command::Shutdown(ack)) => {
                        self.boards.clear();
                        let _ = ack.send(());
                        return false;
                    }
                    Some(Command::Unsubscribe(board_id)) => {
                        self.boards.remove(&board_id);
                    }
                    Some(Command::ActiveBoards(reply)) => {
                        let _ = reply.send(self.active_boards());
                    }
                    Some(Command::Subscribe(board_id)) => {
                        tracing::debug!("Ignoring subscribe to board {} while disconnected", board_id);
                    }
                    Some(Command::Publish { destination, .. }) => {
                        tracing::debug!("Dropping publish to {} while disconnected", destination);
                    }
                },
            }
        }
    }

    async fn connection(&mut self, commands: &mut mpsc::UnboundedReceiver<Command>) -> Exit {
        let (mut sink, mut stream) = match self.connector.connect(&self.url).await {
            Ok(pair) => pair,
            Err(e) => return Exit::Lost(e),
        };

        let connected = match self.handshake(&mut sink, &mut stream).await {
            Ok(frame) => frame,
            Err(e) => return Exit::Lost(e),
        };

        let (send_every, expect_every) = negotiate_heartbeat(self.heartbeat, connected.get("heart-beat"));
        let mut heartbeat = send_every.map(ticker);
        let mut liveness = expect_every.map(ticker);
        let mut last_inbound = Instant::now();

        self.state.send_replace(ConnectionState::Connected);
        tracing::info!("Realtime connected to {}", self.url);

        if let Err(e) = self.restore_subscriptions(&mut sink).await {
            return Exit::Lost(e);
        }

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        self.close(&mut sink).await;
                        return Exit::Shutdown;
                    };
                    match self.handle_command(command, &mut sink).await {
                        Ok(true) => {}
                        Ok(false) => return Exit::Shutdown,
                        Err(e) => return Exit::Lost(e),
                    }
                }
                message = stream.next() => match message {
                    Some(Ok(text)) => {
                        last_inbound = Instant::now();
                        if let Err(e) = self.handle_text(&text) {
                            return Exit::Lost(e);
                        }
                    }
                    Some(Err(e)) => return Exit::Lost(e),
                    None => return Exit::Lost(ClientError::realtime("connection closed by server")),
                },
                _ = tick(&mut heartbeat) => {
                    if let Err(e) = sink.send(HEARTBEAT.to_string()).await {
                        return Exit::Lost(e);
                    }
                }
                _ = tick(&mut liveness) => {
                    if let Some(expect) = expect_every {
                        if last_inbound.elapsed() > expect * 2 {
                            return Exit::Lost(ClientError::realtime("heartbeat timeout"));
                        }
                    }
                }
            }
        }
    }

    async fn handshake(&self, sink: &mut FrameSink, stream: &mut FrameStream) -> Result<Frame, ClientError> {
        sink.send(Frame::connect(&self.host, self.heartbeat).encode()).await?;

        timeout(CONNECT_TIMEOUT, await_connected(stream))
            .await
            .map_err(|_| ClientError::realtime("timed out waiting for CONNECTED"))?
    }

    /// Personal notifications first, then every board retained from earlier connections
    async fn restore_subscriptions(&mut self, sink: &mut FrameSink) -> Result<(), ClientError> {
        if let Some(user) = self.session.current_user() {
            let id = self.next_subscription_id();
            sink.send(Frame::subscribe(&id, &notification_topic(user.id)).encode()).await?;
            self.routes.insert(id, Topic::Notifications);
        }

        let mut retained: Vec<i64> = self.boards.keys().copied().collect();
        retained.sort_unstable();
        for board_id in retained {
            self.subscribe_board(board_id, sink).await?;
        }
        Ok(())
    }

    /// Returns Ok(false) once shut down
    async fn handle_command(&mut self, command: Command, sink: &mut FrameSink) -> Result<bool, ClientError> {
        match command {
            Command::Subscribe(board_id) => {
                if self.boards.contains_key(&board_id) {
                    tracing::debug!("Board {} already subscribed", board_id);
                } else {
                    self.subscribe_board(board_id, sink).await?;
                }
            }
            Command::Unsubscribe(board_id) => {
                if let Some(id) = self.boards.remove(&board_id) {
                    self.routes.remove(&id);
                    sink.send(Frame::unsubscribe(&id).encode()).await?;
                    tracing::debug!("Unsubscribed from board {}", board_id);
                }
            }
            Command::Publish { destination, body } => {
                sink.send(Frame::send(&destination, body).encode()).await?;
            }
            Command::ActiveBoards(reply) => {
                let _ = reply.send(self.active_boards());
            }
            Command::Shutdown(ack) => {
                self.close(sink).await;
                let _ = ack.send(());
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn subscribe_board(&mut self, board_id: i64, sink: &mut FrameSink) -> Result<(), ClientError> {
        let id = self.next_subscription_id();
        sink.send(Frame::subscribe(&id, &board_topic(board_id)).encode()).await?;
        self.routes.insert(id.clone(), Topic::Board(board_id));
        self.boards.insert(board_id, id);
        tracing::debug!("Subscribed to board {}", board_id);
        Ok(())
    }

    /// Best-effort goodbye; errors are irrelevant once we are leaving
    async fn close(&mut self, sink: &mut FrameSink) {
        for id in self.boards.values().filter(|id| !id.is_empty()) {
            let _ = sink.send(Frame::unsubscribe(id).encode()).await;
        }
        self.boards.clear();
        self.routes.clear();
        let _ = sink.send(Frame::disconnect().encode()).await;
        let _ = sink.close().await;
        tracing::info!("Realtime disconnected");
    }

    fn handle_text(&mut self, text: &str) -> Result<(), ClientError> {
        let frames = match parse_frames(text) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!("Discarding unparseable message: {}", e);
                return Ok(());
            }
        };

        for frame in frames {
            match frame.command.as_str() {
                "MESSAGE" => self.route_message(&frame),
                "ERROR" => {
                    return Err(ClientError::realtime(format!(
                        "broker error: {}",
                        frame.get("message").unwrap_or(&frame.body)
                    )))
                }
                "RECEIPT" => {}
                other => tracing::debug!("Ignoring {} frame", other),
            }
        }
        Ok(())
    }

    fn route_message(&self, frame: &Frame) {
        let topic = frame
            .get("subscription")
            .and_then(|id| self.routes.get(id))
            .copied();

        match topic {
            Some(Topic::Board(board_id)) => match serde_json::from_str::<BoardEvent>(&frame.body) {
                Ok(mut event) => {
                    event.board_id = board_id;
                    // No receivers is fine; events are not buffered for late subscribers
                    let _ = self.events.send(event);
                }
                Err(e) => tracing::warn!("Bad board event on board {}: {}", board_id, e),
            },
            Some(Topic::Notifications) => self.unread.increment(),
            None => tracing::debug!("Message for unknown subscription {:?}", frame.get("subscription")),
        }
    }

    fn next_subscription_id(&mut self) -> String {
        let id = format!("sub-{}", self.next_sub);
        self.next_sub += 1;
        id
    }

    fn active_boards(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.boards.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

async fn await_connected(stream: &mut FrameStream) -> Result<Frame, ClientError> {
    while let Some(text) = stream.next().await {
        for frame in parse_frames(&text?)? {
            match frame.command.as_str() {
                "CONNECTED" => return Ok(frame),
                "ERROR" => {
                    return Err(ClientError::realtime(format!(
                        "broker refused connection: {}",
                        frame.get("message").unwrap_or(&frame.body)
                    )))
                }
                other => tracing::debug!("Ignoring {} before CONNECTED", other),
            }
        }
    }
    Err(ClientError::realtime("connection closed during handshake"))
}

fn ticker(period: Duration) -> Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Tick an optional interval; a disabled one never fires
async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::event::BoardEventType;
    use crate::testing::{fast_realtime_config, memory_session, next_connection, sample_user, BrokerSide, MemoryConnector};
    use serde_json::json;

    async fn connected() -> (RealtimeChannel, BrokerSide, mpsc::UnboundedReceiver<BrokerSide>, UnreadCounter) {
        let (connector, mut connections) = MemoryConnector::new();
        let (session, _) = memory_session(true);
        let unread = UnreadCounter::new();
        let channel = RealtimeChannel::new(fast_realtime_config(), Arc::new(connector), session, unread.clone()).unwrap();

        channel.connect();
        let mut broker = next_connection(&mut connections).await;
        let connect = broker.accept().await;
        assert_eq!(connect.get("accept-version"), Some("1.2"));
        assert_eq!(connect.get("host"), Some("broker.test"));

        channel.wait_connected(Duration::from_secs(2)).await.unwrap();

        let notifications = broker.next_frame().await;
        assert_eq!(notifications.command, "SUBSCRIBE");
        assert_eq!(
            notifications.get("destination"),
            Some(notification_topic(sample_user().id).as_str())
        );

        (channel, broker, connections, unread)
    }

    #[tokio::test]
    async fn test_double_subscribe_sends_one_subscription() {
        let (channel, mut broker, _connections, _) = connected().await;

        channel.subscribe_to_board(7);
        channel.subscribe_to_board(7);

        let frame = broker.next_frame().await;
        assert_eq!(frame.command, "SUBSCRIBE");
        assert_eq!(frame.get("destination"), Some("/topic/board/7"));
        broker.expect_silence().await;
        assert_eq!(channel.active_boards().await, vec![7]);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_board_is_noop() {
        let (channel, mut broker, _connections, _) = connected().await;

        channel.unsubscribe_from_board(99);
        broker.expect_silence().await;
        assert!(channel.active_boards().await.is_empty());
        assert!(channel.is_connected());
    }

    #[tokio::test]
    async fn test_board_message_emits_one_event() {
        let (channel, mut broker, _connections, _) = connected().await;
        let mut events = channel.events();

        channel.subscribe_to_board(7);
        let sub = broker.next_frame().await;
        let sub_id = sub.get("id").unwrap().to_string();

        broker.message(
            &sub_id,
            "/topic/board/7",
            &json!({ "type": "TASK_MOVED", "data": { "taskId": 5, "columnId": 2, "position": 0 } }).to_string(),
        );

        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.kind, BoardEventType::TaskMoved);
        assert_eq!(event.board_id, 7);
        assert_eq!(event.task_id(), Some(5));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_notification_message_bumps_unread() {
        let (channel, broker, _connections, unread) = connected().await;
        let mut badge = unread.subscribe();

        // The notification subscription is always the first one
        broker.message("sub-0", &notification_topic(sample_user().id), r#"{"title":"x"}"#);

        tokio::time::timeout(Duration::from_secs(2), badge.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unread.get(), 1);
        drop(channel);
    }

    #[tokio::test]
    async fn test_publish_only_when_connected() {
        let (connector, _connections) = MemoryConnector::new();
        let (session, _) = memory_session(true);
        let idle = RealtimeChannel::new(fast_realtime_config(), Arc::new(connector), session, UnreadCounter::new()).unwrap();
        idle.send_task_moved(7, &json!({ "taskId": 1 }));
        idle.subscribe_to_board(7);
        assert!(idle.active_boards().await.is_empty());

        let (channel, mut broker, _connections, _) = connected().await;
        channel.send_task_created(7, &json!({ "id": 3 }));

        let frame = broker.next_frame().await;
        assert_eq!(frame.command, "SEND");
        assert_eq!(frame.get("destination"), Some("/app/board/7/task-created"));
        assert_eq!(frame.get("content-type"), Some("application/json"));
        assert_eq!(frame.body, r#"{"id":3}"#);
    }

    #[tokio::test]
    async fn test_reconnect_restores_board_subscriptions() {
        let (channel, mut broker, mut connections, _) = connected().await;
        channel.subscribe_to_board(7);
        broker.next_frame().await;

        let mut state = channel.watch_state();
        drop(broker);
        state
            .wait_for(|s| *s != ConnectionState::Connected)
            .await
            .unwrap();

        let mut broker = next_connection(&mut connections).await;
        broker.accept().await;
        channel.wait_connected(Duration::from_secs(2)).await.unwrap();

        let notifications = broker.next_frame().await;
        assert_eq!(notifications.get("destination"), Some("/topic/notifications/11"));
        let board = broker.next_frame().await;
        assert_eq!(board.get("destination"), Some("/topic/board/7"));
        assert_eq!(channel.active_boards().await, vec![7]);
    }

    #[tokio::test]
    async fn test_disconnect_releases_subscriptions() {
        let (channel, mut broker, _connections, _) = connected().await;
        channel.subscribe_to_board(7);
        let sub = broker.next_frame().await;

        channel.disconnect().await;

        let unsubscribe = broker.next_frame().await;
        assert_eq!(unsubscribe.command, "UNSUBSCRIBE");
        assert_eq!(unsubscribe.get("id"), sub.get("id"));
        assert_eq!(broker.next_frame().await.command, "DISCONNECT");
        assert_eq!(channel.state(), ConnectionState::Disconnected);
        assert!(channel.active_boards().await.is_empty());

        // Second call and never-connected channels are fine
        channel.disconnect().await;
    }

    #[tokio::test]
    async fn test_connect_is_idempotent_while_active() {
        let (channel, _broker, mut connections, _) = connected().await;
        channel.connect();
        channel.connect();

        let extra = tokio::time::timeout(Duration::from_millis(100), connections.recv()).await;
        assert!(extra.is_err());
    }
}
