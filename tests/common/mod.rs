#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{OriginalUri, Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use cirquetask_client::config::ClientConfig;
use cirquetask_client::navigation::{Route, Router as AppRouter};
use cirquetask_client::notice::NoticeBoard;
use cirquetask_client::realtime::frame::{parse_frames, Frame};
use cirquetask_client::realtime::WebSocketConnector;
use cirquetask_client::storage::{DurableStorage, MemoryStorage};
use cirquetask_client::{CirqueClient, ClientParts};

pub const PASSWORD: &str = "correct-horse";
pub const USER_ID: i64 = 11;

type Shared = Arc<Mutex<BackendState>>;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

struct Connection {
    outbound: mpsc::UnboundedSender<String>,
    /// subscription id → destination
    subscriptions: HashMap<String, String>,
}

#[derive(Default)]
pub struct BackendState {
    pub requests: Vec<Recorded>,
    pub board: Value,
    pub fail_moves: bool,
    /// Every STOMP command received, with its destination or id
    pub frames: Vec<String>,
    /// (destination, body) of every SEND
    pub sent: Vec<(String, String)>,
    pub connects: usize,
    connections: HashMap<usize, Connection>,
    next_connection: usize,
    next_message: u64,
}

/// In-process CirqueTask backend: REST under `/api` and a STOMP broker at `/ws`
pub struct MockBackend {
    pub api_url: String,
    pub ws_url: String,
    state: Shared,
    task: JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl MockBackend {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock backend")?;

        let state: Shared = Arc::new(Mutex::new(BackendState {
            board: sample_board(),
            ..Default::default()
        }));

        let api = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/refresh", post(refresh))
            .route("/auth/forgot-password", post(accepted))
            .route("/users/me", put(update_me))
            .route("/projects", get(list_projects).post(create_project))
            .route("/projects/:id", get(get_project))
            .route("/projects/:id/members", post(add_member))
            .route("/projects/:id/tasks", get(list_tasks))
            .route("/boards/:id", get(get_board))
            .route("/boards/:id/columns", post(add_column))
            .route("/tasks/:id/move", patch(move_task))
            .route("/notifications", get(list_notifications))
            .route("/notifications/unread-count", get(unread_count))
            .route("/notifications/read-all", patch(accepted))
            .route("/notifications/:id/read", patch(accepted))
            .route("/billing/plan", get(plan))
            .route("/attachments/:id/download", get(download))
            .layer(middleware::from_fn_with_state(state.clone(), record));

        let app = Router::new()
            .nest("/api", api)
            .route("/ws", get(ws_upgrade))
            .with_state(state.clone());

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            api_url: format!("http://127.0.0.1:{}/api", port),
            ws_url: format!("ws://127.0.0.1:{}/ws", port),
            state,
            task,
        })
    }

    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::for_endpoints(&self.api_url, &self.ws_url);
        config.realtime.reconnect_delay_ms = 50;
        config.realtime.heartbeat_incoming_ms = 0;
        config.realtime.heartbeat_outgoing_ms = 0;
        config.ui.language = "tr".to_string();
        config
    }

    /// Fresh client with empty memory storage
    pub fn client(&self) -> Result<TestClient> {
        self.client_with_storage(Arc::new(MemoryStorage::new()))
    }

    pub fn client_with_storage(&self, storage: Arc<MemoryStorage>) -> Result<TestClient> {
        let router = Arc::new(AppRouter::new(Route::Login));
        let notices = Arc::new(NoticeBoard::new());
        let client = CirqueClient::with_parts(
            self.config(),
            ClientParts {
                storage: storage.clone() as Arc<dyn DurableStorage>,
                navigator: router.clone(),
                notifier: notices.clone(),
                connector: Arc::new(WebSocketConnector),
            },
        )?;
        Ok(TestClient {
            client,
            router,
            notices,
            storage,
        })
    }

    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        lock(&self.state)
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    /// Destinations with a live subscription, sorted
    pub fn subscriptions(&self) -> Vec<String> {
        let state = self.state();
        let mut destinations: Vec<String> = state
            .connections
            .values()
            .flat_map(|c| c.subscriptions.values().cloned())
            .collect();
        destinations.sort();
        destinations
    }

    /// Deliver a MESSAGE to every subscriber of `destination`
    pub fn publish(&self, destination: &str, body: Value) -> usize {
        let mut state = self.state();
        state.next_message += 1;
        let message_id = state.next_message;

        let mut delivered = 0;
        for connection in state.connections.values() {
            for (id, dest) in &connection.subscriptions {
                if dest == destination {
                    let frame = Frame::new("MESSAGE")
                        .header("subscription", id.as_str())
                        .header("destination", destination)
                        .header("message-id", message_id.to_string())
                        .header("content-type", "application/json")
                        .body(body.to_string());
                    if connection.outbound.send(frame.encode()).is_ok() {
                        delivered += 1;
                    }
                }
            }
        }
        delivered
    }

    /// Close every socket from the server side
    pub fn drop_connections(&self) {
        self.state().connections.clear();
    }

    /// Poll until `check` holds
    pub async fn eventually(&self, what: &str, check: impl Fn(&BackendState) -> bool) -> Result<()> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if check(&self.state()) {
                return Ok(());
            }
            if Instant::now() > deadline {
                anyhow::bail!("timed out waiting for {}", what);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

pub struct TestClient {
    pub client: CirqueClient,
    pub router: Arc<AppRouter>,
    pub notices: Arc<NoticeBoard>,
    pub storage: Arc<MemoryStorage>,
}

impl TestClient {
    pub async fn sign_in(&self) -> Result<()> {
        let request = cirquetask_client::models::AuthRequest {
            email: "ada@example.com".to_string(),
            password: PASSWORD.to_string(),
        };
        self.client.auth().login(&request).await?.into_result()?;
        Ok(())
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

pub fn sample_user() -> Value {
    json!({
        "id": USER_ID,
        "email": "ada@example.com",
        "firstName": "Ada",
        "lastName": "Turing",
        "isActive": true
    })
}

pub fn sample_board() -> Value {
    json!({
        "id": 7,
        "name": "Sprint 1",
        "projectId": 1,
        "isDefault": true,
        "columns": [
            { "id": 1, "name": "To Do", "position": 0, "tasks": [
                { "id": 10, "title": "Write docs", "taskKey": "CT-10", "columnId": 1, "position": 0 },
                { "id": 11, "title": "Fix login", "taskKey": "CT-11", "columnId": 1, "position": 1 }
            ]},
            { "id": 2, "name": "Done", "position": 1, "wipLimit": 3, "tasks": [] }
        ]
    })
}

fn ok(data: Value) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": data, "timestamp": "2026-10-16T09:30:00" })),
    )
        .into_response()
}

fn failure(status: StatusCode, message: Option<&str>, data: Value) -> Response {
    let mut body = json!({ "success": false, "data": data });
    if let Some(message) = message {
        body["message"] = json!(message);
    }
    (status, Json(body)).into_response()
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, 1 << 20).await.unwrap_or_default();
    let json_body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    // Nested routers see the path with the /api prefix stripped
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| parts.uri.clone());

    lock(&state).requests.push(Recorded {
        method: parts.method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: json_body,
    });

    next.run(Request::from_parts(parts, axum::body::Body::from(bytes))).await
}

fn auth_payload(access: &str, refresh: &str) -> Value {
    json!({
        "accessToken": access,
        "refreshToken": refresh,
        "tokenType": "Bearer",
        "expiresIn": 86400000,
        "user": sample_user()
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if email == "invalid@example.com" {
        return failure(
            StatusCode::BAD_REQUEST,
            Some("Validation failed"),
            json!({ "email": "must be a well-formed email address", "captcha": "ignored" }),
        );
    }
    if password != PASSWORD {
        return failure(StatusCode::UNAUTHORIZED, Some("Invalid email or password"), Value::Null);
    }
    ok(auth_payload("access-1", "refresh-1"))
}

async fn refresh(Json(body): Json<Value>) -> Response {
    if body["refreshToken"] == "refresh-1" {
        ok(auth_payload("access-2", "refresh-2"))
    } else {
        failure(StatusCode::UNAUTHORIZED, Some("Invalid refresh token"), Value::Null)
    }
}

async fn accepted() -> Response {
    ok(Value::Null)
}

async fn update_me(Json(body): Json<Value>) -> Response {
    let mut user = sample_user();
    if let (Some(target), Some(update)) = (user.as_object_mut(), body.as_object()) {
        for (key, value) in update {
            target.insert(key.clone(), value.clone());
        }
    }
    ok(user)
}

fn project(id: i64) -> Value {
    json!({ "id": id, "name": format!("Project {}", id), "prefix": "CT", "memberCount": 2 })
}

async fn list_projects() -> Response {
    ok(json!([project(1), project(2)]))
}

async fn create_project() -> Response {
    failure(
        StatusCode::PAYMENT_REQUIRED,
        Some("Free plan allows 3 projects"),
        Value::Null,
    )
}

async fn get_project(Path(id): Path<i64>) -> Response {
    match id {
        403 => failure(StatusCode::FORBIDDEN, Some("Not a project member"), Value::Null),
        404 => StatusCode::NOT_FOUND.into_response(),
        429 => failure(StatusCode::TOO_MANY_REQUESTS, Some("   "), Value::Null),
        500 => failure(StatusCode::INTERNAL_SERVER_ERROR, None, Value::Null),
        _ => ok(project(id)),
    }
}

async fn add_member(Path(_id): Path<i64>, Json(body): Json<Value>) -> Response {
    ok(json!({
        "id": 90,
        "userId": body["userId"],
        "firstName": "Grace",
        "lastName": "Hopper",
        "email": "grace@example.com",
        "role": body["role"]
    }))
}

async fn list_tasks(Path(_id): Path<i64>, Query(_query): Query<HashMap<String, String>>) -> Response {
    ok(json!([{ "id": 10, "title": "Write docs", "status": "IN_PROGRESS", "priority": "HIGH" }]))
}

async fn get_board(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let board = lock(&state).board.clone();
    if board["id"] == id {
        ok(board)
    } else {
        failure(StatusCode::NOT_FOUND, Some("Board not found"), Value::Null)
    }
}

async fn add_column(State(state): State<Shared>, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    let mut state = lock(&state);
    if state.board["id"] != id {
        return failure(StatusCode::NOT_FOUND, Some("Board not found"), Value::Null);
    }
    let column = json!({ "id": 42, "name": body["name"], "position": 2, "tasks": [] });
    if let Some(columns) = state.board["columns"].as_array_mut() {
        columns.push(column);
    }
    ok(state.board.clone())
}

async fn move_task(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    if lock(&state).fail_moves {
        return failure(StatusCode::CONFLICT, Some("Column is over its WIP limit"), Value::Null);
    }
    ok(json!({ "id": id, "title": "moved" }))
}

async fn list_notifications() -> Response {
    ok(json!([{
        "id": 5,
        "title": "Assigned",
        "message": "You were assigned CT-11",
        "type": "TASK_ASSIGNED",
        "isRead": false,
        "taskId": 11
    }]))
}

async fn unread_count() -> Response {
    ok(json!({ "count": 4 }))
}

async fn plan() -> Response {
    ok(json!({
        "plan": "FREE",
        "maxProjects": 3,
        "maxMembersPerProject": 5,
        "currentProjectCount": 3,
        "enabledFeatures": []
    }))
}

async fn download(Path(_id): Path<i64>) -> Response {
    (StatusCode::OK, vec![0u8, 159, 146, 150]).into_response()
}

async fn ws_upgrade(State(state): State<Shared>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| broker(socket, state))
}

/// Minimal STOMP 1.2 broker: one task per socket
async fn broker(mut socket: WebSocket, state: Shared) {
    let (outbound, mut rx) = mpsc::unbounded_channel::<String>();
    let key = {
        let mut s = lock(&state);
        let key = s.next_connection;
        s.next_connection += 1;
        s.connections.insert(
            key,
            Connection {
                outbound,
                subscriptions: HashMap::new(),
            },
        );
        key
    };

    loop {
        tokio::select! {
            pending = rx.recv() => match pending {
                Some(text) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                // Dropped by the test: hang up on the client
                None => break,
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    let frames = parse_frames(&text).unwrap_or_default();
                    let mut leaving = false;
                    for frame in frames {
                        if let Some(reply) = handle_frame(&state, key, &frame) {
                            if socket.send(Message::Text(reply)).await.is_err() {
                                leaving = true;
                            }
                        }
                        leaving |= frame.command == "DISCONNECT";
                    }
                    if leaving {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    lock(&state).connections.remove(&key);
    let _ = socket.close().await;
}

fn handle_frame(state: &Shared, key: usize, frame: &Frame) -> Option<String> {
    let mut s = lock(state);
    match frame.command.as_str() {
        "CONNECT" | "STOMP" => {
            s.connects += 1;
            s.frames.push(frame.command.clone());
            Some(
                Frame::new("CONNECTED")
                    .header("version", "1.2")
                    .header("heart-beat", "0,0")
                    .encode(),
            )
        }
        "SUBSCRIBE" => {
            let id = frame.get("id").unwrap_or_default().to_string();
            let destination = frame.get("destination").unwrap_or_default().to_string();
            s.frames.push(format!("SUBSCRIBE {}", destination));
            if let Some(connection) = s.connections.get_mut(&key) {
                connection.subscriptions.insert(id, destination);
            }
            None
        }
        "UNSUBSCRIBE" => {
            let id = frame.get("id").unwrap_or_default().to_string();
            let destination = s
                .connections
                .get_mut(&key)
                .and_then(|c| c.subscriptions.remove(&id))
                .unwrap_or_default();
            s.frames.push(format!("UNSUBSCRIBE {}", destination));
            None
        }
        "SEND" => {
            let destination = frame.get("destination").unwrap_or_default().to_string();
            s.frames.push(format!("SEND {}", destination));
            s.sent.push((destination, frame.body.clone()));
            None
        }
        other => {
            s.frames.push(other.to_string());
            None
        }
    }
}
