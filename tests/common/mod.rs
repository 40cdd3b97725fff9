//! Test utilities and common setup.
//!
//! The fake backend is a small axum app standing in for the room service.
//! It speaks the backend's raw (un-enveloped) protocol so the proxy's
//! normalization is exercised end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{any, get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use gtuverse::api::{self, AppState};
use gtuverse::client::ApiClient;
use gtuverse::config::ProxyConfig;

/// Address nothing listens on.
pub const UNREACHABLE_BACKEND: &str = "http://127.0.0.1:9";

#[derive(Clone)]
pub struct BackendState {
    rooms: Arc<Mutex<Vec<Value>>>,
    messages: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicUsize>,
    hits: Arc<AtomicUsize>,
}

impl BackendState {
    fn new() -> Self {
        Self {
            rooms: Arc::new(Mutex::new(vec![
                json!({ "id": 1, "name": "Digital Disco", "size": 3, "capacity": 8, "type": "party" }),
                json!({ "id": 2, "name": "Jazz Corner", "size": 8, "capacity": 8, "type": "jazz" }),
                json!({ "id": 3, "name": "Hip Hop Hub", "size": 0, "capacity": 12, "type": "hip hop" }),
            ])),
            messages: Arc::new(Mutex::new(vec![json!({
                "id": 1,
                "roomId": 1,
                "userId": 2,
                "username": "dj",
                "content": "welcome",
                "timestamp": "2024-05-01T20:00:00Z"
            })])),
            next_id: Arc::new(AtomicUsize::new(100)),
            hits: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }

    fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

/// A running fake backend.
pub struct FakeBackend {
    pub url: String,
    state: BackendState,
}

impl FakeBackend {
    /// Number of requests the backend has received.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn room_count(&self) -> usize {
        self.state.rooms.lock().unwrap().len()
    }
}

fn backend_router(state: BackendState) -> Router {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/roomsWEB", get(list_rooms))
        .route("/roomsWEB/{id}", get(get_room))
        .route("/rooms/{id}", axum::routing::put(update_room).delete(delete_room))
        .route("/rooms/type/{room_type}", get(rooms_by_type))
        .route("/rooms/{id}/users", get(room_users).post(join_room))
        .route("/rooms/{id}/users/{user_id}", axum::routing::delete(leave_room))
        .route("/messages/room/{id}", get(room_messages).post(post_message))
        .route("/streams", get(list_streams))
        .route("/users/{id}", get(get_user).put(echo_update))
        .route("/users/{id}/username", axum::routing::put(echo_update))
        .route("/users/username/{name}", get(get_user_by_name))
        .route("/usersWEB/{id}/rooms", get(user_rooms))
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/text", get(|| async { "plain text reply" }))
        .route("/empty", any(|| async { StatusCode::NO_CONTENT }))
        .route("/blank", any(|| async { StatusCode::OK }))
        .route(
            "/teapot",
            get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }),
        )
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            count_hits,
        ))
        .with_state(state)
}

async fn count_hits(
    State(state): State<BackendState>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    state.hit();
    next.run(req).await
}

async fn list_rooms(State(state): State<BackendState>) -> Json<Value> {
    Json(Value::Array(state.rooms.lock().unwrap().clone()))
}

fn find_room(state: &BackendState, id: &str) -> Option<Value> {
    state
        .rooms
        .lock()
        .unwrap()
        .iter()
        .find(|room| room["id"].to_string() == id)
        .cloned()
}

async fn get_room(State(state): State<BackendState>, Path(id): Path<String>) -> Response {
    match find_room(&state, &id) {
        Some(room) => Json(room).into_response(),
        None => (StatusCode::NOT_FOUND, "Room not found").into_response(),
    }
}

async fn create_room(State(state): State<BackendState>, Json(mut body): Json<Value>) -> Response {
    body["id"] = json!(state.next_id());
    body["size"] = json!(0);
    state.rooms.lock().unwrap().push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_room(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut rooms = state.rooms.lock().unwrap();
    let Some(room) = rooms.iter_mut().find(|room| room["id"].to_string() == id) else {
        return (StatusCode::NOT_FOUND, "Room not found").into_response();
    };
    if let (Some(room), Some(update)) = (room.as_object_mut(), body.as_object()) {
        for (key, value) in update {
            room.insert(key.clone(), value.clone());
        }
    }
    Json(room.clone()).into_response()
}

async fn delete_room(State(state): State<BackendState>, Path(id): Path<String>) -> StatusCode {
    state
        .rooms
        .lock()
        .unwrap()
        .retain(|room| room["id"].to_string() != id);
    StatusCode::OK
}

async fn rooms_by_type(
    State(state): State<BackendState>,
    Path(room_type): Path<String>,
) -> Response {
    let matches: Vec<Value> = state
        .rooms
        .lock()
        .unwrap()
        .iter()
        .filter(|room| room["type"] == room_type.as_str())
        .cloned()
        .collect();
    if matches.is_empty() {
        return (StatusCode::NOT_FOUND, "No rooms found").into_response();
    }
    Json(Value::Array(matches)).into_response()
}

async fn room_users(Path(_id): Path<String>) -> Json<Value> {
    Json(json!([{ "id": 2, "username": "dj" }]))
}

async fn join_room(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "roomId": id, "userId": body["userId"] }))
}

async fn leave_room(Path((_id, _user_id)): Path<(String, String)>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn room_messages(State(state): State<BackendState>, Path(id): Path<String>) -> Json<Value> {
    let messages: Vec<Value> = state
        .messages
        .lock()
        .unwrap()
        .iter()
        .filter(|m| m["roomId"].to_string() == id)
        .cloned()
        .collect();
    Json(Value::Array(messages))
}

async fn post_message(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if body["content"] == "fail" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Message rejected").into_response();
    }
    let id: u64 = id.parse().unwrap_or_default();
    let message = json!({
        "id": state.next_id(),
        "roomId": id,
        "userId": body["userId"],
        "username": "dj",
        "content": body["content"],
        "timestamp": "2024-05-01T20:01:00Z"
    });
    state.messages.lock().unwrap().push(message.clone());
    (StatusCode::CREATED, Json(message)).into_response()
}

async fn list_streams() -> Json<Value> {
    Json(json!([
        { "id": 1, "title": "Friday Night Set", "host": "dj", "viewers": 42 },
        { "id": 2, "name": "Chill Beats" }
    ]))
}

async fn get_user(Path(id): Path<String>) -> Response {
    if id == "7" {
        return Json(json!({ "id": 7, "username": "dj", "email": "dj@gtu.edu.tr" })).into_response();
    }
    (StatusCode::NOT_FOUND, "User not found").into_response()
}

async fn get_user_by_name(Path(name): Path<String>) -> Json<Value> {
    Json(json!({ "id": "u-1", "username": name }))
}

async fn echo_update(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "id": id, "updated": body }))
}

async fn user_rooms(State(state): State<BackendState>, Path(_id): Path<String>) -> Json<Value> {
    let rooms = state.rooms.lock().unwrap();
    Json(Value::Array(rooms.iter().take(1).cloned().collect()))
}

/// Login behaves according to the username so every response shape can be
/// exercised.
async fn login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    match username.as_str() {
        "bare" => Json(json!({ "id": 7, "username": username })).into_response(),
        "wrapped" => Json(json!({
            "user": { "id": 7, "username": username, "email": "w@gtu.edu.tr" },
            "token": "t"
        }))
        .into_response(),
        "rejected" => Json(json!({ "error": "Invalid credentials" })).into_response(),
        "odd" => Json(json!({ "status": "maybe" })).into_response(),
        _ => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    match username.as_str() {
        "confirm" => "User registered successfully".into_response(),
        "auto" => Json(json!({
            "user": { "id": 11, "username": username },
            "token": "fresh"
        }))
        .into_response(),
        _ => (StatusCode::CONFLICT, "Username already exists").into_response(),
    }
}

/// Reflect what the proxy forwarded.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Value> {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "authorization": header_value(header::AUTHORIZATION),
        "contentType": header_value(header::CONTENT_TYPE),
        "body": body,
    }))
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{addr}")
}

/// Start a fake backend on an ephemeral port.
pub async fn spawn_backend() -> FakeBackend {
    let state = BackendState::new();
    let url = serve(backend_router(state.clone())).await;
    FakeBackend { url, state }
}

/// Proxy router forwarding to `backend_url`.
pub fn proxy_app(backend_url: &str) -> Router {
    let config = ProxyConfig {
        backend_url: backend_url.to_string(),
        ..ProxyConfig::default()
    };
    api::create_router(AppState::new(&config))
}

/// Start the proxy on an ephemeral port and return its base URL.
pub async fn spawn_proxy(backend_url: &str) -> String {
    serve(proxy_app(backend_url)).await
}

/// A fake backend, a proxy in front of it and a client pointed at the proxy.
pub struct TestEnv {
    pub backend: FakeBackend,
    pub proxy_url: String,
    pub client: ApiClient,
}

impl TestEnv {
    pub async fn start() -> Self {
        let backend = spawn_backend().await;
        let proxy_url = spawn_proxy(&backend.url).await;
        let client = ApiClient::new(proxy_url.as_str());
        Self {
            backend,
            proxy_url,
            client,
        }
    }
}
