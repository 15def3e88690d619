//! Local stand-in for a chat-completion service.
//!
//! Serves both the OpenAI-compatible `/v1/chat/completions` route and
//! Ollama's `/api/chat`. Records every request it receives and answers with
//! a canned reply shaped for the route that was hit.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with a well-formed envelope whose message content is this string.
    Content(String),
    /// 200 with an envelope that carries no usable content.
    NoContent,
    /// 200 with this raw body.
    Raw(String),
    /// Non-success status with this body.
    Status(u16, String),
    /// Never answers within a test's patience.
    Hang,
}

#[derive(Debug, Clone)]
pub struct Captured {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct ServerState {
    reply: Reply,
    captured: Arc<Mutex<Vec<Captured>>>,
}

pub struct ChatServer {
    /// Base URL including `/v1`, as a client would be configured.
    pub base_url: String,
    /// Server root, as an Ollama client would be configured.
    pub ollama_base_url: String,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl ChatServer {
    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }
}

pub async fn start(reply: Reply) -> ChatServer {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        reply,
        captured: Arc::clone(&captured),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/api/chat", post(ollama_chat))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    ChatServer {
        base_url: format!("http://{addr}/v1"),
        ollama_base_url: format!("http://{addr}"),
        captured,
    }
}

fn capture(state: &ServerState, headers: &HeaderMap, body: Value) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .captured
        .lock()
        .unwrap()
        .push(Captured { authorization, body });
}

async fn chat_completions(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    capture(&state, &headers, body);

    match state.reply {
        Reply::Content(content) => Json(json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        Reply::NoContent => Json(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": null } }]
        }))
        .into_response(),
        Reply::Raw(raw) => (StatusCode::OK, raw).into_response(),
        Reply::Status(code, body) => {
            let status = StatusCode::from_u16(code).unwrap();
            (status, body).into_response()
        }
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
    }
}

async fn ollama_chat(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    capture(&state, &headers, body);

    match state.reply {
        Reply::Content(content) => Json(json!({
            "model": "llama3",
            "message": { "role": "assistant", "content": content },
            "done": true
        }))
        .into_response(),
        Reply::NoContent => Json(json!({
            "model": "llama3",
            "message": { "role": "assistant", "content": "" },
            "done": true
        }))
        .into_response(),
        Reply::Raw(raw) => (StatusCode::OK, raw).into_response(),
        Reply::Status(code, body) => {
            let status = StatusCode::from_u16(code).unwrap();
            (status, body).into_response()
        }
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
    }
}

/// A loopback address nothing is listening on.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1")
}
