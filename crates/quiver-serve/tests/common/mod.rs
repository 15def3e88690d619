#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use quiver_metadata::{
    CompletionBackend, CompletionRequest, MetadataError, MetadataGenerator, TagVocabulary,
};
use quiver_serve::{router, AppState, Config};
use serde_json::Value;
use tower::ServiceExt;

/// Completion backend with a fixed reply that counts its calls.
pub struct StubBackend {
    reply: Result<String, MetadataError>,
    calls: AtomicUsize,
}

impl StubBackend {
    pub fn replying(content: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(content.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(err: MetadataError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(err),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for StubBackend {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

pub fn app_with(stub: &Arc<StubBackend>, tokens: &[&str]) -> Router {
    let config = Config {
        api_tokens: tokens.iter().map(|t| t.to_string()).collect::<HashSet<_>>(),
        ..Config::default()
    };
    let generator = MetadataGenerator::with_backend(
        stub.clone(),
        TagVocabulary::education(),
        Duration::from_secs(5),
        4,
    );
    router(AppState::with_generator(config, generator))
}

pub fn app(stub: &Arc<StubBackend>) -> Router {
    app_with(stub, &[])
}

pub fn post_json(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap()
    }
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec();
    TestResponse {
        status,
        headers,
        bytes,
    }
}
