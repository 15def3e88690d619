//! Deterministic in-process completion backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quiver_metadata::{CompletionBackend, CompletionRequest, MetadataError};

pub struct StubBackend {
    reply: Result<String, MetadataError>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl StubBackend {
    pub fn replying(content: &str) -> Arc<Self> {
        Self::build(Ok(content.to_string()), Duration::ZERO)
    }

    pub fn failing(err: MetadataError) -> Arc<Self> {
        Self::build(Err(err), Duration::ZERO)
    }

    pub fn slow(content: &str, delay: Duration) -> Arc<Self> {
        Self::build(Ok(content.to_string()), delay)
    }

    fn build(reply: Result<String, MetadataError>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for StubBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.reply.clone()
    }
}
