//! Metadata generation for Quiver prompts.
//!
//! Given a CustomGPT link and its prompt text, asks a chat-completion model for
//! a title, a short description and a few tags, then checks the tags against a
//! [`TagVocabulary`] before handing the result back. One upstream call per
//! request; nothing is retried, cached or persisted here.

pub mod engine;
mod error;
mod parse;
mod prompt;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;

pub use engine::{
    build_backend, CompletionBackend, CompletionRequest, EngineSettings, LlmBackend,
    OpenAiBackend, Provider,
};
pub use error::MetadataError;
pub use parse::validate_tags;
pub use quiver_core::{MetadataRequest, MetadataResult, TagVocabulary};

/// Generates validated metadata for prompts. Cheap to clone; clones share the
/// backend and the concurrency limit.
#[derive(Clone)]
pub struct MetadataGenerator {
    backend: Arc<dyn CompletionBackend>,
    vocabulary: TagVocabulary,
    system_prompt: Arc<str>,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl MetadataGenerator {
    /// Build a generator for the configured provider. Fails up front when the
    /// credential is missing, rather than on every call.
    pub fn new(
        settings: &EngineSettings,
        vocabulary: TagVocabulary,
    ) -> Result<Self, MetadataError> {
        let backend = build_backend(settings)?;
        tracing::info!(
            provider = %settings.provider,
            model = %settings.model,
            timeout_secs = settings.timeout.as_secs(),
            max_concurrent = settings.max_concurrent,
            "metadata generator ready"
        );
        Ok(Self::with_backend(
            backend,
            vocabulary,
            settings.timeout,
            settings.max_concurrent,
        ))
    }

    pub fn with_backend(
        backend: Arc<dyn CompletionBackend>,
        vocabulary: TagVocabulary,
        timeout: Duration,
        max_concurrent: usize,
    ) -> Self {
        let system_prompt = prompt::system_prompt(&vocabulary).into();
        Self {
            backend,
            vocabulary,
            system_prompt,
            timeout,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn vocabulary(&self) -> &TagVocabulary {
        &self.vocabulary
    }

    /// Turn a link and its prompt text into a title, description and tags.
    ///
    /// Blank input is rejected before any network traffic. Either a complete
    /// result or an error comes back, never a partial result.
    pub async fn generate(
        &self,
        request: &MetadataRequest,
    ) -> Result<MetadataResult, MetadataError> {
        request.validate()?;

        let completion = CompletionRequest {
            system: self.system_prompt.to_string(),
            user: prompt::user_message(request),
        };

        let started = Instant::now();
        let call = async {
            match self.permits.acquire().await {
                Ok(_permit) => self.backend.complete(&completion).await,
                Err(_) => Err(MetadataError::request(None, "generator is shutting down")),
            }
        };

        let raw = match tokio::time::timeout(self.timeout, call).await {
            Ok(outcome) => outcome?,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "completion call timed out"
                );
                return Err(MetadataError::request(
                    None,
                    format!("timed out after {}ms", self.timeout.as_millis()),
                ));
            }
        };

        tracing::debug!(raw = %raw, "completion content");

        let result = parse::parse_completion(&raw, &self.vocabulary)?;

        tracing::info!(
            tag_count = result.tags.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generated prompt metadata"
        );

        Ok(result)
    }
}
