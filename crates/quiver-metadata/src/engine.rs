use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use serde::{Deserialize, Serialize};

use crate::MetadataError;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// One system + user exchange sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

/// A chat-completion service. Returns the assistant message content as-is.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, MetadataError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
    Ollama,
    Groq,
    Mistral,
    DeepSeek,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
            Provider::Ollama => "ollama",
            Provider::Groq => "groq",
            Provider::Mistral => "mistral",
            Provider::DeepSeek => "deepseek",
        }
    }

    /// Local Ollama servers run without credentials.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Provider::Ollama)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "google" => Ok(Provider::Google),
            "ollama" => Ok(Provider::Ollama),
            "groq" => Ok(Provider::Groq),
            "mistral" => Ok(Provider::Mistral),
            "deepseek" => Ok(Provider::DeepSeek),
            other => Err(MetadataError::UpstreamConfiguration(format!(
                "unknown provider: {other}"
            ))),
        }
    }
}

fn map_backend(provider: Provider) -> LLMBackend {
    match provider {
        Provider::OpenAi => LLMBackend::OpenAI,
        Provider::Anthropic => LLMBackend::Anthropic,
        Provider::Google => LLMBackend::Google,
        Provider::Ollama => LLMBackend::Ollama,
        Provider::Groq => LLMBackend::Groq,
        Provider::Mistral => LLMBackend::Mistral,
        Provider::DeepSeek => LLMBackend::DeepSeek,
    }
}

/// Everything needed to reach the completion service.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub provider: Provider,
    pub model: String,
    pub api_key: Option<String>,
    /// Overrides the provider's default endpoint.
    pub base_url: Option<String>,
    pub temperature: f32,
    /// Upper bound on one upstream call, including the wait for a free slot.
    pub timeout: Duration,
    /// Upstream calls allowed in flight at once.
    pub max_concurrent: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAi,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: None,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

/// Build the backend for the configured provider.
///
/// OpenAI goes through [`OpenAiBackend`], which constrains output to a JSON
/// object; every other provider goes through the `llm` crate.
pub fn build_backend(
    settings: &EngineSettings,
) -> Result<Arc<dyn CompletionBackend>, MetadataError> {
    if settings.model.trim().is_empty() {
        return Err(MetadataError::UpstreamConfiguration(
            "no model configured".to_string(),
        ));
    }

    let api_key = settings
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());

    match (settings.provider, api_key) {
        (Provider::OpenAi, Some(key)) => {
            let base_url = settings
                .base_url
                .as_deref()
                .unwrap_or(DEFAULT_OPENAI_BASE_URL);
            let backend =
                OpenAiBackend::new(base_url, key, &settings.model, settings.temperature)?;
            Ok(Arc::new(backend))
        }
        (provider, None) if provider.requires_api_key() => {
            Err(MetadataError::UpstreamConfiguration(format!(
                "no API key set for provider {provider}"
            )))
        }
        (_, key) => Ok(Arc::new(LlmBackend::new(settings, key)?)),
    }
}

// --- OpenAI chat completions ---

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: [ChatTurn<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Talks to an OpenAI-compatible `/chat/completions` endpoint directly.
pub struct OpenAiBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiBackend {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        temperature: f32,
    ) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MetadataError::UpstreamConfiguration(format!("http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, MetadataError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: [
                ChatTurn {
                    role: "system",
                    content: &request.system,
                },
                ChatTurn {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MetadataError::request(None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %detail,
                "completion service returned an error"
            );
            return Err(MetadataError::request(
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("request failed"),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| MetadataError::request(Some(status.as_u16()), e.to_string()))?;

        let envelope: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| MetadataError::UpstreamParse(format!("chat envelope: {e}")))?;

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                MetadataError::UpstreamParse("no content returned from completion service".to_string())
            })
    }
}

// --- Other providers via the llm crate ---

/// Any provider the `llm` crate supports.
///
/// The client carries the system prompt, so it is rebuilt per call; `new`
/// runs the same build once so that bad settings fail at startup.
pub struct LlmBackend {
    provider: Provider,
    model: String,
    api_key: Option<String>,
    base_url: Option<String>,
    temperature: f32,
    timeout_secs: u64,
}

impl LlmBackend {
    pub fn new(settings: &EngineSettings, api_key: Option<&str>) -> Result<Self, MetadataError> {
        let backend = Self {
            provider: settings.provider,
            model: settings.model.clone(),
            api_key: api_key.map(str::to_string),
            base_url: settings.base_url.clone(),
            temperature: settings.temperature,
            timeout_secs: settings.timeout.as_secs().max(1),
        };
        backend.builder().build().map_err(build_error)?;
        Ok(backend)
    }

    fn builder(&self) -> LLMBuilder {
        let mut builder = LLMBuilder::new()
            .backend(map_backend(self.provider))
            .model(&self.model)
            .temperature(self.temperature)
            .timeout_seconds(self.timeout_secs);

        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        builder
    }
}

fn build_error(err: llm::error::LLMError) -> MetadataError {
    MetadataError::UpstreamConfiguration(format!("build LLM: {err}"))
}

#[async_trait]
impl CompletionBackend for LlmBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, MetadataError> {
        let llm = self
            .builder()
            .system(&request.system)
            .build()
            .map_err(build_error)?;

        let messages = vec![ChatMessage::user().content(&request.user).build()];

        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| MetadataError::request(None, format!("chat: {e}")))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(MetadataError::UpstreamParse(
                "LLM returned empty text".to_string(),
            )),
            None => Err(MetadataError::UpstreamParse(
                "LLM returned no text".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!(" deepseek ".parse::<Provider>().unwrap(), Provider::DeepSeek);
        assert!(matches!(
            "cohere".parse::<Provider>(),
            Err(MetadataError::UpstreamConfiguration(_))
        ));
    }

    #[test]
    fn provider_display_round_trips() {
        for p in [
            Provider::OpenAi,
            Provider::Anthropic,
            Provider::Google,
            Provider::Ollama,
            Provider::Groq,
            Provider::Mistral,
            Provider::DeepSeek,
        ] {
            assert_eq!(p.to_string().parse::<Provider>().unwrap(), p);
        }
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let settings = EngineSettings::default();
        assert!(matches!(
            build_backend(&settings),
            Err(MetadataError::UpstreamConfiguration(_))
        ));

        let settings = EngineSettings {
            api_key: Some("   ".to_string()),
            provider: Provider::Anthropic,
            ..EngineSettings::default()
        };
        assert!(matches!(
            build_backend(&settings),
            Err(MetadataError::UpstreamConfiguration(_))
        ));
    }

    #[test]
    fn ollama_builds_without_key() {
        let settings = EngineSettings {
            provider: Provider::Ollama,
            model: "llama3".to_string(),
            ..EngineSettings::default()
        };
        assert!(build_backend(&settings).is_ok());
    }

    #[test]
    fn llm_builder_failure_surfaces_at_construction() {
        // The llm crate refuses to build an OpenAI client without a key.
        let settings = EngineSettings::default();
        assert!(matches!(
            LlmBackend::new(&settings, None),
            Err(MetadataError::UpstreamConfiguration(msg)) if msg.starts_with("build LLM")
        ));
    }

    #[test]
    fn blank_model_is_a_configuration_error() {
        let settings = EngineSettings {
            api_key: Some("sk-test".to_string()),
            model: " ".to_string(),
            ..EngineSettings::default()
        };
        assert!(build_backend(&settings).is_err());
    }

    #[test]
    fn openai_endpoint_joins_base_url() {
        let backend =
            OpenAiBackend::new("http://localhost:9999/v1/", "sk", DEFAULT_MODEL, 0.7).unwrap();
        assert_eq!(backend.endpoint, "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn request_body_asks_for_json_object() {
        let body = ChatCompletionBody {
            model: "gpt-4o-mini",
            messages: [
                ChatTurn {
                    role: "system",
                    content: "sys",
                },
                ChatTurn {
                    role: "user",
                    content: "usr",
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.7,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
    }
}
