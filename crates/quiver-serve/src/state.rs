//! Application state and configuration.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use quiver_core::{AiSettings, TagVocabulary};
use quiver_metadata::engine::{
    DEFAULT_MAX_CONCURRENT, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT,
};
use quiver_metadata::{EngineSettings, MetadataError, MetadataGenerator, Provider};

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// Completion service settings.
    pub engine: EngineSettings,

    /// Tags the generator may assign.
    pub vocabulary: TagVocabulary,

    /// Accepted API tokens (from QUIVER_API_TOKENS). Empty disables the check.
    pub api_tokens: HashSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            engine: EngineSettings::default(),
            vocabulary: TagVocabulary::education(),
            api_tokens: HashSet::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// `~/.quiver/settings.json` for provider, model and key.
    ///
    /// Optional environment variables:
    /// - `QUIVER_BIND_ADDR`: Server bind address (default: "0.0.0.0:8080")
    /// - `QUIVER_LLM_PROVIDER`: openai, anthropic, google, ollama, groq, mistral, deepseek
    /// - `QUIVER_LLM_MODEL`: Model identifier (default: "gpt-4o-mini")
    /// - `QUIVER_LLM_API_KEY`: Completion service credential. Without it, the
    ///   settings file key is used when the file names the same provider, then
    ///   `OPENAI_API_KEY` when the provider is OpenAI.
    /// - `QUIVER_LLM_BASE_URL`: Override the provider endpoint
    /// - `QUIVER_LLM_TEMPERATURE`: Sampling temperature (default: 0.7)
    /// - `QUIVER_UPSTREAM_TIMEOUT_SECS`: Per-call timeout (default: 30)
    /// - `QUIVER_MAX_CONCURRENT_UPSTREAM`: In-flight upstream calls (default: 16)
    /// - `QUIVER_TAG_VOCABULARY`: "education" or "catalog" (default: "education")
    /// - `QUIVER_API_TOKENS`: Comma-separated bearer tokens
    ///
    /// A missing credential is not an error here; it is reported when the
    /// generator is built.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_env_and_settings(quiver_core::read_settings())
    }

    pub fn from_env_and_settings(file: AiSettings) -> anyhow::Result<Self> {
        let bind_addr = env_opt("QUIVER_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let file_provider = non_empty(file.provider).map(|name| Provider::from_str(&name));
        let provider = match (env_opt("QUIVER_LLM_PROVIDER"), &file_provider) {
            (Some(name), _) => Provider::from_str(&name).map_err(|e| anyhow::anyhow!(e))?,
            (None, Some(parsed)) => parsed.clone().map_err(|e| anyhow::anyhow!(e))?,
            (None, None) => Provider::OpenAi,
        };
        // A file without a provider holds an OpenAI key.
        let file_key_matches = match file_provider {
            Some(Ok(p)) => p == provider,
            Some(Err(_)) => false,
            None => provider == Provider::OpenAi,
        };

        let model = env_opt("QUIVER_LLM_MODEL")
            .or_else(|| non_empty(file.model))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        // Keys are never carried across providers.
        let api_key = env_opt("QUIVER_LLM_API_KEY")
            .or_else(|| {
                non_empty(file.api_key).filter(|_| file_key_matches)
            })
            .or_else(|| {
                env_opt("OPENAI_API_KEY").filter(|_| provider == Provider::OpenAi)
            });

        let base_url = env_opt("QUIVER_LLM_BASE_URL");

        let temperature: f32 = env_parse("QUIVER_LLM_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            anyhow::bail!("QUIVER_LLM_TEMPERATURE must be between 0 and 2, got {temperature}");
        }

        let timeout_secs: u64 =
            env_parse("QUIVER_UPSTREAM_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())?;
        if timeout_secs == 0 {
            anyhow::bail!("QUIVER_UPSTREAM_TIMEOUT_SECS must be greater than 0");
        }

        let max_concurrent: usize =
            env_parse("QUIVER_MAX_CONCURRENT_UPSTREAM", DEFAULT_MAX_CONCURRENT)?;
        if max_concurrent == 0 {
            anyhow::bail!("QUIVER_MAX_CONCURRENT_UPSTREAM must be greater than 0");
        }

        let vocabulary_name =
            env_opt("QUIVER_TAG_VOCABULARY").unwrap_or_else(|| "education".to_string());
        let vocabulary = TagVocabulary::by_name(&vocabulary_name)
            .ok_or_else(|| anyhow::anyhow!("unknown tag vocabulary: {vocabulary_name}"))?;

        let api_tokens: HashSet<String> = std::env::var("QUIVER_API_TOKENS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        tracing::info!(
            bind_addr = %bind_addr,
            provider = %provider,
            model = %model,
            has_api_key = api_key.is_some(),
            vocabulary = %vocabulary_name,
            tag_count = vocabulary.len(),
            token_count = api_tokens.len(),
            "configuration loaded"
        );

        Ok(Self {
            bind_addr,
            engine: EngineSettings {
                provider,
                model,
                api_key,
                base_url,
                temperature,
                timeout: Duration::from_secs(timeout_secs),
                max_concurrent,
            },
            vocabulary,
            api_tokens,
        })
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(non_empty)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key} \"{raw}\": {e}")),
        None => Ok(default),
    }
}

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The generator, or the configuration error every request reports.
    pub generator: Result<MetadataGenerator, MetadataError>,

    /// Application configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// A generator that cannot be built (typically a missing credential) does
    /// not stop the server: health checks stay up and every generation request
    /// answers 500 with the configuration error.
    pub fn new(config: Config) -> Self {
        let generator = MetadataGenerator::new(&config.engine, config.vocabulary.clone());
        if let Err(err) = &generator {
            tracing::error!(error = %err, "metadata generation unavailable");
        }
        Self {
            generator,
            config: Arc::new(config),
        }
    }

    /// Create application state around an already-built generator.
    pub fn with_generator(config: Config, generator: MetadataGenerator) -> Self {
        Self {
            generator: Ok(generator),
            config: Arc::new(config),
        }
    }
}
