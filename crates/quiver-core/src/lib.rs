//! Shared data model for Quiver.
//!
//! The metadata request and result travel through `quiver-metadata` and
//! `quiver-serve`. The [`record`] types describe the rows a client stores
//! once it has a result; no crate in this workspace reads or writes them.

mod error;
pub mod record;
pub mod tags;

pub use error::CoreError;
pub use tags::TagVocabulary;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder name for prompts the model could not title.
pub const UNTITLED_PROMPT: &str = "Untitled Prompt";

/// Placeholder description for prompts the model could not summarize.
pub const NO_DESCRIPTION: &str = "No description available.";

// --- Types (matching the front end's AddPromptData / PromptMetadata) ---

/// A CustomGPT link plus the prompt text a teacher pasted alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataRequest {
    pub url: String,
    pub prompt_text: String,
}

impl MetadataRequest {
    pub fn new(url: impl Into<String>, prompt_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prompt_text: prompt_text.into(),
        }
    }

    /// Both fields must carry something other than whitespace.
    /// The URL is not parsed; any non-blank string is accepted.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.url.trim().is_empty() {
            return Err(CoreError::MissingField("url"));
        }
        if self.prompt_text.trim().is_empty() {
            return Err(CoreError::MissingField("prompt_text"));
        }
        Ok(())
    }
}

/// Display metadata generated for a prompt. Handed to the caller, who persists it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataResult {
    pub generated_name: String,
    pub description: String,
    pub tags: Vec<String>,
}

// --- AI Settings ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

/// `~/.quiver/settings.json`, or `./.quiver/settings.json` without a home.
fn settings_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".quiver")
        .join("settings.json")
}

pub fn read_settings() -> AiSettings {
    read_settings_from(&settings_path())
}

/// Missing or unreadable files yield the default (unconfigured) settings.
pub fn read_settings_from(path: &Path) -> AiSettings {
    if !path.exists() {
        return AiSettings::default();
    }
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}
