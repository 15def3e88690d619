//! Row shapes of the hosted data store's `prompts`, `saved_prompts` and
//! `prompt_upvotes` tables. Quiver never writes these itself; callers persist
//! a [`NewPrompt`] after metadata generation succeeds.

use serde::{Deserialize, Serialize};

use crate::{MetadataRequest, MetadataResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prompt {
    pub id: String,
    pub url: String,
    pub prompt_text: String,
    pub generated_name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub user_token: String,
    #[serde(default)]
    pub upvotes: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Save/unsave join row keyed by (user token, prompt id).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedPrompt {
    pub id: String,
    pub user_token: String,
    pub prompt_id: String,
    pub created_at: String,
}

/// Upvote join row, same key shape as [`SavedPrompt`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptUpvote {
    pub id: String,
    pub user_token: String,
    pub prompt_id: String,
    pub created_at: String,
}

/// Insert payload for the `prompts` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPrompt {
    pub url: String,
    pub prompt_text: String,
    pub generated_name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub user_token: String,
}

impl NewPrompt {
    pub fn from_generated(
        request: &MetadataRequest,
        result: &MetadataResult,
        user_token: impl Into<String>,
    ) -> Self {
        Self {
            url: request.url.clone(),
            prompt_text: request.prompt_text.clone(),
            generated_name: result.generated_name.clone(),
            description: result.description.clone(),
            tags: result.tags.clone(),
            user_token: user_token.into(),
        }
    }
}
