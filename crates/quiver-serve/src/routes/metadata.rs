//! Prompt metadata generation endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use quiver_core::{MetadataRequest, MetadataResult};
use quiver_metadata::MetadataError;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body. Keys are optional here so that a missing key is reported
/// as 400 with the usual error body.
#[derive(Debug, Default, Deserialize)]
struct GenerateBody {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    prompt_text: Option<String>,
}

/// Generate a name, description and tags for a CustomGPT prompt.
///
/// Route: `POST /generate-prompt-metadata`
///
/// Body: `{ "url": string, "prompt_text": string }`
pub async fn generate_metadata(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MetadataResult>, ApiError> {
    let body: GenerateBody = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "unreadable request body");
        ApiError::BadRequest(format!("invalid JSON body: {e}"))
    })?;

    let request = MetadataRequest::new(
        body.url.unwrap_or_default(),
        body.prompt_text.unwrap_or_default(),
    );
    // Input problems win over configuration problems.
    request.validate().map_err(MetadataError::from)?;

    let generator = state.generator.as_ref().map_err(|err| err.clone())?;

    let result = generator.generate(&request).await?;
    Ok(Json(result))
}
