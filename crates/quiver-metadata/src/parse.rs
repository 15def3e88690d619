use quiver_core::{MetadataResult, TagVocabulary, NO_DESCRIPTION, UNTITLED_PROMPT};

use crate::MetadataError;

/// The object the model is asked to return. Name and description may be
/// absent or null; `tags` must be present.
#[derive(Debug, serde::Deserialize)]
struct CompletionMetadata {
    #[serde(default)]
    generated_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    tags: Vec<String>,
}

/// Parse the model's message content and turn it into a validated result.
pub fn parse_completion(
    raw: &str,
    vocabulary: &TagVocabulary,
) -> Result<MetadataResult, MetadataError> {
    let json_str = extract_json_object(raw).ok_or_else(|| {
        MetadataError::UpstreamParse("response does not contain a JSON object".to_string())
    })?;

    let metadata: CompletionMetadata = serde_json::from_str(json_str)
        .map_err(|e| MetadataError::UpstreamParse(e.to_string()))?;

    Ok(MetadataResult {
        generated_name: or_placeholder(metadata.generated_name, UNTITLED_PROMPT),
        description: or_placeholder(metadata.description, NO_DESCRIPTION),
        tags: validate_tags(metadata.tags, vocabulary),
    })
}

/// Extract the outermost `{ ... }` span, so prose or code fences around the
/// object do not defeat parsing.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => placeholder.to_string(),
    }
}

/// Keep upstream tags that are vocabulary members, in upstream order and in
/// the vocabulary's spelling.
///
/// With no members left, the first upstream tag is kept verbatim even though
/// it is not a member. With no upstream tags at all, the vocabulary fallback
/// is used.
pub fn validate_tags(upstream: Vec<String>, vocabulary: &TagVocabulary) -> Vec<String> {
    let valid: Vec<String> = upstream
        .iter()
        .filter_map(|tag| vocabulary.canonical(tag))
        .map(str::to_string)
        .collect();

    if !valid.is_empty() {
        return valid;
    }

    match upstream.into_iter().next() {
        Some(first) => {
            tracing::warn!(tag = %first, "no upstream tag is in the vocabulary, keeping the first verbatim");
            vec![first]
        }
        None => vec![vocabulary.fallback().to_string()],
    }
}
