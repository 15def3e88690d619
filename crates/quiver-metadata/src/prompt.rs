use quiver_core::{MetadataRequest, TagVocabulary};

/// Render the system instruction. The tag list is taken from `vocabulary`, the
/// same value the output filter checks against.
pub fn system_prompt(vocabulary: &TagVocabulary) -> String {
    let mut tags = String::with_capacity(vocabulary.len() * 32);
    for tag in vocabulary.iter() {
        tags.push_str("   - ");
        tags.push_str(tag);
        tags.push('\n');
    }

    format!(
        "You are an AI that generates metadata for educational CustomGPT prompts.\n\n\
Given a CustomGPT URL and prompt text, generate:\n\
1. generated_name: A concise, descriptive title (5-8 words) that captures the purpose\n\
2. description: A 2-3 sentence summary explaining what this prompt helps teachers accomplish\n\
3. tags: An array of 2-5 relevant tags from this list:\n\
{tags}\n\
Focus on clarity and accuracy. Tags should reflect the primary use cases.\n\
Return ONLY valid JSON with these exact keys: generated_name, description, tags (as an array)."
    )
}

/// The URL and prompt text, passed through verbatim.
pub fn user_message(request: &MetadataRequest) -> String {
    format!("URL: {}\n\nPrompt: {}", request.url, request.prompt_text)
}
