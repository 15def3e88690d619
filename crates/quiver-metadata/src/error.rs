//! Failure modes of a single metadata generation call.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// The caller sent a blank URL or prompt text. No upstream call was made.
    #[error("{0}")]
    InvalidInput(String),

    /// The completion service is not usable as deployed (missing credential,
    /// unknown provider). Retrying will not help.
    #[error("completion service is not configured: {0}")]
    UpstreamConfiguration(String),

    /// The completion call failed or returned a non-success status.
    #[error("{}", upstream_request_message(.status, .message))]
    UpstreamRequest {
        status: Option<u16>,
        message: String,
    },

    /// The completion service answered, but not with the requested object.
    #[error("could not parse completion response: {0}")]
    UpstreamParse(String),
}

fn upstream_request_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("completion service error ({code}): {message}"),
        None => format!("completion service error: {message}"),
    }
}

impl MetadataError {
    pub fn request(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::UpstreamRequest {
            status,
            message: message.into(),
        }
    }

    /// True when the caller, not the deployment or the upstream, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl From<quiver_core::CoreError> for MetadataError {
    fn from(err: quiver_core::CoreError) -> Self {
        match err {
            quiver_core::CoreError::MissingField(_) => {
                Self::InvalidInput("url and prompt_text are required".to_string())
            }
            other => Self::UpstreamConfiguration(other.to_string()),
        }
    }
}
