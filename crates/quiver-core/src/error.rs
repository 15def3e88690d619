//! Error types for the Quiver data model.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// A required request field was empty or whitespace.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A tag vocabulary failed its construction checks.
    #[error("invalid tag vocabulary: {0}")]
    InvalidVocabulary(String),
}
