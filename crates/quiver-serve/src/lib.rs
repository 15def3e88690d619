//! Quiver Serve - HTTP endpoint that generates prompt metadata.
//!
//! Accepts a CustomGPT link and its prompt text, asks the configured
//! completion service for a title, description and tags, and returns the
//! validated result as JSON. The caller stores it; this service keeps no state.
//!
//! # Architecture
//!
//! - **AppState**: configuration plus the shared [`MetadataGenerator`]
//! - **Auth**: optional Bearer token gate for the generation routes
//! - **Routes**: health check and metadata generation, behind permissive CORS
//!
//! [`MetadataGenerator`]: quiver_metadata::MetadataGenerator

mod auth;
mod error;
mod routes;
mod state;

pub use self::auth::require_auth;
pub use self::error::ApiError;
pub use self::routes::{cors_layer, router};
pub use self::state::{AppState, Config};
