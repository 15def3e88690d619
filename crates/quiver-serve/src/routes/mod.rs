//! API route definitions.

mod health;
mod metadata;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::require_auth;
use crate::state::AppState;

/// Build the complete API router.
///
/// # Route Structure
///
/// ## Public (no auth)
/// - `GET /health` - Health check
///
/// ## Generation (auth when `QUIVER_API_TOKENS` is set)
/// - `POST /generate-prompt-metadata` - Generate name, description and tags
/// - `POST /functions/v1/generate-prompt-metadata` - Same, at the hosted-function path
///
/// Every route sits behind [`cors_layer`], so any `OPTIONS` request is
/// answered with 200 before routing or auth.
pub fn router(state: AppState) -> Router {
    // Public routes (no authentication)
    let public = Router::new().route("/health", get(health::health_check));

    let generation = Router::new()
        .route(
            "/generate-prompt-metadata",
            post(metadata::generate_metadata),
        )
        .route(
            "/functions/v1/generate-prompt-metadata",
            post(metadata::generate_metadata),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(generation)
        .layer(cors_layer())
        .with_state(state)
}

/// Permissive CORS: any origin, the headers browser clients send.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}
