//! Route definitions, one module per resource.

pub mod auth;
pub mod courses;
pub mod health;
pub mod questions;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                      signup (public)
/// /auth/login                                       login (public)
/// /auth/refresh                                     refresh (public)
/// /auth/logout                                      logout (requires auth)
///
/// /courses                                          catalog (optional auth)
/// /courses/{id_or_slug}                             course detail (optional auth)
/// /courses/{id_or_slug}/purchase                    open checkout (requires auth)
/// /courses/{id_or_slug}/blocks/{block_id}/questions gated listing (requires auth)
///
/// /questions/{id}/attempt                           submit answer (requires auth)
///
/// /webhooks/payments                                payment processor intake (signed)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/courses", courses::router())
        .nest("/questions", questions::router())
        .nest("/webhooks", webhooks::router())
}
