//! Route definitions for the `/questions` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::questions;
use crate::state::AppState;

/// Routes mounted at `/questions`.
///
/// ```text
/// POST /{id}/attempt -> submit_attempt
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/attempt", post(questions::submit_attempt))
}
