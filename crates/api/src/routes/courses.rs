//! Route definitions for the `/courses` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::courses;
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// The course segment accepts a numeric id or a slug.
///
/// ```text
/// GET  /                                     -> list_courses
/// GET  /{id_or_slug}                         -> course_detail
/// POST /{id_or_slug}/purchase                -> purchase_course
/// GET  /{id_or_slug}/blocks/{block_id}/questions -> block_questions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::list_courses))
        .route("/{id_or_slug}", get(courses::course_detail))
        .route("/{id_or_slug}/purchase", post(courses::purchase_course))
        .route(
            "/{id_or_slug}/blocks/{block_id}/questions",
            get(courses::block_questions),
        )
}
