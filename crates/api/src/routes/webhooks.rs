//! Route definitions for the `/webhooks` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Routes mounted at `/webhooks`.
///
/// These routes authenticate by payload signature, not by JWT.
///
/// ```text
/// POST /payments -> payment_webhook
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/payments", post(webhooks::payment_webhook))
}
