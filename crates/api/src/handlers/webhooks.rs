//! Payment webhook intake: the only writer of the purchase ledger.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tradeprep_core::error::CoreError;
use tradeprep_core::types::DbId;
use tradeprep_db::repositories::PurchaseRepo;

use crate::error::{AppError, AppResult};
use crate::payments::webhook::{
    verify_signature, CompletedCheckoutSession, WebhookEvent, DEFAULT_TOLERANCE_SECS,
    EVENT_CHECKOUT_COMPLETED, EVENT_PAYMENT_FAILED, SIGNATURE_HEADER,
};
use crate::state::AppState;

/// `POST /api/v1/webhooks/payments` -- signed event intake from the processor.
///
/// The raw body bytes are verified against the signature header before any
/// JSON parsing; a missing or invalid signature is a 401 and nothing is
/// read from the payload. Unrecognized event types are acknowledged so the
/// processor stops retrying them. The response is `{ "received": true }` for
/// every accepted delivery, replays included.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Missing webhook signature".into()))?;

    verify_signature(
        &state.config.payment.webhook_secret,
        signature,
        &body,
        chrono::Utc::now().timestamp(),
        DEFAULT_TOLERANCE_SECS,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Webhook signature verification failed");
        CoreError::Unauthorized("Invalid webhook signature".into())
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {e}")))?;

    match event.event_type.as_str() {
        EVENT_CHECKOUT_COMPLETED => {
            let session: CompletedCheckoutSession = serde_json::from_value(event.data.object)
                .map_err(|e| AppError::BadRequest(format!("Malformed checkout session: {e}")))?;
            handle_checkout_completed(&state, session).await?;
        }
        EVENT_PAYMENT_FAILED => {
            tracing::warn!(event_id = ?event.id, "Payment failed event received");
        }
        other => {
            tracing::debug!(event_type = other, "Ignoring unhandled webhook event");
        }
    }

    Ok(Json(serde_json::json!({ "received": true })))
}

/// Record the confirmed purchase carried by a completed checkout session.
///
/// Metadata ids were attached by us at session creation; their absence means
/// the session was not created through this system and is rejected. Ids that
/// parse but match no user or course get a 400 as well, so the processor
/// stops redelivering an event that can never succeed. The ledger write is
/// idempotent, so replays fall through to the same acknowledgement without
/// touching anything.
async fn handle_checkout_completed(
    state: &AppState,
    session: CompletedCheckoutSession,
) -> AppResult<()> {
    let user_id = parse_metadata_id(session.metadata.user_id.as_deref(), "user_id")?;
    let course_id = parse_metadata_id(session.metadata.course_id.as_deref(), "course_id")?;

    let inserted = PurchaseRepo::record(
        &state.pool,
        user_id,
        course_id,
        chrono::Utc::now(),
        session.payment_intent.as_deref(),
    )
    .await
    .map_err(|e| match &e {
        // PostgreSQL foreign key violation: error code 23503
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503") => {
            AppError::BadRequest("Checkout metadata references an unknown user or course".into())
        }
        _ => AppError::from(e),
    })?;

    if inserted {
        tracing::info!(user_id, course_id, session_id = %session.id, "Purchase recorded");
    } else {
        tracing::info!(
            user_id,
            course_id,
            session_id = %session.id,
            "Duplicate purchase delivery ignored"
        );
    }

    Ok(())
}

fn parse_metadata_id(value: Option<&str>, field: &str) -> Result<DbId, AppError> {
    value
        .and_then(|v| v.parse::<DbId>().ok())
        .ok_or_else(|| AppError::BadRequest(format!("Missing or invalid metadata field: {field}")))
}
