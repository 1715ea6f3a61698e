//! Trial ledger model.

use serde::Serialize;
use sqlx::FromRow;
use tradeprep_core::types::{DbId, Timestamp};

/// Row from the `user_trials` ledger.
///
/// At most one per user, created lazily on first entitlement check and
/// immutable after creation: never extended, never reset, never deleted.
/// Retained for audit even after expiry or purchase.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserTrial {
    pub id: DbId,
    pub user_id: DbId,
    pub started_at: Timestamp,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}
