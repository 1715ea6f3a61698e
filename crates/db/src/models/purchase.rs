//! Purchase ledger model.

use serde::Serialize;
use sqlx::FromRow;
use tradeprep_core::types::{DbId, Timestamp};

/// Row from the `course_purchases` ledger.
///
/// At most one per (user, course); never mutated, never deleted (refunds are
/// out of scope). `payment_ref` is the processor's payment reference, kept
/// for the audit trail only -- idempotency is keyed on (user, course).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CoursePurchase {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub purchased_at: Timestamp,
    pub payment_ref: Option<String>,
    pub created_at: Timestamp,
}
