//! Repository for the `user_trials` ledger.

use sqlx::PgPool;
use tradeprep_core::types::{DbId, Timestamp};

use crate::models::trial::UserTrial;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, started_at, expires_at, created_at";

/// Access to the single-per-user trial ledger.
pub struct TrialRepo;

impl TrialRepo {
    /// Find a user's trial row, if one exists.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserTrial>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_trials WHERE user_id = $1");
        sqlx::query_as::<_, UserTrial>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create the user's trial row if none exists, returning the committed
    /// row either way.
    ///
    /// Two concurrent first-touch requests can both observe "no trial" and
    /// both call this. The `uq_user_trials_user_id` constraint arbitrates:
    /// the no-op `DO UPDATE` lets the losing writer read back the winner's
    /// row in the same statement, so every caller observes the one committed
    /// `expires_at` and no conflict ever surfaces to the request.
    pub async fn bootstrap(
        pool: &PgPool,
        user_id: DbId,
        started_at: Timestamp,
        expires_at: Timestamp,
    ) -> Result<UserTrial, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_trials (user_id, started_at, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_user_trials_user_id
             DO UPDATE SET user_id = user_trials.user_id
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserTrial>(&query)
            .bind(user_id)
            .bind(started_at)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }
}
