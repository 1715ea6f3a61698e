//! Repository for the `course_purchases` ledger and the purchase-triggered
//! role promotion.

use sqlx::PgPool;
use tradeprep_core::roles;
use tradeprep_core::types::{DbId, Timestamp};

use crate::models::purchase::CoursePurchase;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, course_id, purchased_at, payment_ref, created_at";

/// Access to the append-only purchase ledger.
pub struct PurchaseRepo;

impl PurchaseRepo {
    /// Whether the user owns the course.
    pub async fn exists(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM course_purchases WHERE user_id = $1 AND course_id = $2
             )",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// IDs of all courses the user has purchased.
    pub async fn course_ids_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT course_id FROM course_purchases WHERE user_id = $1 ORDER BY course_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Find the purchase row for a (user, course) pair.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<CoursePurchase>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_purchases WHERE user_id = $1 AND course_id = $2"
        );
        sqlx::query_as::<_, CoursePurchase>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a confirmed purchase. Idempotent: repeated calls for the same
    /// (user, course) pair are no-ops, regardless of `payment_ref`.
    ///
    /// Runs in one transaction: insert the ledger row with the
    /// `uq_course_purchases_user_course` constraint as the backstop for
    /// concurrent deliveries (`ON CONFLICT DO NOTHING` swallows the loser's
    /// insert), and promote a guest purchaser to full user. The promotion is
    /// applied only when this call actually wrote the ledger row, so replays
    /// never touch the user row.
    ///
    /// Returns `true` when a new purchase row was written.
    pub async fn record(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
        purchased_at: Timestamp,
        payment_ref: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO course_purchases (user_id, course_id, purchased_at, payment_ref)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_course_purchases_user_course DO NOTHING",
        )
        .bind(user_id)
        .bind(course_id)
        .bind(purchased_at)
        .bind(payment_ref)
        .execute(&mut *tx)
        .await?;

        let inserted = result.rows_affected() > 0;

        if inserted {
            // One-way guest -> user transition on first purchase.
            sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 AND role = $3")
                .bind(user_id)
                .bind(roles::ROLE_USER)
                .bind(roles::ROLE_GUEST)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
