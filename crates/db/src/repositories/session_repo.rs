//! Refresh-token session persistence.
//!
//! Each login creates one row. Refresh rotates it (old row revoked, new
//! row inserted) and logout revokes everything a user holds. Expired rows
//! are filtered on read instead of being deleted.

use sqlx::PgPool;
use tradeprep_core::types::DbId;

use crate::models::session::{CreateSession, UserSession};

pub struct SessionRepo;

impl SessionRepo {
    /// Persist a new session, returning the stored row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        sqlx::query_as::<_, UserSession>(
            "INSERT INTO user_sessions
                 (user_id, refresh_token_hash, expires_at, user_agent, ip_address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, user_id, refresh_token_hash, expires_at, is_revoked,
                       user_agent, ip_address, created_at",
        )
        .bind(input.user_id)
        .bind(&input.refresh_token_hash)
        .bind(input.expires_at)
        .bind(&input.user_agent)
        .bind(&input.ip_address)
        .fetch_one(pool)
        .await
    }

    /// Look up the live session holding this refresh-token hash.
    ///
    /// Revoked and expired sessions never match, so a rotated-out or stale
    /// token simply stops resolving rather than needing its own check.
    pub async fn find_active_by_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        sqlx::query_as::<_, UserSession>(
            "SELECT id, user_id, refresh_token_hash, expires_at, is_revoked,
                    user_agent, ip_address, created_at
             FROM user_sessions
             WHERE refresh_token_hash = $1
               AND is_revoked = false
               AND expires_at > NOW()",
        )
        .bind(hash)
        .fetch_optional(pool)
        .await
    }

    /// Revoke one session (the rotation half of a refresh). Returns whether
    /// a live row was actually revoked.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true WHERE id = $1 AND is_revoked = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke every live session a user holds. Returns how many were revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
