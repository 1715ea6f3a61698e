//! Repository for questions and the append-only attempt ledger.

use sqlx::PgPool;
use tradeprep_core::types::DbId;

use crate::models::course::BlockProgress;
use crate::models::question::{BlockAttemptStats, CreateAttempt, Question, QuestionAttempt};

/// Column list shared across question queries.
const QUESTION_COLUMNS: &str = "id, course_id, block_id, task_id, subtask_id, stem, options, \
                                 is_active, created_at, updated_at";

/// Column list shared across attempt queries.
const ATTEMPT_COLUMNS: &str =
    "id, user_id, question_id, selected_option_id, is_correct, response_time_ms, attempted_at";

/// Questions are read-only; attempts are append-only.
pub struct QuestionRepo;

impl QuestionRepo {
    /// Find an active question by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Question>, sqlx::Error> {
        let query = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1 AND is_active");
        sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All active questions of a block in their stable order (by ID).
    ///
    /// The zero-based position in this list is the ordinal the visibility
    /// gate locks against, so the ordering must stay stable across requests.
    pub async fn list_by_block(
        pool: &PgPool,
        block_id: DbId,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions
             WHERE block_id = $1 AND is_active
             ORDER BY id"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(block_id)
            .fetch_all(pool)
            .await
    }

    /// Zero-based ordinal of a question within its block's stable order.
    pub async fn ordinal_in_block(
        pool: &PgPool,
        block_id: DbId,
        question_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let (ordinal,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM questions
             WHERE block_id = $1 AND is_active AND id < $2",
        )
        .bind(block_id)
        .bind(question_id)
        .fetch_one(pool)
        .await?;
        Ok(ordinal)
    }

    /// The newest attempt per question for one user within one block.
    pub async fn latest_attempts_in_block(
        pool: &PgPool,
        user_id: DbId,
        block_id: DbId,
    ) -> Result<Vec<QuestionAttempt>, sqlx::Error> {
        sqlx::query_as::<_, QuestionAttempt>(
            "SELECT DISTINCT ON (a.question_id)
                    a.id, a.user_id, a.question_id, a.selected_option_id,
                    a.is_correct, a.response_time_ms, a.attempted_at
             FROM question_attempts a
             JOIN questions q ON q.id = a.question_id
             WHERE a.user_id = $1 AND q.block_id = $2
             ORDER BY a.question_id, a.attempted_at DESC, a.id DESC",
        )
            .bind(user_id)
            .bind(block_id)
            .fetch_all(pool)
            .await
    }

    /// Total answered/correct attempt counts for one user within one block.
    pub async fn block_attempt_stats(
        pool: &PgPool,
        user_id: DbId,
        block_id: DbId,
    ) -> Result<BlockAttemptStats, sqlx::Error> {
        sqlx::query_as::<_, BlockAttemptStats>(
            "SELECT COUNT(*) AS answered,
                    COUNT(*) FILTER (WHERE a.is_correct) AS correct
             FROM question_attempts a
             JOIN questions q ON q.id = a.question_id
             WHERE a.user_id = $1 AND q.block_id = $2",
        )
        .bind(user_id)
        .bind(block_id)
        .fetch_one(pool)
        .await
    }

    /// Attempted/correct counts per block across a whole course.
    pub async fn progress_by_block(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Vec<BlockProgress>, sqlx::Error> {
        sqlx::query_as::<_, BlockProgress>(
            "SELECT q.block_id AS block_id,
                    COUNT(*) AS attempted,
                    COUNT(*) FILTER (WHERE a.is_correct) AS correct
             FROM question_attempts a
             JOIN questions q ON q.id = a.question_id
             WHERE a.user_id = $1 AND q.course_id = $2 AND q.block_id IS NOT NULL
             GROUP BY q.block_id",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// Append an attempt to the ledger, returning the created row.
    pub async fn record_attempt(
        pool: &PgPool,
        input: &CreateAttempt,
    ) -> Result<QuestionAttempt, sqlx::Error> {
        let query = format!(
            "INSERT INTO question_attempts
                 (user_id, question_id, selected_option_id, is_correct, response_time_ms)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ATTEMPT_COLUMNS}"
        );
        sqlx::query_as::<_, QuestionAttempt>(&query)
            .bind(input.user_id)
            .bind(input.question_id)
            .bind(&input.selected_option_id)
            .bind(input.is_correct)
            .bind(input.response_time_ms)
            .fetch_one(pool)
            .await
    }
}
