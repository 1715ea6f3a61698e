//! Question and attempt models.

use serde::Serialize;
use sqlx::FromRow;
use tradeprep_core::types::{DbId, Timestamp};

/// Row from the `questions` table.
///
/// `options` is a JSONB array of `{ id, text, explanation, is_correct }`;
/// decode it with [`tradeprep_core::question::parse_options`]. The stored
/// form includes correctness and explanations, so listings must project it
/// through a response type instead of serializing this row directly.
#[derive(Debug, Clone, FromRow)]
pub struct Question {
    pub id: DbId,
    pub course_id: DbId,
    pub block_id: Option<DbId>,
    pub task_id: Option<DbId>,
    pub subtask_id: Option<DbId>,
    pub stem: String,
    pub options: serde_json::Value,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Row from the `question_attempts` ledger.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestionAttempt {
    pub id: DbId,
    pub user_id: DbId,
    pub question_id: DbId,
    pub selected_option_id: String,
    pub is_correct: bool,
    pub response_time_ms: Option<i32>,
    pub attempted_at: Timestamp,
}

/// DTO for recording a new attempt.
#[derive(Debug)]
pub struct CreateAttempt {
    pub user_id: DbId,
    pub question_id: DbId,
    pub selected_option_id: String,
    pub is_correct: bool,
    pub response_time_ms: Option<i32>,
}

/// Aggregate answered/correct counts for one user within one block.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct BlockAttemptStats {
    pub answered: i64,
    pub correct: i64,
}
