//! Course content models: courses, blocks, tasks, subtasks, and the
//! aggregate rows used by the catalog and course-detail views.

use serde::Serialize;
use sqlx::FromRow;
use tradeprep_core::types::{DbId, Timestamp};

/// Row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub currency: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Row from the `blocks` table. Ordered within a course by `sort_order`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Block {
    pub id: DbId,
    pub course_id: DbId,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

/// Row from the `tasks` table. Ordered within a block by `sort_order`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub block_id: DbId,
    pub code: String,
    pub title: String,
    pub sort_order: i32,
}

/// Row from the `subtasks` table. Ordered within a task by `sort_order`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subtask {
    pub id: DbId,
    pub task_id: DbId,
    pub code: String,
    pub title: String,
    pub sort_order: i32,
}

/// Catalog row: a course plus its block and question counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseSummary {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub currency: String,
    pub block_count: i64,
    pub question_count: i64,
}

/// Question count for one block of a course.
#[derive(Debug, Clone, FromRow)]
pub struct BlockQuestionCount {
    pub block_id: DbId,
    pub question_count: i64,
}

/// Per-block attempt progress for one user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlockProgress {
    pub block_id: DbId,
    pub attempted: i64,
    pub correct: i64,
}
