//! Repository for courses, blocks, tasks, and subtasks.
//!
//! Content is read-only here: rows are written by the external
//! seeding/import tooling, never by request handlers.

use sqlx::PgPool;
use tradeprep_core::types::DbId;

use crate::models::course::{Block, BlockQuestionCount, Course, CourseSummary, Subtask, Task};

/// Column list shared across course queries.
const COURSE_COLUMNS: &str =
    "id, slug, name, description, price_cents, currency, is_active, created_at, updated_at";

/// Read-only access to course content.
pub struct CourseRepo;

impl CourseRepo {
    /// Find a course by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a course by its human-readable slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE slug = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a course by numeric ID or slug.
    ///
    /// Route path parameters accept either form; a numeric identifier is
    /// tried as an ID first and falls back to slug lookup.
    pub async fn find_by_id_or_slug(
        pool: &PgPool,
        ident: &str,
    ) -> Result<Option<Course>, sqlx::Error> {
        if let Ok(id) = ident.parse::<DbId>() {
            if let Some(course) = Self::find_by_id(pool, id).await? {
                return Ok(Some(course));
            }
        }
        Self::find_by_slug(pool, ident).await
    }

    /// List active courses with block and question counts, ordered by name.
    pub async fn list_active_with_stats(pool: &PgPool) -> Result<Vec<CourseSummary>, sqlx::Error> {
        sqlx::query_as::<_, CourseSummary>(
            "SELECT c.id, c.slug, c.name, c.description, c.price_cents, c.currency,
                    (SELECT COUNT(*) FROM blocks b WHERE b.course_id = c.id) AS block_count,
                    (SELECT COUNT(*) FROM questions q
                      WHERE q.course_id = c.id AND q.is_active) AS question_count
             FROM courses c
             WHERE c.is_active = true
             ORDER BY c.name",
        )
        .fetch_all(pool)
        .await
    }

    /// List a course's blocks in display order.
    pub async fn blocks(pool: &PgPool, course_id: DbId) -> Result<Vec<Block>, sqlx::Error> {
        sqlx::query_as::<_, Block>(
            "SELECT id, course_id, code, title, description, sort_order
             FROM blocks WHERE course_id = $1
             ORDER BY sort_order, id",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// Find a block, verifying it belongs to the given course.
    pub async fn find_block(
        pool: &PgPool,
        block_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Block>, sqlx::Error> {
        sqlx::query_as::<_, Block>(
            "SELECT id, course_id, code, title, description, sort_order
             FROM blocks WHERE id = $1 AND course_id = $2",
        )
        .bind(block_id)
        .bind(course_id)
        .fetch_optional(pool)
        .await
    }

    /// All tasks of a course, ordered for grouping under their blocks.
    pub async fn tasks_for_course(pool: &PgPool, course_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT t.id, t.block_id, t.code, t.title, t.sort_order
             FROM tasks t
             JOIN blocks b ON b.id = t.block_id
             WHERE b.course_id = $1
             ORDER BY t.block_id, t.sort_order, t.id",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// All subtasks of a course, ordered for grouping under their tasks.
    pub async fn subtasks_for_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<Subtask>, sqlx::Error> {
        sqlx::query_as::<_, Subtask>(
            "SELECT s.id, s.task_id, s.code, s.title, s.sort_order
             FROM subtasks s
             JOIN tasks t ON t.id = s.task_id
             JOIN blocks b ON b.id = t.block_id
             WHERE b.course_id = $1
             ORDER BY s.task_id, s.sort_order, s.id",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// Active-question counts per block of a course.
    pub async fn question_counts_by_block(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<BlockQuestionCount>, sqlx::Error> {
        sqlx::query_as::<_, BlockQuestionCount>(
            "SELECT block_id, COUNT(*) AS question_count
             FROM questions
             WHERE course_id = $1 AND block_id IS NOT NULL AND is_active
             GROUP BY block_id",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }
}
