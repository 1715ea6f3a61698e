//! Course catalog, course detail, checkout, and the gated question listing.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tradeprep_core::access::{
    accessible_question_count, question_locked, AccessDecision, PlatformAccess,
};
use tradeprep_core::error::CoreError;
use tradeprep_core::question::parse_options;
use tradeprep_core::types::DbId;
use tradeprep_db::models::course::{Block, CourseSummary, Subtask, Task};
use tradeprep_db::models::question::QuestionAttempt;
use tradeprep_db::repositories::{CourseRepo, PurchaseRepo, QuestionRepo};

use crate::access::{resolve_course_access, resolve_platform_access};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::payments::CheckoutParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One catalog entry: course summary plus whether the caller owns it.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub course: CourseSummary,
    pub owned: bool,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub courses: Vec<CatalogEntry>,
    /// `None` for anonymous visitors.
    pub platform_access: Option<PlatformAccess>,
}

/// `GET /api/v1/courses` -- list active courses.
///
/// Anonymous and signed-in callers both get the catalog; only signed-in
/// callers get ownership flags and the platform access summary. Browsing
/// the catalog never starts a trial.
pub async fn list_courses(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
) -> AppResult<Json<CatalogResponse>> {
    let summaries = CourseRepo::list_active_with_stats(&state.pool).await?;

    let platform_access = match &user {
        Some(user) => Some(
            resolve_platform_access(
                &state.pool,
                &state.config.access,
                user.user_id,
                chrono::Utc::now(),
            )
            .await?,
        ),
        None => None,
    };

    let owned_ids: Vec<DbId> = platform_access
        .as_ref()
        .map(|pa| pa.purchased_course_ids.clone())
        .unwrap_or_default();

    let courses = summaries
        .into_iter()
        .map(|course| CatalogEntry {
            owned: owned_ids.contains(&course.id),
            course,
        })
        .collect();

    Ok(Json(CatalogResponse {
        courses,
        platform_access,
    }))
}

// ---------------------------------------------------------------------------
// Course detail
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Subtask>,
}

#[derive(Debug, Serialize)]
pub struct BlockDetail {
    #[serde(flatten)]
    pub block: Block,
    pub question_count: i64,
    pub accessible_question_count: i64,
    pub tasks: Vec<TaskDetail>,
    /// Caller's attempted/correct counts within this block, when signed in.
    pub attempted: i64,
    pub correct: i64,
}

#[derive(Debug, Serialize)]
pub struct CourseDetailResponse {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub currency: String,
    pub blocks: Vec<BlockDetail>,
    /// `None` for anonymous visitors.
    pub access: Option<AccessDecision>,
}

/// `GET /api/v1/courses/{id_or_slug}` -- full course outline with access state.
///
/// Opening a course IS course access: a signed-in caller with no purchase
/// and no trial row gets their trial started here.
pub async fn course_detail(
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
    OptionalAuthUser(user): OptionalAuthUser,
) -> AppResult<Json<CourseDetailResponse>> {
    let course = CourseRepo::find_by_id_or_slug(&state.pool, &id_or_slug)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| CoreError::NotFound {
            entity: "Course",
            key: id_or_slug.clone(),
        })?;

    let access = match &user {
        Some(user) => Some(
            resolve_course_access(
                &state.pool,
                &state.config.access,
                user.user_id,
                course.id,
                chrono::Utc::now(),
            )
            .await?,
        ),
        None => None,
    };
    let decision = access.clone().unwrap_or_else(AccessDecision::unauthenticated);

    let blocks = CourseRepo::blocks(&state.pool, course.id).await?;
    let tasks = CourseRepo::tasks_for_course(&state.pool, course.id).await?;
    let subtasks = CourseRepo::subtasks_for_course(&state.pool, course.id).await?;

    let counts: HashMap<DbId, i64> = CourseRepo::question_counts_by_block(&state.pool, course.id)
        .await?
        .into_iter()
        .map(|c| (c.block_id, c.question_count))
        .collect();

    let progress: HashMap<DbId, (i64, i64)> = match &user {
        Some(user) => QuestionRepo::progress_by_block(&state.pool, user.user_id, course.id)
            .await?
            .into_iter()
            .map(|p| (p.block_id, (p.attempted, p.correct)))
            .collect(),
        None => HashMap::new(),
    };

    let mut subtasks_by_task: HashMap<DbId, Vec<Subtask>> = HashMap::new();
    for subtask in subtasks {
        subtasks_by_task.entry(subtask.task_id).or_default().push(subtask);
    }
    let mut tasks_by_block: HashMap<DbId, Vec<TaskDetail>> = HashMap::new();
    for task in tasks {
        let subtasks = subtasks_by_task.remove(&task.id).unwrap_or_default();
        tasks_by_block
            .entry(task.block_id)
            .or_default()
            .push(TaskDetail { task, subtasks });
    }

    let blocks = blocks
        .into_iter()
        .map(|block| {
            let question_count = counts.get(&block.id).copied().unwrap_or(0);
            let is_sampler = state.config.access.is_sampler_block(&block.code);
            let (attempted, correct) = progress.get(&block.id).copied().unwrap_or((0, 0));
            BlockDetail {
                question_count,
                accessible_question_count: accessible_question_count(
                    &decision,
                    is_sampler,
                    question_count,
                ),
                tasks: tasks_by_block.remove(&block.id).unwrap_or_default(),
                attempted,
                correct,
                block,
            }
        })
        .collect();

    Ok(Json(CourseDetailResponse {
        id: course.id,
        slug: course.slug,
        name: course.name,
        description: course.description,
        price_cents: course.price_cents,
        currency: course.currency,
        blocks,
        access,
    }))
}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Hosted checkout page the client redirects to.
    pub url: String,
}

/// `POST /api/v1/courses/{id_or_slug}/purchase` -- open a checkout session.
///
/// The purchase itself is recorded only when the processor's webhook
/// confirms payment; this endpoint never writes the purchase ledger.
pub async fn purchase_course(
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
    user: AuthUser,
) -> AppResult<Json<CheckoutResponse>> {
    let course = CourseRepo::find_by_id_or_slug(&state.pool, &id_or_slug)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| CoreError::NotFound {
            entity: "Course",
            key: id_or_slug.clone(),
        })?;

    if PurchaseRepo::exists(&state.pool, user.user_id, course.id).await? {
        return Err(CoreError::Conflict("Course already purchased".into()).into());
    }

    let db_user = tradeprep_db::repositories::UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found_id("User", user.user_id))?;

    let payment = &state.config.payment;
    let success_url = format!(
        "{}/{}?success=true",
        payment.checkout_success_url.trim_end_matches('/'),
        course.slug
    );
    let cancel_url = format!(
        "{}/{}?canceled=true",
        payment.checkout_cancel_url.trim_end_matches('/'),
        course.slug
    );

    let session = state
        .payments
        .create_checkout_session(&CheckoutParams {
            user_id: user.user_id,
            course_id: course.id,
            course_name: course.name.clone(),
            course_description: course.description.clone(),
            customer_email: db_user.email,
            amount_cents: i64::from(course.price_cents),
            currency: course.currency.to_lowercase(),
            success_url,
            cancel_url,
        })
        .await?;

    tracing::info!(
        user_id = user.user_id,
        course_id = course.id,
        session_id = %session.id,
        "Checkout session created"
    );

    Ok(Json(CheckoutResponse { url: session.url }))
}

// ---------------------------------------------------------------------------
// Gated question listing
// ---------------------------------------------------------------------------

/// Answer option as exposed in listings: no correctness, no explanation.
#[derive(Debug, Serialize)]
pub struct PublicOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionListItem {
    pub id: DbId,
    pub stem: String,
    pub options: Vec<PublicOption>,
    pub is_locked: bool,
    /// Caller's most recent attempt at this question, if any.
    pub user_attempt: Option<QuestionAttempt>,
}

/// Access summary attached to a question listing.
#[derive(Debug, Serialize)]
pub struct BlockAccessView {
    #[serde(flatten)]
    pub decision: AccessDecision,
    pub is_sampler_block: bool,
    /// True when the whole block is out of trial reach.
    pub block_locked_for_trial: bool,
}

#[derive(Debug, Serialize)]
pub struct BlockStats {
    pub answered: i64,
    pub correct: i64,
    /// Percentage of answered attempts that were correct, rounded.
    pub accuracy: i64,
}

#[derive(Debug, Serialize)]
pub struct BlockQuestionsResponse {
    pub block_id: DbId,
    pub block_code: String,
    pub block_title: String,
    pub questions: Vec<QuestionListItem>,
    pub total_questions: i64,
    pub accessible_questions: i64,
    pub access: BlockAccessView,
    pub stats: BlockStats,
}

/// `GET /api/v1/courses/{id_or_slug}/blocks/{block_id}/questions`
///
/// Requires authentication and an access-granting tier. Lock state is
/// computed per question: under a trial, the first `questions_limit`
/// questions of the sampler block are open and everything else is locked.
/// Locked questions still appear in the listing (with their options) so the
/// client can render the upsell view, but correctness and explanations are
/// never included here for any question.
pub async fn block_questions(
    State(state): State<AppState>,
    Path((id_or_slug, block_id)): Path<(String, DbId)>,
    user: AuthUser,
) -> AppResult<Json<BlockQuestionsResponse>> {
    let course = CourseRepo::find_by_id_or_slug(&state.pool, &id_or_slug)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| CoreError::NotFound {
            entity: "Course",
            key: id_or_slug.clone(),
        })?;

    let block = CourseRepo::find_block(&state.pool, block_id, course.id)
        .await?
        .ok_or_else(|| CoreError::not_found_id("Block", block_id))?;

    let decision = resolve_course_access(
        &state.pool,
        &state.config.access,
        user.user_id,
        course.id,
        chrono::Utc::now(),
    )
    .await?;

    if !decision.has_access {
        return Err(AppError::AccessDenied {
            tier: decision.tier,
            trial_expired: decision.trial_expired,
        });
    }

    let is_sampler = state.config.access.is_sampler_block(&block.code);

    let questions = QuestionRepo::list_by_block(&state.pool, block.id).await?;
    let mut attempts: HashMap<DbId, QuestionAttempt> =
        QuestionRepo::latest_attempts_in_block(&state.pool, user.user_id, block.id)
            .await?
            .into_iter()
            .map(|a| (a.question_id, a))
            .collect();

    let total_questions = questions.len() as i64;
    let accessible_questions = accessible_question_count(&decision, is_sampler, total_questions);
    let mut items = Vec::with_capacity(questions.len());
    for (ordinal, question) in questions.into_iter().enumerate() {
        let options = parse_options(&question.options)?
            .into_iter()
            .map(|opt| PublicOption {
                id: opt.id,
                text: opt.text,
            })
            .collect();
        items.push(QuestionListItem {
            id: question.id,
            stem: question.stem,
            options,
            is_locked: question_locked(&decision, is_sampler, ordinal as i64),
            user_attempt: attempts.remove(&question.id),
        });
    }

    let stats = QuestionRepo::block_attempt_stats(&state.pool, user.user_id, block.id).await?;
    let accuracy = if stats.answered > 0 {
        ((stats.correct as f64 / stats.answered as f64) * 100.0).round() as i64
    } else {
        0
    };

    let block_locked_for_trial = decision.sampler_block_only && !is_sampler;

    Ok(Json(BlockQuestionsResponse {
        block_id: block.id,
        block_code: block.code.clone(),
        block_title: block.title,
        questions: items,
        total_questions,
        accessible_questions,
        access: BlockAccessView {
            decision,
            is_sampler_block: is_sampler,
            block_locked_for_trial,
        },
        stats: BlockStats {
            answered: stats.answered,
            correct: stats.correct,
            accuracy,
        },
    }))
}
