//! Attempt submission and grading.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tradeprep_core::error::CoreError;
use tradeprep_core::question::{grade, parse_options, QuestionOption};
use tradeprep_core::types::DbId;
use tradeprep_db::models::question::CreateAttempt;
use tradeprep_db::repositories::{CourseRepo, QuestionRepo};

use crate::access::resolve_course_access;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AttemptRequest {
    pub selected_option_id: String,
    /// Client-measured answer time, for analytics only.
    pub response_time_ms: Option<i32>,
}

/// Full grading result, including explanations for every option.
#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub attempt_id: DbId,
    pub question_id: DbId,
    pub is_correct: bool,
    pub correct_option_id: Option<String>,
    pub selected_option: QuestionOption,
    /// All options with correctness and explanations, released only after
    /// submission.
    pub options: Vec<QuestionOption>,
}

/// `POST /api/v1/questions/{id}/attempt` -- submit and grade an answer.
///
/// The entitlement gate runs before anything else looks at the payload: a
/// locked or inaccessible question is rejected as an access error even when
/// the submitted option id is garbage. Attempts are append-only; re-answering
/// adds a row rather than replacing one.
pub async fn submit_attempt(
    State(state): State<AppState>,
    Path(question_id): Path<DbId>,
    user: AuthUser,
    Json(req): Json<AttemptRequest>,
) -> AppResult<(StatusCode, Json<AttemptResponse>)> {
    let question = QuestionRepo::find_by_id(&state.pool, question_id)
        .await?
        .ok_or_else(|| CoreError::not_found_id("Question", question_id))?;

    let decision = resolve_course_access(
        &state.pool,
        &state.config.access,
        user.user_id,
        question.course_id,
        chrono::Utc::now(),
    )
    .await?;

    if !decision.has_access {
        return Err(AppError::AccessDenied {
            tier: decision.tier,
            trial_expired: decision.trial_expired,
        });
    }

    // A question outside any block is never part of the sampler window.
    let locked = match question.block_id {
        Some(block_id) => {
            let block = CourseRepo::find_block(&state.pool, block_id, question.course_id)
                .await?
                .ok_or_else(|| CoreError::not_found_id("Block", block_id))?;
            let is_sampler = state.config.access.is_sampler_block(&block.code);
            let ordinal = QuestionRepo::ordinal_in_block(&state.pool, block_id, question.id).await?;
            tradeprep_core::access::question_locked(&decision, is_sampler, ordinal)
        }
        None => decision.sampler_block_only,
    };

    if locked {
        return Err(AppError::AccessDenied {
            tier: decision.tier,
            trial_expired: decision.trial_expired,
        });
    }

    let options = parse_options(&question.options)?;
    let graded = grade(&options, &req.selected_option_id)?;

    let attempt = QuestionRepo::record_attempt(
        &state.pool,
        &CreateAttempt {
            user_id: user.user_id,
            question_id: question.id,
            selected_option_id: graded.selected.id.clone(),
            is_correct: graded.is_correct,
            response_time_ms: req.response_time_ms,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AttemptResponse {
            attempt_id: attempt.id,
            question_id: question.id,
            is_correct: graded.is_correct,
            correct_option_id: graded.correct_option_id,
            selected_option: graded.selected,
            options,
        }),
    ))
}
