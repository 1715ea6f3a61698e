//! Question option parsing and answer grading.
//!
//! Question options are stored as a JSONB array on the `questions` row.
//! This module decodes that array and grades a submitted option id against
//! it. Grading is only reached after the access check has passed: a locked
//! question is rejected as an access error before the option id is ever
//! looked at, so an invalid selection here is always a plain validation
//! error.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One answer option of a multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    pub explanation: String,
    pub is_correct: bool,
}

/// Result of grading a submitted option against a question's options.
#[derive(Debug, Clone)]
pub struct GradedAnswer {
    pub selected: QuestionOption,
    /// Id of the correct option, if the stored data has one.
    pub correct_option_id: Option<String>,
    pub is_correct: bool,
}

/// Decode the JSONB `options` column into typed options.
pub fn parse_options(value: &serde_json::Value) -> Result<Vec<QuestionOption>, CoreError> {
    serde_json::from_value(value.clone())
        .map_err(|e| CoreError::Internal(format!("Malformed question options: {e}")))
}

/// Grade a submitted option id.
///
/// Returns a validation error when `selected_option_id` does not match any
/// option of the question.
pub fn grade(
    options: &[QuestionOption],
    selected_option_id: &str,
) -> Result<GradedAnswer, CoreError> {
    let selected = options
        .iter()
        .find(|opt| opt.id == selected_option_id)
        .cloned()
        .ok_or_else(|| CoreError::Validation("Invalid option selected".into()))?;

    let correct_option_id = options
        .iter()
        .find(|opt| opt.is_correct)
        .map(|opt| opt.id.clone());

    let is_correct = selected.is_correct;

    Ok(GradedAnswer {
        selected,
        correct_option_id,
        is_correct,
    })
}
