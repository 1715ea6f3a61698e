//! Entitlement resolution: access tiers, trial lifecycle math, and
//! per-question visibility.
//!
//! Everything in this module is pure. Ledger reads/writes (purchase lookup,
//! lazy trial bootstrap) live in the API layer's resolver, which feeds the
//! current time and the committed trial row into the constructors here so the
//! same decision logic is exercised by unit tests without a database.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of the one-time free trial window, in days.
pub const TRIAL_DAYS: i64 = 7;

/// Number of sampler-block questions a trial user may view and answer.
pub const TRIAL_QUESTION_LIMIT: i64 = 20;

/// Block code of the designated sampler block.
///
/// Trial access is limited to this block. It is a named configuration value
/// rather than "first block by position" so reordering blocks cannot silently
/// move the trial window.
pub const SAMPLER_BLOCK_CODE: &str = "A";

/// Milliseconds per day, used by the ceiling days-remaining computation.
const ONE_DAY_MS: i64 = 24 * 60 * 60 * 1000;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Tunable entitlement constants, loaded from the environment at startup.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    /// Trial window length in days.
    pub trial_days: i64,
    /// Question limit within the sampler block under trial.
    pub trial_question_limit: i64,
    /// Block code identifying the sampler block.
    pub sampler_block_code: String,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            trial_days: TRIAL_DAYS,
            trial_question_limit: TRIAL_QUESTION_LIMIT,
            sampler_block_code: SAMPLER_BLOCK_CODE.to_string(),
        }
    }
}

impl AccessPolicy {
    /// Whether the given block code designates the sampler block.
    pub fn is_sampler_block(&self, block_code: &str) -> bool {
        block_code == self.sampler_block_code
    }

    /// Trial expiry timestamp for a trial starting at `started_at`.
    pub fn trial_expiry(&self, started_at: Timestamp) -> Timestamp {
        started_at + chrono::Duration::days(self.trial_days)
    }
}

// ---------------------------------------------------------------------------
// Access tier and decision
// ---------------------------------------------------------------------------

/// Coarse entitlement category for a user+course pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessTier {
    /// The user purchased the course. Unlimited access.
    Owner,
    /// The user is inside their trial window. Sampler block only, limited.
    Trial,
    /// No entitlement (expired trial, or no identity presented).
    None,
}

/// The result of entitlement resolution for one user+course pair.
///
/// Computed fresh on every request and never persisted or cached, so it
/// always reflects the latest ledger state.
#[derive(Debug, Clone, Serialize)]
pub struct AccessDecision {
    pub has_access: bool,
    pub tier: AccessTier,
    /// `None` means unlimited (owner). `Some(0)` means nothing is visible.
    pub questions_limit: Option<i64>,
    pub trial_expires_at: Option<Timestamp>,
    pub trial_days_remaining: Option<i64>,
    pub trial_expired: bool,
    /// When true, only sampler-block questions (up to the limit) are visible.
    pub sampler_block_only: bool,
}

impl AccessDecision {
    /// Decision for a user who purchased the course.
    ///
    /// Ownership always wins: an expired trial never revokes a purchase, and
    /// this is the only tier with `sampler_block_only` disabled.
    pub fn owner() -> Self {
        Self {
            has_access: true,
            tier: AccessTier::Owner,
            questions_limit: None,
            trial_expires_at: None,
            trial_days_remaining: None,
            trial_expired: false,
            sampler_block_only: false,
        }
    }

    /// Decision when no identity was presented.
    ///
    /// Not an error path: absence of identity is encoded as tier `None` with
    /// `trial_expired` false, so the presentation layer can tell "never had
    /// access" apart from "trial ran out".
    pub fn unauthenticated() -> Self {
        Self {
            has_access: false,
            tier: AccessTier::None,
            questions_limit: Some(0),
            trial_expires_at: None,
            trial_days_remaining: None,
            trial_expired: false,
            sampler_block_only: true,
        }
    }

    /// Decision for a user whose trial row expires at `expires_at`.
    ///
    /// Expiry is a strict comparison: at `now == expires_at` the trial is
    /// still active. Days remaining are rounded up, so the value is never 0
    /// at any instant strictly before expiry.
    pub fn for_trial(policy: &AccessPolicy, expires_at: Timestamp, now: Timestamp) -> Self {
        if now > expires_at {
            return Self {
                has_access: false,
                tier: AccessTier::None,
                questions_limit: Some(0),
                trial_expires_at: Some(expires_at),
                trial_days_remaining: Some(0),
                trial_expired: true,
                sampler_block_only: true,
            };
        }

        Self {
            has_access: true,
            tier: AccessTier::Trial,
            questions_limit: Some(policy.trial_question_limit),
            trial_expires_at: Some(expires_at),
            trial_days_remaining: Some(trial_days_remaining(expires_at, now)),
            trial_expired: false,
            sampler_block_only: true,
        }
    }
}

/// Whole days remaining before `expires_at`, rounded up.
///
/// Ceiling rounding is deliberate UX behavior carried over from the product:
/// a user mid-day sees "1 day" rather than "0 days". Clamped at zero so the
/// expiry boundary itself reports 0.
pub fn trial_days_remaining(expires_at: Timestamp, now: Timestamp) -> i64 {
    let ms_remaining = (expires_at - now).num_milliseconds();
    if ms_remaining <= 0 {
        return 0;
    }
    (ms_remaining + ONE_DAY_MS - 1) / ONE_DAY_MS
}

// ---------------------------------------------------------------------------
// Visibility gate
// ---------------------------------------------------------------------------

/// Whether the question at zero-based `ordinal` within a block is locked.
///
/// Applied per-question, not per-block: within the sampler block under a
/// trial, the first `questions_limit` questions are individually unlocked and
/// the remainder individually locked.
pub fn question_locked(decision: &AccessDecision, is_sampler_block: bool, ordinal: i64) -> bool {
    if decision.tier == AccessTier::None {
        return true;
    }
    if !decision.sampler_block_only {
        return false;
    }
    if !is_sampler_block {
        return true;
    }
    match decision.questions_limit {
        Some(limit) => ordinal >= limit,
        None => false,
    }
}

/// Count of unlocked questions in a block of `total_in_block` questions.
///
/// Derives the same result as applying [`question_locked`] to every ordinal,
/// without materializing per-question flags. Used for summary displays.
pub fn accessible_question_count(
    decision: &AccessDecision,
    is_sampler_block: bool,
    total_in_block: i64,
) -> i64 {
    if decision.tier == AccessTier::None {
        return 0;
    }
    if !decision.sampler_block_only {
        return total_in_block;
    }
    if !is_sampler_block {
        return 0;
    }
    match decision.questions_limit {
        Some(limit) => total_in_block.min(limit),
        None => total_in_block,
    }
}

// ---------------------------------------------------------------------------
// Platform-level access summary
// ---------------------------------------------------------------------------

/// Platform-level access summary for the course catalog.
///
/// Unlike [`AccessDecision`] this is not tied to one course, and computing it
/// never bootstraps a trial: a user who has not yet touched any course is
/// reported with a prospective full-length trial.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformAccess {
    pub has_access: bool,
    pub is_trial_active: bool,
    pub trial_days_remaining: Option<i64>,
    pub purchased_course_ids: Vec<DbId>,
}

impl PlatformAccess {
    /// Summary for a user who owns at least one course.
    pub fn for_purchases(purchased_course_ids: Vec<DbId>) -> Self {
        Self {
            has_access: true,
            is_trial_active: false,
            trial_days_remaining: None,
            purchased_course_ids,
        }
    }

    /// Summary for a user with no purchases and no trial row yet.
    ///
    /// The trial will be created on first course access; until then the full
    /// window is reported.
    pub fn prospective_trial(policy: &AccessPolicy) -> Self {
        Self {
            has_access: true,
            is_trial_active: true,
            trial_days_remaining: Some(policy.trial_days),
            purchased_course_ids: Vec::new(),
        }
    }

    /// Summary for a user with no purchases and an existing trial row.
    pub fn for_trial(expires_at: Timestamp, now: Timestamp) -> Self {
        if now > expires_at {
            return Self {
                has_access: false,
                is_trial_active: false,
                trial_days_remaining: Some(0),
                purchased_course_ids: Vec::new(),
            };
        }
        Self {
            has_access: true,
            is_trial_active: true,
            trial_days_remaining: Some(trial_days_remaining(expires_at, now)),
            purchased_course_ids: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
