//! Entitlement resolution against the ledgers.
//!
//! The pure decision logic lives in `tradeprep_core::access`; this module
//! supplies it with ledger state. Precedence is fixed: ownership first, then
//! the trial window. `now` is an explicit parameter so boundary behavior can
//! be tested with controlled clocks.

use tradeprep_core::access::{AccessDecision, AccessPolicy, PlatformAccess};
use tradeprep_core::types::{DbId, Timestamp};
use tradeprep_db::repositories::{PurchaseRepo, TrialRepo};
use tradeprep_db::DbPool;

/// Resolve the access decision for one user+course pair.
///
/// Checks the purchase ledger first (ownership always wins and never touches
/// the trial ledger). Otherwise the user is on the trial path: an existing
/// trial row is evaluated as-is, and a user with no row yet gets one created
/// here. The bootstrap is the only write in the entitlement path, and the
/// decision is always computed from the committed row, so concurrent
/// first-touch requests agree on the same expiry.
pub async fn resolve_course_access(
    pool: &DbPool,
    policy: &AccessPolicy,
    user_id: DbId,
    course_id: DbId,
    now: Timestamp,
) -> Result<AccessDecision, sqlx::Error> {
    if PurchaseRepo::exists(pool, user_id, course_id).await? {
        return Ok(AccessDecision::owner());
    }

    let trial = match TrialRepo::find_by_user(pool, user_id).await? {
        Some(trial) => trial,
        None => {
            let trial =
                TrialRepo::bootstrap(pool, user_id, now, policy.trial_expiry(now)).await?;
            tracing::info!(
                user_id,
                expires_at = %trial.expires_at,
                "Trial started"
            );
            trial
        }
    };

    Ok(AccessDecision::for_trial(policy, trial.expires_at, now))
}

/// Resolve the platform-level access summary for the course catalog.
///
/// Never bootstraps a trial: browsing the catalog is not course access, so a
/// user who has not opened any course keeps their untouched trial window and
/// is reported with the full prospective length.
pub async fn resolve_platform_access(
    pool: &DbPool,
    policy: &AccessPolicy,
    user_id: DbId,
    now: Timestamp,
) -> Result<PlatformAccess, sqlx::Error> {
    let purchased = PurchaseRepo::course_ids_for_user(pool, user_id).await?;
    if !purchased.is_empty() {
        return Ok(PlatformAccess::for_purchases(purchased));
    }

    match TrialRepo::find_by_user(pool, user_id).await? {
        Some(trial) => Ok(PlatformAccess::for_trial(trial.expires_at, now)),
        None => Ok(PlatformAccess::prospective_trial(policy)),
    }
}
