//! Database tests for the trial and purchase ledgers: bootstrap races,
//! purchase idempotency, and role promotion.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tradeprep_core::roles;
use tradeprep_core::types::DbId;
use tradeprep_db::repositories::{PurchaseRepo, TrialRepo};

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str, role: &str) -> DbId {
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO users (name, email, password_hash, role)
         VALUES ($1, $2, 'x', $3) RETURNING id",
    )
    .bind(email.split('@').next().unwrap())
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("user seed should insert");
    id
}

async fn seed_course(pool: &PgPool, slug: &str) -> DbId {
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO courses (slug, name, price_cents) VALUES ($1, $2, 9900) RETURNING id",
    )
    .bind(slug)
    .bind(slug.to_uppercase())
    .fetch_one(pool)
    .await
    .expect("course seed should insert");
    id
}

async fn trial_count(pool: &PgPool, user_id: DbId) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM user_trials WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap();
    count
}

async fn purchase_count(pool: &PgPool, user_id: DbId, course_id: DbId) -> i64 {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM course_purchases WHERE user_id = $1 AND course_id = $2",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(pool)
    .await
    .unwrap();
    count
}

async fn user_role(pool: &PgPool, user_id: DbId) -> String {
    let (role,): (String,) = sqlx::query_as("SELECT role FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap();
    role
}

// ---------------------------------------------------------------------------
// Trial ledger
// ---------------------------------------------------------------------------

/// A repeated bootstrap never creates a second row or moves the expiry,
/// even when the retry carries a later timestamp.
#[sqlx::test(migrations = "./migrations")]
async fn trial_bootstrap_is_idempotent(pool: PgPool) {
    let user_id = seed_user(&pool, "first@test.com", roles::ROLE_GUEST).await;

    let now = Utc::now();
    let first = TrialRepo::bootstrap(&pool, user_id, now, now + Duration::days(7))
        .await
        .unwrap();

    let later = now + Duration::hours(3);
    let second = TrialRepo::bootstrap(&pool, user_id, later, later + Duration::days(7))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.expires_at, second.expires_at, "expiry must never move");
    assert_eq!(trial_count(&pool, user_id).await, 1);
}

/// Two concurrent bootstraps commit exactly one row, and both callers
/// observe the same expiry.
#[sqlx::test(migrations = "./migrations")]
async fn trial_bootstrap_race_converges(pool: PgPool) {
    let user_id = seed_user(&pool, "racer@test.com", roles::ROLE_GUEST).await;

    let now = Utc::now();
    let a = TrialRepo::bootstrap(&pool, user_id, now, now + Duration::days(7));
    let b = TrialRepo::bootstrap(&pool, user_id, now, now + Duration::days(7));
    let (a, b) = tokio::join!(a, b);

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.id, b.id);
    assert_eq!(a.expires_at, b.expires_at);
    assert_eq!(trial_count(&pool, user_id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn trial_find_returns_none_for_fresh_user(pool: PgPool) {
    let user_id = seed_user(&pool, "fresh@test.com", roles::ROLE_GUEST).await;
    assert!(TrialRepo::find_by_user(&pool, user_id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Purchase ledger
// ---------------------------------------------------------------------------

/// A retried checkout with a different payment reference must not create
/// a second purchase row. The original reference is retained for audit.
#[sqlx::test(migrations = "./migrations")]
async fn purchase_is_idempotent_across_payment_refs(pool: PgPool) {
    let user_id = seed_user(&pool, "buyer@test.com", roles::ROLE_GUEST).await;
    let course_id = seed_course(&pool, "electrician").await;

    let now = Utc::now();
    let first = PurchaseRepo::record(&pool, user_id, course_id, now, Some("pi_123"))
        .await
        .unwrap();
    let second = PurchaseRepo::record(&pool, user_id, course_id, now, Some("pi_456"))
        .await
        .unwrap();

    assert!(first, "first delivery writes the ledger");
    assert!(!second, "replay is a no-op, not an error");
    assert_eq!(purchase_count(&pool, user_id, course_id).await, 1);

    let purchase = PurchaseRepo::find(&pool, user_id, course_id)
        .await
        .unwrap()
        .expect("purchase row must exist");
    assert_eq!(purchase.payment_ref.as_deref(), Some("pi_123"));
}

#[sqlx::test(migrations = "./migrations")]
async fn purchase_promotes_guest_to_user_once(pool: PgPool) {
    let user_id = seed_user(&pool, "guest@test.com", roles::ROLE_GUEST).await;
    let course_a = seed_course(&pool, "plumber").await;
    let course_b = seed_course(&pool, "welder").await;

    let now = Utc::now();
    PurchaseRepo::record(&pool, user_id, course_a, now, None)
        .await
        .unwrap();
    assert_eq!(user_role(&pool, user_id).await, roles::ROLE_USER);

    // A second purchase leaves the role alone.
    PurchaseRepo::record(&pool, user_id, course_b, now, Some("pi_789"))
        .await
        .unwrap();
    assert_eq!(user_role(&pool, user_id).await, roles::ROLE_USER);
}

#[sqlx::test(migrations = "./migrations")]
async fn purchase_does_not_demote_admin(pool: PgPool) {
    let user_id = seed_user(&pool, "admin@test.com", roles::ROLE_ADMIN).await;
    let course_id = seed_course(&pool, "millwright").await;

    PurchaseRepo::record(&pool, user_id, course_id, Utc::now(), None)
        .await
        .unwrap();
    assert_eq!(user_role(&pool, user_id).await, roles::ROLE_ADMIN);
}

#[sqlx::test(migrations = "./migrations")]
async fn purchase_lookups(pool: PgPool) {
    let user_id = seed_user(&pool, "owner@test.com", roles::ROLE_GUEST).await;
    let course_a = seed_course(&pool, "hvac").await;
    let course_b = seed_course(&pool, "crane").await;

    assert!(!PurchaseRepo::exists(&pool, user_id, course_a).await.unwrap());

    PurchaseRepo::record(&pool, user_id, course_a, Utc::now(), None)
        .await
        .unwrap();

    assert!(PurchaseRepo::exists(&pool, user_id, course_a).await.unwrap());
    assert!(!PurchaseRepo::exists(&pool, user_id, course_b).await.unwrap());
    assert_eq!(
        PurchaseRepo::course_ids_for_user(&pool, user_id).await.unwrap(),
        vec![course_a]
    );
}
