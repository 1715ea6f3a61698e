//! HTTP-level integration tests for signup, login, token refresh, and logout.

mod common;

use axum::http::StatusCode;
use common::{body_json, expect_json, post_json, post_json_auth, seed_user};
use sqlx::PgPool;
use tradeprep_core::roles;

/// Log in via the API and return the JSON response.
async fn login(app: axum::Router, email: &str, password: &str) -> serde_json::Value {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn signup_creates_guest_and_returns_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "name": "New Student",
        "email": "student@test.com",
        "password": "a-long-enough-password"
    });
    let json = expect_json(
        post_json(app, "/api/v1/auth/signup", body).await,
        StatusCode::CREATED,
    )
    .await;

    assert_eq!(json["user"]["email"], "student@test.com");
    assert_eq!(json["user"]["role"], roles::ROLE_GUEST);
    assert!(json["user"].get("password_hash").is_none());
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn signup_rejects_duplicate_email(pool: PgPool) {
    seed_user(&pool, "taken@test.com", roles::ROLE_GUEST).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "name": "Second",
        "email": "taken@test.com",
        "password": "a-long-enough-password"
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn signup_validates_input(pool: PgPool) {
    let app = common::build_test_app(pool);

    for body in [
        serde_json::json!({ "name": "", "email": "x@test.com", "password": "long-enough-pw" }),
        serde_json::json!({ "name": "X", "email": "not-an-email", "password": "long-enough-pw" }),
        serde_json::json!({ "name": "X", "email": "x@test.com", "password": "short" }),
    ] {
        let response = post_json(app.clone(), "/api/v1/auth/signup", body.clone()).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "body {body} must be rejected"
        );
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_success_returns_tokens_and_user(pool: PgPool) {
    let (user, password) = seed_user(&pool, "login@test.com", roles::ROLE_USER).await;
    let app = common::build_test_app(pool);

    let json = login(app, "login@test.com", &password).await;

    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], roles::ROLE_USER);
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_wrong_password_returns_401(pool: PgPool) {
    seed_user(&pool, "wrongpw@test.com", roles::ROLE_GUEST).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "wrongpw@test.com", "password": "incorrect" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_nonexistent_user_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "ghost@test.com", "password": "whatever" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn repeated_failures_lock_the_account(pool: PgPool) {
    let (_user, password) = seed_user(&pool, "lockme@test.com", roles::ROLE_GUEST).await;
    let app = common::build_test_app(pool);

    for _ in 0..5 {
        let body = serde_json::json!({ "email": "lockme@test.com", "password": "incorrect" });
        let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the correct password is rejected while the account is locked.
    let body = serde_json::json!({ "email": "lockme@test.com", "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn lapsed_lockout_starts_a_fresh_failure_count(pool: PgPool) {
    let (user, password) = seed_user(&pool, "patient@test.com", roles::ROLE_GUEST).await;
    let app = common::build_test_app(pool.clone());

    for _ in 0..5 {
        let body = serde_json::json!({ "email": "patient@test.com", "password": "incorrect" });
        let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Move the lockout into the past, as if the window had elapsed.
    sqlx::query("UPDATE users SET locked_until = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    // One more wrong guess counts as the first of a new series, not the
    // sixth of the old one, so the account is not re-locked.
    let body = serde_json::json!({ "email": "patient@test.com", "password": "incorrect" });
    let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = serde_json::json!({ "email": "patient@test.com", "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Refresh and logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_the_token(pool: PgPool) {
    let (_user, password) = seed_user(&pool, "refresher@test.com", roles::ROLE_USER).await;
    let app = common::build_test_app(pool);

    let json = login(app.clone(), "refresher@test.com", &password).await;
    let refresh_token = json["refresh_token"].as_str().unwrap().to_string();

    let body = serde_json::json!({ "refresh_token": refresh_token });
    let json = expect_json(
        post_json(app.clone(), "/api/v1/auth/refresh", body.clone()).await,
        StatusCode::OK,
    )
    .await;
    assert!(json["access_token"].is_string());
    assert_ne!(json["refresh_token"].as_str().unwrap(), refresh_token);

    // The old refresh token is single-use.
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_sessions(pool: PgPool) {
    let (_user, password) = seed_user(&pool, "leaver@test.com", roles::ROLE_USER).await;
    let app = common::build_test_app(pool);

    let json = login(app.clone(), "leaver@test.com", &password).await;
    let access_token = json["access_token"].as_str().unwrap().to_string();
    let refresh_token = json["refresh_token"].as_str().unwrap().to_string();

    let json = expect_json(
        post_json_auth(
            app.clone(),
            "/api/v1/auth/logout",
            &access_token,
            serde_json::json!({}),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["revoked_sessions"], 1);

    // The refresh token no longer works after logout.
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/logout", serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
