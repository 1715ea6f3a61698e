//! Shared helpers for HTTP-level integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use tradeprep_api::auth::jwt::JwtConfig;
use tradeprep_api::auth::password::hash_password;
use tradeprep_api::config::{PaymentConfig, ServerConfig};
use tradeprep_api::payments::{CheckoutGateway, CheckoutParams, CheckoutSession, PaymentError};
use tradeprep_api::router::build_app_router;
use tradeprep_api::state::AppState;
use tradeprep_core::access::AccessPolicy;
use tradeprep_core::types::DbId;
use tradeprep_db::models::user::{CreateUser, User};
use tradeprep_db::repositories::UserRepo;

/// Webhook secret baked into the test config, so tests can sign payloads.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Stub checkout gateway: records nothing and returns a fixed session.
pub struct StubCheckoutGateway;

#[async_trait]
impl CheckoutGateway for StubCheckoutGateway {
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<CheckoutSession, PaymentError> {
        Ok(CheckoutSession {
            id: format!("cs_test_{}_{}", params.user_id, params.course_id),
            url: "https://checkout.test/session/cs_test".to_string(),
        })
    }
}

/// Build a test `ServerConfig` with safe defaults and dummy secrets.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 30,
        },
        access: AccessPolicy::default(),
        payment: PaymentConfig {
            secret_key: "sk_test_dummy".to_string(),
            webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
            checkout_success_url: "http://localhost:5173/dashboard/courses".to_string(),
            checkout_cancel_url: "http://localhost:5173/dashboard/courses".to_string(),
            api_base: "http://payments.invalid".to_string(),
        },
    }
}

/// Build the full application router with the production middleware stack,
/// a stubbed payment gateway, and the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        payments: Arc::new(StubCheckoutGateway),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request to the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request with a Bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and a Bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with raw bytes and extra headers (webhook deliveries).
pub async fn post_raw(
    app: Router,
    uri: &str,
    body: Vec<u8>,
    headers: &[(&str, String)],
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, value);
    }
    let request = builder.body(Body::from(body)).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert status and return the JSON body in one step.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Create a user directly in the database and return the row plus the
/// plaintext password.
pub async fn seed_user(pool: &PgPool, email: &str, role: &str) -> (User, String) {
    let password = "test_password_123!";
    let hashed = hash_password(password).expect("hashing should succeed");
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: hashed,
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed");
    (user, password.to_string())
}

/// Mint a valid access token for a user without going through login.
pub fn mint_token(user: &User) -> String {
    test_config()
        .jwt
        .sign_access_token(user.id, &user.role)
        .expect("token generation should succeed")
}

/// Seeded course with its two blocks.
pub struct SeededCourse {
    pub course_id: DbId,
    pub slug: String,
    pub sampler_block_id: DbId,
    pub other_block_id: DbId,
}

/// Insert a course with a sampler block ("A") and a second block ("B").
pub async fn seed_course(pool: &PgPool, slug: &str) -> SeededCourse {
    let (course_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO courses (slug, name, description, price_cents, currency)
         VALUES ($1, $2, 'Prep course for the journeyman exam', 9900, 'usd')
         RETURNING id",
    )
    .bind(slug)
    .bind(format!("Course {slug}"))
    .fetch_one(pool)
    .await
    .expect("course insert should succeed");

    let (sampler_block_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO blocks (course_id, code, title, sort_order)
         VALUES ($1, 'A', 'Electrical Theory', 0) RETURNING id",
    )
    .bind(course_id)
    .fetch_one(pool)
    .await
    .expect("block insert should succeed");

    let (other_block_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO blocks (course_id, code, title, sort_order)
         VALUES ($1, 'B', 'Wiring Methods', 1) RETURNING id",
    )
    .bind(course_id)
    .fetch_one(pool)
    .await
    .expect("block insert should succeed");

    SeededCourse {
        course_id,
        slug: slug.to_string(),
        sampler_block_id,
        other_block_id,
    }
}

/// Insert `count` active questions into a block, returning their ids in
/// stable listing order. Option "b" is always the correct one.
pub async fn seed_questions(
    pool: &PgPool,
    course_id: DbId,
    block_id: DbId,
    count: usize,
) -> Vec<DbId> {
    let options = serde_json::json!([
        { "id": "a", "text": "10 A", "explanation": "Too low.", "is_correct": false },
        { "id": "b", "text": "15 A", "explanation": "Correct per the ampacity table.", "is_correct": true },
        { "id": "c", "text": "20 A", "explanation": "Too high.", "is_correct": false },
    ]);

    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO questions (course_id, block_id, stem, options)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(course_id)
        .bind(block_id)
        .bind(format!("Question {i}: what is the maximum breaker size?"))
        .bind(&options)
        .fetch_one(pool)
        .await
        .expect("question insert should succeed");
        ids.push(id);
    }
    ids
}

/// Insert a trial row directly, bypassing the lazy bootstrap. Used to place
/// a user at a chosen point in (or past) their trial window.
pub async fn seed_trial(
    pool: &PgPool,
    user_id: DbId,
    started_at: chrono::DateTime<chrono::Utc>,
    expires_at: chrono::DateTime<chrono::Utc>,
) {
    sqlx::query("INSERT INTO user_trials (user_id, started_at, expires_at) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(started_at)
        .bind(expires_at)
        .execute(pool)
        .await
        .expect("trial insert should succeed");
}

/// Insert a purchase row directly, bypassing the webhook path.
pub async fn seed_purchase(pool: &PgPool, user_id: DbId, course_id: DbId) {
    sqlx::query(
        "INSERT INTO course_purchases (user_id, course_id, payment_ref)
         VALUES ($1, $2, 'pi_seeded')",
    )
    .bind(user_id)
    .bind(course_id)
    .execute(pool)
    .await
    .expect("purchase insert should succeed");
}
