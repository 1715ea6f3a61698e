//! Authentication handlers: signup, login, token refresh, logout.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tradeprep_core::error::CoreError;
use tradeprep_core::roles;
use tradeprep_db::models::user::{CreateUser, UserResponse};
use tradeprep_db::models::session::CreateSession;
use tradeprep_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::{new_refresh_token, refresh_token_digest};
use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Failed logins before the account is temporarily locked.
const MAX_FAILED_LOGINS: i32 = 5;

/// Lockout duration after too many failed logins.
const LOCKOUT_MINUTES: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `POST /api/v1/auth/signup` -- register a new account.
///
/// New accounts start as guests; the role changes only on first purchase.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()).into());
    }
    let email = req.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(CoreError::Validation("Invalid email address".into()).into());
    }
    validate_password_strength(&req.password, MIN_PASSWORD_LENGTH)
        .map_err(CoreError::Validation)?;

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(CoreError::Conflict("Email is already registered".into()).into());
    }

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: name.to_string(),
            email,
            password_hash,
            role: roles::ROLE_GUEST.to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User signed up");

    let (access_token, refresh_token) = issue_tokens(&state, user.id, &user.role).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserResponse::from(&user),
            access_token,
            refresh_token,
        }),
    ))
}

/// `POST /api/v1/auth/login` -- authenticate with email and password.
///
/// Uses a deliberately uniform error message so credential probing cannot
/// distinguish "no such account" from "wrong password". Repeated failures
/// lock the account for [`LOCKOUT_MINUTES`].
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = req.email.trim().to_lowercase();

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Invalid email or password".into()))?;

    if !user.is_active {
        return Err(CoreError::Forbidden("Account is deactivated".into()).into());
    }

    let now = chrono::Utc::now();
    let mut prior_failures = user.failed_login_count;
    if let Some(locked_until) = user.locked_until {
        if locked_until > now {
            return Err(CoreError::Forbidden(
                "Account temporarily locked due to repeated failed logins".into(),
            )
            .into());
        }
        // The lockout has lapsed; earlier failures no longer count, otherwise
        // a single wrong password would re-lock the account immediately.
        UserRepo::clear_lockout(&state.pool, user.id).await?;
        prior_failures = 0;
    }

    let valid = crate::auth::password::verify_password(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;

    if !valid {
        UserRepo::increment_failed_login(&state.pool, user.id).await?;
        if prior_failures + 1 >= MAX_FAILED_LOGINS {
            let locked_until = now + chrono::Duration::minutes(LOCKOUT_MINUTES);
            UserRepo::lock_account(&state.pool, user.id, locked_until).await?;
            tracing::warn!(user_id = user.id, "Account locked after repeated failed logins");
        }
        return Err(CoreError::Unauthorized("Invalid email or password".into()).into());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let (access_token, refresh_token) = issue_tokens(&state, user.id, &user.role).await?;

    Ok(Json(AuthResponse {
        user: UserResponse::from(&user),
        access_token,
        refresh_token,
    }))
}

/// `POST /api/v1/auth/refresh` -- rotate a refresh token into a new token pair.
///
/// The presented token's session is revoked and a fresh session created, so
/// each refresh token is single-use.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<TokenPairResponse>> {
    let hash = refresh_token_digest(&req.refresh_token);

    let session = SessionRepo::find_active_by_hash(&state.pool, &hash)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Invalid or expired refresh token".into()))?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Invalid or expired refresh token".into()))?;

    if !user.is_active {
        return Err(CoreError::Forbidden("Account is deactivated".into()).into());
    }

    SessionRepo::revoke(&state.pool, session.id).await?;

    let (access_token, refresh_token) = issue_tokens(&state, user.id, &user.role).await?;

    Ok(Json(TokenPairResponse {
        access_token,
        refresh_token,
    }))
}

/// `POST /api/v1/auth/logout` -- revoke all of the caller's sessions.
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<serde_json::Value>> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, user.user_id).await?;
    tracing::info!(user_id = user.user_id, revoked, "User logged out");
    Ok(Json(serde_json::json!({ "revoked_sessions": revoked })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Mint an access token and persist a new refresh-token session.
async fn issue_tokens(
    state: &AppState,
    user_id: tradeprep_core::types::DbId,
    role: &str,
) -> AppResult<(String, String)> {
    let access_token = state
        .config
        .jwt
        .sign_access_token(user_id, role)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    let (refresh_token, refresh_hash) = new_refresh_token();
    let expires_at =
        chrono::Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id,
            refresh_token_hash: refresh_hash,
            expires_at,
            user_agent: None,
            ip_address: None,
        },
    )
    .await?;

    Ok((access_token, refresh_token))
}
