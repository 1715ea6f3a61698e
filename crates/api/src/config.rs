use tradeprep_core::access::{self, AccessPolicy};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except secrets have sensible defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    #[allow(dead_code)]
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Entitlement constants (trial length, question limit, sampler block).
    pub access: AccessPolicy,
    /// Payment processor configuration (API keys, webhook secret, URLs).
    pub payment: PaymentConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            access: load_access_policy(),
            payment: PaymentConfig::from_env(),
        }
    }
}

/// Load entitlement constants from the environment.
///
/// | Env Var                | Default |
/// |------------------------|---------|
/// | `TRIAL_DAYS`           | `7`     |
/// | `TRIAL_QUESTION_LIMIT` | `20`    |
/// | `SAMPLER_BLOCK_CODE`   | `A`     |
fn load_access_policy() -> AccessPolicy {
    let trial_days: i64 = std::env::var("TRIAL_DAYS")
        .unwrap_or_else(|_| access::TRIAL_DAYS.to_string())
        .parse()
        .expect("TRIAL_DAYS must be a valid i64");

    let trial_question_limit: i64 = std::env::var("TRIAL_QUESTION_LIMIT")
        .unwrap_or_else(|_| access::TRIAL_QUESTION_LIMIT.to_string())
        .parse()
        .expect("TRIAL_QUESTION_LIMIT must be a valid i64");

    let sampler_block_code =
        std::env::var("SAMPLER_BLOCK_CODE").unwrap_or_else(|_| access::SAMPLER_BLOCK_CODE.into());

    AccessPolicy {
        trial_days,
        trial_question_limit,
        sampler_block_code,
    }
}

/// Payment processor configuration.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Secret API key used for the checkout-session API.
    pub secret_key: String,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: String,
    /// Base URL the course slug is appended to for post-checkout redirects.
    pub checkout_success_url: String,
    /// Base URL the course slug is appended to when checkout is cancelled.
    pub checkout_cancel_url: String,
    /// Payment processor API base (overridable for local mocks).
    pub api_base: String,
}

impl PaymentConfig {
    /// Load payment configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default                                  |
    /// |--------------------------|----------|------------------------------------------|
    /// | `PAYMENT_SECRET_KEY`     | **yes**  | --                                       |
    /// | `PAYMENT_WEBHOOK_SECRET` | **yes**  | --                                       |
    /// | `CHECKOUT_SUCCESS_URL`   | no       | `http://localhost:5173/dashboard/courses`|
    /// | `CHECKOUT_CANCEL_URL`    | no       | `http://localhost:5173/dashboard/courses`|
    /// | `PAYMENT_API_BASE`       | no       | `https://api.stripe.com`                 |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is not set.
    pub fn from_env() -> Self {
        let secret_key = std::env::var("PAYMENT_SECRET_KEY")
            .expect("PAYMENT_SECRET_KEY must be set in the environment");
        let webhook_secret = std::env::var("PAYMENT_WEBHOOK_SECRET")
            .expect("PAYMENT_WEBHOOK_SECRET must be set in the environment");

        let checkout_success_url = std::env::var("CHECKOUT_SUCCESS_URL")
            .unwrap_or_else(|_| "http://localhost:5173/dashboard/courses".into());
        let checkout_cancel_url = std::env::var("CHECKOUT_CANCEL_URL")
            .unwrap_or_else(|_| "http://localhost:5173/dashboard/courses".into());

        let api_base = std::env::var("PAYMENT_API_BASE")
            .unwrap_or_else(|_| "https://api.stripe.com".into());

        Self {
            secret_key,
            webhook_secret,
            checkout_success_url,
            checkout_cancel_url,
            api_base,
        }
    }
}
