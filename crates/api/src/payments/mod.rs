//! Payment-processor integration: checkout-session creation and webhook
//! verification.
//!
//! The processor is reached through the [`CheckoutGateway`] trait so tests
//! can stub it; the production implementation is [`stripe::StripeGateway`].
//! Webhook signature verification and event decoding live in [`webhook`].

pub mod stripe;
pub mod webhook;

use async_trait::async_trait;
use tradeprep_core::types::DbId;

/// Errors from the payment-processor integration.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The processor returned a non-2xx status code.
    #[error("Payment API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A webhook signature failed verification.
    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),
}

/// Everything needed to open a checkout session for one course purchase.
#[derive(Debug, Clone)]
pub struct CheckoutParams {
    pub user_id: DbId,
    pub course_id: DbId,
    pub course_name: String,
    pub course_description: Option<String>,
    pub customer_email: String,
    pub amount_cents: i64,
    /// Lowercase ISO currency code, e.g. `"usd"`.
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// A checkout session created at the processor.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Processor-assigned session id.
    pub id: String,
    /// Hosted checkout page URL the client is redirected to.
    pub url: String,
}

/// Client for the payment processor's checkout API.
///
/// The user and course ids ride along as session metadata and come back on
/// the `checkout.session.completed` webhook, which is the only channel that
/// writes the purchase ledger.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Create a hosted checkout session for a one-time course purchase.
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<CheckoutSession, PaymentError>;
}
