//! Stripe checkout-session client.
//!
//! Talks to the Stripe REST API directly over [`reqwest`] using
//! form-encoded requests (Stripe does not accept JSON bodies).

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::PaymentConfig;

use super::{CheckoutGateway, CheckoutParams, CheckoutSession, PaymentError};

/// Stripe implementation of [`CheckoutGateway`].
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

/// Response body of `POST /v1/checkout/sessions` (the fields we use).
#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: String,
}

impl StripeGateway {
    /// Create a client from payment configuration.
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CheckoutGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut form: Vec<(&str, String)> = vec![
            ("mode", "payment".into()),
            ("customer_email", params.customer_email.clone()),
            (
                "line_items[0][price_data][currency]",
                params.currency.to_lowercase(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                params.course_name.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                params.amount_cents.to_string(),
            ),
            ("line_items[0][quantity]", "1".into()),
            ("metadata[user_id]", params.user_id.to_string()),
            ("metadata[course_id]", params.course_id.to_string()),
            ("success_url", params.success_url.clone()),
            ("cancel_url", params.cancel_url.clone()),
        ];
        if let Some(description) = &params.course_description {
            form.push((
                "line_items[0][price_data][product_data][description]",
                description.clone(),
            ));
        }

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api { status, body });
        }

        let session: SessionResponse = response.json().await?;
        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }
}
