//! Checkout-provider client for mobile-money wallet top-ups.
//!
//! Talks to the external payment provider over HTTPS. The provider redirects
//! the payer back to our receipt/cancel callbacks once the session resolves;
//! the session id doubles as the external reference that makes the receipt
//! callback idempotent.

use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::config::CheckoutConfig;
use crate::types::Money;

/// Checkout service errors.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Failed to reach the provider.
    #[error("Failed to reach checkout provider: {0}")]
    Request(String),
    /// Provider answered but refused to create a session.
    #[error("Checkout session rejected: {0}")]
    Rejected(String),
    /// Provider response did not have the expected shape.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

/// A created checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// External reference for this payment, unique per session.
    pub reference: String,
    /// URL the payer is redirected to.
    pub checkout_url: String,
}

/// Client for the external checkout provider.
#[derive(Clone)]
pub struct CheckoutService {
    config: CheckoutConfig,
    client: reqwest::Client,
}

impl CheckoutService {
    /// Creates a new checkout service.
    #[must_use]
    pub fn new(config: CheckoutConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Creates a provider checkout session for topping up a user's wallet.
    ///
    /// This call never runs inside a store transaction; the wallet is only
    /// credited later, when the provider hits the receipt callback.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unreachable or rejects the session.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        amount: Money,
    ) -> Result<CheckoutSession, CheckoutError> {
        let reference = Uuid::new_v4().to_string();
        let base = &self.config.redirect_base_url;
        let value = amount.amount;

        let body = json!({
            "clientReference": user_id.to_string(),
            "bulk": {
                "amount": {
                    "currency": amount.currency.to_string(),
                    "value": value.to_string(),
                }
            },
            "cancelUrl": format!("{base}/api/v1/topups/cancel?user_id={user_id}&amount={value}"),
            "receiptUrl": format!(
                "{base}/api/v1/topups/receipt?user_id={user_id}&amount={value}&reference={reference}"
            ),
        });

        let response = self
            .client
            .post(&self.config.checkout_url)
            .header("X-Space-Id", &self.config.space_id)
            .header("X-Idempotency-Key", &reference)
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CheckoutError::Request(e.to_string()))?;

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CheckoutError::MalformedResponse(e.to_string()))?;

        if payload["success"].as_bool() != Some(true) {
            return Err(CheckoutError::Rejected(
                payload["messages"].to_string(),
            ));
        }

        let checkout_url = payload["result"]["checkoutUrl"]
            .as_str()
            .ok_or_else(|| {
                CheckoutError::MalformedResponse("missing result.checkoutUrl".to_string())
            })?
            .to_string();

        Ok(CheckoutSession {
            reference,
            checkout_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_config_default() {
        let config = CheckoutConfig::default();
        assert_eq!(config.redirect_base_url, "http://localhost:8080");
        assert!(config.checkout_url.contains("checkout-sessions"));
    }

    #[test]
    fn test_service_construction() {
        let service = CheckoutService::new(CheckoutConfig::default());
        // A fresh service holds the configured endpoint untouched.
        assert_eq!(
            service.config.checkout_url,
            CheckoutConfig::default().checkout_url
        );
    }
}
