//! Transfer and distribution routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{routes::ledger_error_response, AppState};
use pesa_core::ledger::{Distribution, DistributionRequest, TransferRequest};
use pesa_db::LedgerRepository;

/// Creates the transfer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transfers", post(create_transfer))
        .route("/distributions", post(create_distribution))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for a one-to-one transfer.
#[derive(Debug, Deserialize, Validate)]
pub struct TransferBody {
    /// Sending user.
    pub sender_id: Uuid,
    /// Receiving user.
    pub recipient_id: Uuid,
    /// Amount as a decimal string, e.g. "25.50".
    #[validate(length(min = 1))]
    pub amount: String,
    /// Optional client retry key; resubmitting with the same key replays
    /// the committed transfer instead of moving funds twice.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub idempotency_key: Option<String>,
}

/// One share of a distribution request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DistributionShareBody {
    /// Receiving user.
    pub recipient_id: Uuid,
    /// Share amount as a decimal string.
    #[validate(length(min = 1))]
    pub amount: String,
}

/// Request body for a one-to-many distribution.
#[derive(Debug, Deserialize, Validate)]
pub struct DistributionBody {
    /// Sending user.
    pub sender_id: Uuid,
    /// Shares, credited in this order.
    #[validate(length(min = 1), nested)]
    pub distributions: Vec<DistributionShareBody>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/transfers` - Move funds between two user wallets.
async fn create_transfer(
    State(state): State<AppState>,
    Json(payload): Json<TransferBody>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }
    let Some(amount) = parse_amount(&payload.amount) else {
        return invalid_amount_response(&payload.amount);
    };

    let repo = LedgerRepository::new((*state.db).clone());
    let request = TransferRequest {
        sender_id: payload.sender_id,
        recipient_id: payload.recipient_id,
        amount,
        idempotency_key: payload.idempotency_key,
    };

    match repo.transfer(request).await {
        Ok(receipt) => {
            info!(
                sender_id = %payload.sender_id,
                recipient_id = %payload.recipient_id,
                transfer_id = %receipt.transfer_id,
                replayed = receipt.replayed,
                "Transfer committed"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "status": "ok",
                    "transfer_id": receipt.transfer_id,
                    "sender_balance": receipt.sender_balance.to_string(),
                    "recipient_balance": receipt.recipient_balance.to_string(),
                    "replayed": receipt.replayed,
                })),
            )
                .into_response()
        }
        Err(e) => ledger_error_response("transfer", &e),
    }
}

/// POST `/distributions` - Distribute funds from one sender to many recipients.
async fn create_distribution(
    State(state): State<AppState>,
    Json(payload): Json<DistributionBody>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }

    let mut distributions = Vec::with_capacity(payload.distributions.len());
    for share in &payload.distributions {
        let Some(amount) = parse_amount(&share.amount) else {
            return invalid_amount_response(&share.amount);
        };
        distributions.push(Distribution {
            recipient_id: share.recipient_id,
            amount,
        });
    }

    let repo = LedgerRepository::new((*state.db).clone());
    let request = DistributionRequest {
        sender_id: payload.sender_id,
        distributions,
    };

    match repo.distribute(request).await {
        Ok(receipt) => {
            info!(
                sender_id = %payload.sender_id,
                transfer_id = %receipt.transfer_id,
                total = %receipt.total,
                recipients = receipt.credited.len(),
                "Distribution committed"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "status": "ok",
                    "transfer_id": receipt.transfer_id,
                    "total": receipt.total.to_string(),
                    "sender_balance": receipt.sender_balance.to_string(),
                    "credited": receipt
                        .credited
                        .iter()
                        .map(|c| json!({
                            "recipient_id": c.recipient_id,
                            "amount": c.amount.to_string(),
                        }))
                        .collect::<Vec<_>>(),
                })),
            )
                .into_response()
        }
        Err(e) => ledger_error_response("distribute", &e),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

pub(crate) fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw).ok()
}

pub(crate) fn invalid_amount_response(raw: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_amount",
            "message": format!("Invalid amount format: {raw}")
        })),
    )
        .into_response()
}

pub(crate) fn validation_response(errors: &validator::ValidationErrors) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "validation_error",
            "message": errors.to_string()
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transfer_body_deserializes() {
        let body: TransferBody = serde_json::from_value(json!({
            "sender_id": "00000000-0000-0000-0000-000000000001",
            "recipient_id": "00000000-0000-0000-0000-000000000002",
            "amount": "25.50"
        }))
        .unwrap();
        assert!(body.validate().is_ok());
        assert_eq!(parse_amount(&body.amount), Some(dec!(25.50)));
        assert!(body.idempotency_key.is_none());
    }

    #[test]
    fn test_empty_idempotency_key_fails_validation() {
        let body: TransferBody = serde_json::from_value(json!({
            "sender_id": "00000000-0000-0000-0000-000000000001",
            "recipient_id": "00000000-0000-0000-0000-000000000002",
            "amount": "10",
            "idempotency_key": ""
        }))
        .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_empty_amount_fails_validation() {
        let body: TransferBody = serde_json::from_value(json!({
            "sender_id": "00000000-0000-0000-0000-000000000001",
            "recipient_id": "00000000-0000-0000-0000-000000000002",
            "amount": ""
        }))
        .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_empty_distribution_list_fails_validation() {
        let body: DistributionBody = serde_json::from_value(json!({
            "sender_id": "00000000-0000-0000-0000-000000000001",
            "distributions": []
        }))
        .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_malformed_amount_is_rejected() {
        assert_eq!(parse_amount("not-a-number"), None);
        assert_eq!(parse_amount("1,000"), None);
        assert_eq!(parse_amount("12.34"), Some(dec!(12.34)));
    }
}
