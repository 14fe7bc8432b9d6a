//! Mobile-money top-up routes.
//!
//! A top-up runs in two steps: `POST /topups` creates a checkout session with
//! the external provider, and the provider later redirects the payer to the
//! receipt (or cancel) callback. Only the receipt callback credits the wallet,
//! and it is idempotent per session reference.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::{
    routes::{
        app_error_response, ledger_error_response,
        transfers::{invalid_amount_response, parse_amount, validation_response},
    },
    AppState,
};
use pesa_db::{LedgerRepository, UserRepository};
use pesa_shared::types::{Currency, Money};
use pesa_shared::AppError;

/// Creates the top-up routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/topups", post(initiate_top_up))
        .route("/topups/receipt", get(top_up_receipt))
        .route("/topups/cancel", get(top_up_cancel))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for starting a top-up.
#[derive(Debug, Deserialize, Validate)]
pub struct TopUpBody {
    /// User whose wallet gets credited once the payment settles.
    pub user_id: Uuid,
    /// Amount as a decimal string.
    #[validate(length(min = 1))]
    pub amount: String,
}

/// Query parameters the provider sends to the receipt callback.
#[derive(Debug, Deserialize)]
pub struct ReceiptQuery {
    pub user_id: Uuid,
    pub amount: String,
    pub reference: String,
}

/// Query parameters the provider sends to the cancel callback.
#[derive(Debug, Deserialize)]
pub struct CancelQuery {
    pub user_id: Uuid,
    pub amount: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/topups` - Create a provider checkout session for a wallet top-up.
///
/// No wallet state changes here; the credit happens in the receipt callback.
async fn initiate_top_up(
    State(state): State<AppState>,
    Json(payload): Json<TopUpBody>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }
    let Some(amount) = parse_amount(&payload.amount) else {
        return invalid_amount_response(&payload.amount);
    };

    let users = UserRepository::new((*state.db).clone());
    match users.find_by_id(payload.user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return app_error_response(&AppError::NotFound(format!(
                "User {} not found",
                payload.user_id
            )));
        }
        Err(e) => {
            error!(error = %e, "Failed to look up user for top-up");
            return app_error_response(&AppError::Internal(
                "An internal error occurred".to_string(),
            ));
        }
    }

    match state
        .checkout
        .create_session(payload.user_id, Money::new(amount, Currency::Sle))
        .await
    {
        Ok(session) => {
            info!(
                user_id = %payload.user_id,
                reference = %session.reference,
                "Checkout session created"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "url": session.checkout_url,
                    "reference": session.reference,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(user_id = %payload.user_id, error = %e, "Checkout session failed");
            app_error_response(&AppError::ExternalService(
                "Failed to create checkout session".to_string(),
            ))
        }
    }
}

/// GET `/topups/receipt` - Provider callback after a successful payment.
///
/// Credits the user's wallet exactly once per session reference; replays of
/// the same reference return the receipt without a second credit.
async fn top_up_receipt(
    State(state): State<AppState>,
    Query(query): Query<ReceiptQuery>,
) -> impl IntoResponse {
    let Some(amount) = parse_amount(&query.amount) else {
        return invalid_amount_response(&query.amount);
    };

    let repo = LedgerRepository::new((*state.db).clone());
    match repo
        .credit_from_external_payment(query.user_id, amount, &query.reference)
        .await
    {
        Ok(receipt) => {
            info!(
                user_id = %query.user_id,
                reference = %query.reference,
                replayed = receipt.replayed,
                "Top-up receipt processed"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "status": "ok",
                    "wallet_id": receipt.wallet_id,
                    "balance": receipt.balance.to_string(),
                    "replayed": receipt.replayed,
                })),
            )
                .into_response()
        }
        Err(e) => ledger_error_response("top_up", &e),
    }
}

/// GET `/topups/cancel` - Provider callback after a cancelled payment.
///
/// Nothing to undo: the wallet was never touched.
async fn top_up_cancel(Query(query): Query<CancelQuery>) -> impl IntoResponse {
    info!(
        user_id = %query.user_id,
        amount = %query.amount,
        "Top-up cancelled by payer"
    );
    (StatusCode::OK, Json(json!({ "status": "cancelled" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_up_body_deserializes() {
        let body: TopUpBody = serde_json::from_value(json!({
            "user_id": "00000000-0000-0000-0000-000000000001",
            "amount": "100"
        }))
        .unwrap();
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_receipt_query_requires_reference() {
        let missing: Result<ReceiptQuery, _> = serde_json::from_value(json!({
            "user_id": "00000000-0000-0000-0000-000000000001",
            "amount": "100"
        }));
        assert!(missing.is_err());
    }
}
