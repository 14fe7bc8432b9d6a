//! API route definitions.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use crate::AppState;
use pesa_db::LedgerError;
use pesa_shared::AppError;

pub mod health;
pub mod history;
pub mod topups;
pub mod transfers;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(transfers::routes())
        .merge(topups::routes())
        .merge(history::routes())
}

/// Maps an application error to its HTTP response using its stable code.
pub(crate) fn app_error_response(err: &AppError) -> Response {
    let status = StatusCode::from_u16(err.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

/// Maps a ledger error to its HTTP response.
///
/// Mutation errors have already aborted the store transaction by the time
/// they reach here; internal failures are logged with context and surfaced
/// generically so store internals never leak to clients.
pub(crate) fn ledger_error_response(operation: &str, err: &LedgerError) -> Response {
    match err {
        LedgerError::Validation(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": e.to_string()
            })),
        )
            .into_response(),
        LedgerError::WalletNotFound(user_id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "wallet_not_found",
                "message": format!("Wallet not found for user {user_id}")
            })),
        )
            .into_response(),
        LedgerError::UserNotFound(user_id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "user_not_found",
                "message": format!("User not found: {user_id}")
            })),
        )
            .into_response(),
        LedgerError::WalletInactive(user_id) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "wallet_inactive",
                "message": format!("Wallet for user {user_id} is inactive")
            })),
        )
            .into_response(),
        LedgerError::InsufficientFunds { .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "insufficient_funds",
                "message": "Insufficient funds in sender's wallet"
            })),
        )
            .into_response(),
        LedgerError::Database(_) if err.is_transient() => {
            error!(operation, error = %err, "Transient store failure, nothing committed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "transient_failure",
                    "message": "Store temporarily unavailable, retry the operation"
                })),
            )
                .into_response()
        }
        LedgerError::Database(_) => {
            error!(operation, error = %err, "Ledger operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pesa_core::ledger::ValidationError;
    use uuid::Uuid;

    #[test]
    fn test_app_error_status_and_code() {
        let response = app_error_response(&AppError::NotFound("User x not found".to_string()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            app_error_response(&AppError::ExternalService("provider down".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = LedgerError::Validation(ValidationError::EmptyDistribution);
        let response = ledger_error_response("transfer", &err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_wallet_maps_to_404() {
        let err = LedgerError::WalletNotFound(Uuid::new_v4());
        let response = ledger_error_response("transfer", &err);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_insufficient_funds_maps_to_400() {
        let err = LedgerError::InsufficientFunds {
            available: rust_decimal::Decimal::ZERO,
            requested: rust_decimal::Decimal::ONE,
        };
        let response = ledger_error_response("transfer", &err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_transient_maps_to_503() {
        let err = LedgerError::Database(sea_orm::DbErr::Conn(sea_orm::RuntimeErr::Internal(
            "connection refused".to_string(),
        )));
        let response = ledger_error_response("transfer", &err);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_other_database_errors_map_to_500() {
        let err = LedgerError::Database(sea_orm::DbErr::RecordNotFound("x".to_string()));
        let response = ledger_error_response("transfer", &err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
