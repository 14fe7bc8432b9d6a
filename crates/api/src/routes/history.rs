//! Transaction history routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use crate::{routes::ledger_error_response, AppState};
use pesa_core::ledger::EntryDirection;
use pesa_db::LedgerRepository;

/// Creates the history routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users/{user_id}/history", get(transaction_history))
}

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Which side of the ledger to read, `credit` or `debit`.
    pub direction: String,
}

/// GET `/users/{user_id}/history` - One side of a user's ledger, oldest first.
async fn transaction_history(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let Ok(direction) = EntryDirection::from_str(&query.direction) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_direction",
                "message": format!(
                    "Invalid direction '{}', expected 'credit' or 'debit'",
                    query.direction
                )
            })),
        )
            .into_response();
    };

    let repo = LedgerRepository::new((*state.db).clone());
    match repo.history(user_id, direction).await {
        Ok(entries) => {
            let history = entries
                .iter()
                .map(|entry| {
                    json!({
                        "transaction_id": entry.transaction_id,
                        "amount": entry.amount.to_string(),
                        "direction": entry.direction.to_string(),
                        "description": entry.description,
                        "timestamp": entry.timestamp.to_rfc3339(),
                        "other_user": entry.other_user.as_ref().map(|user| json!({
                            "user_id": user.user_id,
                            "name": user.name,
                            "email": user.email,
                        })),
                    })
                })
                .collect::<Vec<_>>();
            (
                StatusCode::OK,
                Json(json!({ "transaction_history": history })),
            )
                .into_response()
        }
        Err(e) => ledger_error_response("history", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case("credit", EntryDirection::Credit)]
    #[case("debit", EntryDirection::Debit)]
    fn test_direction_parses(#[case] input: &str, #[case] expected: EntryDirection) {
        assert_eq!(EntryDirection::from_str(input).ok(), Some(expected));
    }

    #[test]
    fn test_unknown_direction_rejected() {
        assert!(EntryDirection::from_str("sideways").is_err());
    }
}
