//! Defines the endpoint for marking a transaction as completed.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use time::OffsetDateTime;

use crate::{
    AppState, reconciler,
    transaction::{TransactionId, TransactionPayload},
    user::UserId,
};

/// A route handler marking a transaction owned by `user_id` as completed.
///
/// Completing a transaction credits the owner's balance with its signed
/// amount; completing an already completed transaction leaves the balance
/// unchanged.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn complete_transaction_endpoint(
    State(state): State<AppState>,
    Path((user_id, transaction_id)): Path<(UserId, TransactionId)>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match reconciler::complete_transaction(transaction_id, user_id, &connection) {
        Ok(transaction) => {
            let today = OffsetDateTime::now_utc().date();
            Json(TransactionPayload::new(transaction, today)).into_response()
        }
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AppState,
        reconciler::create_transaction,
        transaction::{Transaction, TransactionType},
        user::{UserId, create_user, get_balance},
    };

    use super::complete_transaction_endpoint;

    fn get_test_state() -> (AppState, UserId) {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(conn).unwrap();
        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            create_user("ana@example.com", "Ana", &connection).unwrap().id
        };

        (state, user_id)
    }

    #[tokio::test]
    async fn completing_credits_the_signed_amount() {
        let (state, user_id) = get_test_state();
        let transaction_id = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(
                    user_id,
                    "Groceries",
                    "120.00".parse().unwrap(),
                    TransactionType::Expense,
                    date!(2025 - 10 - 03),
                ),
                &connection,
            )
            .unwrap()
            .id
        };

        let response =
            complete_transaction_endpoint(State(state.clone()), Path((user_id, transaction_id)))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_balance(user_id, &connection),
            Ok("-120.00".parse().unwrap())
        );
    }

    #[tokio::test]
    async fn completing_a_missing_transaction_returns_not_found() {
        let (state, user_id) = get_test_state();

        let response = complete_transaction_endpoint(State(state), Path((user_id, 404)))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
