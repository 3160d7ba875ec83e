//! Defines the endpoint for fetching a single transaction.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use time::OffsetDateTime;

use crate::{
    AppState,
    transaction::{TransactionId, TransactionPayload, get_transaction},
    user::UserId,
};

/// A route handler returning a transaction owned by `user_id`.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn get_transaction_endpoint(
    State(state): State<AppState>,
    Path((user_id, transaction_id)): Path<(UserId, TransactionId)>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match get_transaction(transaction_id, user_id, &connection) {
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
        user::{UserId, create_user},
    };

    use super::get_transaction_endpoint;

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
    async fn returns_owned_transactions() {
        let (state, user_id) = get_test_state();
        let transaction_id = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(
                    user_id,
                    "Cinema",
                    "18.00".parse().unwrap(),
                    TransactionType::Expense,
                    date!(2025 - 10 - 04),
                ),
                &connection,
            )
            .unwrap()
            .id
        };

        let response = get_transaction_endpoint(State(state), Path((user_id, transaction_id)))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn hides_transactions_of_other_users() {
        let (state, user_id) = get_test_state();
        let transaction_id = {
            let connection = state.db_connection.lock().unwrap();
            let other = create_user("bob@example.com", "Bob", &connection).unwrap();
            create_transaction(
                Transaction::build(
                    other.id,
                    "Cinema",
                    "18.00".parse().unwrap(),
                    TransactionType::Expense,
                    date!(2025 - 10 - 04),
                ),
                &connection,
            )
            .unwrap()
            .id
        };

        let response = get_transaction_endpoint(State(state), Path((user_id, transaction_id)))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
