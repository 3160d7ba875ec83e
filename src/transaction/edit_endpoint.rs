//! Defines the endpoint for editing an existing transaction.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState,
    category::Category,
    reconciler,
    transaction::{TransactionId, TransactionPayload, TransactionType, TransactionUpdate},
    user::UserId,
};

/// The request body for editing a transaction. All user-mutable fields are
/// replaced as a whole.
#[derive(Debug, Deserialize)]
pub struct EditTransactionBody {
    /// The new title.
    pub title: String,
    /// The new description.
    #[serde(default)]
    pub description: String,
    /// The new amount, non-negative.
    pub amount: Decimal,
    /// The new transaction type code, `IN` or `OUT`.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The new category code.
    pub category: Category,
    /// The new completion flag.
    pub is_completed: bool,
    /// The new date.
    pub date: Date,
}

/// A route handler for editing a transaction owned by `user_id`.
///
/// The owner's balance is adjusted by the difference the edit implies, in
/// the same database transaction.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn edit_transaction_endpoint(
    State(state): State<AppState>,
    Path((user_id, transaction_id)): Path<(UserId, TransactionId)>,
    Json(body): Json<EditTransactionBody>,
) -> Response {
    let update = TransactionUpdate {
        title: body.title,
        description: body.description,
        amount: body.amount,
        transaction_type: body.transaction_type,
        category: body.category,
        is_completed: body.is_completed,
        date: body.date,
    };

    let connection = state.db_connection.lock().unwrap();

    match reconciler::update_transaction(transaction_id, user_id, update, &connection) {
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
        Json,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AppState,
        category::Category,
        reconciler::create_transaction,
        transaction::{Transaction, TransactionType},
        user::{UserId, create_user, get_balance},
    };

    use super::{EditTransactionBody, edit_transaction_endpoint};

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
    async fn editing_a_completed_amount_moves_the_balance_by_the_difference() {
        let (state, user_id) = get_test_state();
        let transaction_id = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(
                    user_id,
                    "Rent",
                    "50.00".parse().unwrap(),
                    TransactionType::Expense,
                    date!(2025 - 10 - 02),
                )
                .category(Category::Housing)
                .completed(true),
                &connection,
            )
            .unwrap()
            .id
        };

        let body = EditTransactionBody {
            title: "Rent".to_owned(),
            description: String::new(),
            amount: "75.00".parse().unwrap(),
            transaction_type: TransactionType::Expense,
            category: Category::Housing,
            is_completed: true,
            date: date!(2025 - 10 - 02),
        };

        let response =
            edit_transaction_endpoint(State(state.clone()), Path((user_id, transaction_id)), Json(body))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_balance(user_id, &connection),
            Ok("-75.00".parse().unwrap())
        );
    }

    #[tokio::test]
    async fn editing_a_missing_transaction_returns_not_found() {
        let (state, user_id) = get_test_state();

        let body = EditTransactionBody {
            title: "Rent".to_owned(),
            description: String::new(),
            amount: "75.00".parse().unwrap(),
            transaction_type: TransactionType::Expense,
            category: Category::Housing,
            is_completed: true,
            date: date!(2025 - 10 - 02),
        };

        let response = edit_transaction_endpoint(State(state), Path((user_id, 404)), Json(body))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
