//! Defines the endpoint for deleting a transaction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{AppState, reconciler, transaction::TransactionId, user::UserId};

/// A route handler for deleting a transaction owned by `user_id`.
///
/// Deleting a completed transaction debits the owner's balance with the
/// signed amount the transaction had at the time of deletion.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    Path((user_id, transaction_id)): Path<(UserId, TransactionId)>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match reconciler::delete_transaction(transaction_id, user_id, &connection) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}
