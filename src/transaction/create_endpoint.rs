//! Defines the endpoint for creating a new transaction.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState,
    category::Category,
    reconciler,
    transaction::{Transaction, TransactionPayload, TransactionType},
    user::UserId,
};

/// The request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionBody {
    /// A short human readable title.
    pub title: String,
    /// A text description, may be empty.
    #[serde(default)]
    pub description: String,
    /// The value of the transaction, non-negative.
    pub amount: Decimal,
    /// The transaction type code, `IN` or `OUT`.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The category code. Defaults to `OTH`.
    #[serde(default)]
    pub category: Category,
    /// Whether the transaction is already settled.
    #[serde(default)]
    pub is_completed: bool,
    /// When the transaction happened or is expected to happen.
    pub date: Date,
}

/// A route handler for creating a new transaction owned by `user_id`.
///
/// A transaction created already completed credits the owner's balance in
/// the same database transaction.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<CreateTransactionBody>,
) -> Response {
    let builder = Transaction::build(
        user_id,
        &body.title,
        body.amount,
        body.transaction_type,
        body.date,
    )
    .description(&body.description)
    .category(body.category)
    .completed(body.is_completed);

    let connection = state.db_connection.lock().unwrap();

    match reconciler::create_transaction(builder, &connection) {
        Ok(transaction) => {
            let today = OffsetDateTime::now_utc().date();
            (
                StatusCode::CREATED,
                Json(TransactionPayload::new(transaction, today)),
            )
                .into_response()
        }
        Err(error) => error.into_response(),
    }
}
