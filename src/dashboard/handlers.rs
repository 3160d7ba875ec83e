//! The dashboard endpoint.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    AppState,
    transaction::{TransactionPayload, recent_completed},
    user::{UserId, get_user_by_id},
};

use super::{
    aggregation::{
        CategoryTotal, DailyBalance, daily_balance_series, expenses_by_category, monthly_summary,
    },
    transaction::get_completed_transactions,
};

/// How many recent transactions the dashboard shows.
const RECENT_TRANSACTIONS_LIMIT: u32 = 5;

/// The dashboard overview for one user.
#[derive(Debug, Serialize)]
struct DashboardPayload {
    /// The user's display name.
    name: String,
    /// The cached balance over completed transactions.
    current_balance: Decimal,
    /// Total completed income this calendar month.
    monthly_income: Decimal,
    /// Total completed expenses this calendar month.
    monthly_expense: Decimal,
    /// Income minus expenses this calendar month.
    monthly_savings: Decimal,
    /// Running balance for the last 30 days, oldest first.
    daily_balance: Vec<DailyBalance>,
    /// Completed expense totals this month by category, largest first.
    expenses_by_category: Vec<CategoryTotal>,
    /// The most recently dated completed transactions.
    recent_transactions: Vec<TransactionPayload>,
}

/// A route handler returning an overview of the user's finances.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn get_dashboard_endpoint(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Response {
    let today = OffsetDateTime::now_utc().date();
    let connection = state.db_connection.lock().unwrap();

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };

    let completed = match get_completed_transactions(user_id, &connection) {
        Ok(completed) => completed,
        Err(error) => return error.into_response(),
    };

    let recent = match recent_completed(user_id, RECENT_TRANSACTIONS_LIMIT, &connection) {
        Ok(recent) => recent,
        Err(error) => return error.into_response(),
    };

    let summary = monthly_summary(&completed, today);

    Json(DashboardPayload {
        name: user.name,
        current_balance: user.balance,
        monthly_income: summary.income,
        monthly_expense: summary.expense,
        monthly_savings: summary.savings,
        daily_balance: daily_balance_series(&completed, today),
        expenses_by_category: expenses_by_category(&completed, today),
        recent_transactions: recent
            .into_iter()
            .map(|transaction| TransactionPayload::new(transaction, today))
            .collect(),
    })
    .into_response()
}
