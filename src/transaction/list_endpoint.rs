//! Defines the endpoint for listing a user's transactions.
//!
//! The query parameters mirror the stored filters: a title substring, a
//! trailing period of days ending today, an explicit date range, and
//! comma-separated type and category codes.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use time::{Date, Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    category::Category,
    transaction::{TransactionFilter, TransactionPayload, TransactionType, list_transactions},
    user::{UserId, get_user_by_id},
};

/// The supported query parameters for the transaction listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Match titles containing this text.
    pub search: Option<String>,
    /// Match dates within the last N days, ending today.
    pub period_days: Option<i64>,
    /// Match dates on or after this day. Takes precedence over
    /// `period_days`.
    pub start_date: Option<Date>,
    /// Match dates on or before this day. Takes precedence over
    /// `period_days`.
    pub end_date: Option<Date>,
    /// Comma-separated transaction type codes, e.g. `IN,OUT`.
    pub types: Option<String>,
    /// Comma-separated category codes, e.g. `FOO,TRA`.
    pub categories: Option<String>,
    /// Match only (in)complete transactions.
    pub completed: Option<bool>,
}

impl ListQuery {
    /// Convert the raw query parameters into a [TransactionFilter] as of
    /// `today`.
    ///
    /// # Errors
    /// Returns [Error::InvalidTransactionType] or [Error::InvalidCategory]
    /// if a code list contains an unknown code.
    fn into_filter(self, today: Date) -> Result<TransactionFilter, Error> {
        let (mut start_date, mut end_date) = match self.period_days {
            Some(days) => (Some(today - Duration::days(days)), Some(today)),
            None => (None, None),
        };

        if self.start_date.is_some() {
            start_date = self.start_date;
        }
        if self.end_date.is_some() {
            end_date = self.end_date;
        }

        Ok(TransactionFilter {
            search: self.search,
            start_date,
            end_date,
            types: parse_codes(self.types.as_deref(), TransactionType::from_code)?,
            categories: parse_codes(self.categories.as_deref(), Category::from_code)?,
            completed: self.completed,
        })
    }
}

fn parse_codes<T>(
    raw: Option<&str>,
    parse: impl Fn(&str) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    match raw {
        None => Ok(Vec::new()),
        Some(text) => text
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(parse)
            .collect(),
    }
}

/// A route handler listing the transactions owned by `user_id`, newest
/// first, narrowed by the request's query parameters.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn list_transactions_endpoint(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<ListQuery>,
) -> Response {
    let today = OffsetDateTime::now_utc().date();

    let filter = match query.into_filter(today) {
        Ok(filter) => filter,
        Err(error) => return error.into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    if let Err(error) = get_user_by_id(user_id, &connection) {
        return error.into_response();
    }

    match list_transactions(user_id, &filter, &connection) {
        Ok(transactions) => {
            let payloads: Vec<TransactionPayload> = transactions
                .into_iter()
                .map(|transaction| TransactionPayload::new(transaction, today))
                .collect();

            Json(payloads).into_response()
        }
        Err(error) => error.into_response(),
    }
}
