//! Per-day counts of transaction activity for a calendar month.
//!
//! Backs a month view: for each day with activity, how many of the user's
//! transactions are settled and how many are still pending. Rendering the
//! month grid is the client's concern.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;
use time::{Date, Month};

use crate::{
    AppState, Error,
    user::{UserId, get_user_by_id},
};

/// How many of a day's transactions are settled vs pending.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct DayActivity {
    /// The number of completed transactions dated on the day.
    pub completed: u32,
    /// The number of not-yet-completed transactions dated on the day.
    pub pending: u32,
}

/// Count the transactions owned by `user_id` for each day of the given
/// month, split into completed and pending. Days without activity are
/// omitted.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the year is outside the supported calendar range,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn month_activity(
    user_id: UserId,
    year: i32,
    month: Month,
    connection: &Connection,
) -> Result<BTreeMap<u8, DayActivity>, Error> {
    let first_day = Date::from_calendar_date(year, month, 1).map_err(|_| Error::NotFound)?;
    let last_day = first_day
        .replace_day(month.length(year))
        .map_err(|_| Error::NotFound)?;

    let mut statement = connection.prepare(
        "SELECT date, is_completed FROM \"transaction\" \
         WHERE user_id = :user_id AND date BETWEEN :first_day AND :last_day",
    )?;

    let rows = statement.query_map(
        &[
            (":user_id", &user_id.as_i64() as &dyn rusqlite::ToSql),
            (":first_day", &first_day),
            (":last_day", &last_day),
        ],
        |row| {
            let date: Date = row.get(0)?;
            let is_completed: bool = row.get(1)?;

            Ok((date, is_completed))
        },
    )?;

    let mut days: BTreeMap<u8, DayActivity> = BTreeMap::new();

    for row in rows {
        let (date, is_completed) = row?;
        let activity = days.entry(date.day()).or_default();

        if is_completed {
            activity.completed += 1;
        } else {
            activity.pending += 1;
        }
    }

    Ok(days)
}

/// A route handler returning the per-day activity counts for one month of
/// the user's transactions.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn get_calendar_endpoint(
    State(state): State<AppState>,
    Path((user_id, year, month)): Path<(UserId, i32, u8)>,
) -> Response {
    let month = match Month::try_from(month) {
        Ok(month) => month,
        Err(_) => return Error::InvalidMonth(month).into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    if let Err(error) = get_user_by_id(user_id, &connection) {
        return error.into_response();
    }

    match month_activity(user_id, year, month, &connection) {
        Ok(days) => Json(serde_json::json!({
            "year": year,
            "month": month as u8,
            "days": days,
        }))
        .into_response(),
        Err(error) => error.into_response(),
    }
}
