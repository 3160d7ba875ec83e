//! Code for creating the user table, fetching users and their cached
//! balances, and the user endpoints.

use std::fmt::Display;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, db::decimal_column};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to
/// better compile time errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// `balance` is the cached sum of the signed amounts of the user's completed
/// transactions. It is mutated only by the [crate::reconciler].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's email address, unique across users.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// The cached balance over the user's completed transactions.
    pub balance: Decimal,
}

/// Create the user table.
///
/// # Errors
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                balance TEXT NOT NULL DEFAULT '0'
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database with a zero balance.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateEmail] if a user with `email` already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_user(email: &str, name: &str, connection: &Connection) -> Result<User, Error> {
    connection.execute("INSERT INTO user (email, name) VALUES (?1, ?2)", (email, name))?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: email.to_owned(),
        name: name.to_owned(),
        balance: Decimal::ZERO,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `user_id` does not belong to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, name, balance FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], |row| {
            Ok(User {
                id: UserId::new(row.get(0)?),
                email: row.get(1)?,
                name: row.get(2)?,
                balance: decimal_column(row, 3)?,
            })
        })
        .map_err(|error| error.into())
}

/// Get the cached balance for the user with `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `user_id` does not belong to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_balance(user_id: UserId, connection: &Connection) -> Result<Decimal, Error> {
    connection
        .prepare("SELECT balance FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], |row| decimal_column(row, 0))
        .map_err(|error| error.into())
}

/// Overwrite the cached balance for the user with `user_id`.
///
/// Only the [crate::reconciler] writes balances.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `user_id` does not belong to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn set_balance(
    user_id: UserId,
    balance: Decimal,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET balance = ?1 WHERE id = ?2",
        (balance.to_string(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The request body for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    /// The new user's email address.
    pub email: String,
    /// The new user's display name.
    pub name: String,
}

/// A route handler for creating a new user record.
///
/// This is a bare record create for the multi-user API. Registration flows
/// (passwords, sessions) are out of scope.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn create_user_endpoint(
    State(state): State<AppState>,
    Json(body): Json<CreateUserBody>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match create_user(&body.email, &body.name, &connection) {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler returning a user with their current cached balance.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn get_user_endpoint(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match get_user_by_id(user_id, &connection) {
        Ok(user) => Json(user).into_response(),
        Err(error) => error.into_response(),
    }
}
