//! Saldo is a personal finance tracker: users record income and expense
//! transactions, read a dashboard of balances and trends, and query per-day
//! transaction activity for a month.
//!
//! This library provides a JSON REST API. Every transaction mutation goes
//! through the [reconciler], which keeps each user's cached balance equal to
//! the sum of the signed amounts of their completed transactions.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use rust_decimal::Decimal;
use tokio::signal;

mod app_state;
pub mod calendar;
pub mod category;
pub mod dashboard;
mod db;
pub mod endpoints;
mod logging;
pub mod reconciler;
mod routing;
pub mod transaction;
pub mod user;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user's email already exists in the database.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// An empty string was used as a transaction title.
    #[error("transaction title cannot be empty")]
    EmptyTitle,

    /// A negative amount was used to create or update a transaction.
    ///
    /// Direction is expressed through the transaction type, so amounts are
    /// always non-negative.
    #[error("transaction amount must not be negative, got {0}")]
    NegativeAmount(Decimal),

    /// A string that is not a valid category code.
    #[error("\"{0}\" is not a valid category code")]
    InvalidCategory(String),

    /// A string that is not a valid transaction type code.
    #[error("\"{0}\" is not a valid transaction type code")]
    InvalidTransactionType(String),

    /// A calendar month outside 1-12.
    #[error("{0} is not a valid calendar month")]
    InvalidMonth(u8),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the
    /// parameters (e.g., ID) are correct and that the resource has been
    /// created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist or is not owned by
    /// the requesting user.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist or is not owned by
    /// the requesting user.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = match self {
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::EmptyTitle
            | Error::NegativeAmount(_)
            | Error::InvalidCategory(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidMonth(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            // SQL errors are not intended to be shown to the client.
            Error::SqlError(error) => {
                tracing::error!("An unexpected error occurred: {}", error);
                "an internal error occurred, check the server logs for details".to_owned()
            }
            error => error.to_string(),
        };

        (status_code, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
