//! The balance reconciliation rules.
//!
//! Every transaction mutation goes through this module so that a user's
//! cached balance always equals the sum of the signed amounts of their
//! completed transactions. Each operation captures the prior state of the
//! affected row, applies the change, and adjusts the balance by the delta
//! the change implies. All of it runs inside a single exclusive SQLite
//! transaction, so the row change and the balance write commit or roll back
//! together.
//!
//! [recompute_balance] is the fallback path: it rebuilds the cached balance
//! from scratch and converges even if the cache was corrupted out of band.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use rust_decimal::Decimal;

use crate::{
    AppState, Error,
    db::decimal_column,
    transaction::{
        Transaction, TransactionBuilder, TransactionId, TransactionType, TransactionUpdate,
        core::{
            delete_transaction_row, get_transaction, insert_transaction, update_transaction_row,
        },
    },
    user::{self, UserId},
};

/// The completion flag and signed amount of a transaction at a point in
/// time.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Snapshot {
    is_completed: bool,
    signed_amount: Decimal,
}

impl Snapshot {
    fn of(transaction: &Transaction) -> Self {
        Self {
            is_completed: transaction.is_completed,
            signed_amount: transaction.signed_amount(),
        }
    }
}

/// The change a mutation implies for the owner's cached balance.
///
/// `old` is the state of the row before the mutation (`None` on create) and
/// `new` the state after it (`None` on delete). Only completed transactions
/// count toward the balance.
fn balance_delta(old: Option<Snapshot>, new: Option<Snapshot>) -> Decimal {
    match (old, new) {
        (None, Some(new)) if new.is_completed => new.signed_amount,
        (Some(old), None) if old.is_completed => -old.signed_amount,
        (Some(old), Some(new)) => match (old.is_completed, new.is_completed) {
            (false, true) => new.signed_amount,
            (true, false) => -old.signed_amount,
            (true, true) => new.signed_amount - old.signed_amount,
            (false, false) => Decimal::ZERO,
        },
        _ => Decimal::ZERO,
    }
}

/// Apply the balance change implied by a mutation from `old` to `new`.
///
/// Must run inside the same SQL transaction as the row change itself.
fn apply_delta(
    user_id: UserId,
    old: Option<Snapshot>,
    new: Option<Snapshot>,
    connection: &Connection,
) -> Result<(), Error> {
    let delta = balance_delta(old, new);

    if delta == Decimal::ZERO {
        return Ok(());
    }

    let balance = user::get_balance(user_id, connection)?;
    user::set_balance(user_id, balance + delta, connection)
}

/// Create a new transaction and credit the owner's balance if the
/// transaction is created already completed.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyTitle] or [Error::NegativeAmount] if the builder violates
///   the boundary rules,
/// - [Error::NotFound] if the builder's user does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = builder.validated()?;

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let transaction = insert_transaction(&builder, &sql_transaction)?;
    apply_delta(
        transaction.user_id,
        None,
        Some(Snapshot::of(&transaction)),
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Overwrite the user-mutable fields of an owned transaction and adjust the
/// owner's balance by the difference the change implies.
///
/// The prior signed amount and completion flag are captured from the
/// persisted row before the new values are applied, inside the same SQL
/// transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyTitle] or [Error::NegativeAmount] if the update violates
///   the boundary rules,
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a
///   transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let update = update.validated()?;

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let old = get_transaction(id, user_id, &sql_transaction).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        error => error,
    })?;
    let old_snapshot = Snapshot::of(&old);

    let transaction = update_transaction_row(id, user_id, &update, &sql_transaction)?;
    apply_delta(
        user_id,
        Some(old_snapshot),
        Some(Snapshot::of(&transaction)),
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Mark an owned transaction as completed, crediting the owner's balance
/// with its signed amount. Completing an already completed transaction
/// leaves the balance unchanged.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a
///   transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn complete_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let old = get_transaction(id, user_id, &sql_transaction).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        error => error,
    })?;
    let old_snapshot = Snapshot::of(&old);

    let mut update = TransactionUpdate::keeping(&old);
    update.is_completed = true;

    let transaction = update_transaction_row(id, user_id, &update, &sql_transaction)?;
    apply_delta(
        user_id,
        Some(old_snapshot),
        Some(Snapshot::of(&transaction)),
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Delete an owned transaction and debit the owner's balance with the
/// signed amount the transaction had at the time of deletion, if it was
/// completed.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a
///   transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let old = get_transaction(id, user_id, &sql_transaction).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingTransaction,
        error => error,
    })?;

    delete_transaction_row(id, user_id, &sql_transaction)?;
    apply_delta(user_id, Some(Snapshot::of(&old)), None, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}

/// Rebuild the cached balance for `user_id` from scratch: the sum of the
/// signed amounts of the user's completed transactions.
///
/// The incremental paths above never lose their prior-state snapshot, so
/// this full recompute exists as the repair path: it converges to the
/// correct balance even if the cache was corrupted out of band.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `user_id` does not belong to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn recompute_balance(user_id: UserId, connection: &Connection) -> Result<Decimal, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let balance = completed_signed_sum(user_id, &sql_transaction)?;
    user::set_balance(user_id, balance, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(balance)
}

/// Sum the signed amounts of the completed transactions owned by `user_id`.
fn completed_signed_sum(user_id: UserId, connection: &Connection) -> Result<Decimal, Error> {
    let mut statement = connection.prepare(
        "SELECT amount, type FROM \"transaction\" \
         WHERE user_id = :user_id AND is_completed = 1",
    )?;

    let rows = statement.query_map(&[(":user_id", &user_id.as_i64())], |row| {
        let amount = decimal_column(row, 0)?;
        let type_code: String = row.get(1)?;

        Ok((amount, type_code))
    })?;

    let mut total = Decimal::ZERO;

    for row in rows {
        let (amount, type_code) = row?;
        let transaction_type = TransactionType::from_code(&type_code)?;
        total += transaction_type.signed(amount);
    }

    Ok(total)
}

/// A route handler that rebuilds a user's cached balance from their
/// completed transactions.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn recompute_balance_endpoint(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match recompute_balance(user_id, &connection) {
        Ok(balance) => Json(serde_json::json!({ "balance": balance })).into_response(),
        Err(error) => error.into_response(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
