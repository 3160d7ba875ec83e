/*! Database initialization for the application's SQLite schema. */

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use rust_decimal::Decimal;

use crate::{transaction::create_transaction_table, user::create_user_table};

/// Create the application's tables if they do not exist.
///
/// The tables are created inside one exclusive transaction so that a
/// partially created schema is never committed.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is some other
/// SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    // Transactions are cascade-deleted with their owning user.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Read the TEXT column at `index` as an exact decimal.
///
/// Amounts and balances are stored as decimal strings so that currency math
/// never goes through floating point.
pub(crate) fn decimal_column(row: &rusqlite::Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let text: String = row.get(index)?;

    text.parse::<Decimal>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })
}
