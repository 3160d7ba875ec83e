//! Lightweight completed-transaction view backing the dashboard
//! aggregation.

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error, category::Category, db::decimal_column, transaction::TransactionType, user::UserId,
};

/// The fields of a completed transaction the dashboard aggregates over.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CompletedTransaction {
    /// When the transaction happened.
    pub(super) date: Date,
    /// The non-negative amount.
    pub(super) amount: Decimal,
    /// Whether money was earned or spent.
    pub(super) transaction_type: TransactionType,
    /// The category the transaction belongs to.
    pub(super) category: Category,
}

impl CompletedTransaction {
    /// The amount with the type's sign applied.
    pub(super) fn signed_amount(&self) -> Decimal {
        self.transaction_type.signed(self.amount)
    }
}

/// Fetch every completed transaction owned by `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub(super) fn get_completed_transactions(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<CompletedTransaction>, Error> {
    connection
        .prepare(
            "SELECT date, amount, type, category FROM \"transaction\" \
             WHERE user_id = :user_id AND is_completed = 1",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            let type_code: String = row.get(2)?;
            let transaction_type = TransactionType::from_code(&type_code).map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(error),
                )
            })?;

            let category_code: String = row.get(3)?;
            let category = Category::from_code(&category_code).map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    Box::new(error),
                )
            })?;

            Ok(CompletedTransaction {
                date: row.get(0)?,
                amount: decimal_column(row, 1)?,
                transaction_type,
                category,
            })
        })?
        .map(|row| row.map_err(Error::SqlError))
        .collect()
}
