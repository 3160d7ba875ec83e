//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use time::{Date, OffsetDateTime};

use crate::{Error, category::Category, db::decimal_column, user::UserId};

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

/// The direction of a transaction: money earned or money spent.
///
/// Stored and transmitted as a short code, displayed with its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Money flowing in.
    Income,
    /// Money flowing out.
    Expense,
}

impl TransactionType {
    /// Both transaction types.
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];

    /// The short code the type is stored and transmitted as.
    pub fn code(&self) -> &'static str {
        match self {
            TransactionType::Income => "IN",
            TransactionType::Expense => "OUT",
        }
    }

    /// The human readable label for the type.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }

    /// Parse a transaction type from its short `code`.
    ///
    /// # Errors
    /// Returns [Error::InvalidTransactionType] if `code` is not `IN` or
    /// `OUT`.
    pub fn from_code(code: &str) -> Result<Self, Error> {
        match code {
            "IN" => Ok(TransactionType::Income),
            "OUT" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }

    /// Apply the type's sign to `amount`: positive for income, negative for
    /// expense.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TransactionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for TransactionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        TransactionType::from_code(&code).map_err(de::Error::custom)
    }
}

/// The settlement state of a transaction, derived from its completion flag
/// and date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The transaction is completed and counts toward the balance.
    PaidOrReceived,
    /// Not completed, dated in the future.
    Scheduled,
    /// Not completed, dated today or in the past.
    Pending,
}

impl Status {
    /// The human readable label for the status.
    pub fn label(&self) -> &'static str {
        match self {
            Status::PaidOrReceived => "Paid/Received",
            Status::Scheduled => "Scheduled",
            Status::Pending => "Pending",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// An expense or income, i.e. an event where money is either spent or
/// earned.
///
/// To create a new `Transaction`, use [Transaction::build] and pass the
/// builder to [crate::reconciler::create_transaction].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns this transaction. Assigned at creation, immutable
    /// thereafter.
    pub user_id: UserId,
    /// A short human readable title.
    pub title: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned, always non-negative. Direction
    /// is expressed through the type.
    pub amount: Decimal,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The category the transaction belongs to.
    pub category: Category,
    /// Whether the transaction has settled and counts toward the owner's
    /// balance.
    pub is_completed: bool,
    /// When the transaction happened or is expected to happen. May be in
    /// the past, present or future.
    pub date: Date,
    /// When the record was created. System-managed.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the record was last updated. System-managed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        user_id: UserId,
        title: &str,
        amount: Decimal,
        transaction_type: TransactionType,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            title: title.to_owned(),
            description: String::new(),
            amount,
            transaction_type,
            category: Category::default(),
            is_completed: false,
            date,
        }
    }

    /// The amount with the type's sign applied: positive for income,
    /// negative for expense.
    pub fn signed_amount(&self) -> Decimal {
        self.transaction_type.signed(self.amount)
    }

    /// The settlement state of the transaction as of `today`.
    pub fn status(&self, today: Date) -> Status {
        if self.is_completed {
            Status::PaidOrReceived
        } else if self.date > today {
            Status::Scheduled
        } else {
            Status::Pending
        }
    }
}

/// A builder for creating [Transaction] instances through the reconciler.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The user that will own the transaction.
    pub user_id: UserId,
    /// A short human readable title. Must not be empty.
    pub title: String,
    /// A text description, may be empty.
    pub description: String,
    /// The monetary amount, must not be negative. Rounded to two decimal
    /// places when the transaction is created.
    pub amount: Decimal,
    /// Whether money was earned or spent.
    pub transaction_type: TransactionType,
    /// The category of the transaction. Defaults to [Category::Other].
    pub category: Category,
    /// Whether the transaction is already settled. Defaults to false.
    pub is_completed: bool,
    /// When the transaction happened or is expected to happen.
    pub date: Date,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the category for the transaction.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set whether the transaction is already completed.
    pub fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    /// Check the boundary rules and normalize the amount to two decimal
    /// places.
    ///
    /// # Errors
    /// Returns [Error::EmptyTitle] or [Error::NegativeAmount] if the
    /// builder violates the boundary rules.
    pub(crate) fn validated(mut self) -> Result<Self, Error> {
        self.amount = validate_amount(&self.title, self.amount)?;
        Ok(self)
    }
}

/// The user-mutable fields of a transaction, applied as a whole on update.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionUpdate {
    /// The new title. Must not be empty.
    pub title: String,
    /// The new description.
    pub description: String,
    /// The new amount, must not be negative.
    pub amount: Decimal,
    /// The new transaction type.
    pub transaction_type: TransactionType,
    /// The new category.
    pub category: Category,
    /// The new completion flag.
    pub is_completed: bool,
    /// The new date.
    pub date: Date,
}

impl TransactionUpdate {
    /// The update that leaves every field of `transaction` unchanged.
    pub fn keeping(transaction: &Transaction) -> Self {
        Self {
            title: transaction.title.clone(),
            description: transaction.description.clone(),
            amount: transaction.amount,
            transaction_type: transaction.transaction_type,
            category: transaction.category,
            is_completed: transaction.is_completed,
            date: transaction.date,
        }
    }

    /// The signed amount the transaction will have after this update.
    pub fn signed_amount(&self) -> Decimal {
        self.transaction_type.signed(self.amount)
    }

    /// Check the boundary rules and normalize the amount to two decimal
    /// places.
    ///
    /// # Errors
    /// Returns [Error::EmptyTitle] or [Error::NegativeAmount] if the update
    /// violates the boundary rules.
    pub(crate) fn validated(mut self) -> Result<Self, Error> {
        self.amount = validate_amount(&self.title, self.amount)?;
        Ok(self)
    }
}

fn validate_amount(title: &str, amount: Decimal) -> Result<Decimal, Error> {
    if title.trim().is_empty() {
        return Err(Error::EmptyTitle);
    }

    if amount < Decimal::ZERO {
        return Err(Error::NegativeAmount(amount));
    }

    Ok(amount.round_dp(2))
}

/// A transaction as returned by the API, carrying the derived signed amount
/// and status alongside the stored fields.
#[derive(Debug, Serialize)]
pub struct TransactionPayload {
    /// The stored transaction fields.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The amount with the type's sign applied.
    pub signed_amount: Decimal,
    /// The settlement state as of the request date.
    pub status: Status,
}

impl TransactionPayload {
    /// Wrap `transaction` with the derived fields as of `today`.
    pub fn new(transaction: Transaction, today: Date) -> Self {
        let signed_amount = transaction.signed_amount();
        let status = transaction.status(today);

        Self {
            transaction,
            signed_amount,
            status,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The column list every transaction query selects, in [map_transaction_row]
/// order.
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, user_id, title, description, amount, type, category, is_completed, \
     date, created_at, updated_at";

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                amount TEXT NOT NULL,
                type TEXT NOT NULL,
                category TEXT NOT NULL,
                is_completed INTEGER NOT NULL DEFAULT 0,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    // Composite index used by the dashboard and calendar queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date \
         ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let type_code: String = row.get(5)?;
    let transaction_type = TransactionType::from_code(&type_code).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(error))
    })?;

    let category_code: String = row.get(6)?;
    let category = Category::from_code(&category_code).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        amount: decimal_column(row, 4)?,
        transaction_type,
        category,
        is_completed: row.get(7)?,
        date: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Insert a new transaction row.
///
/// This is the raw insert; callers outside the crate go through
/// [crate::reconciler::create_transaction] so the owner's balance stays
/// consistent.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the builder's user does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn insert_transaction(
    builder: &TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" \
             (user_id, title, description, amount, type, category, is_completed, date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.user_id.as_i64(),
                &builder.title,
                &builder.description,
                builder.amount.to_string(),
                builder.transaction_type.code(),
                builder.category.code(),
                builder.is_completed,
                builder.date,
                now,
                now,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Retrieve a transaction owned by `user_id` by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by
///   `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
             WHERE id = :id AND user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Overwrite the user-mutable fields of an owned transaction row and
/// refresh its `updated_at` timestamp.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a
///   transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn update_transaction_row(
    id: TransactionId,
    user_id: UserId,
    update: &TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET title = ?1, description = ?2, amount = ?3, type = ?4, category = ?5,
                 is_completed = ?6, date = ?7, updated_at = ?8
             WHERE id = ?9 AND user_id = ?10
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                &update.title,
                &update.description,
                update.amount.to_string(),
                update.transaction_type.code(),
                update.category.code(),
                update.is_completed,
                update.date,
                OffsetDateTime::now_utc(),
                id,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Delete an owned transaction row, returning the number of rows removed.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL
/// error.
pub(crate) fn delete_transaction_row(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
            &[(":id", &id), (":user_id", &user_id.as_i64())],
        )
        .map_err(|error| error.into())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL
/// error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod model_tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error,
        category::Category,
        transaction::{Status, Transaction, TransactionType},
        user::UserId,
    };

    fn income_of(amount: &str) -> crate::transaction::TransactionBuilder {
        Transaction::build(
            UserId::new(1),
            "Salary",
            amount.parse().unwrap(),
            TransactionType::Income,
            date!(2025 - 10 - 05),
        )
    }

    #[test]
    fn signed_amount_follows_type() {
        let amount: Decimal = "12.34".parse().unwrap();

        assert_eq!(TransactionType::Income.signed(amount), amount);
        assert_eq!(TransactionType::Expense.signed(amount), -amount);
    }

    #[test]
    fn status_is_paid_when_completed() {
        let today = date!(2025 - 10 - 05);
        let builder = income_of("10.00").completed(true);

        // A completed transaction is settled regardless of its date.
        let transaction = fake_transaction(builder, date!(2025 - 12 - 31));

        assert_eq!(transaction.status(today), Status::PaidOrReceived);
    }

    #[test]
    fn status_is_scheduled_for_future_dates() {
        let today = date!(2025 - 10 - 05);
        let transaction = fake_transaction(income_of("10.00"), date!(2025 - 10 - 06));

        assert_eq!(transaction.status(today), Status::Scheduled);
    }

    #[test]
    fn status_is_pending_for_past_and_present_dates() {
        let today = date!(2025 - 10 - 05);

        let due_today = fake_transaction(income_of("10.00"), today);
        assert_eq!(due_today.status(today), Status::Pending);

        let overdue = fake_transaction(income_of("10.00"), date!(2025 - 10 - 04));
        assert_eq!(overdue.status(today), Status::Pending);
    }

    #[test]
    fn empty_title_is_rejected() {
        let builder = Transaction::build(
            UserId::new(1),
            "  ",
            Decimal::ONE,
            TransactionType::Expense,
            date!(2025 - 10 - 05),
        );

        assert_eq!(builder.validated(), Err(Error::EmptyTitle));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let amount: Decimal = "-1.00".parse().unwrap();
        let builder = Transaction::build(
            UserId::new(1),
            "Refund",
            amount,
            TransactionType::Expense,
            date!(2025 - 10 - 05),
        );

        assert_eq!(builder.validated(), Err(Error::NegativeAmount(amount)));
    }

    #[test]
    fn amounts_are_normalized_to_two_decimal_places() {
        let builder = income_of("12.345").validated().unwrap();

        assert_eq!(builder.amount, "12.34".parse::<Decimal>().unwrap());
    }

    #[test]
    fn type_codes_round_trip() {
        for transaction_type in TransactionType::ALL {
            assert_eq!(
                Ok(transaction_type),
                TransactionType::from_code(transaction_type.code())
            );
        }

        assert_eq!(
            TransactionType::from_code("SIDEWAYS"),
            Err(Error::InvalidTransactionType("SIDEWAYS".to_owned()))
        );
    }

    fn fake_transaction(
        builder: crate::transaction::TransactionBuilder,
        date: time::Date,
    ) -> Transaction {
        let now = time::OffsetDateTime::now_utc();

        Transaction {
            id: 1,
            user_id: builder.user_id,
            title: builder.title,
            description: builder.description,
            amount: builder.amount,
            transaction_type: builder.transaction_type,
            category: Category::default(),
            is_completed: builder.is_completed,
            date,
            created_at: now,
            updated_at: now,
        }
    }
}
