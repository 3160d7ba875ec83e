//! Database query helpers for listing transactions.

use rusqlite::{Connection, params_from_iter, types::Value};
use time::Date;

use crate::{Error, category::Category, user::UserId};

use super::core::{TRANSACTION_COLUMNS, Transaction, TransactionType, map_transaction_row};

/// Optional conditions narrowing a transaction listing.
///
/// Every condition left unset matches all transactions. Results are always
/// scoped to one user and ordered by date, then creation time, newest
/// first.
#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    /// Match titles containing this text.
    pub search: Option<String>,
    /// Match dates on or after this day.
    pub start_date: Option<Date>,
    /// Match dates on or before this day.
    pub end_date: Option<Date>,
    /// Match any of these transaction types. Empty matches all.
    pub types: Vec<TransactionType>,
    /// Match any of these categories. Empty matches all.
    pub categories: Vec<Category>,
    /// Match only (in)complete transactions.
    pub completed: Option<bool>,
}

/// List the transactions owned by `user_id` that match `filter`, ordered by
/// date, then creation time, then ID, all descending.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn list_transactions(
    user_id: UserId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut sql = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE user_id = ?"
    );
    let mut params: Vec<Value> = vec![Value::Integer(user_id.as_i64())];

    if let Some(search) = &filter.search {
        sql.push_str(" AND title LIKE '%' || ? || '%'");
        params.push(Value::Text(search.clone()));
    }

    if let Some(start_date) = filter.start_date {
        sql.push_str(" AND date >= ?");
        params.push(Value::Text(start_date.to_string()));
    }

    if let Some(end_date) = filter.end_date {
        sql.push_str(" AND date <= ?");
        params.push(Value::Text(end_date.to_string()));
    }

    if !filter.types.is_empty() {
        push_in_clause(&mut sql, "type", filter.types.len());
        params.extend(
            filter
                .types
                .iter()
                .map(|transaction_type| Value::Text(transaction_type.code().to_owned())),
        );
    }

    if !filter.categories.is_empty() {
        push_in_clause(&mut sql, "category", filter.categories.len());
        params.extend(
            filter
                .categories
                .iter()
                .map(|category| Value::Text(category.code().to_owned())),
        );
    }

    if let Some(completed) = filter.completed {
        sql.push_str(" AND is_completed = ?");
        params.push(Value::Integer(completed as i64));
    }

    sql.push_str(" ORDER BY date DESC, created_at DESC, id DESC");

    connection
        .prepare(&sql)?
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|row| row.map_err(Error::SqlError))
        .collect()
}

fn push_in_clause(sql: &mut String, column: &str, count: usize) {
    let placeholders = vec!["?"; count].join(", ");
    sql.push_str(&format!(" AND {column} IN ({placeholders})"));
}

/// The `limit` most recently dated completed transactions owned by
/// `user_id`, tie-broken by creation time, then ID, all descending.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub fn recent_completed(
    user_id: UserId,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
             WHERE user_id = :user_id AND is_completed = 1 \
             ORDER BY date DESC, created_at DESC, id DESC \
             LIMIT :limit"
        ))?
        .query_map(
            &[(":user_id", &user_id.as_i64()), (":limit", &(limit as i64))],
            map_transaction_row,
        )?
        .map(|row| row.map_err(Error::SqlError))
        .collect()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        category::Category,
        db::initialize,
        reconciler::create_transaction,
        transaction::{Transaction, TransactionType},
        user::{UserId, create_user},
    };

    use super::{TransactionFilter, list_transactions, recent_completed};

    fn get_test_connection() -> (Connection, UserId) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user("ana@example.com", "Ana", &conn).unwrap();

        (conn, user.id)
    }

    fn seed(conn: &Connection, user_id: UserId) {
        let entries = [
            ("Salary", "2500.00", TransactionType::Income, Category::Salary, true, date!(2025 - 10 - 01)),
            ("Rent", "900.00", TransactionType::Expense, Category::Housing, true, date!(2025 - 10 - 02)),
            ("Groceries", "120.00", TransactionType::Expense, Category::Food, false, date!(2025 - 10 - 03)),
            ("Cinema", "18.00", TransactionType::Expense, Category::Leisure, true, date!(2025 - 10 - 04)),
        ];

        for (title, amount, transaction_type, category, is_completed, date) in entries {
            create_transaction(
                Transaction::build(
                    user_id,
                    title,
                    amount.parse::<Decimal>().unwrap(),
                    transaction_type,
                    date,
                )
                .category(category)
                .completed(is_completed),
                conn,
            )
            .expect("Could not create transaction");
        }
    }

    #[test]
    fn lists_only_the_owners_transactions_newest_first() {
        let (conn, user_id) = get_test_connection();
        let other = create_user("bob@example.com", "Bob", &conn).unwrap();
        seed(&conn, user_id);
        create_transaction(
            Transaction::build(
                other.id,
                "Someone else's coffee",
                Decimal::ONE,
                TransactionType::Expense,
                date!(2025 - 10 - 03),
            ),
            &conn,
        )
        .unwrap();

        let got = list_transactions(user_id, &TransactionFilter::default(), &conn).unwrap();

        let titles: Vec<&str> = got.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Cinema", "Groceries", "Rent", "Salary"]);
    }

    #[test]
    fn filters_by_title_substring() {
        let (conn, user_id) = get_test_connection();
        seed(&conn, user_id);

        let filter = TransactionFilter {
            search: Some("ocer".to_owned()),
            ..Default::default()
        };
        let got = list_transactions(user_id, &filter, &conn).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].title, "Groceries");
    }

    #[test]
    fn filters_by_date_range() {
        let (conn, user_id) = get_test_connection();
        seed(&conn, user_id);

        let filter = TransactionFilter {
            start_date: Some(date!(2025 - 10 - 02)),
            end_date: Some(date!(2025 - 10 - 03)),
            ..Default::default()
        };
        let got = list_transactions(user_id, &filter, &conn).unwrap();

        let titles: Vec<&str> = got.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Groceries", "Rent"]);
    }

    #[test]
    fn filters_by_type_category_and_completion() {
        let (conn, user_id) = get_test_connection();
        seed(&conn, user_id);

        let filter = TransactionFilter {
            types: vec![TransactionType::Expense],
            completed: Some(true),
            ..Default::default()
        };
        let got = list_transactions(user_id, &filter, &conn).unwrap();
        let titles: Vec<&str> = got.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Cinema", "Rent"]);

        let filter = TransactionFilter {
            categories: vec![Category::Food, Category::Housing],
            ..Default::default()
        };
        let got = list_transactions(user_id, &filter, &conn).unwrap();
        let titles: Vec<&str> = got.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Groceries", "Rent"]);
    }

    #[test]
    fn recent_completed_returns_at_most_limit_rows() {
        let (conn, user_id) = get_test_connection();
        seed(&conn, user_id);

        let got = recent_completed(user_id, 2, &conn).unwrap();

        let titles: Vec<&str> = got.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Cinema", "Rent"]);
    }

    #[test]
    fn recent_completed_breaks_date_ties_by_creation_order() {
        let (conn, user_id) = get_test_connection();
        let day = date!(2025 - 10 - 05);

        for title in ["First", "Second", "Third"] {
            create_transaction(
                Transaction::build(user_id, title, Decimal::ONE, TransactionType::Income, day)
                    .completed(true),
                &conn,
            )
            .unwrap();
        }

        let got = recent_completed(user_id, 5, &conn).unwrap();

        let titles: Vec<&str> = got.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Third", "Second", "First"]);
    }
}
