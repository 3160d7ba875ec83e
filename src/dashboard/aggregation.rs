//! Transaction data aggregation for the dashboard.
//!
//! Pure functions over fetched rows: monthly totals, the 30-day running
//! balance series, and expense totals grouped by category. All arithmetic
//! uses exact decimals.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, Duration};

use crate::{category::Category, transaction::TransactionType};

use super::transaction::CompletedTransaction;

/// The number of days covered by the daily balance series, today inclusive.
pub(super) const BALANCE_SERIES_DAYS: i64 = 30;

/// Income, expense and savings totals for one calendar month.
#[derive(Debug, PartialEq, Serialize)]
pub(super) struct MonthlySummary {
    /// Total completed income this month.
    pub(super) income: Decimal,
    /// Total completed expenses this month.
    pub(super) expense: Decimal,
    /// Income minus expenses.
    pub(super) savings: Decimal,
}

/// Sum the completed transactions dated in `today`'s calendar month, split
/// by type.
pub(super) fn monthly_summary(
    transactions: &[CompletedTransaction],
    today: Date,
) -> MonthlySummary {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;

    for transaction in transactions.iter().filter(|t| in_month(t.date, today)) {
        match transaction.transaction_type {
            TransactionType::Income => income += transaction.amount,
            TransactionType::Expense => expense += transaction.amount,
        }
    }

    MonthlySummary {
        income,
        expense,
        savings: income - expense,
    }
}

fn in_month(date: Date, today: Date) -> bool {
    date.year() == today.year() && date.month() == today.month()
}

/// The running balance at the end of one day.
#[derive(Debug, PartialEq, Serialize)]
pub(super) struct DailyBalance {
    /// The day the balance is for.
    pub(super) date: Date,
    /// The balance over completed transactions dated on or before the day.
    pub(super) balance: Decimal,
}

/// The running balance for each of the [BALANCE_SERIES_DAYS] days ending
/// `today`, oldest first.
///
/// Each value is the sum of the signed amounts of the completed
/// transactions dated strictly before the window, plus the cumulative
/// signed amounts of completed transactions up to and including the day.
/// Completed transactions dated after `today` never appear in the series.
pub(super) fn daily_balance_series(
    transactions: &[CompletedTransaction],
    today: Date,
) -> Vec<DailyBalance> {
    let window_start = today - Duration::days(BALANCE_SERIES_DAYS - 1);

    let mut opening_balance = Decimal::ZERO;
    let mut day_totals: HashMap<Date, Decimal> = HashMap::new();

    for transaction in transactions {
        if transaction.date < window_start {
            opening_balance += transaction.signed_amount();
        } else if transaction.date <= today {
            *day_totals.entry(transaction.date).or_insert(Decimal::ZERO) +=
                transaction.signed_amount();
        }
    }

    let mut series = Vec::with_capacity(BALANCE_SERIES_DAYS as usize);
    let mut running = opening_balance;

    for offset in 0..BALANCE_SERIES_DAYS {
        let date = window_start + Duration::days(offset);
        running += day_totals.get(&date).copied().unwrap_or(Decimal::ZERO);
        series.push(DailyBalance {
            date,
            balance: running,
        });
    }

    series
}

/// The total spent in one category.
#[derive(Debug, PartialEq, Serialize)]
pub(super) struct CategoryTotal {
    /// The category code.
    pub(super) category: Category,
    /// The category's display label.
    pub(super) label: &'static str,
    /// The total amount spent.
    pub(super) total: Decimal,
}

/// Sum the completed expenses dated in `today`'s calendar month by
/// category, largest total first. Categories with no expenses are omitted.
pub(super) fn expenses_by_category(
    transactions: &[CompletedTransaction],
    today: Date,
) -> Vec<CategoryTotal> {
    let mut totals: HashMap<Category, Decimal> = HashMap::new();

    let expenses = transactions.iter().filter(|t| {
        t.transaction_type == TransactionType::Expense && in_month(t.date, today)
    });

    for transaction in expenses {
        *totals.entry(transaction.category).or_insert(Decimal::ZERO) += transaction.amount;
    }

    let mut totals: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category,
            label: category.label(),
            total,
        })
        .collect();

    totals.sort_by(|a, b| b.total.cmp(&a.total).then(a.label.cmp(b.label)));

    totals
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::{Duration, macros::date};

    use crate::{category::Category, transaction::TransactionType};

    use super::{
        super::transaction::CompletedTransaction, BALANCE_SERIES_DAYS, daily_balance_series,
        expenses_by_category, monthly_summary,
    };

    fn dec(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    fn income(amount: &str, date: time::Date) -> CompletedTransaction {
        CompletedTransaction {
            date,
            amount: dec(amount),
            transaction_type: TransactionType::Income,
            category: Category::Salary,
        }
    }

    fn expense(amount: &str, date: time::Date, category: Category) -> CompletedTransaction {
        CompletedTransaction {
            date,
            amount: dec(amount),
            transaction_type: TransactionType::Expense,
            category,
        }
    }

    #[test]
    fn monthly_summary_covers_only_the_current_month() {
        let today = date!(2025 - 10 - 15);
        let transactions = vec![
            income("2500.00", date!(2025 - 10 - 01)),
            expense("900.00", date!(2025 - 10 - 02), Category::Housing),
            // Same month last year and last month are both excluded.
            income("9999.00", date!(2024 - 10 - 01)),
            expense("50.00", date!(2025 - 09 - 30), Category::Food),
        ];

        let summary = monthly_summary(&transactions, today);

        assert_eq!(summary.income, dec("2500.00"));
        assert_eq!(summary.expense, dec("900.00"));
        assert_eq!(summary.savings, dec("1600.00"));
    }

    #[test]
    fn series_always_has_thirty_values_oldest_first() {
        let today = date!(2025 - 10 - 15);

        let series = daily_balance_series(&[], today);

        assert_eq!(series.len(), BALANCE_SERIES_DAYS as usize);
        assert_eq!(series[0].date, today - Duration::days(29));
        assert_eq!(series.last().unwrap().date, today);
        assert!(series.iter().all(|day| day.balance == Decimal::ZERO));
    }

    #[test]
    fn series_starts_from_the_balance_before_the_window() {
        let today = date!(2025 - 10 - 15);
        let transactions = vec![
            income("1000.00", date!(2025 - 01 - 01)),
            expense("100.00", today - Duration::days(29), Category::Food),
        ];

        let series = daily_balance_series(&transactions, today);

        assert_eq!(series[0].balance, dec("900.00"));
        assert_eq!(series.last().unwrap().balance, dec("900.00"));
    }

    #[test]
    fn series_accumulates_by_day() {
        let today = date!(2025 - 10 - 15);
        let transactions = vec![
            income("100.00", today - Duration::days(2)),
            expense("30.00", today - Duration::days(1), Category::Food),
            expense("20.00", today - Duration::days(1), Category::Leisure),
            income("5.00", today),
        ];

        let series = daily_balance_series(&transactions, today);

        let last_three: Vec<Decimal> = series[27..].iter().map(|day| day.balance).collect();
        assert_eq!(last_three, vec![dec("100.00"), dec("50.00"), dec("55.00")]);
    }

    #[test]
    fn series_ignores_transactions_dated_after_today() {
        let today = date!(2025 - 10 - 15);
        let transactions = vec![
            income("100.00", today),
            income("9999.00", today + Duration::days(1)),
        ];

        let series = daily_balance_series(&transactions, today);

        assert_eq!(series.last().unwrap().balance, dec("100.00"));
    }

    #[test]
    fn category_totals_are_sorted_largest_first() {
        let today = date!(2025 - 10 - 15);
        let transactions = vec![
            expense("100.00", date!(2025 - 10 - 01), Category::Food),
            expense("20.00", date!(2025 - 10 - 02), Category::Food),
            expense("900.00", date!(2025 - 10 - 02), Category::Housing),
            expense("18.00", date!(2025 - 10 - 04), Category::Leisure),
            // Income and other months never show up.
            income("2500.00", date!(2025 - 10 - 01)),
            expense("77.00", date!(2025 - 09 - 04), Category::Leisure),
        ];

        let totals = expenses_by_category(&transactions, today);

        let got: Vec<(Category, Decimal)> =
            totals.into_iter().map(|t| (t.category, t.total)).collect();
        assert_eq!(
            got,
            vec![
                (Category::Housing, dec("900.00")),
                (Category::Food, dec("120.00")),
                (Category::Leisure, dec("18.00")),
            ]
        );
    }
}
