use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use saldo::category::Category;
use saldo::initialize_db;
use saldo::reconciler::create_transaction;
use saldo::transaction::{Transaction, TransactionType};
use saldo::user::{create_user, get_user_by_id};

/// A utility for creating a demo database for the saldo API server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user...");
    let user = create_user("demo@example.com", "Demo", &conn)?;

    println!("Creating demo transactions...");
    let today = OffsetDateTime::now_utc().date();

    let entries: [(&str, &str, TransactionType, Category, bool, time::Date); 6] = [
        (
            "Monthly salary",
            "2600.00",
            TransactionType::Income,
            Category::Salary,
            true,
            today - Duration::days(14),
        ),
        (
            "Rent",
            "950.00",
            TransactionType::Expense,
            Category::Housing,
            true,
            today - Duration::days(12),
        ),
        (
            "Groceries",
            "86.40",
            TransactionType::Expense,
            Category::Food,
            true,
            today - Duration::days(3),
        ),
        (
            "Concert tickets",
            "120.00",
            TransactionType::Expense,
            Category::Leisure,
            true,
            today - Duration::days(1),
        ),
        (
            "Freelance invoice",
            "400.00",
            TransactionType::Income,
            Category::Other,
            false,
            today + Duration::days(7),
        ),
        (
            "Electricity bill",
            "74.30",
            TransactionType::Expense,
            Category::Housing,
            false,
            today + Duration::days(10),
        ),
    ];

    for (title, amount, transaction_type, category, is_completed, date) in entries {
        let amount: Decimal = amount.parse()?;
        create_transaction(
            Transaction::build(user.id, title, amount, transaction_type, date)
                .category(category)
                .completed(is_completed),
            &conn,
        )?;
    }

    let user = get_user_by_id(user.id, &conn)?;
    println!("Success! Demo user #{} starts at {}.", user.id, user.balance);

    Ok(())
}
