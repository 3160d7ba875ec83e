//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating
//!   transactions through the reconciler
//! - Database functions for storing and querying transactions
//! - The JSON endpoints for the transaction routes

pub(crate) mod core;
mod query;

mod complete_endpoint;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;

pub use self::core::{
    Status, Transaction, TransactionBuilder, TransactionId, TransactionPayload, TransactionType,
    TransactionUpdate, count_transactions, create_transaction_table, get_transaction,
    map_transaction_row,
};
pub use self::query::{TransactionFilter, list_transactions, recent_completed};

pub use complete_endpoint::complete_transaction_endpoint;
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
