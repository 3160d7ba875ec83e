//! Dashboard module
//!
//! Read-only aggregation over a user's completed transactions: monthly
//! income, expense and savings, a 30-day daily balance series, expense
//! totals by category, and the most recent completed transactions.

mod aggregation;
mod handlers;
mod transaction;

pub use handlers::get_dashboard_endpoint;
