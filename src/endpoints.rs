//! The API endpoint URIs.

/// The route to create a user record.
pub const USERS: &str = "/api/users";
/// The route to fetch a user with their current cached balance.
pub const USER: &str = "/api/users/{user_id}";
/// The route to rebuild a user's cached balance from their transactions.
pub const RECOMPUTE_BALANCE: &str = "/api/users/{user_id}/balance/recompute";
/// The route to create or list a user's transactions.
pub const TRANSACTIONS: &str = "/api/users/{user_id}/transactions";
/// The route to fetch, edit or delete a single transaction.
pub const TRANSACTION: &str = "/api/users/{user_id}/transactions/{transaction_id}";
/// The route to mark a transaction as completed.
pub const COMPLETE_TRANSACTION: &str =
    "/api/users/{user_id}/transactions/{transaction_id}/complete";
/// The route for the user's dashboard overview.
pub const DASHBOARD: &str = "/api/users/{user_id}/dashboard";
/// The route for per-day transaction activity in a month.
pub const CALENDAR: &str = "/api/users/{user_id}/calendar/{year}/{month}";
