//! Application router configuration.

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState, Error,
    calendar::get_calendar_endpoint,
    dashboard::get_dashboard_endpoint,
    endpoints,
    reconciler::recompute_balance_endpoint,
    transaction::{
        complete_transaction_endpoint, create_transaction_endpoint, delete_transaction_endpoint,
        edit_transaction_endpoint, get_transaction_endpoint, list_transactions_endpoint,
    },
    user::{create_user_endpoint, get_user_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::USERS, post(create_user_endpoint))
        .route(endpoints::USER, get(get_user_endpoint))
        .route(
            endpoints::RECOMPUTE_BALANCE,
            post(recompute_balance_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            post(create_transaction_endpoint).get(list_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::COMPLETE_TRANSACTION,
            post(complete_transaction_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard_endpoint))
        .route(endpoints::CALENDAR, get(get_calendar_endpoint))
        .fallback(get_not_found)
        .with_state(state)
}

/// The fallback for paths that match no route.
async fn get_not_found() -> Response {
    Error::NotFound.into_response()
}
