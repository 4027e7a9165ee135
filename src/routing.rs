//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};

use crate::{
    AppState, Error,
    allocation::{
        create_allocation_rule_endpoint, delete_allocation_rule_endpoint,
        get_allocation_rules_endpoint,
    },
    auth::{auth_guard, post_log_in, post_log_out},
    budget::{
        delete_budget_endpoint, get_budget_summary_endpoint, set_global_budget_endpoint,
        update_budget_endpoint, upsert_category_budget_endpoint,
    },
    category::{create_category_endpoint, get_categories_endpoint, update_category_endpoint},
    endpoints,
    maintenance::{maintenance_hook, run_maintenance_endpoint},
    settings::{get_settings_endpoint, update_settings_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every protected route starts scheduled maintenance for the logged-in user
/// in the background.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT_API, post(post_log_out));

    let protected_routes = Router::new()
        .route(
            endpoints::BUDGETS_API,
            get(get_budget_summary_endpoint).post(upsert_category_budget_endpoint),
        )
        .route(endpoints::GLOBAL_BUDGET_API, put(set_global_budget_endpoint))
        .route(
            endpoints::BUDGET_API,
            put(update_budget_endpoint).delete(delete_budget_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_API,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION_API,
            delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::CATEGORIES_API,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(endpoints::CATEGORY_API, put(update_category_endpoint))
        .route(
            endpoints::SETTINGS_API,
            get(get_settings_endpoint).put(update_settings_endpoint),
        )
        .route(
            endpoints::ALLOCATION_RULES_API,
            get(get_allocation_rules_endpoint).post(create_allocation_rule_endpoint),
        )
        .route(
            endpoints::ALLOCATION_RULE_API,
            delete(delete_allocation_rule_endpoint),
        )
        .route(endpoints::MAINTENANCE_API, post(run_maintenance_endpoint))
        // The guard must be the outer layer so that the hook sees the user ID.
        .route_layer(middleware::from_fn_with_state(state.clone(), maintenance_hook))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
