//! Budget endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{
        Budget, BudgetLimitForm, BudgetSummary, CategoryBudgetForm, GlobalBudgetForm,
        delete_budget, get_budgets_for_period, summarize_budgets, update_budget_limit,
        upsert_budget,
    },
    category::CategoryName,
    database_id::BudgetId,
    period::BudgetPeriod,
    timezone::local_now,
    transaction::get_transactions_in_range,
};

/// The state needed for the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters selecting a month. Both must be given to override the current month.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<i32>,
    pub month: Option<u8>,
}

impl PeriodQuery {
    fn resolve(&self, local_timezone: &str) -> Result<BudgetPeriod, Error> {
        match (self.year, self.month) {
            (Some(year), Some(month)) => BudgetPeriod::new(year, month),
            _ => Ok(BudgetPeriod::containing(local_now(local_timezone)?.date())),
        }
    }
}

/// Get the budget cards and totals for a month.
pub async fn get_budget_summary_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<BudgetSummary>, Error> {
    let period = query.resolve(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets_for_period(user_id, period, &connection)?;
    let transactions = get_transactions_in_range(user_id, period.date_range(), &connection)?;

    Ok(Json(summarize_budgets(period, &budgets, &transactions)))
}

/// Create a category budget, or replace the limit of the existing one for that month.
pub async fn upsert_category_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<CategoryBudgetForm>,
) -> Result<Json<Budget>, Error> {
    let category = CategoryName::new(&form.category)?;
    let period = BudgetPeriod::new(form.year, form.month)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    upsert_budget(user_id, Some(&category), form.limit, period, &connection).map(Json)
}

/// Set the global budget for a month.
pub async fn set_global_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<GlobalBudgetForm>,
) -> Result<Json<Budget>, Error> {
    let period = BudgetPeriod::new(form.year, form.month)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    upsert_budget(user_id, None, form.limit, period, &connection).map(Json)
}

/// Change the limit of a budget.
pub async fn update_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
    Json(form): Json<BudgetLimitForm>,
) -> Result<Json<Budget>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    update_budget_limit(user_id, budget_id, form.limit, &connection).map(Json)
}

/// Delete a budget.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_budget(user_id, budget_id, &connection).map(|_| StatusCode::NO_CONTENT)
}
