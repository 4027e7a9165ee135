//! Transaction endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::TransactionId,
    period::BudgetPeriod,
    timezone::local_now,
    transaction::{
        NewTransaction, Transaction, create_transaction, delete_transaction,
        get_transactions_in_range,
    },
};

/// The state needed for the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters for listing transactions.
///
/// Missing bounds default to the first and last day of the current month.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionRangeQuery {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

/// List the user's transactions in a date range.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionRangeQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let current_month = BudgetPeriod::containing(local_now(&state.local_timezone)?.date());
    let from = query.from.unwrap_or(current_month.first_day());
    let to = query.to.unwrap_or(current_month.last_day());

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_transactions_in_range(user_id, from..=to, &connection).map(Json)
}

/// Record a transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let amount = new_transaction.magnitude()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    create_transaction(
        user_id,
        new_transaction.category_name(),
        amount,
        new_transaction.kind,
        new_transaction.date,
        new_transaction.description.trim(),
        &connection,
    )
    .map(|transaction| (StatusCode::CREATED, Json(transaction)))
}

/// Delete a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(user_id, transaction_id, &connection).map(|_| StatusCode::NO_CONTENT)
}
