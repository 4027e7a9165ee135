//! Settings endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    settings::{BudgetSettings, SettingsForm, get_budget_settings, update_budget_settings},
};

/// The state needed for the settings endpoints.
#[derive(Debug, Clone)]
pub struct SettingsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get the user's budget settings.
pub async fn get_settings_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<BudgetSettings>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_budget_settings(user_id, &connection).map(Json)
}

/// Change the user's budget settings.
pub async fn update_settings_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<SettingsForm>,
) -> Result<Json<BudgetSettings>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    update_budget_settings(user_id, &form, &connection).map(Json)
}
