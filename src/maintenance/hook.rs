//! Triggers maintenance from HTTP requests.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::Response,
};
use rusqlite::Connection;
use time::OffsetDateTime;
use tokio::task::JoinHandle;

use crate::{
    AppState, Error,
    allocation::PercentageAllocation,
    auth::UserID,
    maintenance::{MaintenanceReport, MaintenanceTrigger, run_maintenance},
    store::SQLiteStore,
    timezone::local_now,
};

/// The state needed to run maintenance from a request.
#[derive(Debug, Clone)]
pub struct MaintenanceState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MaintenanceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Run scheduled maintenance for `user_id` on a blocking thread.
pub fn spawn_scheduled_maintenance(
    db_connection: Arc<Mutex<Connection>>,
    user_id: Option<UserID>,
    now: OffsetDateTime,
) -> JoinHandle<Option<MaintenanceReport>> {
    tokio::task::spawn_blocking(move || {
        let store = SQLiteStore::new(db_connection);

        run_maintenance(
            user_id,
            now,
            MaintenanceTrigger::Scheduled,
            &store,
            &PercentageAllocation,
        )
    })
}

/// Middleware that starts scheduled maintenance for the current user and
/// carries on with the request without waiting for it.
///
/// Must be layered inside [crate::auth::auth_guard] so that the user ID is available.
pub async fn maintenance_hook(
    State(state): State<MaintenanceState>,
    request: Request,
    next: Next,
) -> Response {
    let user_id = request.extensions().get::<UserID>().copied();

    match local_now(&state.local_timezone) {
        Ok(now) => {
            // Dropping the handle detaches the task.
            spawn_scheduled_maintenance(state.db_connection.clone(), user_id, now);
        }
        Err(error) => tracing::error!("Skipping maintenance: {error}"),
    }

    next.run(request).await
}

/// Run maintenance for the current user now, whatever the day of the month.
pub async fn run_maintenance_endpoint(
    State(state): State<MaintenanceState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<MaintenanceReport>, Error> {
    let now = local_now(&state.local_timezone)?;
    let store = SQLiteStore::new(state.db_connection);

    run_maintenance(
        Some(user_id),
        now,
        MaintenanceTrigger::Manual,
        &store,
        &PercentageAllocation,
    )
    .map(Json)
    .ok_or(Error::NotAuthenticated)
}
