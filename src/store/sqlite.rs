//! Implements a SQLite backed budget store.

use std::{
    ops::RangeInclusive,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    allocation::{AllocationRule, get_allocation_rules},
    auth::UserID,
    budget::{self, Budget, BudgetChange},
    category::CategoryName,
    database_id::BudgetId,
    period::BudgetPeriod,
    settings::{self, BudgetSettings, MaintenancePolicy},
    store::BudgetStore,
    transaction::{Transaction, get_transactions_in_range},
};

/// Reads and writes budget data in a SQLite database shared with the HTTP handlers.
#[derive(Debug, Clone)]
pub struct SQLiteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteStore {
    /// Create a store over an initialized database connection.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Lock the underlying connection.
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

impl BudgetStore for SQLiteStore {
    fn list_budgets(&self, user_id: UserID, period: BudgetPeriod) -> Result<Vec<Budget>, Error> {
        budget::get_budgets_for_period(user_id, period, &*self.connection()?)
    }

    fn upsert_budget(
        &self,
        user_id: UserID,
        category: Option<&CategoryName>,
        limit: f64,
        period: BudgetPeriod,
    ) -> Result<Budget, Error> {
        budget::upsert_budget(user_id, category, limit, period, &*self.connection()?)
    }

    fn update_budget(
        &self,
        user_id: UserID,
        budget_id: BudgetId,
        limit: f64,
    ) -> Result<Budget, Error> {
        budget::update_budget_limit(user_id, budget_id, limit, &*self.connection()?)
    }

    fn delete_budget(&self, user_id: UserID, budget_id: BudgetId) -> Result<(), Error> {
        budget::delete_budget(user_id, budget_id, &*self.connection()?)
    }

    fn list_transactions(
        &self,
        user_id: UserID,
        date_range: RangeInclusive<Date>,
    ) -> Result<Vec<Transaction>, Error> {
        get_transactions_in_range(user_id, date_range, &*self.connection()?)
    }

    fn get_settings(&self, user_id: UserID) -> Result<BudgetSettings, Error> {
        settings::get_budget_settings(user_id, &*self.connection()?)
    }

    fn update_carry_over_flag(&self, user_id: UserID, enabled: bool) -> Result<(), Error> {
        settings::update_carry_over_flag(user_id, enabled, &*self.connection()?)
    }

    fn record_maintenance_timestamp(
        &self,
        user_id: UserID,
        policy: MaintenancePolicy,
        timestamp: OffsetDateTime,
    ) -> Result<(), Error> {
        settings::record_maintenance_timestamp(user_id, policy, timestamp, &*self.connection()?)
    }

    fn apply_maintenance(
        &self,
        user_id: UserID,
        period: BudgetPeriod,
        policy: MaintenancePolicy,
        changes: &[BudgetChange],
        applied_at: OffsetDateTime,
    ) -> Result<usize, Error> {
        let connection = self.connection()?;
        let transaction = connection.unchecked_transaction()?;

        let changed = budget::apply_budget_changes(user_id, period, changes, &transaction)?;
        settings::record_maintenance_timestamp(user_id, policy, applied_at, &transaction)?;
        transaction.commit()?;

        Ok(changed)
    }

    fn list_allocation_rules(&self, user_id: UserID) -> Result<Vec<AllocationRule>, Error> {
        get_allocation_rules(user_id, &*self.connection()?)
    }
}
