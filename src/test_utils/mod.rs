//! Fixtures shared by the unit tests.

#![allow(missing_docs)]

use std::{
    ops::RangeInclusive,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    allocation::AllocationRule,
    auth::{PasswordHash, UserID, Username, create_user},
    budget::{Budget, BudgetChange},
    category::CategoryName,
    database_id::BudgetId,
    db::initialize,
    period::BudgetPeriod,
    settings::{BudgetSettings, MaintenancePolicy},
    store::{BudgetStore, SQLiteStore},
    transaction::{Transaction, TransactionKind, create_transaction},
};

/// An initialized in-memory database.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    initialize(&connection).unwrap();
    connection
}

pub(crate) fn create_test_user(username: &str, connection: &Connection) -> UserID {
    create_user(
        Username::new(username).unwrap(),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .unwrap()
    .id
}

/// A store over an in-memory database with one user.
pub(crate) fn new_sqlite_store() -> (SQLiteStore, UserID) {
    let connection = get_test_connection();
    let user_id = create_test_user("alex", &connection);

    (SQLiteStore::new(Arc::new(Mutex::new(connection))), user_id)
}

pub(crate) fn add_test_transaction(
    store: &SQLiteStore,
    user_id: UserID,
    category: &str,
    amount: f64,
    kind: TransactionKind,
    date: Date,
) -> Transaction {
    create_transaction(
        user_id,
        Some(CategoryName::new(category).unwrap()),
        amount,
        kind,
        date,
        "",
        &store.connection().unwrap(),
    )
    .unwrap()
}

/// Wraps a store and fails selected operations with [Error::DatabaseLockError].
pub(crate) struct FlakyStore<'a> {
    inner: &'a SQLiteStore,
    fail_writes: bool,
    fail_transactions: bool,
}

impl<'a> FlakyStore<'a> {
    /// Fails budget upserts, updates, deletes and maintenance writes.
    pub(crate) fn failing_writes(inner: &'a SQLiteStore) -> Self {
        Self {
            inner,
            fail_writes: true,
            fail_transactions: false,
        }
    }

    /// Fails transaction listing.
    pub(crate) fn failing_transactions(inner: &'a SQLiteStore) -> Self {
        Self {
            inner,
            fail_writes: false,
            fail_transactions: true,
        }
    }

    fn check_write(&self) -> Result<(), Error> {
        if self.fail_writes {
            Err(Error::DatabaseLockError)
        } else {
            Ok(())
        }
    }
}

impl BudgetStore for FlakyStore<'_> {
    fn list_budgets(&self, user_id: UserID, period: BudgetPeriod) -> Result<Vec<Budget>, Error> {
        self.inner.list_budgets(user_id, period)
    }

    fn upsert_budget(
        &self,
        user_id: UserID,
        category: Option<&CategoryName>,
        limit: f64,
        period: BudgetPeriod,
    ) -> Result<Budget, Error> {
        self.check_write()?;
        self.inner.upsert_budget(user_id, category, limit, period)
    }

    fn update_budget(
        &self,
        user_id: UserID,
        budget_id: BudgetId,
        limit: f64,
    ) -> Result<Budget, Error> {
        self.check_write()?;
        self.inner.update_budget(user_id, budget_id, limit)
    }

    fn delete_budget(&self, user_id: UserID, budget_id: BudgetId) -> Result<(), Error> {
        self.check_write()?;
        self.inner.delete_budget(user_id, budget_id)
    }

    fn list_transactions(
        &self,
        user_id: UserID,
        date_range: RangeInclusive<Date>,
    ) -> Result<Vec<Transaction>, Error> {
        if self.fail_transactions {
            return Err(Error::DatabaseLockError);
        }

        self.inner.list_transactions(user_id, date_range)
    }

    fn get_settings(&self, user_id: UserID) -> Result<BudgetSettings, Error> {
        self.inner.get_settings(user_id)
    }

    fn update_carry_over_flag(&self, user_id: UserID, enabled: bool) -> Result<(), Error> {
        self.inner.update_carry_over_flag(user_id, enabled)
    }

    fn record_maintenance_timestamp(
        &self,
        user_id: UserID,
        policy: MaintenancePolicy,
        timestamp: OffsetDateTime,
    ) -> Result<(), Error> {
        self.inner.record_maintenance_timestamp(user_id, policy, timestamp)
    }

    fn apply_maintenance(
        &self,
        user_id: UserID,
        period: BudgetPeriod,
        policy: MaintenancePolicy,
        changes: &[BudgetChange],
        applied_at: OffsetDateTime,
    ) -> Result<usize, Error> {
        self.check_write()?;
        self.inner
            .apply_maintenance(user_id, period, policy, changes, applied_at)
    }

    fn list_allocation_rules(&self, user_id: UserID) -> Result<Vec<AllocationRule>, Error> {
        self.inner.list_allocation_rules(user_id)
    }
}
