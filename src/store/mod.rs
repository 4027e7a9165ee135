//! The persistence interface used by the budget board and the maintenance runner.

mod sqlite;

use std::ops::RangeInclusive;

use time::{Date, OffsetDateTime};

use crate::{
    Error,
    allocation::AllocationRule,
    auth::UserID,
    budget::{Budget, BudgetChange},
    category::CategoryName,
    database_id::BudgetId,
    period::BudgetPeriod,
    settings::{BudgetSettings, MaintenancePolicy},
    transaction::Transaction,
};

pub use sqlite::SQLiteStore;

/// Reads and writes the budget data of a user.
///
/// Every operation is scoped to `user_id`: rows owned by other users are
/// treated as missing.
pub trait BudgetStore {
    /// Get the user's budgets for `period`, global budget included.
    fn list_budgets(&self, user_id: UserID, period: BudgetPeriod) -> Result<Vec<Budget>, Error>;

    /// Set the limit of the budget for `category` in `period`, creating it if needed.
    ///
    /// `None` as the category targets the global budget.
    fn upsert_budget(
        &self,
        user_id: UserID,
        category: Option<&CategoryName>,
        limit: f64,
        period: BudgetPeriod,
    ) -> Result<Budget, Error>;

    /// Change the limit of a budget.
    fn update_budget(&self, user_id: UserID, budget_id: BudgetId, limit: f64)
    -> Result<Budget, Error>;

    /// Delete a budget.
    fn delete_budget(&self, user_id: UserID, budget_id: BudgetId) -> Result<(), Error>;

    /// Get the user's transactions dated within `date_range`.
    fn list_transactions(
        &self,
        user_id: UserID,
        date_range: RangeInclusive<Date>,
    ) -> Result<Vec<Transaction>, Error>;

    /// Get the user's settings, creating the defaults if needed.
    fn get_settings(&self, user_id: UserID) -> Result<BudgetSettings, Error>;

    /// Turn carry-over on or off.
    fn update_carry_over_flag(&self, user_id: UserID, enabled: bool) -> Result<(), Error>;

    /// Record that `policy` was applied at `timestamp`.
    fn record_maintenance_timestamp(
        &self,
        user_id: UserID,
        policy: MaintenancePolicy,
        timestamp: OffsetDateTime,
    ) -> Result<(), Error>;

    /// Apply `changes` to the user's budgets for `period` and record that
    /// `policy` was applied at `applied_at`.
    ///
    /// Either all of it is saved or none of it is. Returns how many budgets
    /// were created or changed.
    fn apply_maintenance(
        &self,
        user_id: UserID,
        period: BudgetPeriod,
        policy: MaintenancePolicy,
        changes: &[BudgetChange],
        applied_at: OffsetDateTime,
    ) -> Result<usize, Error>;

    /// Get the user's auto-allocation rules.
    fn list_allocation_rules(&self, user_id: UserID) -> Result<Vec<AllocationRule>, Error>;
}
