//! Per-user settings that control monthly maintenance.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_budget_settings_table, get_budget_settings, record_maintenance_timestamp,
    update_budget_settings, update_carry_over_flag,
};
pub use domain::{
    BudgetSettings, MAX_TRAILING_PERIODS, MaintenancePolicy, ResetRule, SettingsForm,
};
pub use endpoints::{SettingsState, get_settings_endpoint, update_settings_endpoint};
