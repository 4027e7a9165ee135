//! Monthly maintenance: seeding, carrying over and allocating budgets when a month starts.

mod hook;
mod policies;
mod runner;

pub use hook::{
    MaintenanceState, maintenance_hook, run_maintenance_endpoint, spawn_scheduled_maintenance,
};
pub use policies::{plan_auto_allocate, plan_carry_over, plan_reset_rules};
pub use runner::{
    MaintenanceReport, MaintenanceTrigger, POLICY_ORDER, PolicyOutcome, PolicyReport,
    run_maintenance,
};
