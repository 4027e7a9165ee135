//! Rules that split monthly income across category budgets.

mod db;
mod domain;
mod endpoints;
mod strategy;

pub use db::{
    create_allocation_rule, create_allocation_rule_table, delete_allocation_rule,
    get_allocation_rules,
};
pub use domain::{AllocationRule, AllocationRuleForm, validate_percent};
pub use endpoints::{
    AllocationState, create_allocation_rule_endpoint, delete_allocation_rule_endpoint,
    get_allocation_rules_endpoint,
};
pub use strategy::{AllocationStrategy, PercentageAllocation};
