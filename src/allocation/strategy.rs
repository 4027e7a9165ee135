//! Turns a month's income into amounts for category budgets.

use crate::{allocation::AllocationRule, category::CategoryName};

/// Decides how much of `income` each category budget receives.
pub trait AllocationStrategy: Send + Sync {
    /// The amount to add to each category's budget.
    ///
    /// Categories that would receive nothing may be left out.
    fn allocate(&self, income: f64, rules: &[AllocationRule]) -> Vec<(CategoryName, f64)>;
}

/// Gives each rule's category `income * percent / 100`, rounded to cents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentageAllocation;

impl AllocationStrategy for PercentageAllocation {
    fn allocate(&self, income: f64, rules: &[AllocationRule]) -> Vec<(CategoryName, f64)> {
        if income <= 0.0 {
            return Vec::new();
        }

        rules
            .iter()
            .map(|rule| {
                let amount = (income * rule.percent).round() / 100.0;
                (rule.category.clone(), amount)
            })
            .filter(|(_, amount)| *amount > 0.0)
            .collect()
    }
}
