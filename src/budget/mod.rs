//! Monthly budgets, how much of them has been spent, and the client-side board for editing them.

mod aggregation;
mod board;
mod db;
mod domain;
mod endpoints;
mod optimistic;

pub use aggregation::{
    BudgetCard, BudgetSummary, BudgetTotals, budget_cards, normalize_category_name,
    percent_used, spent_by_category, summarize_budgets, totals,
};
pub use board::{BudgetBoard, MissingBudgetPolicy};
pub use db::{
    apply_budget_changes, create_budget_table, delete_budget, get_budget, get_budgets_for_period,
    update_budget_limit, upsert_budget,
};
pub use domain::{
    Budget, BudgetChange, BudgetLimitForm, CategoryBudgetForm, GlobalBudgetForm, validate_limit,
};
pub use endpoints::{
    BudgetState, PeriodQuery, delete_budget_endpoint, get_budget_summary_endpoint,
    set_global_budget_endpoint, update_budget_endpoint, upsert_category_budget_endpoint,
};
pub use optimistic::OptimisticCell;
