//! The month-start policies: seeding limits, carrying over what was left, and allocating income.
//!
//! Each function works on the month `period` and reads the month before it.
//! Nothing is written here: they return the changes to make, which the store
//! applies together with the policy's timestamp.

use crate::{
    Error,
    allocation::AllocationStrategy,
    auth::UserID,
    budget::{Budget, BudgetChange, spent_by_category},
    category::CategoryName,
    period::BudgetPeriod,
    settings::ResetRule,
    store::BudgetStore,
    transaction::TransactionKind,
};

fn same_category(a: Option<&CategoryName>, b: Option<&CategoryName>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.normalized() == b.normalized(),
        _ => false,
    }
}

fn find_budget<'a>(budgets: &'a [Budget], category: Option<&CategoryName>) -> Option<&'a Budget> {
    budgets
        .iter()
        .find(|budget| same_category(budget.category.as_ref(), category))
}

/// Mean limit of `category` over the `periods` months before `period`, skipping months without a budget.
fn trailing_average<S: BudgetStore + ?Sized>(
    store: &S,
    user_id: UserID,
    period: BudgetPeriod,
    category: Option<&CategoryName>,
    periods: u32,
) -> Result<Option<f64>, Error> {
    let mut limits = Vec::new();

    for past_period in period.trailing(periods as usize) {
        let budgets = store.list_budgets(user_id, past_period)?;

        if let Some(budget) = find_budget(&budgets, category) {
            limits.push(budget.limit);
        }
    }

    if limits.is_empty() {
        return Ok(None);
    }

    Ok(Some(limits.iter().sum::<f64>() / limits.len() as f64))
}

/// Plan this month's budgets from last month's, seeding their limits with `rule`.
///
/// Budgets that already exist this month are left alone.
pub fn plan_reset_rules<S: BudgetStore + ?Sized>(
    store: &S,
    user_id: UserID,
    period: BudgetPeriod,
    rule: ResetRule,
) -> Result<Vec<BudgetChange>, Error> {
    let Some(previous_period) = period.previous() else {
        return Ok(Vec::new());
    };

    let previous_budgets = store.list_budgets(user_id, previous_period)?;
    let current_budgets = store.list_budgets(user_id, period)?;
    let mut changes = Vec::new();

    for previous in &previous_budgets {
        let category = previous.category.as_ref();

        if find_budget(&current_budgets, category).is_some() {
            continue;
        }

        let limit = match rule {
            ResetRule::Zero => 0.0,
            ResetRule::KeepPrevious => previous.limit,
            ResetRule::TrailingAverage { periods } => {
                trailing_average(store, user_id, period, category, periods)?
                    .unwrap_or(previous.limit)
            }
        };

        changes.push(BudgetChange::Seed {
            category: previous.category.clone(),
            limit,
        });
    }

    Ok(changes)
}

/// Plan adding what was left of each category budget last month to the same category this month.
///
/// Overspent budgets carry nothing. The global budget is not carried over.
pub fn plan_carry_over<S: BudgetStore + ?Sized>(
    store: &S,
    user_id: UserID,
    period: BudgetPeriod,
) -> Result<Vec<BudgetChange>, Error> {
    let Some(previous_period) = period.previous() else {
        return Ok(Vec::new());
    };

    let previous_budgets = store.list_budgets(user_id, previous_period)?;
    let previous_transactions = store.list_transactions(user_id, previous_period.date_range())?;
    let spent = spent_by_category(&previous_transactions);
    let mut changes = Vec::new();

    for previous in &previous_budgets {
        let Some(category) = &previous.category else {
            continue;
        };

        let spent = spent.get(&category.normalized()).copied().unwrap_or(0.0);
        let remainder = (previous.limit - spent).max(0.0);

        if remainder <= 0.0 {
            continue;
        }

        changes.push(BudgetChange::Increase {
            category: category.clone(),
            amount: remainder,
        });
    }

    Ok(changes)
}

/// Plan splitting last month's income across category budgets with `strategy`.
pub fn plan_auto_allocate<S: BudgetStore + ?Sized>(
    store: &S,
    user_id: UserID,
    period: BudgetPeriod,
    strategy: &dyn AllocationStrategy,
) -> Result<Vec<BudgetChange>, Error> {
    let Some(previous_period) = period.previous() else {
        return Ok(Vec::new());
    };

    let income: f64 = store
        .list_transactions(user_id, previous_period.date_range())?
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Income)
        .map(|transaction| transaction.amount.abs())
        .sum();
    let rules = store.list_allocation_rules(user_id)?;

    Ok(strategy
        .allocate(income, &rules)
        .into_iter()
        .map(|(category, amount)| BudgetChange::Increase { category, amount })
        .collect())
}
