//! A client-side view of one month of budgets with optimistic mutations.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetSummary, OptimisticCell, summarize_budgets, validate_limit},
    category::CategoryName,
    database_id::BudgetId,
    period::BudgetPeriod,
    store::BudgetStore,
    transaction::Transaction,
};

/// What to do when an update or delete targets a budget the store no longer has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingBudgetPolicy {
    /// Treat the mutation as successful.
    Ignore,
    /// Roll back and return the error.
    #[default]
    Report,
}

#[derive(Debug, Clone)]
struct BoardState {
    budgets: Vec<Budget>,
    transactions: Vec<Transaction>,
}

/// The budgets and transactions of one month for one user.
///
/// Mutations are applied locally first, then persisted through a [BudgetStore].
/// A failed mutation is rolled back and its error returned. A successful
/// mutation re-fetches the month's budgets from the store.
pub struct BudgetBoard {
    user_id: UserID,
    period: BudgetPeriod,
    missing_budget_policy: MissingBudgetPolicy,
    state: OptimisticCell<BoardState>,
    next_temp_id: AtomicI64,
}

impl BudgetBoard {
    /// Fetch the budgets and transactions for `period`.
    pub fn load<S: BudgetStore + ?Sized>(
        store: &S,
        user_id: UserID,
        period: BudgetPeriod,
        missing_budget_policy: MissingBudgetPolicy,
    ) -> Result<Self, Error> {
        let budgets = store.list_budgets(user_id, period)?;
        let transactions = store.list_transactions(user_id, period.date_range())?;

        Ok(Self {
            user_id,
            period,
            missing_budget_policy,
            state: OptimisticCell::new(BoardState {
                budgets,
                transactions,
            }),
            next_temp_id: AtomicI64::new(-1),
        })
    }

    /// The month this board shows.
    pub fn period(&self) -> BudgetPeriod {
        self.period
    }

    /// The budgets as currently shown, including unconfirmed changes.
    pub fn budgets(&self) -> Vec<Budget> {
        self.state.get().budgets
    }

    /// The cards and totals for the current state.
    pub fn summary(&self) -> BudgetSummary {
        let state = self.state.get();

        summarize_budgets(self.period, &state.budgets, &state.transactions)
    }

    /// Replace the month's transactions, e.g. after the user records a new one.
    pub fn set_transactions(&self, transactions: Vec<Transaction>) {
        let mut state = self.state.get();
        state.transactions = transactions;
        self.state.set(state);
    }

    /// Stop applying results of in-flight mutations.
    pub fn unmount(&self) {
        self.state.unmount();
    }

    fn temp_id(&self) -> BudgetId {
        self.next_temp_id.fetch_sub(1, Ordering::Relaxed)
    }

    /// Create a budget for `name`, or change its limit if one already exists this month.
    ///
    /// Until the store confirms, a new budget is shown with a negative temporary ID.
    pub async fn create_category_budget<S: BudgetStore + ?Sized>(
        &self,
        store: &S,
        name: &str,
        limit: f64,
    ) -> Result<Budget, Error> {
        let category = CategoryName::new(name)?;
        let limit = validate_limit(limit)?;
        let temp_budget = Budget {
            id: self.temp_id(),
            user_id: self.user_id,
            category: Some(category.clone()),
            limit,
            period: self.period,
        };

        let budget = self
            .state
            .with_optimistic_update(
                |state| upsert_local(&mut state.budgets, temp_budget),
                async { store.upsert_budget(self.user_id, Some(&category), limit, self.period) },
            )
            .await?;

        self.revalidate(store);

        Ok(budget)
    }

    /// Set the month's global budget, creating it if needed.
    pub async fn set_global_budget<S: BudgetStore + ?Sized>(
        &self,
        store: &S,
        limit: f64,
    ) -> Result<Budget, Error> {
        let limit = validate_limit(limit)?;
        let temp_budget = Budget {
            id: self.temp_id(),
            user_id: self.user_id,
            category: None,
            limit,
            period: self.period,
        };

        let budget = self
            .state
            .with_optimistic_update(
                |state| upsert_local(&mut state.budgets, temp_budget),
                async { store.upsert_budget(self.user_id, None, limit, self.period) },
            )
            .await?;

        self.revalidate(store);

        Ok(budget)
    }

    /// Change the limit of an existing budget.
    pub async fn update_budget<S: BudgetStore + ?Sized>(
        &self,
        store: &S,
        budget_id: BudgetId,
        limit: f64,
    ) -> Result<(), Error> {
        let limit = validate_limit(limit)?;

        self.state
            .with_optimistic_update(
                |state| {
                    if let Some(budget) = state.budgets.iter_mut().find(|budget| budget.id == budget_id) {
                        budget.limit = limit;
                    }
                },
                async {
                    let result = store.update_budget(self.user_id, budget_id, limit).map(|_| ());
                    self.apply_missing_budget_policy(result, budget_id)
                },
            )
            .await?;

        self.revalidate(store);

        Ok(())
    }

    /// Delete a budget.
    pub async fn delete_budget<S: BudgetStore + ?Sized>(
        &self,
        store: &S,
        budget_id: BudgetId,
    ) -> Result<(), Error> {
        self.state
            .with_optimistic_update(
                |state| state.budgets.retain(|budget| budget.id != budget_id),
                async {
                    let result = store.delete_budget(self.user_id, budget_id);
                    self.apply_missing_budget_policy(result, budget_id)
                },
            )
            .await?;

        self.revalidate(store);

        Ok(())
    }

    fn apply_missing_budget_policy(
        &self,
        result: Result<(), Error>,
        budget_id: BudgetId,
    ) -> Result<(), Error> {
        match result {
            Err(error)
                if error.is_missing_row()
                    && self.missing_budget_policy == MissingBudgetPolicy::Ignore =>
            {
                tracing::warn!("Budget {budget_id} no longer exists, ignoring: {error}");
                Ok(())
            }
            result => result,
        }
    }

    /// Re-fetch the month's budgets so that temporary IDs are replaced.
    ///
    /// A failed re-fetch is logged and the optimistic state is kept.
    fn revalidate<S: BudgetStore + ?Sized>(&self, store: &S) {
        if !self.state.is_mounted() {
            return;
        }

        match store.list_budgets(self.user_id, self.period) {
            Ok(budgets) => {
                let mut state = self.state.get();
                state.budgets = budgets;
                self.state.set(state);
            }
            Err(error) => {
                tracing::warn!("Could not refresh budgets for {}: {error}", self.period);
            }
        }
    }
}

/// Replace the local budget with the same category as `budget`, or append it.
fn upsert_local(budgets: &mut Vec<Budget>, budget: Budget) {
    let existing = budgets.iter_mut().find(|existing| match (&existing.category, &budget.category) {
        (None, None) => true,
        (Some(existing), Some(new)) => existing.matches(new.as_ref()),
        _ => false,
    });

    match existing {
        Some(existing) => existing.limit = budget.limit,
        None => budgets.push(budget),
    }
}
