//! Derives spend-versus-limit figures from a month's budgets and transactions.
//!
//! Everything here is pure: callers fetch the rows, these functions do the sums.
//! Transactions are matched to budgets by category *name*, ignoring case and
//! surrounding whitespace.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    budget::Budget,
    category::CategoryName,
    database_id::BudgetId,
    period::BudgetPeriod,
    transaction::{Transaction, TransactionKind},
};

/// The spend-versus-limit figures for one category budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCard {
    pub budget_id: BudgetId,
    pub category: CategoryName,
    pub limit: f64,
    pub spent: f64,
    /// May be negative when the budget is overspent.
    pub remaining: f64,
    /// Percentage of the limit used, 0-100.
    pub pct: u8,
}

/// The spend-versus-limit figures for a whole month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetTotals {
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub pct: u8,
}

/// Everything a client needs to display a month of budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub period: BudgetPeriod,
    pub global_budget: Option<Budget>,
    pub cards: Vec<BudgetCard>,
    pub totals: BudgetTotals,
}

/// The key used to match category names: trimmed and lowercase.
pub fn normalize_category_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Sum the expenses in `transactions` per normalized category name.
///
/// Income and uncategorized transactions are skipped.
pub fn spent_by_category(transactions: &[Transaction]) -> HashMap<String, f64> {
    let mut spent = HashMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }

        let Some(category) = &transaction.category else {
            continue;
        };

        *spent.entry(category.normalized()).or_insert(0.0) += transaction.amount.abs();
    }

    spent
}

/// Percentage of `limit` used by `spent`, rounded and capped at 100.
///
/// Limits below one are treated as one so that a zero limit does not divide by zero.
pub fn percent_used(spent: f64, limit: f64) -> u8 {
    let pct = spent / limit.max(1.0) * 100.0;

    pct.clamp(0.0, 100.0).round() as u8
}

/// Build one card per category budget, in the order of `budgets`.
///
/// The global budget does not get a card.
pub fn budget_cards(budgets: &[Budget], spent: &HashMap<String, f64>) -> Vec<BudgetCard> {
    budgets
        .iter()
        .filter_map(|budget| {
            let category = budget.category.as_ref()?;
            let spent = spent.get(&category.normalized()).copied().unwrap_or(0.0);

            Some(BudgetCard {
                budget_id: budget.id,
                category: category.clone(),
                limit: budget.limit,
                spent,
                remaining: budget.limit - spent,
                pct: percent_used(spent, budget.limit),
            })
        })
        .collect()
}

/// Total up the month.
///
/// The limit is the global budget's limit if there is one, otherwise the sum of
/// the category limits. Spending is the sum of the cards' spending.
pub fn totals(global_budget: Option<&Budget>, cards: &[BudgetCard]) -> BudgetTotals {
    let spent: f64 = cards.iter().map(|card| card.spent).sum();
    let limit = match global_budget {
        Some(budget) => budget.limit,
        None => cards.iter().map(|card| card.limit).sum(),
    };

    BudgetTotals {
        limit,
        spent,
        remaining: limit - spent,
        pct: percent_used(spent, limit),
    }
}

/// Compute the cards and totals for `period`.
///
/// Budgets and transactions outside of `period` are ignored.
pub fn summarize_budgets(
    period: BudgetPeriod,
    budgets: &[Budget],
    transactions: &[Transaction],
) -> BudgetSummary {
    let budgets: Vec<Budget> = budgets
        .iter()
        .filter(|budget| budget.period == period)
        .cloned()
        .collect();
    let transactions: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| period.contains(transaction.date))
        .cloned()
        .collect();

    let global_budget = budgets.iter().find(|budget| budget.is_global()).cloned();
    let spent = spent_by_category(&transactions);
    let cards = budget_cards(&budgets, &spent);
    let totals = totals(global_budget.as_ref(), &cards);

    BudgetSummary {
        period,
        global_budget,
        cards,
        totals,
    }
}

#[cfg(test)]
mod aggregation_tests {
    use time::{Date, macros::date};

    use crate::{
        auth::UserID,
        budget::{
            Budget, BudgetTotals, budget_cards, normalize_category_name, percent_used,
            spent_by_category, summarize_budgets, totals,
        },
        category::CategoryName,
        period::BudgetPeriod,
        transaction::{Transaction, TransactionKind},
    };

    fn october() -> BudgetPeriod {
        BudgetPeriod::new(2026, 10).unwrap()
    }

    fn budget(id: i64, category: Option<&str>, limit: f64) -> Budget {
        Budget {
            id,
            user_id: UserID::new(1),
            category: category.map(CategoryName::new_unchecked),
            limit,
            period: october(),
        }
    }

    fn transaction(category: Option<&str>, amount: f64, kind: TransactionKind, date: Date) -> Transaction {
        Transaction {
            id: 0,
            user_id: UserID::new(1),
            category: category.map(CategoryName::new_unchecked),
            amount,
            kind,
            date,
            description: String::new(),
        }
    }

    fn expense(category: &str, amount: f64) -> Transaction {
        transaction(Some(category), amount, TransactionKind::Expense, date!(2026 - 10 - 10))
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_category_name("  Eating Out "), "eating out");
    }

    #[test]
    fn spent_groups_by_normalized_name() {
        let transactions = vec![
            expense("Groceries", 20.0),
            expense(" groceries", 5.5),
            expense("Rent", 800.0),
        ];

        let spent = spent_by_category(&transactions);

        assert_eq!(spent.get("groceries"), Some(&25.5));
        assert_eq!(spent.get("rent"), Some(&800.0));
    }

    #[test]
    fn spent_skips_income_and_uncategorized() {
        let transactions = vec![
            transaction(Some("Groceries"), 100.0, TransactionKind::Income, date!(2026 - 10 - 01)),
            transaction(None, 50.0, TransactionKind::Expense, date!(2026 - 10 - 01)),
        ];

        assert!(spent_by_category(&transactions).is_empty());
    }

    #[test]
    fn percent_used_rounds_and_caps() {
        assert_eq!(percent_used(33.333, 100.0), 33);
        assert_eq!(percent_used(250.0, 100.0), 100);
    }

    #[test]
    fn percent_used_with_zero_limit_uses_one() {
        assert_eq!(percent_used(0.5, 0.0), 50);
        assert_eq!(percent_used(0.0, 0.0), 0);
    }

    #[test]
    fn cards_follow_budget_order_and_skip_global() {
        let budgets = vec![
            budget(3, Some("Rent"), 800.0),
            budget(1, None, 2000.0),
            budget(2, Some("Groceries"), 400.0),
        ];
        let spent = spent_by_category(&[expense("groceries", 500.0)]);

        let cards = budget_cards(&budgets, &spent);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].budget_id, 3);
        assert_eq!(cards[0].spent, 0.0);
        assert_eq!(cards[0].remaining, 800.0);
        assert_eq!(cards[1].spent, 500.0);
        assert_eq!(cards[1].remaining, -100.0);
        assert_eq!(cards[1].pct, 100);
    }

    #[test]
    fn totals_prefer_global_limit() {
        let budgets = vec![budget(1, Some("Rent"), 800.0), budget(2, Some("Fun"), 200.0)];
        let spent = spent_by_category(&[expense("Rent", 800.0), expense("Fun", 100.0)]);
        let cards = budget_cards(&budgets, &spent);
        let global = budget(3, None, 1800.0);

        assert_eq!(
            totals(Some(&global), &cards),
            BudgetTotals {
                limit: 1800.0,
                spent: 900.0,
                remaining: 900.0,
                pct: 50,
            }
        );
        assert_eq!(totals(None, &cards).limit, 1000.0);
    }

    #[test]
    fn totals_ignore_spending_without_a_budget() {
        let budgets = vec![budget(1, Some("Rent"), 1000.0)];
        let spent = spent_by_category(&[expense("Rent", 250.0), expense("Travel", 999.0)]);

        let totals = totals(None, &budget_cards(&budgets, &spent));

        assert_eq!(totals.spent, 250.0);
        assert_eq!(totals.pct, 25);
    }

    #[test]
    fn summary_ignores_rows_outside_period() {
        let mut september_budget = budget(9, Some("Rent"), 5.0);
        september_budget.period = BudgetPeriod::new(2026, 9).unwrap();
        let budgets = vec![budget(1, Some("Rent"), 1000.0), september_budget, budget(2, None, 1500.0)];
        let transactions = vec![
            expense("Rent", 600.0),
            transaction(Some("Rent"), 300.0, TransactionKind::Expense, date!(2026 - 09 - 30)),
            transaction(Some("Rent"), 300.0, TransactionKind::Expense, date!(2026 - 11 - 01)),
        ];

        let summary = summarize_budgets(october(), &budgets, &transactions);

        assert_eq!(summary.period, october());
        assert_eq!(summary.global_budget.map(|budget| budget.id), Some(2));
        assert_eq!(summary.cards.len(), 1);
        assert_eq!(summary.cards[0].spent, 600.0);
        assert_eq!(summary.totals.limit, 1500.0);
        assert_eq!(summary.totals.pct, 40);
    }

    #[test]
    fn empty_month_has_zero_totals() {
        let summary = summarize_budgets(october(), &[], &[]);

        assert_eq!(summary.cards, vec![]);
        assert_eq!(
            summary.totals,
            BudgetTotals {
                limit: 0.0,
                spent: 0.0,
                remaining: 0.0,
                pct: 0,
            }
        );
    }
}
