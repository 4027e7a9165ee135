//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;
/// Database identifier for a budget.
///
/// Budgets that only exist in optimistic client state carry a negative ID until
/// they are re-fetched from the store.
pub type BudgetId = DatabaseId;
/// Database identifier for a category.
pub type CategoryId = DatabaseId;
/// Database identifier for an auto-allocation rule.
pub type AllocationRuleId = DatabaseId;
