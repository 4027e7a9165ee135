//! Core budget domain types.

use serde::{Deserialize, Serialize};

use crate::{
    Error, auth::UserID, category::CategoryName, database_id::BudgetId, period::BudgetPeriod,
};

/// A spending limit for one month.
///
/// A budget without a category is the user's global budget for that month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserID,
    pub category: Option<CategoryName>,
    pub limit: f64,
    pub period: BudgetPeriod,
}

impl Budget {
    /// Whether this is the global (whole-month) budget.
    pub fn is_global(&self) -> bool {
        self.category.is_none()
    }
}

/// A change to one budget row made by monthly maintenance.
///
/// Changes are planned from a read of the store and then written together,
/// so a failed write leaves none of them behind.
#[derive(Debug, Clone, PartialEq)]
pub enum BudgetChange {
    /// Create the budget with `limit` unless the month already has one.
    Seed {
        category: Option<CategoryName>,
        limit: f64,
    },
    /// Add `amount` to the category's limit, starting from 0 if it has no budget.
    Increase { category: CategoryName, amount: f64 },
}

/// Check that `limit` can be used as a budget limit.
///
/// # Errors
///
/// Returns [Error::InvalidLimit] if `limit` is negative, NaN or infinite.
pub fn validate_limit(limit: f64) -> Result<f64, Error> {
    if limit.is_finite() && limit >= 0.0 {
        Ok(limit)
    } else {
        Err(Error::InvalidLimit(limit))
    }
}

/// Request body for creating or replacing a category budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBudgetForm {
    pub category: String,
    pub limit: f64,
    pub year: i32,
    pub month: u8,
}

/// Request body for setting the global budget of a month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalBudgetForm {
    pub limit: f64,
    pub year: i32,
    pub month: u8,
}

/// Request body for changing the limit of an existing budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLimitForm {
    pub limit: f64,
}

#[cfg(test)]
mod validate_limit_tests {
    use crate::{Error, budget::validate_limit};

    #[test]
    fn zero_is_valid() {
        assert_eq!(validate_limit(0.0), Ok(0.0));
    }

    #[test]
    fn negative_is_invalid() {
        assert_eq!(validate_limit(-0.01), Err(Error::InvalidLimit(-0.01)));
    }

    #[test]
    fn infinity_is_invalid() {
        assert!(validate_limit(f64::INFINITY).is_err());
    }
}
