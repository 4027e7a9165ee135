use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID, category::CategoryName, database_id::AllocationRuleId};

/// Sends a share of each month's income to a category budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRule {
    pub id: AllocationRuleId,
    pub user_id: UserID,
    /// The category whose budget receives the share.
    pub category: CategoryName,
    /// The share of income, greater than 0 and at most 100.
    pub percent: f64,
}

/// Request body for creating an allocation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRuleForm {
    pub category: String,
    pub percent: f64,
}

/// Check that `percent` is a usable share of income.
///
/// # Errors
///
/// Returns [Error::InvalidPercent] unless `percent` is in (0, 100].
pub fn validate_percent(percent: f64) -> Result<f64, Error> {
    if percent.is_finite() && percent > 0.0 && percent <= 100.0 {
        Ok(percent)
    } else {
        Err(Error::InvalidPercent(percent))
    }
}
