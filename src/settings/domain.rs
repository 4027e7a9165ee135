//! Per-user budget settings and the maintenance policies they control.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserID};

/// The largest number of months a trailing average may look back over.
pub const MAX_TRAILING_PERIODS: u32 = 24;

/// How the limit of a budget is seeded when a new month starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResetRule {
    /// Start the month with a limit of zero.
    Zero,
    /// Start the month with last month's limit.
    #[default]
    KeepPrevious,
    /// Start the month with the mean limit of the last `periods` months that had a budget.
    TrailingAverage { periods: u32 },
}

impl ResetRule {
    /// Check that the rule can be applied.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidTrailingPeriods] if a trailing average covers
    /// zero months or more than [MAX_TRAILING_PERIODS].
    pub fn validate(self) -> Result<Self, Error> {
        match self {
            ResetRule::TrailingAverage { periods }
                if periods == 0 || periods > MAX_TRAILING_PERIODS =>
            {
                Err(Error::InvalidTrailingPeriods(periods))
            }
            rule => Ok(rule),
        }
    }
}

/// A monthly maintenance policy that records when it was last applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenancePolicy {
    CarryOver,
    AutoAllocate,
    ResetRules,
}

impl MaintenancePolicy {
    /// The name used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenancePolicy::CarryOver => "carry_over",
            MaintenancePolicy::AutoAllocate => "auto_allocate",
            MaintenancePolicy::ResetRules => "reset_rules",
        }
    }
}

impl Display for MaintenancePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's budget settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSettings {
    pub user_id: UserID,
    pub carry_over_enabled: bool,
    pub auto_allocate_enabled: bool,
    pub reset_rules_enabled: bool,
    pub reset_rule: ResetRule,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_carryover_applied_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_auto_allocate_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_reset_rules_applied_at: Option<OffsetDateTime>,
}

impl BudgetSettings {
    /// When `policy` was last applied, if ever.
    pub fn last_applied_at(&self, policy: MaintenancePolicy) -> Option<OffsetDateTime> {
        match policy {
            MaintenancePolicy::CarryOver => self.last_carryover_applied_at,
            MaintenancePolicy::AutoAllocate => self.last_auto_allocate_at,
            MaintenancePolicy::ResetRules => self.last_reset_rules_applied_at,
        }
    }

    /// Whether `policy` is switched on. Every policy is off until the user enables it.
    pub fn is_enabled(&self, policy: MaintenancePolicy) -> bool {
        match policy {
            MaintenancePolicy::CarryOver => self.carry_over_enabled,
            MaintenancePolicy::AutoAllocate => self.auto_allocate_enabled,
            MaintenancePolicy::ResetRules => self.reset_rules_enabled,
        }
    }
}

/// Request body for changing settings. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsForm {
    pub carry_over_enabled: Option<bool>,
    pub auto_allocate_enabled: Option<bool>,
    pub reset_rules_enabled: Option<bool>,
    pub reset_rule: Option<ResetRule>,
}
