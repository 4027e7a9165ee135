//! Runs the month-start policies at most once per calendar month.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    allocation::AllocationStrategy,
    auth::UserID,
    maintenance::policies::{plan_auto_allocate, plan_carry_over, plan_reset_rules},
    period::BudgetPeriod,
    settings::{BudgetSettings, MaintenancePolicy},
    store::BudgetStore,
};

/// The order policies are applied in: limits are seeded before anything is added to them.
pub const POLICY_ORDER: [MaintenancePolicy; 3] = [
    MaintenancePolicy::ResetRules,
    MaintenancePolicy::CarryOver,
    MaintenancePolicy::AutoAllocate,
];

/// What started a maintenance run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceTrigger {
    /// An automatic run, e.g. from a request hook. Only does anything on the first of the month.
    Scheduled,
    /// A run the user asked for. Proceeds on any day of the month.
    Manual,
}

/// The result of one policy in a maintenance run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PolicyOutcome {
    /// The policy ran and its timestamp was recorded.
    Applied { budgets_changed: usize },
    /// The policy already ran this month.
    AlreadyApplied,
    /// The policy is switched off in the user's settings.
    Disabled,
    /// A scheduled run outside of the first day of the month.
    NotDue,
    /// The policy failed. Other policies were still attempted.
    Failed { message: String },
}

/// The result of a policy, tagged with the policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyReport {
    pub policy: MaintenancePolicy,
    pub outcome: PolicyOutcome,
}

/// What a maintenance run did for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceReport {
    pub user_id: UserID,
    pub period: BudgetPeriod,
    pub trigger: MaintenanceTrigger,
    pub policies: Vec<PolicyReport>,
}

impl MaintenanceReport {
    /// The outcome for `policy`.
    pub fn outcome(&self, policy: MaintenancePolicy) -> Option<&PolicyOutcome> {
        self.policies
            .iter()
            .find(|report| report.policy == policy)
            .map(|report| &report.outcome)
    }
}

/// Whether `timestamp` falls in the same calendar month as `now`, judged in `now`'s offset.
fn in_same_month(timestamp: OffsetDateTime, now: OffsetDateTime) -> bool {
    let timestamp = timestamp.to_offset(now.offset());

    timestamp.year() == now.year() && timestamp.month() == now.month()
}

/// Apply the month-start policies for `user_id`, for the month containing `now`.
///
/// Returns `None` without doing anything when there is no user.
/// A scheduled run only proceeds on the first day of the month. Each policy is
/// skipped if it is disabled or already ran this month, and a failing policy
/// does not stop the ones after it. A policy's budget changes are saved
/// together with its timestamp, so a failed policy leaves nothing behind and
/// runs in full on the next attempt.
///
/// Two runs that start at the same time may both apply a policy: the
/// already-applied check and the timestamp write are not atomic.
pub fn run_maintenance<S: BudgetStore + ?Sized>(
    user_id: Option<UserID>,
    now: OffsetDateTime,
    trigger: MaintenanceTrigger,
    store: &S,
    strategy: &dyn AllocationStrategy,
) -> Option<MaintenanceReport> {
    let user_id = user_id?;
    let period = BudgetPeriod::containing(now.date());

    let report = |policies| MaintenanceReport {
        user_id,
        period,
        trigger,
        policies,
    };

    if trigger == MaintenanceTrigger::Scheduled && now.day() != 1 {
        return Some(report(
            POLICY_ORDER
                .iter()
                .map(|&policy| PolicyReport {
                    policy,
                    outcome: PolicyOutcome::NotDue,
                })
                .collect(),
        ));
    }

    let settings = match store.get_settings(user_id) {
        Ok(settings) => settings,
        Err(error) => {
            tracing::error!("Could not load budget settings for user {user_id}: {error}");
            return Some(report(
                POLICY_ORDER
                    .iter()
                    .map(|&policy| PolicyReport {
                        policy,
                        outcome: PolicyOutcome::Failed {
                            message: error.to_string(),
                        },
                    })
                    .collect(),
            ));
        }
    };

    let policies = POLICY_ORDER
        .iter()
        .map(|&policy| PolicyReport {
            policy,
            outcome: run_policy(policy, user_id, period, now, &settings, store, strategy),
        })
        .collect();

    Some(report(policies))
}

fn run_policy<S: BudgetStore + ?Sized>(
    policy: MaintenancePolicy,
    user_id: UserID,
    period: BudgetPeriod,
    now: OffsetDateTime,
    settings: &BudgetSettings,
    store: &S,
    strategy: &dyn AllocationStrategy,
) -> PolicyOutcome {
    if !settings.is_enabled(policy) {
        return PolicyOutcome::Disabled;
    }

    if settings
        .last_applied_at(policy)
        .is_some_and(|last_applied_at| in_same_month(last_applied_at, now))
    {
        tracing::debug!("Skipping {policy} for user {user_id}, already applied in {period}");
        return PolicyOutcome::AlreadyApplied;
    }

    let result = match policy {
        MaintenancePolicy::ResetRules => {
            plan_reset_rules(store, user_id, period, settings.reset_rule)
        }
        MaintenancePolicy::CarryOver => plan_carry_over(store, user_id, period),
        MaintenancePolicy::AutoAllocate => plan_auto_allocate(store, user_id, period, strategy),
    }
    .and_then(|changes| store.apply_maintenance(user_id, period, policy, &changes, now));

    match result {
        Ok(budgets_changed) => {
            tracing::info!(
                "Applied {policy} for user {user_id} in {period}, {budgets_changed} budget(s) changed"
            );
            PolicyOutcome::Applied { budgets_changed }
        }
        Err(error) => {
            tracing::error!("Could not apply {policy} for user {user_id} in {period}: {error}");
            PolicyOutcome::Failed {
                message: error.to_string(),
            }
        }
    }
}
