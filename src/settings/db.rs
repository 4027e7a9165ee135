//! Database operations for budget settings.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    settings::{BudgetSettings, MaintenancePolicy, ResetRule, SettingsForm},
};

/// Create the budget settings table.
pub fn create_budget_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget_settings (
            user_id INTEGER PRIMARY KEY,
            carry_over_enabled INTEGER NOT NULL DEFAULT 0,
            auto_allocate_enabled INTEGER NOT NULL DEFAULT 0,
            reset_rules_enabled INTEGER NOT NULL DEFAULT 0,
            reset_rule TEXT NOT NULL DEFAULT 'keep_previous',
            reset_rule_periods INTEGER,
            last_carryover_applied_at TEXT,
            last_auto_allocate_at TEXT,
            last_reset_rules_applied_at TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Get the user's settings, creating the defaults on first access.
pub fn get_budget_settings(
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetSettings, Error> {
    connection.execute(
        "INSERT OR IGNORE INTO budget_settings (user_id) VALUES (?1)",
        (user_id.as_i64(),),
    )?;

    connection
        .prepare(
            "SELECT user_id, carry_over_enabled, auto_allocate_enabled, reset_rules_enabled,
                reset_rule, reset_rule_periods, last_carryover_applied_at, last_auto_allocate_at,
                last_reset_rules_applied_at
            FROM budget_settings WHERE user_id = ?1",
        )?
        .query_row((user_id.as_i64(),), map_row)
        .map_err(|error| error.into())
}

/// Turn carry-over on or off.
pub fn update_carry_over_flag(
    user_id: UserID,
    enabled: bool,
    connection: &Connection,
) -> Result<(), Error> {
    get_budget_settings(user_id, connection)?;
    connection.execute(
        "UPDATE budget_settings SET carry_over_enabled = ?1 WHERE user_id = ?2",
        (enabled, user_id.as_i64()),
    )?;

    Ok(())
}

/// Apply the fields set in `form` to the user's settings.
///
/// # Errors
///
/// Returns [Error::InvalidTrailingPeriods] if the new reset rule cannot be applied.
pub fn update_budget_settings(
    user_id: UserID,
    form: &SettingsForm,
    connection: &Connection,
) -> Result<BudgetSettings, Error> {
    let reset_rule = form.reset_rule.map(ResetRule::validate).transpose()?;
    let transaction = connection.unchecked_transaction()?;

    if let Some(enabled) = form.carry_over_enabled {
        update_carry_over_flag(user_id, enabled, &transaction)?;
    }

    if let Some(enabled) = form.auto_allocate_enabled {
        get_budget_settings(user_id, &transaction)?;
        transaction.execute(
            "UPDATE budget_settings SET auto_allocate_enabled = ?1 WHERE user_id = ?2",
            (enabled, user_id.as_i64()),
        )?;
    }

    if let Some(enabled) = form.reset_rules_enabled {
        get_budget_settings(user_id, &transaction)?;
        transaction.execute(
            "UPDATE budget_settings SET reset_rules_enabled = ?1 WHERE user_id = ?2",
            (enabled, user_id.as_i64()),
        )?;
    }

    if let Some(rule) = reset_rule {
        let (kind, periods) = reset_rule_columns(rule);
        get_budget_settings(user_id, &transaction)?;
        transaction.execute(
            "UPDATE budget_settings SET reset_rule = ?1, reset_rule_periods = ?2 WHERE user_id = ?3",
            (kind, periods, user_id.as_i64()),
        )?;
    }

    let settings = get_budget_settings(user_id, &transaction)?;
    transaction.commit()?;

    Ok(settings)
}

/// Record that `policy` was applied for the user at `timestamp`.
pub fn record_maintenance_timestamp(
    user_id: UserID,
    policy: MaintenancePolicy,
    timestamp: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let column = match policy {
        MaintenancePolicy::CarryOver => "last_carryover_applied_at",
        MaintenancePolicy::AutoAllocate => "last_auto_allocate_at",
        MaintenancePolicy::ResetRules => "last_reset_rules_applied_at",
    };

    get_budget_settings(user_id, connection)?;
    connection.execute(
        &format!("UPDATE budget_settings SET {column} = ?1 WHERE user_id = ?2"),
        (timestamp, user_id.as_i64()),
    )?;

    Ok(())
}

fn reset_rule_columns(rule: ResetRule) -> (&'static str, Option<u32>) {
    match rule {
        ResetRule::Zero => ("zero", None),
        ResetRule::KeepPrevious => ("keep_previous", None),
        ResetRule::TrailingAverage { periods } => ("trailing_average", Some(periods)),
    }
}

fn map_row(row: &Row) -> Result<BudgetSettings, rusqlite::Error> {
    let kind: String = row.get(4)?;
    let periods: Option<u32> = row.get(5)?;
    let reset_rule = match (kind.as_str(), periods) {
        ("zero", _) => ResetRule::Zero,
        ("trailing_average", Some(periods)) => ResetRule::TrailingAverage { periods },
        ("keep_previous", _) => ResetRule::KeepPrevious,
        (other, _) => {
            tracing::warn!("Unknown reset rule \"{other}\", falling back to keep_previous");
            ResetRule::KeepPrevious
        }
    };

    Ok(BudgetSettings {
        user_id: UserID::new(row.get(0)?),
        carry_over_enabled: row.get(1)?,
        auto_allocate_enabled: row.get(2)?,
        reset_rules_enabled: row.get(3)?,
        reset_rule,
        last_carryover_applied_at: row.get(6)?,
        last_auto_allocate_at: row.get(7)?,
        last_reset_rules_applied_at: row.get(8)?,
    })
}
