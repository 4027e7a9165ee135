//! Database operations for budgets.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetChange, validate_limit},
    category::CategoryName,
    database_id::BudgetId,
    period::BudgetPeriod,
};

/// Create the budget table.
///
/// There is at most one budget per user, month and category. `category_key`
/// holds the normalized category name, see [CategoryName::normalized], and is
/// `''` for the global budget. Category names are never empty, so `''` cannot
/// collide with a real category. The key is computed in Rust because SQLite
/// only folds ASCII case.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category TEXT,
            category_key TEXT NOT NULL,
            limit_amount REAL NOT NULL CHECK (limit_amount >= 0),
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_budget_user_period_category
            ON budget(user_id, year, month, category_key);",
    )?;

    Ok(())
}

fn category_key(category: Option<&CategoryName>) -> String {
    category.map(CategoryName::normalized).unwrap_or_default()
}

const SELECT_BUDGET: &str = "SELECT id, user_id, category, limit_amount, year, month FROM budget";

/// Get the user's budgets for `period` in the order they were created.
pub fn get_budgets_for_period(
    user_id: UserID,
    period: BudgetPeriod,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_BUDGET} WHERE user_id = ?1 AND year = ?2 AND month = ?3 ORDER BY id ASC"
        ))?
        .query_map((user_id.as_i64(), period.year(), period.month()), map_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Get one of the user's budgets by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user has no budget with this ID.
pub fn get_budget(
    user_id: UserID,
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(&format!("{SELECT_BUDGET} WHERE id = ?1 AND user_id = ?2"))?
        .query_row((budget_id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Set the limit of the user's budget for `category` in `period`, creating
/// the budget if it does not exist.
///
/// `None` as the category targets the global budget.
///
/// # Errors
///
/// Returns [Error::InvalidLimit] if `limit` is negative or not finite.
pub fn upsert_budget(
    user_id: UserID,
    category: Option<&CategoryName>,
    limit: f64,
    period: BudgetPeriod,
    connection: &Connection,
) -> Result<Budget, Error> {
    let limit = validate_limit(limit)?;
    let transaction = connection.unchecked_transaction()?;

    let budget_id = upsert_budget_row(user_id, category, limit, period, &transaction)?;
    let budget = get_budget(user_id, budget_id, &transaction)?;
    transaction.commit()?;

    Ok(budget)
}

/// Apply maintenance `changes` to the user's budgets for `period` and return
/// how many budgets were created or changed.
///
/// Does not open a transaction. Callers that need the changes to be all or
/// nothing must run this inside one.
///
/// # Errors
///
/// Returns [Error::InvalidLimit] if a change would produce a negative or
/// non-finite limit. Changes made before the error are not undone here.
pub fn apply_budget_changes(
    user_id: UserID,
    period: BudgetPeriod,
    changes: &[BudgetChange],
    connection: &Connection,
) -> Result<usize, Error> {
    let mut changed = 0;

    for change in changes {
        match change {
            BudgetChange::Seed { category, limit } => {
                let category = category.as_ref();

                if find_budget_row(user_id, category, period, connection)?.is_none() {
                    upsert_budget_row(user_id, category, validate_limit(*limit)?, period, connection)?;
                    changed += 1;
                }
            }
            BudgetChange::Increase { category, amount } => {
                let current = find_budget_row(user_id, Some(category), period, connection)?
                    .map(|(_, limit)| limit)
                    .unwrap_or(0.0);
                let limit = validate_limit(current + amount)?;
                upsert_budget_row(user_id, Some(category), limit, period, connection)?;
                changed += 1;
            }
        }
    }

    Ok(changed)
}

fn find_budget_row(
    user_id: UserID,
    category: Option<&CategoryName>,
    period: BudgetPeriod,
    connection: &Connection,
) -> Result<Option<(BudgetId, f64)>, Error> {
    connection
        .query_row(
            "SELECT id, limit_amount FROM budget
            WHERE user_id = ?1 AND year = ?2 AND month = ?3 AND category_key = ?4",
            (
                user_id.as_i64(),
                period.year(),
                period.month(),
                category_key(category),
            ),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|error| error.into())
}

/// Update or insert one budget row without opening a transaction.
fn upsert_budget_row(
    user_id: UserID,
    category: Option<&CategoryName>,
    limit: f64,
    period: BudgetPeriod,
    connection: &Connection,
) -> Result<BudgetId, Error> {
    match find_budget_row(user_id, category, period, connection)? {
        Some((budget_id, _)) => {
            connection.execute(
                "UPDATE budget SET limit_amount = ?1 WHERE id = ?2",
                (limit, budget_id),
            )?;
            Ok(budget_id)
        }
        None => {
            connection.execute(
                "INSERT INTO budget (user_id, category, category_key, limit_amount, year, month)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (
                    user_id.as_i64(),
                    category,
                    category_key(category),
                    limit,
                    period.year(),
                    period.month(),
                ),
            )?;
            Ok(connection.last_insert_rowid())
        }
    }
}

/// Change the limit of one of the user's budgets.
///
/// # Errors
///
/// Returns [Error::UpdateMissingBudget] if the user has no budget with this ID,
/// or [Error::InvalidLimit] if `limit` is negative or not finite.
pub fn update_budget_limit(
    user_id: UserID,
    budget_id: BudgetId,
    limit: f64,
    connection: &Connection,
) -> Result<Budget, Error> {
    let limit = validate_limit(limit)?;
    let rows_affected = connection.execute(
        "UPDATE budget SET limit_amount = ?1 WHERE id = ?2 AND user_id = ?3",
        (limit, budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    get_budget(user_id, budget_id, connection)
}

/// Delete one of the user's budgets.
///
/// # Errors
///
/// Returns [Error::DeleteMissingBudget] if the user has no budget with this ID.
pub fn delete_budget(
    user_id: UserID,
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let year: i32 = row.get(4)?;
    let month: u8 = row.get(5)?;
    let period = BudgetPeriod::new(year, month).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Integer, Box::new(error))
    })?;

    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        limit: row.get(3)?,
        period,
    })
}

#[cfg(test)]
mod budget_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::UserID,
        budget::{
            BudgetChange, apply_budget_changes, delete_budget, get_budget, get_budgets_for_period,
            update_budget_limit, upsert_budget,
        },
        category::CategoryName,
        period::BudgetPeriod,
        test_utils::{create_test_user, get_test_connection},
    };

    fn setup() -> (Connection, UserID) {
        let connection = get_test_connection();
        let user_id = create_test_user("alex", &connection);
        (connection, user_id)
    }

    fn october() -> BudgetPeriod {
        BudgetPeriod::new(2026, 10).unwrap()
    }

    #[test]
    fn upsert_creates_then_updates_same_row() {
        let (connection, user_id) = setup();
        let groceries = CategoryName::new_unchecked("Groceries");

        let created = upsert_budget(user_id, Some(&groceries), 400.0, october(), &connection).unwrap();
        let updated = upsert_budget(
            user_id,
            Some(&CategoryName::new_unchecked("groceries")),
            450.0,
            october(),
            &connection,
        )
        .unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(updated.limit, 450.0);
        assert_eq!(updated.category, Some(groceries));
        assert_eq!(
            get_budgets_for_period(user_id, october(), &connection).unwrap(),
            vec![updated]
        );
    }

    #[test]
    fn upsert_matches_non_ascii_case() {
        let (connection, user_id) = setup();

        let created = upsert_budget(
            user_id,
            Some(&CategoryName::new_unchecked("Épicerie")),
            100.0,
            october(),
            &connection,
        )
        .unwrap();
        let updated = upsert_budget(
            user_id,
            Some(&CategoryName::new_unchecked("épicerie")),
            120.0,
            october(),
            &connection,
        )
        .unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(
            get_budgets_for_period(user_id, october(), &connection).unwrap(),
            vec![updated]
        );
    }

    #[test]
    fn global_budget_is_its_own_slot() {
        let (connection, user_id) = setup();

        let global = upsert_budget(user_id, None, 2000.0, october(), &connection).unwrap();
        let again = upsert_budget(user_id, None, 2500.0, october(), &connection).unwrap();
        let rent = upsert_budget(
            user_id,
            Some(&CategoryName::new_unchecked("Rent")),
            800.0,
            october(),
            &connection,
        )
        .unwrap();

        assert_eq!(global.id, again.id);
        assert!(again.is_global());
        assert_ne!(rent.id, global.id);
        assert_eq!(
            get_budgets_for_period(user_id, october(), &connection)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn budgets_are_scoped_to_month_and_user() {
        let (connection, user_id) = setup();
        let other_user = create_test_user("sam", &connection);
        let september = BudgetPeriod::new(2026, 9).unwrap();
        upsert_budget(user_id, None, 100.0, september, &connection).unwrap();
        upsert_budget(other_user, None, 100.0, october(), &connection).unwrap();

        assert_eq!(
            get_budgets_for_period(user_id, october(), &connection),
            Ok(vec![])
        );
    }

    #[test]
    fn upsert_rejects_negative_limit() {
        let (connection, user_id) = setup();

        let result = upsert_budget(user_id, None, -1.0, october(), &connection);

        assert_eq!(result, Err(Error::InvalidLimit(-1.0)));
    }

    #[test]
    fn update_limit_changes_row() {
        let (connection, user_id) = setup();
        let budget = upsert_budget(user_id, None, 100.0, october(), &connection).unwrap();

        let updated = update_budget_limit(user_id, budget.id, 150.0, &connection).unwrap();

        assert_eq!(updated.limit, 150.0);
        assert_eq!(get_budget(user_id, budget.id, &connection), Ok(updated));
    }

    #[test]
    fn update_missing_budget_fails() {
        let (connection, user_id) = setup();

        assert_eq!(
            update_budget_limit(user_id, 77, 1.0, &connection),
            Err(Error::UpdateMissingBudget)
        );
    }

    #[test]
    fn delete_other_users_budget_fails() {
        let (connection, user_id) = setup();
        let other_user = create_test_user("sam", &connection);
        let budget = upsert_budget(user_id, None, 100.0, october(), &connection).unwrap();

        assert_eq!(
            delete_budget(other_user, budget.id, &connection),
            Err(Error::DeleteMissingBudget)
        );
        assert_eq!(delete_budget(user_id, budget.id, &connection), Ok(()));
        assert_eq!(get_budget(user_id, budget.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn seed_only_creates_missing_budgets() {
        let (connection, user_id) = setup();
        let rent = CategoryName::new_unchecked("Rent");
        upsert_budget(user_id, Some(&rent), 800.0, october(), &connection).unwrap();

        let changed = apply_budget_changes(
            user_id,
            october(),
            &[
                BudgetChange::Seed {
                    category: Some(CategoryName::new_unchecked("rent")),
                    limit: 1.0,
                },
                BudgetChange::Seed {
                    category: None,
                    limit: 2000.0,
                },
            ],
            &connection,
        );

        assert_eq!(changed, Ok(1));
        let limits: Vec<f64> = get_budgets_for_period(user_id, october(), &connection)
            .unwrap()
            .iter()
            .map(|budget| budget.limit)
            .collect();
        assert_eq!(limits, vec![800.0, 2000.0]);
    }

    #[test]
    fn increase_adds_to_existing_or_new_budget() {
        let (connection, user_id) = setup();
        let food = CategoryName::new_unchecked("Food");
        upsert_budget(user_id, Some(&food), 100.0, october(), &connection).unwrap();

        let changed = apply_budget_changes(
            user_id,
            october(),
            &[
                BudgetChange::Increase {
                    category: food,
                    amount: 25.0,
                },
                BudgetChange::Increase {
                    category: CategoryName::new_unchecked("Fun"),
                    amount: 10.0,
                },
            ],
            &connection,
        );

        assert_eq!(changed, Ok(2));
        let limits: Vec<f64> = get_budgets_for_period(user_id, october(), &connection)
            .unwrap()
            .iter()
            .map(|budget| budget.limit)
            .collect();
        assert_eq!(limits, vec![125.0, 10.0]);
    }
}
