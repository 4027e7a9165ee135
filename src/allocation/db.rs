//! Database operations for allocation rules.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    allocation::{AllocationRule, validate_percent},
    auth::UserID,
    category::CategoryName,
    database_id::AllocationRuleId,
};

/// Create the allocation rule table.
pub fn create_allocation_rule_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS allocation_rule (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            percent REAL NOT NULL CHECK (percent > 0 AND percent <= 100),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Create an allocation rule for the user.
///
/// # Errors
///
/// Returns [Error::InvalidPercent] if `percent` is not in (0, 100], or
/// [Error::AllocationOverCommitted] if the user's rules would then allocate
/// more than all of their income.
pub fn create_allocation_rule(
    user_id: UserID,
    category: CategoryName,
    percent: f64,
    connection: &Connection,
) -> Result<AllocationRule, Error> {
    let percent = validate_percent(percent)?;
    let transaction = connection.unchecked_transaction()?;

    let committed: f64 = transaction.query_row(
        "SELECT COALESCE(SUM(percent), 0) FROM allocation_rule WHERE user_id = ?1",
        (user_id.as_i64(),),
        |row| row.get(0),
    )?;

    let total = committed + percent;
    if total > 100.0 {
        return Err(Error::AllocationOverCommitted(total));
    }

    transaction.execute(
        "INSERT INTO allocation_rule (user_id, category, percent) VALUES (?1, ?2, ?3)",
        (user_id.as_i64(), &category, percent),
    )?;
    let id = transaction.last_insert_rowid();
    transaction.commit()?;

    Ok(AllocationRule {
        id,
        user_id,
        category,
        percent,
    })
}

/// Get the user's allocation rules in the order they were created.
pub fn get_allocation_rules(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<AllocationRule>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, percent FROM allocation_rule
            WHERE user_id = ?1 ORDER BY id ASC",
        )?
        .query_map((user_id.as_i64(),), map_row)?
        .map(|maybe_rule| maybe_rule.map_err(|error| error.into()))
        .collect()
}

/// Delete one of the user's allocation rules.
///
/// # Errors
///
/// Returns [Error::DeleteMissingAllocationRule] if the user has no rule with this ID.
pub fn delete_allocation_rule(
    user_id: UserID,
    rule_id: AllocationRuleId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM allocation_rule WHERE id = ?1 AND user_id = ?2",
        (rule_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingAllocationRule);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<AllocationRule, rusqlite::Error> {
    Ok(AllocationRule {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        percent: row.get(3)?,
    })
}

#[cfg(test)]
mod allocation_rule_tests {
    use crate::{
        Error,
        allocation::{create_allocation_rule, delete_allocation_rule, get_allocation_rules},
        category::CategoryName,
        test_utils::{create_test_user, get_test_connection},
    };

    #[test]
    fn create_and_list() {
        let connection = get_test_connection();
        let user_id = create_test_user("alex", &connection);

        let savings =
            create_allocation_rule(user_id, CategoryName::new_unchecked("Savings"), 60.0, &connection)
                .unwrap();
        let fun = create_allocation_rule(user_id, CategoryName::new_unchecked("Fun"), 40.0, &connection)
            .unwrap();

        assert_eq!(get_allocation_rules(user_id, &connection), Ok(vec![savings, fun]));
    }

    #[test]
    fn rejects_over_commitment() {
        let connection = get_test_connection();
        let user_id = create_test_user("alex", &connection);
        create_allocation_rule(user_id, CategoryName::new_unchecked("Savings"), 80.0, &connection)
            .unwrap();

        let result =
            create_allocation_rule(user_id, CategoryName::new_unchecked("Fun"), 30.0, &connection);

        assert_eq!(result, Err(Error::AllocationOverCommitted(110.0)));
        assert_eq!(get_allocation_rules(user_id, &connection).unwrap().len(), 1);
    }

    #[test]
    fn commitment_is_per_user() {
        let connection = get_test_connection();
        let alex = create_test_user("alex", &connection);
        let sam = create_test_user("sam", &connection);
        create_allocation_rule(alex, CategoryName::new_unchecked("Savings"), 100.0, &connection)
            .unwrap();

        let result =
            create_allocation_rule(sam, CategoryName::new_unchecked("Savings"), 100.0, &connection);

        assert!(result.is_ok());
    }

    #[test]
    fn rejects_invalid_percent() {
        let connection = get_test_connection();
        let user_id = create_test_user("alex", &connection);

        let result =
            create_allocation_rule(user_id, CategoryName::new_unchecked("Fun"), -5.0, &connection);

        assert_eq!(result, Err(Error::InvalidPercent(-5.0)));
    }

    #[test]
    fn delete_is_scoped_to_owner() {
        let connection = get_test_connection();
        let alex = create_test_user("alex", &connection);
        let sam = create_test_user("sam", &connection);
        let rule = create_allocation_rule(alex, CategoryName::new_unchecked("Fun"), 10.0, &connection)
            .unwrap();

        assert_eq!(
            delete_allocation_rule(sam, rule.id, &connection),
            Err(Error::DeleteMissingAllocationRule)
        );
        assert_eq!(delete_allocation_rule(alex, rule.id, &connection), Ok(()));
        assert_eq!(get_allocation_rules(alex, &connection), Ok(vec![]));
    }
}
