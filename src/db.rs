//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, allocation::create_allocation_rule_table, auth::create_user_table,
    budget::create_budget_table, category::create_category_table,
    settings::create_budget_settings_table, transaction::create_transaction_table,
};

/// Create the tables for the domain models if they do not exist and turn on
/// foreign key checks for `connection`.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_budget_settings_table(&transaction)?;
    create_allocation_rule_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
