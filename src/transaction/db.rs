//! Database operations for transactions.

use std::ops::RangeInclusive;

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::CategoryName,
    database_id::TransactionId,
    transaction::{Transaction, TransactionKind},
};

/// Create the transaction table and its indexes.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category TEXT,
            amount REAL NOT NULL CHECK (amount >= 0),
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            date TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// Create a new transaction in the database.
///
/// `amount` is stored as its magnitude.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] if `amount` is NaN or infinite, or
/// [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    category: Option<CategoryName>,
    amount: f64,
    kind: TransactionKind,
    date: Date,
    description: &str,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !amount.is_finite() {
        return Err(Error::InvalidAmount(amount));
    }

    let amount = amount.abs();

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, category, amount, kind, date, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, user_id, category, amount, kind, date, description",
        )?
        .query_row(
            (user_id.as_i64(), &category, amount, kind, date, description),
            map_row,
        )?;

    Ok(transaction)
}

/// Retrieve one of the user's transactions by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user has no transaction with this ID.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, amount, kind, date, description
            FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve the user's transactions dated within `date_range`, oldest first.
///
/// # Errors
///
/// Returns [Error::InvalidDateRange] if the range is empty.
pub fn get_transactions_in_range(
    user_id: UserID,
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    if date_range.start() > date_range.end() {
        return Err(Error::InvalidDateRange(
            *date_range.start(),
            *date_range.end(),
        ));
    }

    connection
        .prepare(
            "SELECT id, user_id, category, amount, kind, date, description
            FROM \"transaction\"
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
            ORDER BY date ASC, id ASC",
        )?
        .query_map(
            (user_id.as_i64(), date_range.start(), date_range.end()),
            map_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Delete one of the user's transactions.
///
/// # Errors
///
/// Returns [Error::DeleteMissingTransaction] if the user has no transaction with this ID.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        amount: row.get(3)?,
        kind: row.get(4)?,
        date: row.get(5)?,
        description: row.get(6)?,
    })
}
