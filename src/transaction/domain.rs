//! Core transaction domain types.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserID, category::CategoryName, database_id::TransactionId};

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// The name used in the database and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.as_str().to_sql()
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserID,
    /// The name of the category the transaction belongs to, if any.
    pub category: Option<CategoryName>,
    /// The magnitude of the transaction, always non-negative.
    pub amount: f64,
    pub kind: TransactionKind,
    /// When the transaction happened.
    pub date: Date,
    pub description: String,
}

/// Request body for creating a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    /// A blank category is treated as no category.
    pub category: Option<String>,
    /// Negative amounts are stored as their magnitude; `kind` carries the sign.
    pub amount: f64,
    pub kind: TransactionKind,
    pub date: Date,
    #[serde(default)]
    pub description: String,
}

impl NewTransaction {
    /// The category name, or `None` if it is missing or blank.
    pub fn category_name(&self) -> Option<CategoryName> {
        self.category
            .as_deref()
            .and_then(|name| CategoryName::new(name).ok())
    }

    /// The amount as a non-negative magnitude.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if the amount is NaN or infinite.
    pub fn magnitude(&self) -> Result<f64, Error> {
        if self.amount.is_finite() {
            Ok(self.amount.abs())
        } else {
            Err(Error::InvalidAmount(self.amount))
        }
    }
}
