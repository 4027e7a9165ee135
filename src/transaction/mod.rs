//! Income and expense transactions.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    get_transactions_in_range,
};
pub use domain::{NewTransaction, Transaction, TransactionKind};
pub use endpoints::{
    TransactionRangeQuery, TransactionState, create_transaction_endpoint,
    delete_transaction_endpoint, get_transactions_endpoint,
};
