//! Categories for grouping transactions and budgets.

mod db;
mod domain;
mod endpoints;

pub use db::{create_category, create_category_table, get_categories, get_category, update_category};
pub use domain::{Category, CategoryForm, CategoryName, DEFAULT_CATEGORY_COLOR};
pub use endpoints::{
    CategoryState, create_category_endpoint, get_categories_endpoint, update_category_endpoint,
};
