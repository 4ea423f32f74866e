//! Categories group a user's expenses, e.g. "Groceries" or "Transport".

mod create;
mod db;
mod delete;
mod domain;
mod list;

pub use create::{create_category_endpoint, get_new_category_page};
pub use db::{
    create_category, create_category_table, get_categories, get_categories_by_name, get_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryColor, CategoryIcon, CategoryId, CategoryName};
pub use list::get_categories_page;

#[cfg(test)]
pub(crate) use db::delete_category;
