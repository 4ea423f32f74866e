//! Expense management.
//!
//! This module contains everything related to expenses:
//! - The expense models and [NewExpense] for recording expenses
//! - Database functions for storing, listing and deleting expenses
//! - The snapshot read used to compute spending statistics
//! - View handlers for expense-related pages and endpoints

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod expenses_page;

pub use core::{
    EXPENSES_CHANGED_EVENT, NewExpense, create_expense, create_expense_table,
    get_expense_snapshot, get_recent_expenses, parse_expense_record,
};
pub use create_endpoint::create_expense_endpoint;
pub use create_page::get_new_expense_page;
pub use delete_endpoint::delete_expense_endpoint;
pub use expenses_page::{expense_list, get_expenses_page};
