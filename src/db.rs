//! Creating the database schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    auth::create_user_table, category::create_category_table, expense::create_expense_table,
    preferences::create_user_preference_table,
};

/// Create the application tables if they do not exist and turn on foreign
/// key enforcement for `connection`.
///
/// # Errors
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    // Has no effect inside a transaction, so it must come first.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_user_preference_table(&transaction)?;

    transaction.commit()
}
