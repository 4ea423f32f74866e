//! Per-user settings, currently only the currency totals are displayed in.

use rusqlite::{Connection, OptionalExtension};

use crate::{Error, UserID, currency::Currency};

/// Get the currency `user_id` wants totals shown in.
///
/// Users who never chose a currency get [Currency::Usd].
pub fn get_display_currency(user_id: UserID, connection: &Connection) -> Result<Currency, Error> {
    let currency: Option<Currency> = connection
        .query_row(
            "SELECT display_currency FROM user_preference WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .optional()?;

    Ok(currency.unwrap_or_default())
}

/// Save the currency `user_id` wants totals shown in.
///
/// # Errors
/// Returns [Error::PreferencesSaveError] if the preference could not be written.
pub fn save_display_currency(
    user_id: UserID,
    currency: Currency,
    connection: &Connection,
) -> Result<(), Error> {
    connection
        .execute(
            "INSERT INTO user_preference (user_id, display_currency) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET display_currency = excluded.display_currency",
            (user_id.as_i64(), currency),
        )
        .map_err(|error| {
            tracing::error!("Could not save display currency for user {user_id}: {error}");
            Error::PreferencesSaveError
        })?;

    Ok(())
}

pub fn create_user_preference_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_preference (
            user_id INTEGER PRIMARY KEY,
            display_currency TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}
