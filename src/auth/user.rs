//! Registered users and the queries on the user table.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// Keeps user IDs from being mixed up with expense or category IDs in the
/// many queries that take both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The ID as stored in the database.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A trimmed, lower-case email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Normalise and validate `raw_email`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmail] unless the address has exactly one '@'
    /// with text on either side.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let email = raw_email.trim().to_lowercase();

        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(email))
            }
            _ => Err(Error::InvalidEmail(raw_email.trim().to_owned())),
        }
    }

    /// Wrap an email address loaded from the database.
    pub fn new_unchecked(raw_email: &str) -> Self {
        Self(raw_email.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The address the user logs in with.
    pub email: Email,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        (),
    )?;

    Ok(())
}

/// Insert a new user into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateEmail] if the email address is already
/// registered, or [Error::SqlError] for any other SQL error.
pub fn create_user(
    email: Email,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (email, password) VALUES (?1, ?2)",
        (email.as_ref(), password_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email,
        password_hash,
    })
}

/// Get the user registered with `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if nobody registered with that address.
pub fn get_user_by_email(email: &Email, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password FROM user WHERE email = :email")?
        .query_row(&[(":email", email.as_ref())], map_row)
        .map_err(|error| error.into())
}

/// Replace the password hash of the user with the ID `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such user.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        email: Email::new_unchecked(&raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}


#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{Error, PasswordHash};

    use super::{
        Email, UserID, create_user, create_user_table, get_user_by_email, update_password,
    };

    fn get_db_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        connection
    }

    fn test_email() -> Email {
        Email::new("foo@bar.baz").unwrap()
    }

    #[test]
    fn insert_user_succeeds() {
        let connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let user = create_user(test_email(), password_hash.clone(), &connection).unwrap();

        assert!(user.id.as_i64() > 0);
        assert_eq!(user.email, test_email());
        assert_eq!(user.password_hash, password_hash);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let connection = get_db_connection();
        create_user(
            test_email(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let result = create_user(
            test_email(),
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_by_email_returns_created_user() {
        let connection = get_db_connection();
        let user = create_user(
            test_email(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        assert_eq!(get_user_by_email(&test_email(), &connection), Ok(user));
    }

    #[test]
    fn get_user_by_email_fails_for_unknown_address() {
        let connection = get_db_connection();
        let email = Email::new("nobody@bar.baz").unwrap();

        assert_eq!(get_user_by_email(&email, &connection), Err(Error::NotFound));
    }

    #[test]
    fn update_password_replaces_hash() {
        let connection = get_db_connection();
        let user = create_user(
            test_email(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let new_hash = PasswordHash::new_unchecked("hunter3");

        update_password(user.id, &new_hash, &connection).unwrap();

        let got = get_user_by_email(&test_email(), &connection).unwrap();
        assert_eq!(got.password_hash, new_hash);
    }

    #[test]
    fn update_password_fails_for_unknown_user() {
        let connection = get_db_connection();

        let result = update_password(
            UserID::new(7),
            &PasswordHash::new_unchecked("hunter3"),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }
}
