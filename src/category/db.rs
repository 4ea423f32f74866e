//! Database operations for categories.
//!
//! Every query is scoped to a single user. A category ID that belongs to
//! someone else behaves exactly like one that does not exist.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryColor, CategoryIcon, CategoryId, CategoryName},
};

/// Create a category for `user_id` and return it with its generated ID.
pub fn create_category(
    name: CategoryName,
    icon: CategoryIcon,
    color: CategoryColor,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, icon, color) VALUES (?1, ?2, ?3, ?4)",
        (user_id.as_i64(), name.as_ref(), icon.as_ref(), color.as_ref()),
    )?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        name,
        icon,
        color,
    })
}

/// Retrieve a single category owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user has no category with this ID.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, name, icon, color FROM category WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the user's categories, newest first.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    query_categories(
        "SELECT id, name, icon, color FROM category WHERE user_id = ?1 \
        ORDER BY created_at DESC, id DESC",
        user_id,
        connection,
    )
}

/// Retrieve the user's categories in alphabetical order.
pub fn get_categories_by_name(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    query_categories(
        "SELECT id, name, icon, color FROM category WHERE user_id = ?1 \
        ORDER BY name COLLATE NOCASE ASC, id ASC",
        user_id,
        connection,
    )
}

fn query_categories(
    query: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(query)?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Delete one of the user's categories. Expenses in the category become
/// uncategorised.
///
/// # Errors
///
/// Returns [Error::DeleteMissingCategory] if the user has no category with this ID.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            color TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(1)?;
    let raw_icon: String = row.get(2)?;
    let raw_color: String = row.get(3)?;

    Ok(Category {
        id: row.get(0)?,
        name: CategoryName::new_unchecked(&raw_name),
        icon: CategoryIcon::new_unchecked(&raw_icon),
        color: CategoryColor::new_unchecked(&raw_color),
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        auth::{Email, User, UserID, create_user},
        category::{CategoryColor, CategoryIcon, CategoryName},
        db::initialize,
    };

    use super::{
        create_category, delete_category, get_categories, get_categories_by_name, get_category,
    };

    fn get_connection_with_users() -> (Connection, User, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let alice = create_user(
            Email::new("alice@example.com").unwrap(),
            PasswordHash::new_unchecked("hash"),
            &connection,
        )
        .unwrap();
        let bob = create_user(
            Email::new("bob@example.com").unwrap(),
            PasswordHash::new_unchecked("hash"),
            &connection,
        )
        .unwrap();

        (connection, alice, bob)
    }

    fn create(name: &str, user_id: UserID, connection: &Connection) -> crate::category::Category {
        create_category(
            CategoryName::new_unchecked(name),
            CategoryIcon::default(),
            CategoryColor::default(),
            user_id,
            connection,
        )
        .unwrap()
    }

    #[test]
    fn create_then_get_category() {
        let (connection, alice, _) = get_connection_with_users();
        let category = create_category(
            CategoryName::new_unchecked("Transport"),
            CategoryIcon::new_unchecked("🚗"),
            CategoryColor::new_unchecked("#ef4444"),
            alice.id,
            &connection,
        )
        .unwrap();

        assert_eq!(get_category(category.id, alice.id, &connection), Ok(category));
    }

    #[test]
    fn other_users_category_is_not_found() {
        let (connection, alice, bob) = get_connection_with_users();
        let category = create("Transport", alice.id, &connection);

        assert_eq!(
            get_category(category.id, bob.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn categories_are_listed_newest_first() {
        let (connection, alice, bob) = get_connection_with_users();
        let first = create("Food", alice.id, &connection);
        let second = create("Bills", alice.id, &connection);
        create("Hidden", bob.id, &connection);

        let categories = get_categories(alice.id, &connection).unwrap();

        assert_eq!(categories, vec![second, first]);
    }

    #[test]
    fn categories_can_be_listed_by_name() {
        let (connection, alice, _) = get_connection_with_users();
        let food = create("food", alice.id, &connection);
        let bills = create("Bills", alice.id, &connection);

        let categories = get_categories_by_name(alice.id, &connection).unwrap();

        assert_eq!(categories, vec![bills, food]);
    }

    #[test]
    fn delete_removes_category() {
        let (connection, alice, _) = get_connection_with_users();
        let category = create("Food", alice.id, &connection);

        delete_category(category.id, alice.id, &connection).unwrap();

        assert_eq!(get_categories(alice.id, &connection), Ok(vec![]));
    }

    #[test]
    fn delete_other_users_category_fails() {
        let (connection, alice, bob) = get_connection_with_users();
        let category = create("Food", alice.id, &connection);

        assert_eq!(
            delete_category(category.id, bob.id, &connection),
            Err(Error::DeleteMissingCategory)
        );
        assert!(get_category(category.id, alice.id, &connection).is_ok());
    }
}
