//! Defines the expense models and the database queries for expenses.

use rusqlite::{Connection, Row};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Error,
    auth::UserID,
    category::{CategoryColor, CategoryIcon, CategoryId, CategoryName, get_category},
    currency::Currency,
    stats::ExpenseRecord,
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// The HTMX event sent to the page whenever a user's expenses change.
pub const EXPENSES_CHANGED_EVENT: &str = "expenses-changed";

/// The max number of graphemes of an expense label to display before it is
/// truncated with an ellipsis.
const MAX_LABEL_GRAPHEMES: usize = 32;

const FALLBACK_LABEL: &str = "Uncategorized";

/// An amount of money spent on one occasion.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    /// How much was spent, always greater than zero.
    pub amount: f64,
    pub currency: Currency,
    /// What the money was spent on, if the user said.
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    /// The day the money was spent.
    pub date: Date,
}

/// An expense that has not been saved yet.
///
/// Use [NewExpense::build] and the setters to fill in the optional fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// How much was spent. Must be greater than zero.
    pub amount: f64,
    /// The currency `amount` is in.
    pub currency: Currency,
    /// The day the money was spent.
    pub date: Date,
    /// What the money was spent on.
    pub description: Option<String>,
    /// One of the user's categories.
    pub category_id: Option<CategoryId>,
}

impl NewExpense {
    /// Start a new expense with no description or category.
    pub fn build(amount: f64, currency: Currency, date: Date) -> Self {
        Self {
            amount,
            currency,
            date,
            description: None,
            category_id: None,
        }
    }

    /// Set the description. Blank descriptions are treated as no description.
    pub fn description(mut self, description: &str) -> Self {
        let description = description.trim();
        self.description = (!description.is_empty()).then(|| description.to_owned());
        self
    }

    /// Set the category.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

/// The parts of a category shown next to an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseCategory {
    pub name: CategoryName,
    pub icon: CategoryIcon,
    pub color: CategoryColor,
}

/// An expense joined with its category, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseWithCategory {
    pub expense: Expense,
    pub category: Option<ExpenseCategory>,
}

impl ExpenseWithCategory {
    /// The text to show for the expense: the description, otherwise the
    /// category name, otherwise "Uncategorized".
    ///
    /// Long labels are truncated to [MAX_LABEL_GRAPHEMES] graphemes.
    pub fn label(&self) -> String {
        let label = self
            .expense
            .description
            .as_deref()
            .or_else(|| self.category.as_ref().map(|category| category.name.as_ref()))
            .unwrap_or(FALLBACK_LABEL);

        truncate_label(label)
    }

    pub fn icon(&self) -> &str {
        self.category
            .as_ref()
            .map(|category| category.icon.as_ref())
            .unwrap_or(CategoryIcon::FALLBACK)
    }

    pub fn color(&self) -> &str {
        self.category
            .as_ref()
            .map(|category| category.color.as_ref())
            .unwrap_or(CategoryColor::FALLBACK)
    }
}

fn truncate_label(label: &str) -> String {
    if label.graphemes(true).count() <= MAX_LABEL_GRAPHEMES {
        return label.to_owned();
    }

    let truncated: String = label
        .graphemes(true)
        .take(MAX_LABEL_GRAPHEMES - 3)
        .collect();

    truncated + "..."
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The largest amount a single expense may have, in its own currency.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// Save a new expense for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not a finite number greater than zero
///   and at most [MAX_AMOUNT],
/// - or [Error::InvalidCategory] if the category ID does not refer to one of the user's categories,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(
    new_expense: NewExpense,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    if !new_expense.amount.is_finite()
        || new_expense.amount <= 0.0
        || new_expense.amount > MAX_AMOUNT
    {
        return Err(Error::InvalidAmount(new_expense.amount));
    }

    if let Some(category_id) = new_expense.category_id {
        match get_category(category_id, user_id, connection) {
            Ok(_) => {}
            Err(Error::NotFound) => return Err(Error::InvalidCategory(Some(category_id))),
            Err(error) => return Err(error),
        }
    }

    let expense = connection
        .prepare(
            "INSERT INTO expense (user_id, amount, currency, description, category_id, expense_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, amount, currency, description, category_id, expense_date",
        )?
        .query_row(
            (
                user_id.as_i64(),
                new_expense.amount,
                new_expense.currency,
                new_expense.description,
                new_expense.category_id,
                new_expense.date,
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Get the user's `limit` most recent expenses, latest first, with their categories.
///
/// Expenses on the same day are ordered by when they were recorded.
pub fn get_recent_expenses(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<ExpenseWithCategory>, Error> {
    connection
        .prepare(
            "SELECT e.id, e.amount, e.currency, e.description, e.category_id, e.expense_date,
                c.name, c.icon, c.color
             FROM expense e
             LEFT JOIN category c ON c.id = e.category_id
             WHERE e.user_id = ?1
             ORDER BY e.expense_date DESC, e.id DESC
             LIMIT ?2",
        )?
        .query_map((user_id.as_i64(), limit), |row| {
            let expense = map_expense_row(row)?;
            let name: Option<String> = row.get(6)?;
            let icon: Option<String> = row.get(7)?;
            let color: Option<String> = row.get(8)?;

            let category = match (name, icon, color) {
                (Some(name), Some(icon), Some(color)) => Some(ExpenseCategory {
                    name: CategoryName::new_unchecked(&name),
                    icon: CategoryIcon::new_unchecked(&icon),
                    color: CategoryColor::new_unchecked(&color),
                }),
                _ => None,
            };

            Ok(ExpenseWithCategory { expense, category })
        })?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Delete one of the user's expenses.
///
/// # Errors
/// Returns [Error::DeleteMissingExpense] if the user has no expense with this ID.
pub fn delete_expense(
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (expense_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

const EXPENSE_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Read the amount, currency and date of every one of the user's expenses.
///
/// The currency and date columns are read as text and parsed here, so a
/// malformed row is reported instead of being skipped.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidExpenseDate] if a stored date is not an ISO 8601 calendar date,
/// - or [Error::InvalidCurrencyCode] if a stored currency is not supported,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_expense_snapshot(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<ExpenseRecord>, Error> {
    let raw_rows = connection
        .prepare("SELECT amount, currency, expense_date FROM expense WHERE user_id = ?1")?
        .query_map([user_id.as_i64()], |row| {
            let amount: f64 = row.get(0)?;
            let currency: String = row.get(1)?;
            let date: String = row.get(2)?;

            Ok((amount, currency, date))
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    raw_rows
        .into_iter()
        .map(|(amount, raw_currency, raw_date)| {
            parse_expense_record(amount, &raw_currency, &raw_date)
        })
        .collect()
}

/// Build an [ExpenseRecord] from the raw amount, currency and date columns
/// of a stored expense.
///
/// Every query that reads expenses as text for aggregation goes through
/// here, so they all reject the same malformed rows.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCurrencyCode] if the currency is not supported,
/// - or [Error::InvalidExpenseDate] if the date is not formatted as YYYY-MM-DD.
pub fn parse_expense_record(
    amount: f64,
    raw_currency: &str,
    raw_date: &str,
) -> Result<ExpenseRecord, Error> {
    let currency = raw_currency.parse::<Currency>()?;
    let date = parse_expense_date(raw_date)?;

    Ok(ExpenseRecord {
        amount,
        currency,
        date,
    })
}

/// Parse a stored expense date.
///
/// # Errors
/// Returns [Error::InvalidExpenseDate] if `raw_date` is not formatted as YYYY-MM-DD.
fn parse_expense_date(raw_date: &str) -> Result<Date, Error> {
    Date::parse(raw_date.trim(), EXPENSE_DATE_FORMAT).map_err(|error| {
        tracing::error!("Could not parse expense date \"{raw_date}\": {error}");
        Error::InvalidExpenseDate(raw_date.to_owned())
    })
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            currency TEXT NOT NULL,
            description TEXT,
            category_id INTEGER,
            expense_date TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, expense_date);",
    )?;

    Ok(())
}

/// Map a database row to an [Expense].
///
/// Expects the columns id, amount, currency, description, category_id and
/// expense_date in that order.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        currency: row.get(2)?,
        description: row.get(3)?,
        category_id: row.get(4)?,
        date: row.get(5)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod label_tests {
    use time::macros::date;

    use crate::{
        category::{CategoryColor, CategoryIcon, CategoryName},
        currency::Currency,
    };

    use super::{Expense, ExpenseCategory, ExpenseWithCategory};

    fn expense(description: Option<&str>, category: Option<&str>) -> ExpenseWithCategory {
        ExpenseWithCategory {
            expense: Expense {
                id: 1,
                amount: 1.0,
                currency: Currency::Usd,
                description: description.map(str::to_owned),
                category_id: category.map(|_| 1),
                date: date!(2025 - 10 - 05),
            },
            category: category.map(|name| ExpenseCategory {
                name: CategoryName::new_unchecked(name),
                icon: CategoryIcon::new_unchecked("🚗"),
                color: CategoryColor::new_unchecked("#ef4444"),
            }),
        }
    }

    #[test]
    fn label_prefers_description() {
        assert_eq!(expense(Some("Taxi"), Some("Transport")).label(), "Taxi");
    }

    #[test]
    fn label_falls_back_to_category_name() {
        assert_eq!(expense(None, Some("Transport")).label(), "Transport");
    }

    #[test]
    fn label_falls_back_to_uncategorized() {
        let uncategorized = expense(None, None);

        assert_eq!(uncategorized.label(), "Uncategorized");
        assert_eq!(uncategorized.icon(), "💰");
        assert_eq!(uncategorized.color(), "#3b82f6");
    }

    #[test]
    fn category_style_is_used_when_present() {
        let categorized = expense(None, Some("Transport"));

        assert_eq!(categorized.icon(), "🚗");
        assert_eq!(categorized.color(), "#ef4444");
    }

    #[test]
    fn long_label_is_truncated_by_grapheme() {
        let description = "🍽️".repeat(40);

        let label = expense(Some(&description), None).label();

        assert_eq!(label, format!("{}...", "🍽️".repeat(29)));
    }
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, PasswordHash,
        auth::{Email, User, create_user},
        category::{CategoryColor, CategoryIcon, CategoryName, create_category},
        currency::Currency,
        db::initialize,
        stats::ExpenseRecord,
    };

    use super::{
        MAX_AMOUNT, NewExpense, create_expense, delete_expense, get_expense_snapshot,
        get_recent_expenses, parse_expense_record,
    };

    fn get_test_connection() -> (Connection, User, User) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let alice = create_user(
            Email::new("alice@example.com").unwrap(),
            PasswordHash::new_unchecked("hash"),
            &conn,
        )
        .unwrap();
        let bob = create_user(
            Email::new("bob@example.com").unwrap(),
            PasswordHash::new_unchecked("hash"),
            &conn,
        )
        .unwrap();

        (conn, alice, bob)
    }

    #[test]
    fn create_succeeds() {
        let (conn, alice, _) = get_test_connection();

        let expense = create_expense(
            NewExpense::build(12.5, Currency::Uzs, date!(2025 - 10 - 05)).description("  Bread "),
            alice.id,
            &conn,
        )
        .unwrap();

        assert_eq!(expense.amount, 12.5);
        assert_eq!(expense.currency, Currency::Uzs);
        assert_eq!(expense.description.as_deref(), Some("Bread"));
        assert_eq!(expense.date, date!(2025 - 10 - 05));
    }

    #[test]
    fn blank_description_is_stored_as_null() {
        let (conn, alice, _) = get_test_connection();

        let expense = create_expense(
            NewExpense::build(1.0, Currency::Usd, date!(2025 - 10 - 05)).description("   "),
            alice.id,
            &conn,
        )
        .unwrap();

        assert_eq!(expense.description, None);
        let is_null: bool = conn
            .query_row(
                "SELECT description IS NULL FROM expense WHERE id = ?1",
                [expense.id],
                |row| row.get(0),
            )
            .unwrap();
        assert!(is_null);
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let (conn, alice, _) = get_test_connection();

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = create_expense(
                NewExpense::build(amount, Currency::Usd, date!(2025 - 10 - 05)),
                alice.id,
                &conn,
            );

            assert!(
                matches!(result, Err(Error::InvalidAmount(_))),
                "want InvalidAmount for {amount}, got {result:?}"
            );
        }
    }

    #[test]
    fn create_fails_on_amount_over_maximum() {
        let (conn, alice, _) = get_test_connection();

        let result = create_expense(
            NewExpense::build(MAX_AMOUNT * 10.0, Currency::Uzs, date!(2025 - 10 - 05)),
            alice.id,
            &conn,
        );
        let largest = create_expense(
            NewExpense::build(MAX_AMOUNT, Currency::Uzs, date!(2025 - 10 - 05)),
            alice.id,
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidAmount(MAX_AMOUNT * 10.0)));
        assert_eq!(largest.map(|expense| expense.amount), Ok(MAX_AMOUNT));
    }

    #[test]
    fn parsing_record_reports_bad_fields() {
        assert_eq!(
            parse_expense_record(1.0, "EUR", "2025-10-05"),
            Err(Error::InvalidCurrencyCode("EUR".to_owned()))
        );
        assert_eq!(
            parse_expense_record(1.0, "USD", "05/10/2025"),
            Err(Error::InvalidExpenseDate("05/10/2025".to_owned()))
        );
        assert_eq!(
            parse_expense_record(2.5, "UZS", "2025-10-05"),
            Ok(ExpenseRecord {
                amount: 2.5,
                currency: Currency::Uzs,
                date: date!(2025 - 10 - 05),
            })
        );
    }

    #[test]
    fn create_fails_on_missing_category() {
        let (conn, alice, _) = get_test_connection();

        let result = create_expense(
            NewExpense::build(1.0, Currency::Usd, date!(2025 - 10 - 05)).category_id(Some(42)),
            alice.id,
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(Some(42))));
    }

    #[test]
    fn create_fails_on_other_users_category() {
        let (conn, alice, bob) = get_test_connection();
        let category = create_category(
            CategoryName::new_unchecked("Food"),
            CategoryIcon::default(),
            CategoryColor::default(),
            bob.id,
            &conn,
        )
        .unwrap();

        let result = create_expense(
            NewExpense::build(1.0, Currency::Usd, date!(2025 - 10 - 05))
                .category_id(Some(category.id)),
            alice.id,
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(Some(category.id))));
    }

    #[test]
    fn recent_expenses_are_latest_first_and_limited() {
        let (conn, alice, bob) = get_test_connection();
        let older = create_expense(
            NewExpense::build(1.0, Currency::Usd, date!(2025 - 09 - 01)),
            alice.id,
            &conn,
        )
        .unwrap();
        let newest = create_expense(
            NewExpense::build(2.0, Currency::Usd, date!(2025 - 10 - 01)),
            alice.id,
            &conn,
        )
        .unwrap();
        let same_day_later = create_expense(
            NewExpense::build(3.0, Currency::Usd, date!(2025 - 10 - 01)),
            alice.id,
            &conn,
        )
        .unwrap();
        create_expense(
            NewExpense::build(4.0, Currency::Usd, date!(2025 - 10 - 02)),
            bob.id,
            &conn,
        )
        .unwrap();

        let all = get_recent_expenses(alice.id, 20, &conn).unwrap();
        let limited = get_recent_expenses(alice.id, 2, &conn).unwrap();

        let ids = |expenses: &[super::ExpenseWithCategory]| {
            expenses
                .iter()
                .map(|expense| expense.expense.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&all), vec![same_day_later.id, newest.id, older.id]);
        assert_eq!(ids(&limited), vec![same_day_later.id, newest.id]);
    }

    #[test]
    fn recent_expenses_include_category() {
        let (conn, alice, _) = get_test_connection();
        let category = create_category(
            CategoryName::new_unchecked("Transport"),
            CategoryIcon::new_unchecked("🚗"),
            CategoryColor::new_unchecked("#ef4444"),
            alice.id,
            &conn,
        )
        .unwrap();
        create_expense(
            NewExpense::build(1.0, Currency::Usd, date!(2025 - 10 - 01))
                .category_id(Some(category.id)),
            alice.id,
            &conn,
        )
        .unwrap();

        let expenses = get_recent_expenses(alice.id, 20, &conn).unwrap();

        assert_eq!(expenses[0].label(), "Transport");
        assert_eq!(expenses[0].icon(), "🚗");
    }

    #[test]
    fn deleting_category_uncategorizes_expenses() {
        let (conn, alice, _) = get_test_connection();
        let category = create_category(
            CategoryName::new_unchecked("Transport"),
            CategoryIcon::default(),
            CategoryColor::default(),
            alice.id,
            &conn,
        )
        .unwrap();
        create_expense(
            NewExpense::build(1.0, Currency::Usd, date!(2025 - 10 - 01))
                .category_id(Some(category.id)),
            alice.id,
            &conn,
        )
        .unwrap();

        crate::category::delete_category(category.id, alice.id, &conn).unwrap();

        let expenses = get_recent_expenses(alice.id, 20, &conn).unwrap();
        assert_eq!(expenses[0].expense.category_id, None);
        assert_eq!(expenses[0].label(), "Uncategorized");
    }

    #[test]
    fn delete_succeeds() {
        let (conn, alice, _) = get_test_connection();
        let expense = create_expense(
            NewExpense::build(1.0, Currency::Usd, date!(2025 - 10 - 01)),
            alice.id,
            &conn,
        )
        .unwrap();

        delete_expense(expense.id, alice.id, &conn).unwrap();

        assert_eq!(get_recent_expenses(alice.id, 20, &conn), Ok(vec![]));
    }

    #[test]
    fn delete_other_users_expense_is_not_found() {
        let (conn, alice, bob) = get_test_connection();
        let expense = create_expense(
            NewExpense::build(1.0, Currency::Usd, date!(2025 - 10 - 01)),
            alice.id,
            &conn,
        )
        .unwrap();

        assert_eq!(
            delete_expense(expense.id, bob.id, &conn),
            Err(Error::DeleteMissingExpense)
        );
        assert_eq!(get_recent_expenses(alice.id, 20, &conn).unwrap().len(), 1);
    }

    #[test]
    fn snapshot_contains_only_users_expenses() {
        let (conn, alice, bob) = get_test_connection();
        create_expense(
            NewExpense::build(100.0, Currency::Usd, date!(2025 - 10 - 01)),
            alice.id,
            &conn,
        )
        .unwrap();
        create_expense(
            NewExpense::build(50_000.0, Currency::Uzs, date!(2025 - 09 - 15)),
            alice.id,
            &conn,
        )
        .unwrap();
        create_expense(
            NewExpense::build(7.0, Currency::Usd, date!(2025 - 10 - 01)),
            bob.id,
            &conn,
        )
        .unwrap();

        let mut snapshot = get_expense_snapshot(alice.id, &conn).unwrap();
        snapshot.sort_by_key(|record| record.date);

        assert_eq!(snapshot, vec![
            ExpenseRecord {
                amount: 50_000.0,
                currency: Currency::Uzs,
                date: date!(2025 - 09 - 15),
            },
            ExpenseRecord {
                amount: 100.0,
                currency: Currency::Usd,
                date: date!(2025 - 10 - 01),
            },
        ]);
    }

    #[test]
    fn snapshot_reports_malformed_date() {
        let (conn, alice, _) = get_test_connection();
        conn.execute(
            "INSERT INTO expense (user_id, amount, currency, expense_date) VALUES (?1, 1.0, 'USD', 'last tuesday')",
            [alice.id.as_i64()],
        )
        .unwrap();

        assert_eq!(
            get_expense_snapshot(alice.id, &conn),
            Err(Error::InvalidExpenseDate("last tuesday".to_owned()))
        );
    }

    #[test]
    fn snapshot_reports_unknown_currency() {
        let (conn, alice, _) = get_test_connection();
        conn.execute(
            "INSERT INTO expense (user_id, amount, currency, expense_date) VALUES (?1, 1.0, 'EUR', '2025-10-01')",
            [alice.id.as_i64()],
        )
        .unwrap();

        assert_eq!(
            get_expense_snapshot(alice.id, &conn),
            Err(Error::InvalidCurrencyCode("EUR".to_owned()))
        );
    }

    #[test]
    fn snapshot_of_user_without_expenses_is_empty() {
        let (conn, alice, _) = get_test_connection();

        assert_eq!(get_expense_snapshot(alice.id, &conn), Ok(vec![]));
    }
}
