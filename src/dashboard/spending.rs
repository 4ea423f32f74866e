//! Spending per category for the current month.

use std::collections::HashMap;

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::CategoryColor,
    currency::{Currency, convert},
    expense::parse_expense_record,
};

const UNCATEGORIZED: &str = "Uncategorized";

/// The total spent in one category, in the display currency.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategorySpending {
    pub name: String,
    /// The category colour as a hex string.
    pub color: String,
    pub amount: f64,
}

/// Total the user's spending on or after `month_start` by category,
/// converted into `display_currency`.
///
/// Uncategorized expenses are grouped together. The result is sorted by
/// amount, largest first.
///
/// # Errors
/// Returns an error if a stored row is malformed or cannot be converted.
pub(super) fn get_spending_by_category(
    user_id: UserID,
    month_start: Date,
    display_currency: Currency,
    connection: &Connection,
) -> Result<Vec<CategorySpending>, Error> {
    let rows = connection
        .prepare(
            "SELECT e.amount, e.currency, e.expense_date, e.category_id, c.name, c.color
             FROM expense e
             LEFT JOIN category c ON c.id = e.category_id
             WHERE e.user_id = ?1",
        )?
        .query_map([user_id.as_i64()], |row| {
            let amount: f64 = row.get(0)?;
            let currency: String = row.get(1)?;
            let date: String = row.get(2)?;
            let category_id: Option<i64> = row.get(3)?;
            let name: Option<String> = row.get(4)?;
            let color: Option<String> = row.get(5)?;

            Ok((amount, currency, date, category_id, name, color))
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    let mut totals: HashMap<Option<i64>, CategorySpending> = HashMap::new();

    for (amount, raw_currency, raw_date, category_id, name, color) in rows {
        let record = parse_expense_record(amount, &raw_currency, &raw_date)?;

        if record.date < month_start {
            continue;
        }

        let amount = convert(record.amount, record.currency, display_currency)?;

        totals
            .entry(category_id)
            .or_insert_with(|| CategorySpending {
                name: name.unwrap_or_else(|| UNCATEGORIZED.to_owned()),
                color: color.unwrap_or_else(|| CategoryColor::FALLBACK.to_owned()),
                amount: 0.0,
            })
            .amount += amount;
    }

    let mut spending = totals.into_values().collect::<Vec<_>>();
    spending.sort_by(|a, b| b.amount.total_cmp(&a.amount).then(a.name.cmp(&b.name)));

    Ok(spending)
}
