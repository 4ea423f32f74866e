//! Summary statistics over a user's expenses.
//!
//! [aggregate] is a pure function over a snapshot of expense records. It does
//! no I/O and keeps no state between calls, so it is run from scratch every
//! time the dashboard asks for fresh numbers.

use time::{Date, Duration};

use crate::{
    Error,
    currency::{Currency, convert},
};

/// The parts of an expense needed to compute summary statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpenseRecord {
    /// The amount spent, in `currency`.
    pub amount: f64,
    /// The currency the expense was recorded in.
    pub currency: Currency,
    /// The day the money was spent.
    pub date: Date,
}

/// Totals derived from a set of expenses, all expressed in `display_currency`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsResult {
    /// The currency every total is expressed in.
    pub display_currency: Currency,
    /// Spending since the first day of the current month.
    pub total_this_month: f64,
    /// Spending during the whole of the previous calendar month.
    pub total_last_month: f64,
    /// Spending across all records.
    pub total_expenses: f64,
    /// This month's spending divided by the current day of the month.
    pub avg_daily: f64,
}

impl StatsResult {
    /// The month-over-month change, see [monthly_change_percent].
    pub fn monthly_change_percent(&self) -> f64 {
        monthly_change_percent(self.total_this_month, self.total_last_month)
    }
}

/// The percentage change from `total_last_month` to `total_this_month`.
///
/// Returns zero when there was no spending last month rather than an
/// infinite or undefined change.
pub fn monthly_change_percent(total_this_month: f64, total_last_month: f64) -> f64 {
    if total_last_month > 0.0 {
        (total_this_month - total_last_month) / total_last_month * 100.0
    } else {
        0.0
    }
}

/// The calendar boundaries used to bucket expenses by month.
#[derive(Debug, PartialEq)]
struct MonthBoundaries {
    start_of_current_month: Date,
    start_of_previous_month: Date,
    end_of_previous_month: Date,
}

impl MonthBoundaries {
    fn new(today: Date) -> Self {
        let start_of_current_month = first_day_of_month(today);
        let end_of_previous_month = start_of_current_month - Duration::days(1);
        let start_of_previous_month = first_day_of_month(end_of_previous_month);

        Self {
            start_of_current_month,
            start_of_previous_month,
            end_of_previous_month,
        }
    }
}

/// The first day of the month that `date` falls in.
pub fn first_day_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

/// Compute summary statistics for `records` in `display_currency`.
///
/// `today` decides which records belong to the current and previous months.
/// Records dated on or after the first of the current month count towards
/// this month, records in the previous calendar month count towards last
/// month and anything older only counts towards the overall total.
///
/// # Errors
/// Returns [Error::UnsupportedConversion] if a record cannot be converted to
/// `display_currency`. No partial totals are returned in that case.
pub fn aggregate(
    records: &[ExpenseRecord],
    display_currency: Currency,
    today: Date,
) -> Result<StatsResult, Error> {
    let boundaries = MonthBoundaries::new(today);

    let mut total_this_month = 0.0;
    let mut total_last_month = 0.0;
    let mut total_expenses = 0.0;

    for record in records {
        let amount = convert(record.amount, record.currency, display_currency)?;
        total_expenses += amount;

        if record.date >= boundaries.start_of_current_month {
            total_this_month += amount;
        } else if record.date >= boundaries.start_of_previous_month
            && record.date <= boundaries.end_of_previous_month
        {
            total_last_month += amount;
        }
    }

    let avg_daily = total_this_month / f64::from(today.day());

    Ok(StatsResult {
        display_currency,
        total_this_month,
        total_last_month,
        total_expenses,
        avg_daily,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::currency::{Currency, USD_TO_UZS};

    use super::{
        ExpenseRecord, MonthBoundaries, aggregate, first_day_of_month, monthly_change_percent,
    };

    fn usd(amount: f64, date: time::Date) -> ExpenseRecord {
        ExpenseRecord {
            amount,
            currency: Currency::Usd,
            date,
        }
    }

    fn uzs(amount: f64, date: time::Date) -> ExpenseRecord {
        ExpenseRecord {
            amount,
            currency: Currency::Uzs,
            date,
        }
    }

    #[track_caller]
    fn assert_close(got: f64, want: f64) {
        assert!((got - want).abs() < 1e-9, "want {want}, got {got}");
    }

    #[test]
    fn empty_records_produce_zero_totals() {
        let stats = aggregate(&[], Currency::Usd, date!(2025 - 03 - 15)).unwrap();

        assert_eq!(stats.total_this_month, 0.0);
        assert_eq!(stats.total_last_month, 0.0);
        assert_eq!(stats.total_expenses, 0.0);
        assert_eq!(stats.avg_daily, 0.0);
        assert_eq!(stats.monthly_change_percent(), 0.0);
    }

    #[test]
    fn buckets_records_by_month() {
        let today = date!(2025 - 03 - 15);
        let records = [
            usd(100.0, date!(2025 - 03 - 10)),
            usd(50.0, date!(2025 - 02 - 20)),
            usd(10.0, date!(2025 - 01 - 05)),
        ];

        let stats = aggregate(&records, Currency::Usd, today).unwrap();

        assert_close(stats.total_this_month, 100.0);
        assert_close(stats.total_last_month, 50.0);
        assert_close(stats.total_expenses, 160.0);
    }

    #[test]
    fn first_day_of_month_counts_towards_this_month() {
        let today = date!(2025 - 03 - 15);
        let records = [usd(25.0, date!(2025 - 03 - 01))];

        let stats = aggregate(&records, Currency::Usd, today).unwrap();

        assert_close(stats.total_this_month, 25.0);
        assert_close(stats.total_last_month, 0.0);
    }

    #[test]
    fn last_day_of_previous_month_counts_towards_last_month() {
        let today = date!(2025 - 03 - 15);
        let records = [
            usd(30.0, date!(2025 - 02 - 28)),
            usd(20.0, date!(2025 - 02 - 01)),
            usd(5.0, date!(2025 - 01 - 31)),
        ];

        let stats = aggregate(&records, Currency::Usd, today).unwrap();

        assert_close(stats.total_this_month, 0.0);
        assert_close(stats.total_last_month, 50.0);
        assert_close(stats.total_expenses, 55.0);
    }

    #[test]
    fn future_dated_records_count_towards_this_month() {
        let today = date!(2025 - 03 - 15);
        let records = [usd(12.0, date!(2025 - 03 - 20))];

        let stats = aggregate(&records, Currency::Usd, today).unwrap();

        assert_close(stats.total_this_month, 12.0);
    }

    #[test]
    fn daily_average_divides_by_day_of_month() {
        let records = [usd(100.0, date!(2025 - 03 - 02))];

        let stats = aggregate(&records, Currency::Usd, date!(2025 - 03 - 04)).unwrap();

        assert_close(stats.avg_daily, 25.0);
    }

    #[test]
    fn daily_average_on_first_of_month_uses_divisor_of_one() {
        let records = [usd(42.0, date!(2025 - 03 - 01))];

        let stats = aggregate(&records, Currency::Usd, date!(2025 - 03 - 01)).unwrap();

        assert_close(stats.avg_daily, 42.0);
    }

    #[test]
    fn converts_records_into_display_currency() {
        let today = date!(2025 - 03 - 15);
        let records = [
            usd(10.0, date!(2025 - 03 - 01)),
            uzs(125_000.0, date!(2025 - 03 - 02)),
        ];

        let in_usd = aggregate(&records, Currency::Usd, today).unwrap();
        let in_uzs = aggregate(&records, Currency::Uzs, today).unwrap();

        assert_close(in_usd.total_this_month, 20.0);
        assert_close(in_uzs.total_this_month, 20.0 * USD_TO_UZS);
        assert_eq!(in_usd.display_currency, Currency::Usd);
        assert_eq!(in_uzs.display_currency, Currency::Uzs);
    }

    #[test]
    fn january_buckets_december_as_last_month() {
        let today = date!(2025 - 01 - 10);
        let records = [
            usd(7.0, date!(2025 - 01 - 01)),
            usd(3.0, date!(2024 - 12 - 31)),
            usd(1.0, date!(2024 - 11 - 30)),
        ];

        let stats = aggregate(&records, Currency::Usd, today).unwrap();

        assert_close(stats.total_this_month, 7.0);
        assert_close(stats.total_last_month, 3.0);
        assert_close(stats.total_expenses, 11.0);
    }

    #[test]
    fn month_boundaries_handle_leap_years() {
        let boundaries = MonthBoundaries::new(date!(2024 - 03 - 31));

        assert_eq!(boundaries.start_of_current_month, date!(2024 - 03 - 01));
        assert_eq!(boundaries.start_of_previous_month, date!(2024 - 02 - 01));
        assert_eq!(boundaries.end_of_previous_month, date!(2024 - 02 - 29));
    }

    #[test]
    fn first_day_of_month_is_idempotent() {
        assert_eq!(
            first_day_of_month(date!(2025 - 06 - 01)),
            date!(2025 - 06 - 01)
        );
        assert_eq!(
            first_day_of_month(date!(2025 - 06 - 30)),
            date!(2025 - 06 - 01)
        );
    }

    #[test]
    fn monthly_change_is_zero_without_spending_last_month() {
        let change = monthly_change_percent(100.0, 0.0);

        assert_eq!(change, 0.0);
        assert!(change.is_finite());
    }

    #[test]
    fn monthly_change_is_relative_to_last_month() {
        assert_close(monthly_change_percent(150.0, 100.0), 50.0);
        assert_close(monthly_change_percent(50.0, 100.0), -50.0);
        assert_close(monthly_change_percent(0.0, 100.0), -100.0);
    }
}
