//! Supported currencies, the fixed exchange rate table and amount formatting.
//!
//! Every expense is recorded in one of the [Currency] variants. Totals are
//! shown in the user's display currency, so amounts recorded in another
//! currency are converted with [convert] before they are summed.

use std::{fmt::Display, str::FromStr, sync::OnceLock};

use numfmt::{Formatter, Precision};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A currency that expenses can be recorded and displayed in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// US dollars.
    #[default]
    #[serde(rename = "USD")]
    Usd,
    /// Uzbek so'm.
    #[serde(rename = "UZS")]
    Uzs,
}

impl Currency {
    /// All supported currencies in the order they are offered to the user.
    pub const ALL: [Currency; 2] = [Currency::Usd, Currency::Uzs];

    /// The ISO 4217 code, e.g. "USD".
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Uzs => "UZS",
        }
    }

    /// The symbol used when formatting amounts.
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Uzs => "UZS",
        }
    }

    /// The human readable name of the currency.
    pub fn name(self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Uzs => "So'm",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "USD" => Ok(Currency::Usd),
            "UZS" => Ok(Currency::Uzs),
            other => Err(Error::InvalidCurrencyCode(other.to_owned())),
        }
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// How many so'm one US dollar buys.
pub const USD_TO_UZS: f64 = 12_500.0;

/// Fixed exchange rates as `(from, to, multiplier)`.
///
/// Each direction is listed explicitly and the two rates for a pair are
/// reciprocals of each other. Converting a currency to itself is not listed,
/// [convert] handles that case before consulting the table.
const EXCHANGE_RATES: &[(Currency, Currency, f64)] = &[
    (Currency::Usd, Currency::Uzs, USD_TO_UZS),
    (Currency::Uzs, Currency::Usd, 1.0 / USD_TO_UZS),
];

/// Look up the multiplier for converting from `from` to `to`.
///
/// # Errors
/// Returns [Error::UnsupportedConversion] if the pair is not in the rate table.
pub fn exchange_rate(from: Currency, to: Currency) -> Result<f64, Error> {
    if from == to {
        return Ok(1.0);
    }

    EXCHANGE_RATES
        .iter()
        .find(|(rate_from, rate_to, _)| *rate_from == from && *rate_to == to)
        .map(|(_, _, rate)| *rate)
        .ok_or(Error::UnsupportedConversion { from, to })
}

/// Convert `amount` from the currency `from` to the currency `to`.
///
/// Converting a currency to itself returns `amount` untouched.
///
/// # Errors
/// Returns [Error::UnsupportedConversion] if there is no exchange rate for the pair.
pub fn convert(amount: f64, from: Currency, to: Currency) -> Result<f64, Error> {
    if from == to {
        return Ok(amount);
    }

    Ok(amount * exchange_rate(from, to)?)
}

/// Format `amount` for display in `currency`.
///
/// US dollars are shown with a leading "$" and two decimal places, e.g.
/// "$1,234.50". So'm are rounded to whole numbers and followed by the
/// currency code, e.g. "1,234 UZS". Negative amounts get a leading "-".
pub fn format_amount(amount: f64, currency: Currency) -> String {
    // Amounts that round to zero are shown without a sign.
    let sign = |rounded: u64| if amount < 0.0 && rounded > 0 { "-" } else { "" };

    match currency {
        Currency::Uzs => {
            let whole = amount.abs().round() as u64;
            format!(
                "{}{} {}",
                sign(whole),
                group_thousands(whole),
                currency.symbol()
            )
        }
        Currency::Usd => {
            let cents = (amount.abs() * 100.0).round() as u64;
            let (whole, fraction) = (cents / 100, cents % 100);

            format!(
                "{}{}{}.{fraction:02}",
                sign(cents),
                currency.symbol(),
                group_thousands(whole)
            )
        }
    }
}

fn group_thousands(number: u64) -> String {
    const BILLION: u64 = 1_000_000_000;
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    let formatter = FORMATTER.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .unwrap()
            .precision(Precision::Decimals(0))
    });

    // numfmt switches to scientific notation for large numbers, so the low
    // nine digits are grouped here and only the rest goes through numfmt.
    if number >= BILLION {
        let low = number % BILLION;
        return format!(
            "{},{:03},{:03},{:03}",
            formatter.fmt_string(number / BILLION),
            low / 1_000_000,
            low / 1_000 % 1_000,
            low % 1_000
        );
    }

    // Zero is hardcoded as "0" by numfmt, which is already what we want.
    formatter.fmt_string(number)
}
