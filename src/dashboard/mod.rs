//! The dashboard: summary cards, a chart of this month's spending by
//! category, the latest expenses and the display currency selector.

mod cards;
mod charts;
mod handlers;
mod spending;

pub use handlers::{get_dashboard_page, get_dashboard_stats, update_display_currency_endpoint};
