//! Summary cards for the dashboard.

use maud::{Markup, html};

use crate::{currency::format_amount, html::CARD_STYLE, stats::StatsResult};

/// Format a month-over-month change, e.g. "+12.5%" or "-3.0%".
///
/// Only increases get an explicit sign.
fn format_change_percent(change: f64) -> String {
    if change > 0.0 {
        format!("+{change:.1}%")
    } else {
        format!("{change:.1}%")
    }
}

struct Card {
    id: &'static str,
    title: &'static str,
    icon: &'static str,
    value: String,
    caption: Markup,
    accent: &'static str,
}

fn stat_card(card: Card) -> Markup {
    html! {
        div id=(card.id) class=(CARD_STYLE)
        {
            div class="flex items-center justify-between mb-2"
            {
                h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (card.title) }
                span class={ "text-lg " (card.accent) } aria-hidden="true" { (card.icon) }
            }

            p class="text-2xl font-bold" data-value { (card.value) }
            p class="mt-1 text-xs text-gray-500 dark:text-gray-400" data-caption { (card.caption) }
        }
    }
}

/// Renders the four summary cards for `stats`.
pub(super) fn stats_cards(stats: &StatsResult) -> Markup {
    let currency = stats.display_currency;
    let change = stats.monthly_change_percent();
    let change_style = if change > 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    };

    let cards = [
        Card {
            id: "this-month-card",
            title: "This Month",
            icon: "📅",
            value: format_amount(stats.total_this_month, currency),
            caption: html! {
                span class=(change_style) { (format_change_percent(change)) }
                " from last month"
            },
            accent: "text-blue-500",
        },
        Card {
            id: "last-month-card",
            title: "Last Month",
            icon: "🗓️",
            value: format_amount(stats.total_last_month, currency),
            caption: html! { "Previous month total" },
            accent: "text-gray-500",
        },
        Card {
            id: "daily-average-card",
            title: "Daily Average",
            icon: "📈",
            value: format_amount(stats.avg_daily, currency),
            caption: html! { "This month's daily average" },
            accent: "text-emerald-500",
        },
        Card {
            id: "total-expenses-card",
            title: "Total Expenses",
            icon: "💵",
            value: format_amount(stats.total_expenses, currency),
            caption: html! { "All time" },
            accent: "text-purple-500",
        },
    ];

    html! {
        div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 w-full"
        {
            @for card in cards {
                (stat_card(card))
            }
        }
    }
}
