//! Dashboard HTTP handlers and view rendering.
//!
//! The dashboard page wraps a stats panel that is also served on its own as
//! a fragment. The panel reloads itself whenever an `expenses-changed` event
//! fires or the display currency changes.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    currency::Currency,
    dashboard::{
        cards::stats_cards,
        charts::{CATEGORY_CHART_ID, DashboardChart, category_chart, chart_view},
        spending::get_spending_by_category,
    },
    endpoints,
    expense::{EXPENSES_CHANGED_EVENT, expense_list, get_expense_snapshot, get_recent_expenses},
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, base, link,
    },
    navigation::NavBar,
    preferences::{get_display_currency, save_display_currency},
    stats::{aggregate, first_day_of_month},
    timezone::local_today,
};

/// How many of the latest expenses are listed under the stats cards.
const RECENT_EXPENSES_LIMIT: u32 = 5;

/// The HTML element ID of the stats panel.
const STATS_PANEL_ID: &str = "dashboard-stats";

/// The state needed for displaying the dashboard and its stats.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading expenses and preferences.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Tashkent".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Form data for changing the display currency.
#[derive(Debug, Deserialize)]
pub struct DisplayCurrencyForm {
    /// The ISO 4217 code of the new display currency.
    pub currency: String,
}

/// Display a page with a summary of the user's spending.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let display_currency = get_display_currency(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get display currency: {error}"))?;
    let stats_content = build_stats_content(
        user_id,
        display_currency,
        &state.local_timezone,
        &connection,
    )
    .inspect_err(|error| tracing::error!("could not build dashboard stats: {error}"))?;

    Ok(dashboard_view(display_currency, stats_content).into_response())
}

/// A route handler that returns the stats panel content for the user.
///
/// The panel requests this whenever an [EXPENSES_CHANGED_EVENT] fires.
/// Every call fetches a fresh snapshot and aggregates it from scratch.
pub async fn get_dashboard_stats(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let stats_content = get_display_currency(user_id, &connection).and_then(|currency| {
        build_stats_content(user_id, currency, &state.local_timezone, &connection)
    });

    match stats_content {
        Ok(content) => content.into_response(),
        Err(error) => {
            tracing::error!("could not build dashboard stats: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler that saves the user's display currency and responds
/// with the stats panel content in the new currency.
pub async fn update_display_currency_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<DisplayCurrencyForm>,
) -> Response {
    let display_currency = match form.currency.parse::<Currency>() {
        Ok(currency) => currency,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = save_display_currency(user_id, display_currency, &connection) {
        tracing::error!("Failed to save display currency: {error}");
        return Error::PreferencesSaveError.into_alert_response();
    }

    match build_stats_content(
        user_id,
        display_currency,
        &state.local_timezone,
        &connection,
    ) {
        Ok(content) => content.into_response(),
        Err(error) => {
            tracing::error!("could not build dashboard stats: {error}");
            error.into_alert_response()
        }
    }
}

/// Renders the cards, category chart and recent expenses for the user.
///
/// # Errors
/// Returns an error if the expenses cannot be read, a stored expense is
/// malformed, or the timezone is invalid. No partial content is rendered.
fn build_stats_content(
    user_id: UserID,
    display_currency: Currency,
    local_timezone: &str,
    connection: &Connection,
) -> Result<Markup, Error> {
    let today = local_today(local_timezone)?;

    let snapshot = get_expense_snapshot(user_id, connection)?;
    let stats = aggregate(&snapshot, display_currency, today)?;

    let spending = get_spending_by_category(
        user_id,
        first_day_of_month(today),
        display_currency,
        connection,
    )?;
    let chart = (!spending.is_empty()).then(|| DashboardChart {
        id: CATEGORY_CHART_ID,
        options: category_chart(&spending, display_currency).to_string(),
    });

    let recent_expenses = get_recent_expenses(user_id, RECENT_EXPENSES_LIMIT, connection)?;

    Ok(html! {
        div class="flex flex-col gap-4 w-full"
        {
            (stats_cards(&stats))

            @if let Some(chart) = &chart {
                div class=(CARD_STYLE) { (chart_view(chart)) }
            }

            section id="recent-expenses" class=(CARD_STYLE)
            {
                header class="flex justify-between items-center mb-2"
                {
                    h2 class="text-lg font-semibold" { "Recent Expenses" }
                    (link(endpoints::EXPENSES_VIEW, "View all"))
                }

                (expense_list(&recent_expenses, display_currency))
            }
        }
    })
}

fn currency_selector(display_currency: Currency) -> Markup {
    let stats_panel_target = format!("#{STATS_PANEL_ID}");
    let sync = format!("#{STATS_PANEL_ID}:replace");

    html! {
        form
            hx-post=(endpoints::DISPLAY_CURRENCY)
            hx-trigger="change"
            hx-target=(stats_panel_target)
            hx-swap="innerHTML"
            hx-target-error="#alert-container"
            hx-sync=(sync)
            class="flex items-center gap-2"
        {
            label for="currency" class="text-sm font-medium" { "Show amounts in" }

            select id="currency" name="currency" class=(FORM_TEXT_INPUT_STYLE)
            {
                @for currency in Currency::ALL {
                    option value=(currency.code()) selected[currency == display_currency]
                    {
                        (currency.code()) " - " (currency.name())
                    }
                }
            }
        }
    }
}

fn dashboard_view(display_currency: Currency, stats_content: Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let refresh_trigger = format!("{EXPENSES_CHANGED_EVENT} from:body");

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            header class="flex justify-between flex-wrap items-end gap-4 mb-4"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                div class="flex items-center gap-4"
                {
                    (currency_selector(display_currency))

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Add Expense"
                    }
                }
            }

            div
                id=(STATS_PANEL_ID)
                hx-get=(endpoints::DASHBOARD_STATS)
                hx-trigger=(refresh_trigger)
                hx-sync="this:replace"
                hx-swap="innerHTML"
                hx-target-error="#alert-container"
            {
                (stats_content)
            }
        }
    };

    let scripts = [HeadElement::ScriptLink(
        "/static/echarts.6.0.0.min.js".to_owned(),
    )];

    base("Dashboard", &scripts, &content)
}
