//! Chart generation and rendering for the dashboard.
//!
//! Charts are generated as ECharts configuration with `charming` and
//! rendered as a container plus an inline script. The script runs again
//! every time HTMX swaps the stats panel, so the chart always matches the
//! totals next to it.

use charming::{
    Chart,
    component::{Legend, Title},
    element::{Color, JsFunction, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};

use crate::{currency::Currency, dashboard::spending::CategorySpending};

/// The HTML element ID of the category chart container.
pub(super) const CATEGORY_CHART_ID: &str = "category-chart";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the chart container and the script that draws the chart into it.
pub(super) fn chart_view(chart: &DashboardChart) -> Markup {
    let script = format!(
        r#"(function() {{
            const chartDom = document.getElementById("{}");
            if (!chartDom || typeof echarts === 'undefined') {{
                return;
            }}

            echarts.dispose(chartDom);
            const chart = echarts.init(chartDom);
            const option = {};
            chart.setOption(option);

            window.addEventListener('resize', () => chart.resize());

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
            }};
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }})();"#,
        chart.id, chart.options
    );

    html! {
        div id=(chart.id) class="min-h-[320px] w-full rounded" {}
        script { (PreEscaped(script)) }
    }
}

/// A pie chart of this month's spending per category.
pub(super) fn category_chart(spending: &[CategorySpending], currency: Currency) -> Chart {
    let colors = spending
        .iter()
        .map(|category| Color::from(category.color.as_str()))
        .collect::<Vec<_>>();
    let data = spending
        .iter()
        .map(|category| (category.amount, category.name.as_str()))
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Spending by Category").subtext("This month"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter(currency)),
        )
        .legend(Legend::new().left("center").bottom(0))
        .color(colors)
        .series(
            Pie::new()
                .name("Spending")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

fn currency_formatter(currency: Currency) -> JsFunction {
    let body = match currency {
        Currency::Usd => {
            "const currencyFormatter = new Intl.NumberFormat('en-US', {
                  style: 'currency',
                  currency: 'USD'
                });
                return currencyFormatter.format(number);"
        }
        Currency::Uzs => {
            "const numberFormatter = new Intl.NumberFormat('en-US', {
                  maximumFractionDigits: 0
                });
                return numberFormatter.format(number) + ' UZS';"
        }
    };

    JsFunction::new_with_args("number", body)
}
