//! Page layout, shared styles and small reusable view fragments.

use maud::{DOCTYPE, Markup, html};

use crate::currency::Currency;

pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500 \
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_SECONDARY_STYLE: &str = "py-2 px-4 text-sm font-medium \
    text-gray-900 bg-white rounded border border-gray-200 hover:bg-gray-100 \
    hover:text-blue-700 dark:bg-gray-800 dark:text-gray-300 \
    dark:border-gray-600 dark:hover:text-white dark:hover:bg-gray-700";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";

/// Radio buttons drawn as tiles, used for the icon and colour pickers.
pub const FORM_RADIO_TILE_STYLE: &str = "peer sr-only";
pub const FORM_RADIO_TILE_LABEL_STYLE: &str = "flex items-center justify-center \
    w-11 h-11 rounded-lg border-2 border-gray-200 dark:border-gray-600 \
    cursor-pointer transition hover:border-gray-400 \
    peer-checked:border-blue-600 peer-checked:ring-2 peer-checked:ring-blue-300 \
    peer-focus-visible:ring-2 peer-focus-visible:ring-blue-500";

pub const CARD_STYLE: &str = "p-5 bg-white rounded-lg shadow dark:bg-gray-800 \
    border border-gray-100 dark:border-gray-700";

pub const LIST_ITEM_STYLE: &str = "flex items-center gap-3 py-3 px-4 \
    bg-white dark:bg-gray-800 border-b border-gray-100 dark:border-gray-700";

pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

/// Extra elements to add to a page's `<head>`.
pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Spendwise" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" {}

                style
                {
                    r#"
                    #indicator.htmx-indicator {
                        display: none;
                    }

                    #indicator.htmx-request .htmx-indicator,
                    #indicator.htmx-request.htmx-indicator {
                        display: inline;
                    }

                    .htmx-request#dashboard-stats {
                        opacity: 0.6;
                    }
                    "#
                }

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptLink(path) => script src=(path) {}
                    }
                }
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900 pb-[calc(5rem+env(safe-area-inset-bottom))] lg:pb-0"
            {
                (content)

                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-emerald-600 dark:text-emerald-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-emerald-600
                            hover:bg-emerald-800 focus:ring-4 focus:outline-hidden
                            focus:ring-emerald-300 font-medium rounded text-sm px-5
                            py-2.5 text-center my-4"
                    {
                        "Back to Homepage"
                    }
                }
            }
        }
    );

    base(title, &[], &content)
}

/// The card layout shared by the log in and registration pages.
pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            a href="/" class="flex items-center mb-6 text-2xl font-semibold text-gray-900 dark:text-white"
            {
                span class="mr-2" aria-hidden="true" { "💰" }
                "Spendwise"
            }

            div class="w-full bg-white rounded-lg shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1 class="text-xl font-bold leading-tight tracking-tight text-gray-900 md:text-2xl dark:text-white"
                    {
                        (form_title)
                    }

                    (form)
                }
            }
        }
    }
}

pub fn email_input(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="email" class=(FORM_LABEL_STYLE) { "Email" }

            input
                type="email"
                name="email"
                id="email"
                placeholder="you@example.com"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autofocus
                value=(email);

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

pub fn password_input(password: &str, min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="password" class=(FORM_LABEL_STYLE) { "Password" }

            input
                type="password"
                name="password"
                id="password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=(password)
                minlength=(min_length);

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

pub fn loading_spinner() -> Markup {
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            circle cx="50" cy="50.5" r="45" stroke="#E5E7EB" stroke-width="10" {}
            path
                d="M50 5.5 A45 45 0 0 1 95 50.5"
                stroke="currentColor"
                stroke-width="10"
                stroke-linecap="round" {}
        }
    }
}

/// A small pill with the currency code, shown next to amounts that are not
/// in the user's display currency.
pub fn currency_badge(currency: Currency) -> Markup {
    html! {
        span
            class="ml-1 inline-flex items-center px-1.5 py-0.5 text-xs font-semibold \
                text-gray-700 bg-gray-100 rounded dark:bg-gray-700 dark:text-gray-300"
        {
            (currency.code())
        }
    }
}

/// A coloured circle containing an emoji icon.
pub fn category_icon(icon: &str, color: &str) -> Markup {
    html! {
        span
            class="flex shrink-0 items-center justify-center w-10 h-10 rounded-full text-lg"
            style={ "background-color: " (color) "33;" }
        {
            (icon)
        }
    }
}

/// A button that deletes `url` after the user confirms and removes the
/// element matched by `target` on success.
pub fn delete_button(url: &str, confirm_message: &str, target: &str) -> Markup {
    html! {
        button
            type="button"
            hx-delete=(url)
            hx-confirm=(confirm_message)
            hx-target=(target)
            hx-swap="delete"
            hx-target-error="#alert-container"
            class=(BUTTON_DELETE_STYLE)
        {
            "Delete"
        }
    }
}

/// A link with blue text for use in a <p> tag.
pub fn link(url: &str, text: &str) -> Markup {
    html! {
        a href=(url) class=(LINK_STYLE) { (text) }
    }
}
