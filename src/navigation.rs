//! The navigation bar shown at the top of every page, and at the bottom on
//! small screens.

use maud::{Markup, html};

use crate::endpoints;

#[derive(Clone)]
struct Link {
    url: &'static str,
    title: &'static str,
    is_current: bool,
}

impl Link {
    fn new(url: &'static str, title: &'static str, active_endpoint: &str) -> Self {
        Self {
            url,
            title,
            is_current: url == active_endpoint,
        }
    }

    fn desktop_html(&self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-emerald-700 rounded-sm lg:bg-transparent
            lg:text-emerald-700 lg:p-0 dark:text-white lg:dark:text-emerald-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
            lg:hover:bg-transparent lg:border-0 lg:hover:text-emerald-700 lg:p-0
            dark:text-white lg:dark:hover:text-emerald-500 dark:hover:bg-gray-700
            dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html! {
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        }
    }

    fn mobile_html(&self) -> Markup {
        let style = if self.is_current {
            "flex w-full min-w-0 items-center justify-center rounded-lg \
            bg-emerald-50 px-2.5 py-2 text-xs font-semibold leading-tight \
            text-emerald-700 shadow-sm sm:text-sm \
            dark:bg-emerald-900/30 dark:text-emerald-200"
        } else {
            "flex w-full min-w-0 items-center justify-center rounded-lg \
            px-2.5 py-2 text-xs font-semibold leading-tight text-gray-600 \
            sm:text-sm hover:bg-emerald-50/70 hover:text-emerald-700 \
            dark:text-gray-300 dark:hover:bg-emerald-900/20 dark:hover:text-emerald-200"
        };

        html! {
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                span class="truncate" { (self.title) }
            }
        }
    }
}

pub struct NavBar {
    links: Vec<Link>,
}

impl NavBar {
    /// Build the navigation bar, highlighting the link to `active_endpoint`
    /// if there is one.
    pub fn new(active_endpoint: &str) -> Self {
        let links = vec![
            Link::new(endpoints::DASHBOARD_VIEW, "Dashboard", active_endpoint),
            Link::new(endpoints::EXPENSES_VIEW, "Expenses", active_endpoint),
            Link::new(endpoints::CATEGORIES_VIEW, "Categories", active_endpoint),
            Link {
                url: endpoints::LOG_OUT,
                title: "Log out",
                is_current: false,
            },
        ];

        NavBar { links }
    }

    pub fn into_html(self) -> Markup {
        html! {
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::DASHBOARD_VIEW) class="flex items-center space-x-3"
                    {
                        span class="text-2xl" aria-hidden="true" { "💰" }
                        span class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Spendwise"
                        }
                    }

                    div class="hidden w-full lg:block lg:w-auto"
                    {
                        ul
                            class="font-medium flex flex-col p-4 lg:p-0 mt-4
                            border border-gray-100 rounded bg-gray-50
                            lg:flex-row lg:space-x-8 lg:mt-0
                            lg:border-0 lg:bg-white dark:bg-gray-800
                            lg:dark:bg-gray-900 dark:border-gray-700"
                        {
                            @for link in &self.links {
                                li { (link.desktop_html()) }
                            }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden"
            {
                div class="mx-auto max-w-screen-xl px-4 pb-4"
                {
                    ul
                        class="grid grid-cols-4 gap-2 px-4 py-3 rounded-xl border
                        border-gray-200 bg-white/95 shadow-lg backdrop-blur
                        dark:border-gray-700 dark:bg-gray-900/95"
                        aria-label="Primary"
                    {
                        @for link in &self.links {
                            li class="min-w-0" { (link.mobile_html()) }
                        }
                    }
                }
            }
        }
    }
}
