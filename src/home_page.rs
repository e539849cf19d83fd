//! The public landing page at the root path.

use axum::response::{IntoResponse, Response};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    auth::get_token_from_cookies,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, PAGE_CONTAINER_STYLE, base},
};

fn home_view(logged_in: bool) -> Markup {
    let content = html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            section id="hero" class="w-full max-w-3xl py-16 text-center space-y-4"
            {
                h1 class="text-4xl font-extrabold tracking-tight lg:text-5xl"
                {
                    "Take control of your finances"
                }

                p class="text-lg text-gray-500 dark:text-gray-400"
                {
                    "Keep track of your income and expenses in one place."
                }

                div class="flex flex-col sm:flex-row justify-center gap-4 max-w-md mx-auto pt-4"
                {
                    @if logged_in {
                        a id="go-to-dashboard" href=(endpoints::DASHBOARD_VIEW) class=(BUTTON_PRIMARY_STYLE)
                        {
                            "Go to your dashboard"
                        }
                    } @else {
                        a id="get-started" href=(endpoints::REGISTER_VIEW) class=(BUTTON_PRIMARY_STYLE)
                        {
                            "Get started"
                        }

                        a id="log-in" href=(endpoints::LOG_IN_VIEW) class=(BUTTON_SECONDARY_STYLE)
                        {
                            "Log in"
                        }
                    }
                }
            }

            section id="about" class="w-full max-w-3xl space-y-2"
            {
                h2 class="text-2xl font-bold" { "Welcome to PrimeFinance" }

                p
                {
                    "Record what comes in and what goes out, see the totals for each \
                    month and keep an eye on what is still to be paid."
                }
            }
        }
    };

    base("Home", &[], &content)
}

/// Display the landing page.
///
/// Visitors with a valid session are pointed at their dashboard, everyone
/// else at the registration and log-in pages.
pub async fn get_home_page(jar: PrivateCookieJar) -> Response {
    let logged_in = get_token_from_cookies(&jar).is_ok();

    home_view(logged_in).into_response()
}
