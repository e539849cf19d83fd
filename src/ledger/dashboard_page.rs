//! The dashboard: one month of ledger entries with their totals.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rust_decimal::Decimal;
use time::{Date, Month};

use crate::{
    auth::UserID,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    ledger::{
        aggregation::PeriodAggregate,
        core::{CategoryKind, LedgerEntry, PaymentStatus},
        lifecycle::PeriodView,
        period::{Period, PeriodQuery, dashboard_url},
        state::LedgerState,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// The ID of the table body holding the entry rows.
pub const ENTRY_ROWS_ID: &str = "entry-rows";

pub const EMPTY_PERIOD_MSG: &str = "No entries for this month.";

fn month_choices() -> impl Iterator<Item = Month> {
    (1..=12u8).filter_map(|month| Month::try_from(month).ok())
}

fn period_picker(period: Period, today: Date) -> Markup {
    let previous = period.previous().map(dashboard_url);
    let next = period.next().map(dashboard_url);

    html! {
        div class="flex flex-wrap items-center justify-between gap-4"
        {
            @if let Some(previous) = previous {
                a href=(previous) id="previous-period" class=(LINK_STYLE) { "← Previous" }
            } @else {
                span {}
            }

            form
                method="get"
                action=(endpoints::DASHBOARD_VIEW)
                id="period-picker"
                class="flex items-center gap-2"
            {
                label for="month" class="sr-only" { "Month" }
                select name="month" id="month" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for month in month_choices() {
                        option value=(u8::from(month)) selected[month == period.month()]
                        {
                            (month)
                        }
                    }
                }

                label for="year" class="sr-only" { "Year" }
                select name="year" id="year" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for year in period.year_choices(today) {
                        option value=(year) selected[year == period.year()] { (year) }
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Show" }
            }

            @if let Some(next) = next {
                a href=(next) id="next-period" class=(LINK_STYLE) { "Next →" }
            } @else {
                span {}
            }
        }
    }
}

fn summary_card(kind: &str, title: &str, amount: Decimal) -> Markup {
    html! {
        div
            data-total=(kind)
            class="p-4 bg-white rounded-lg shadow dark:bg-gray-800"
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            p class="text-2xl font-bold" { (format_currency(amount)) }
        }
    }
}

/// The income, expense and balance totals of a period, plus a warning for
/// entries that could not be counted.
///
/// With `swap_oob` the summary replaces the one already on the page when it
/// is part of an HTMX response.
pub fn period_summary(aggregate: &PeriodAggregate, swap_oob: bool) -> Markup {
    html! {
        div
            id="period-summary"
            hx-swap-oob=[swap_oob.then_some("true")]
            class="space-y-4"
        {
            div class="grid grid-cols-1 md:grid-cols-3 gap-4"
            {
                (summary_card("income", "Income", aggregate.total_income))
                (summary_card("expense", "Expenses", aggregate.total_expense))
                (summary_card("balance", "Balance", aggregate.balance))
            }

            @if !aggregate.unclassified.is_empty() {
                div
                    id="unclassified-warning"
                    role="status"
                    class="p-4 text-sm rounded-lg border text-yellow-800 bg-yellow-50
                        border-yellow-300 dark:bg-gray-800 dark:text-yellow-300
                        dark:border-yellow-800"
                {
                    p class="font-semibold"
                    {
                        "Some entries are not counted in the totals because their category is not income or expense:"
                    }

                    ul class="mt-1 list-disc list-inside"
                    {
                        @for entry in &aggregate.unclassified {
                            li { (entry.label) " (" (format_currency(entry.amount)) ")" }
                        }
                    }
                }
            }
        }
    }
}

fn signed_amount(entry: &LedgerEntry) -> Decimal {
    match entry.category.kind() {
        CategoryKind::Expense => -entry.amount.value(),
        CategoryKind::Income | CategoryKind::Unclassified => entry.amount.value(),
    }
}

fn entry_row(entry: &LedgerEntry) -> Markup {
    let amount_style = match entry.category.kind() {
        CategoryKind::Income => "text-green-600 dark:text-green-400",
        CategoryKind::Expense => "text-red-600 dark:text-red-400",
        CategoryKind::Unclassified => "text-yellow-600 dark:text-yellow-400",
    };

    html! {
        tr id={"entry-" (entry.id)} class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (entry.posted_date) }
            td class=(TABLE_CELL_STYLE) { (entry.category.label) }
            td class=(TABLE_CELL_STYLE) { (entry.description) }
            td class={(TABLE_CELL_STYLE) " " (amount_style)}
            {
                (format_currency(signed_amount(entry)))
            }
            td class=(TABLE_CELL_STYLE)
            {
                @match entry.payment {
                    PaymentStatus::Paid(date) => {
                        span title={"Paid on " (date)} { "Paid" }
                    }
                    PaymentStatus::Pending => {
                        span { "Pending" }
                    }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a
                        href=(format_endpoint(endpoints::EDIT_ENTRY_VIEW, entry.id.as_i64()))
                        class=(LINK_STYLE)
                    {
                        "Edit"
                    }

                    button
                        type="button"
                        hx-get=(format_endpoint(endpoints::DELETE_ENTRY_VIEW, entry.id.as_i64()))
                        hx-target="#dialog-container"
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

/// The rows of the entry table, or a single row saying the period is empty.
pub fn entry_rows(entries: &[LedgerEntry]) -> Markup {
    html! {
        @for entry in entries {
            (entry_row(entry))
        }

        @if entries.is_empty() {
            tr
            {
                td
                    colspan="6"
                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                {
                    (EMPTY_PERIOD_MSG) " "
                    a href=(endpoints::NEW_ENTRY_VIEW) class=(LINK_STYLE) { "Add an entry" }
                }
            }
        }
    }
}

fn entry_table(entries: &[LedgerEntry]) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md rounded-lg dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        @for heading in ["Date", "Category", "Description", "Amount", "Status", "Actions"] {
                            th scope="col" class=(TABLE_CELL_STYLE) { (heading) }
                        }
                    }
                }

                tbody id=(ENTRY_ROWS_ID)
                {
                    (entry_rows(entries))
                }
            }
        }
    }
}

fn store_error_banner() -> Markup {
    html! {
        div
            id="load-error"
            role="alert"
            class="p-4 text-sm rounded-lg border text-red-800 bg-red-50 border-red-300
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        {
            p class="font-semibold" { "Could not load your entries" }
            p class="mt-1" { "The ledger could not be reached. Refresh the page to try again." }
        }
    }
}

fn dashboard_view(
    view: &PeriodView,
    today: Date,
    load_failed: bool,
    user_name: Option<&str>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW)
        .user_name(user_name)
        .into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                div class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { (view.period) }

                    a href=(endpoints::NEW_ENTRY_VIEW) class=(LINK_STYLE) { "New entry" }
                }

                (period_picker(view.period, today))

                @if load_failed {
                    (store_error_banner())
                }

                (period_summary(&view.aggregate, false))
                (entry_table(&view.entries))

                div id="dialog-container" {}
            }
        }
    };

    base("Dashboard", &[], &content)
}

/// Display the entries and totals of the month picked with `?month=&year=`,
/// defaulting to the current month.
///
/// If the ledger cannot be read the page still renders, with an empty month
/// and an error message.
pub async fn get_dashboard_page(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };
    let period = query.resolve(today);

    let mut lifecycle = state.lifecycle(user_id);
    let (view, load_failed) = match lifecycle.load_period(period) {
        Ok(view) => (view.clone(), false),
        Err(_) => (PeriodView::empty(period), true),
    };

    let user_name = state.user_name(user_id);

    dashboard_view(&view, today, load_failed, user_name.as_deref()).into_response()
}
