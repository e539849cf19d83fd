//! Deleting a ledger entry, with a confirmation step.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    alert::Alert,
    auth::UserID,
    endpoints::{self, format_endpoint},
    html::{BUTTON_SECONDARY_STYLE, format_currency},
    ledger::{
        core::{EntryId, LedgerEntry},
        dashboard_page::{ENTRY_ROWS_ID, entry_rows, period_summary},
        lifecycle::SubmitFailure,
        period::Period,
        state::LedgerState,
        store::LedgerStore,
    },
};

const BUTTON_DANGER_STYLE: &str = "w-full py-2.5 px-5 mb-2 text-sm font-medium text-white \
    bg-red-600 rounded-lg hover:bg-red-700 focus:ring-4 focus:outline-none focus:ring-red-300 \
    dark:bg-red-600 dark:hover:bg-red-700 dark:focus:ring-red-900";

fn confirm_delete_dialog(entry: &LedgerEntry) -> Markup {
    html! {
        div
            id="confirm-delete"
            role="dialog"
            aria-modal="true"
            aria-labelledby="confirm-delete-title"
            class="fixed inset-0 z-50 flex items-center justify-center bg-gray-900/50"
        {
            div class="w-full max-w-md p-6 space-y-4 rounded-lg shadow bg-white dark:bg-gray-800"
            {
                h3 id="confirm-delete-title" class="text-lg font-semibold" { "Delete entry?" }

                p
                {
                    "\"" (entry.description) "\" of " (format_currency(entry.amount.value()))
                    " on " (entry.posted_date) " will be deleted. This cannot be undone."
                }

                div class="flex gap-4"
                {
                    button
                        type="button"
                        class=(BUTTON_SECONDARY_STYLE)
                        onclick="document.getElementById('dialog-container').innerHTML = ''"
                    {
                        "Cancel"
                    }

                    button
                        type="button"
                        id="confirm-delete-button"
                        hx-delete=(format_endpoint(endpoints::ENTRY_API, entry.id.as_i64()))
                        hx-target={"#" (ENTRY_ROWS_ID)}
                        hx-swap="innerHTML"
                        hx-target-error="#alert-container"
                        hx-disabled-elt="this"
                        class=(BUTTON_DANGER_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

/// Ask the user to confirm deleting an entry.
///
/// Responds with a dialog fragment for the page's dialog container, or an
/// alert if the entry is missing or belongs to someone else.
pub async fn get_delete_entry_dialog(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Path(entry_id): Path<EntryId>,
) -> Response {
    match state.store().get(entry_id, user_id) {
        Ok(entry) => confirm_delete_dialog(&entry).into_response(),
        Err(error) => {
            tracing::warn!("User {user_id} cannot delete entry {entry_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting an entry.
///
/// Responds with the remaining rows of the entry's month plus out-of-band
/// swaps for the totals, the closed dialog and a success alert.
pub async fn delete_entry_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Path(entry_id): Path<EntryId>,
) -> Response {
    let mut lifecycle = state.lifecycle(user_id);

    let entry = match lifecycle.store().get(entry_id, user_id) {
        Ok(entry) => entry,
        Err(error) => {
            tracing::warn!("User {user_id} cannot delete entry {entry_id}: {error}");
            return error.into_alert_response();
        }
    };

    let period = Period::containing(entry.posted_date);
    if let Err(error) = lifecycle.load_period(period) {
        return error.into_alert_response();
    }

    let pending = match lifecycle.request_delete(entry_id) {
        Ok(pending) => pending,
        Err(error) => return error.into_alert_response(),
    };

    match lifecycle.confirm_delete(pending) {
        Ok(()) => {}
        Err(SubmitFailure::Store(error)) => {
            tracing::error!("Could not delete entry {entry_id} for user {user_id}: {error}");
            return error.into_alert_response();
        }
        Err(SubmitFailure::Validation(errors)) => {
            tracing::error!("Deleting entry {entry_id} failed validation: {errors:?}");
            return Alert::ErrorSimple {
                message: "Could not delete the entry".to_owned(),
            }
            .into_response();
        }
    }

    tracing::info!("User {user_id} deleted entry {entry_id}");

    let Some(view) = lifecycle.view() else {
        return Alert::SuccessSimple {
            message: "Entry deleted".to_owned(),
        }
        .into_response();
    };

    let alert = Alert::Success {
        message: "Entry deleted".to_owned(),
        details: format!("The totals for {period} have been updated."),
    };

    html! {
        (entry_rows(&view.entries))
        (period_summary(&view.aggregate, true))
        div id="dialog-container" hx-swap-oob="true" {}
        (alert.into_html())
    }
    .into_response()
}
