//! The page and endpoint for changing an existing ledger entry.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::html;

use crate::{
    Error,
    auth::UserID,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, currency_input_styles},
    ledger::{
        core::EntryId,
        form::{FormMode, entry_form, entry_form_fields, form_from_entry},
        lifecycle::SubmitFailure,
        period::{Period, dashboard_url},
        state::LedgerState,
        store::LedgerStore,
        validation::{EntryForm, FieldErrors},
    },
    navigation::NavBar,
};

/// Display the edit form filled in with the entry's current values.
///
/// Entries that do not exist and entries of other users both get the 404 page.
pub async fn get_edit_entry_page(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Path(entry_id): Path<EntryId>,
) -> Response {
    let entry = match state.store().get(entry_id, user_id) {
        Ok(entry) => entry,
        Err(Error::NotFoundOrForbidden) => {
            tracing::info!("User {user_id} requested missing or foreign entry {entry_id}");
            return Error::NotFoundOrForbidden.into_response();
        }
        Err(error) => {
            tracing::error!("Could not load entry {entry_id}: {error}");
            return error.into_response();
        }
    };

    let form = form_from_entry(&entry);
    let nav_bar = NavBar::new(endpoints::EDIT_ENTRY_VIEW)
        .user_name(state.user_name(user_id).as_deref())
        .into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Edit entry" }

            (entry_form(
                FormMode::Edit(entry_id),
                &form,
                &FieldErrors::default(),
                &[entry.category],
            ))
        }
    };

    base("Edit Entry", &[currency_input_styles()], &content).into_response()
}

/// A route handler for updating an entry, redirects to the entry's month on success.
///
/// The category is never changed. Invalid fields re-render the form with a
/// 422 status, anything else is shown as an alert.
pub async fn update_entry_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Path(entry_id): Path<EntryId>,
    Form(form): Form<EntryForm>,
) -> Response {
    let mut lifecycle = state.lifecycle(user_id);

    match lifecycle.submit_update(entry_id, &form) {
        Ok(entry) => {
            tracing::info!("User {user_id} updated entry {entry_id}");

            (
                HxRedirect(dashboard_url(Period::containing(entry.posted_date))),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(SubmitFailure::Validation(errors)) => {
            let categories = lifecycle.store().list_categories().unwrap_or_else(|error| {
                tracing::warn!("Could not load categories to re-render the entry form: {error}");
                Vec::new()
            });

            (
                StatusCode::UNPROCESSABLE_ENTITY,
                entry_form_fields(FormMode::Edit(entry_id), &form, &errors, &categories),
            )
                .into_response()
        }
        Err(SubmitFailure::Store(error)) => {
            tracing::error!("Could not update entry {entry_id} for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}
