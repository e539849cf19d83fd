//! The page and endpoint for adding a ledger entry.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::html;

use crate::{
    auth::UserID,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, currency_input_styles},
    ledger::{
        form::{FormMode, entry_form, entry_form_fields},
        lifecycle::SubmitFailure,
        period::{Period, dashboard_url},
        state::LedgerState,
        store::LedgerStore,
        validation::{EntryForm, FieldErrors},
    },
    navigation::NavBar,
    timezone::local_today,
};

/// Display the form for a new entry, dated today.
pub async fn get_new_entry_page(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    let categories = match state.store().list_categories() {
        Ok(categories) => categories,
        Err(error) => {
            tracing::error!("Could not load categories for the new entry page: {error}");
            return error.into_response();
        }
    };

    let form = EntryForm {
        posted_date: today.to_string(),
        ..Default::default()
    };
    let nav_bar = NavBar::new(endpoints::NEW_ENTRY_VIEW)
        .user_name(state.user_name(user_id).as_deref())
        .into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "New entry" }

            (entry_form(FormMode::Create, &form, &FieldErrors::default(), &categories))
        }
    };

    base("New Entry", &[currency_input_styles()], &content).into_response()
}

/// A route handler for creating a new entry.
///
/// On success the client is redirected to the month of the new entry.
/// Invalid fields re-render the form with a 422 status and store failures
/// are shown as an alert.
pub async fn create_entry_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<EntryForm>,
) -> Response {
    let mut lifecycle = state.lifecycle(user_id);

    match lifecycle.submit_create(&form) {
        Ok(entry) => {
            tracing::info!("User {user_id} created entry {}", entry.id);

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
                entry_form_fields(FormMode::Create, &form, &errors, &categories),
            )
                .into_response()
        }
        Err(SubmitFailure::Store(error)) => {
            tracing::error!("Could not create entry for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}
